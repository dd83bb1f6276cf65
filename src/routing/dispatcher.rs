//! Request dispatch.
//!
//! # Responsibilities
//! - Own the route table, the root group and the not-found handler
//! - Resolve (method, path) to a route, redirect, 405 or 404
//! - Bind params into the request and run the composed handler
//!
//! # Design Decisions
//! - Resolution returns owned values, so no lock is held while a handler runs
//! - Redirects and 405s are plain outcomes, never errors
//! - The request is passed through untouched apart from the params binding

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use futures_util::future::BoxFuture;
use tower::Service;

use crate::config::{ConfigError, RedirectBehavior, RouterConfig};
use crate::config::validation::redirect_table;
use crate::http::handler::Handler;
use crate::http::middleware::{Middleware, MiddlewareChain};
use crate::http::response;
use crate::routing::error::RouterError;
use crate::routing::group::{register, Group, RouteRegistrar};
use crate::routing::params::Params;
use crate::routing::path::{clean_path, split_path, toggle_trailing_slash};
use crate::routing::store::RouteStore;
use crate::routing::trie::{AllowedMethods, Lookup, Node, RouteEntry};

/// Dispatcher construction options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub config: RouterConfig,

    /// Invoked when no route matches. Defaults to a plain 404.
    pub not_found: Option<Handler>,
}

impl Options {
    pub fn with_not_found(mut self, handler: Handler) -> Self {
        self.not_found = Some(handler);
        self
    }
}

/// Outcome of resolving a request against the route table.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A route matched. `params` holds the bound path parameters.
    Matched { entry: RouteEntry, params: Params },
    /// The canonical form of the path matched; send the client there.
    Redirect { location: String, status: StatusCode },
    /// The path exists but not for this method.
    MethodNotAllowed(AllowedMethods),
    /// Nothing matched.
    NotFound,
}

pub(crate) struct Shared {
    pub(crate) store: RouteStore,
    root_chain: ArcSwap<MiddlewareChain>,
    config: RouterConfig,
    redirects: HashMap<Method, RedirectBehavior>,
    not_found: Handler,
}

impl Shared {
    fn redirect_behavior(&self, method: &Method) -> RedirectBehavior {
        self.redirects
            .get(method)
            .copied()
            .unwrap_or(self.config.default_redirect)
    }
}

/// The entry point for every request.
///
/// Cloning is cheap: clones share the route table and the root chain, so
/// `use_middleware` on any clone applies to routes later registered
/// through any other. Groups still snapshot the root chain when created.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

impl Dispatcher {
    /// Build a dispatcher. Fails if the redirect table names a non-method.
    pub fn new(options: Options) -> Result<Self, ConfigError> {
        let redirects = redirect_table(&options.config).map_err(ConfigError::Validation)?;
        let shared = Arc::new(Shared {
            store: RouteStore::new(options.config.safe_add_routes_while_running),
            root_chain: ArcSwap::from_pointee(MiddlewareChain::new()),
            redirects,
            not_found: options.not_found.unwrap_or_else(response::default_not_found),
            config: options.config,
        });

        tracing::debug!(
            safe_add_routes_while_running = shared.store.accepts_live_registration(),
            "Dispatcher created"
        );

        Ok(Self { shared })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.shared.config
    }

    /// Resolve `method` and `path` without running anything.
    ///
    /// `query` is appended to redirect locations.
    pub fn resolve(&self, method: &Method, path: &str, query: Option<&str>) -> Resolution {
        self.shared
            .store
            .read(|root| resolve_in(&self.shared, root, method, path, query))
    }

    /// Serve one request.
    pub async fn serve(&self, mut req: Request<Body>) -> Response<Body> {
        self.shared.store.mark_serving();

        let resolution = self.resolve(req.method(), req.uri().path(), req.uri().query());
        match resolution {
            Resolution::Matched { entry, params } => {
                tracing::trace!(method = %req.method(), route = %entry.pattern(), "Route matched");
                params.bind(&mut req);
                entry.handler().call(req).await
            }
            Resolution::Redirect { location, status } => {
                tracing::debug!(method = %req.method(), path = %req.uri().path(), location = %location, status = %status, "Redirecting");
                response::redirect(status, &location)
            }
            Resolution::MethodNotAllowed(allowed) => {
                tracing::debug!(method = %req.method(), path = %req.uri().path(), allow = %allowed.header_value(), "Method not allowed");
                response::method_not_allowed(&allowed)
            }
            Resolution::NotFound => {
                tracing::debug!(method = %req.method(), path = %req.uri().path(), "No route matched");
                self.shared.not_found.call(req).await
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.shared.config)
            .field("root_chain", &self.chain())
            .finish()
    }
}

fn resolve_in(
    shared: &Shared,
    root: &Node,
    method: &Method,
    path: &str,
    query: Option<&str>,
) -> Resolution {
    let config = &shared.config;
    let mut target = if config.redirect_clean_path {
        clean_path(path)
    } else {
        path.to_string()
    };
    let mut canonical_differs = target != path;

    let head_can_use_get = config.head_can_use_get;
    let mut lookup = root.lookup(&split_path(&target), method, head_can_use_get);

    if matches!(lookup, Lookup::NotFound) && config.redirect_trailing_slash {
        if let Some(alternate) = toggle_trailing_slash(&target) {
            lookup = root.lookup(&split_path(&alternate), method, head_can_use_get);
            if !matches!(lookup, Lookup::NotFound) {
                target = alternate;
                canonical_differs = true;
            }
        }
    }

    let (entry, params) = match lookup {
        Lookup::Matched(entry, params) => (entry, params),
        Lookup::MethodNotAllowed(node) => {
            let allowed = AllowedMethods::new(node.methods().cloned().collect(), head_can_use_get);
            return Resolution::MethodNotAllowed(allowed);
        }
        Lookup::NotFound => return Resolution::NotFound,
    };

    if canonical_differs {
        if let Some(status) = shared.redirect_behavior(method).status_for(method) {
            let location = match query {
                Some(q) => format!("{target}?{q}"),
                None => target,
            };
            return Resolution::Redirect { location, status };
        }
    }

    Resolution::Matched {
        entry: entry.clone(),
        params,
    }
}

impl RouteRegistrar for Dispatcher {
    fn handle_methods(
        &self,
        methods: &[Method],
        path: &str,
        handler: Handler,
        middleware: &[Middleware],
    ) -> Result<(), RouterError> {
        let chain = self.shared.root_chain.load();
        register(&self.shared, "", &chain, methods, path, handler, middleware)
    }

    fn group(&self, prefix: &str) -> Result<Group, RouterError> {
        Group::nested(Arc::clone(&self.shared), "", prefix, self.chain())
    }

    fn use_middleware<I>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = Middleware>,
    {
        let added: Vec<Middleware> = middleware.into_iter().collect();
        self.shared
            .root_chain
            .rcu(|chain| chain.extend(added.iter().cloned()));
        self
    }

    fn chain(&self) -> MiddlewareChain {
        MiddlewareChain::clone(&self.shared.root_chain.load())
    }
}

impl Service<Request<Body>> for Dispatcher {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { Ok(dispatcher.serve(req).await) })
    }
}
