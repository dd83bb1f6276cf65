//! Route registration: the registrar trait and prefixed groups.
//!
//! # Responsibilities
//! - Expose one registration surface for the dispatcher and its groups
//! - Accumulate path prefixes across nested groups
//! - Snapshot the parent's middleware chain when a group is created
//!
//! # Design Decisions
//! - A group's effective chain is `parent chain at creation ++ own chain`
//! - Route-specific middleware always runs inside the group chain
//! - `use_middleware` only affects routes registered after the call

use std::sync::Arc;

use axum::http::Method;

use crate::http::handler::Handler;
use crate::http::middleware::{Middleware, MiddlewareChain};
use crate::routing::dispatcher::Shared;
use crate::routing::error::RouterError;
use crate::routing::path::{join_route, normalize_prefix, parse_pattern};
use crate::routing::trie::RouteEntry;

/// Methods registered by [`RouteRegistrar::any`].
pub const ANY_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::CONNECT,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
];

/// Route registration shared by [`crate::routing::Dispatcher`] and [`Group`].
pub trait RouteRegistrar {
    /// Register `handler` for each of `methods` at `path`, wrapped by this
    /// registrar's chain and then by `middleware`.
    ///
    /// The batch is checked as a whole first: on error no method is
    /// registered.
    fn handle_methods(
        &self,
        methods: &[Method],
        path: &str,
        handler: Handler,
        middleware: &[Middleware],
    ) -> Result<(), RouterError>;

    /// Create a nested group under `prefix`.
    fn group(&self, prefix: &str) -> Result<Group, RouterError>;

    /// Append to this registrar's own chain.
    fn use_middleware<I>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = Middleware>,
        Self: Sized;

    /// The chain routes registered here are wrapped by, outermost first.
    fn chain(&self) -> MiddlewareChain;

    /// Register `handler` for `method` at `path`.
    fn handle(
        &self,
        method: Method,
        path: &str,
        handler: Handler,
        middleware: &[Middleware],
    ) -> Result<(), RouterError> {
        self.handle_methods(std::slice::from_ref(&method), path, handler, middleware)
    }

    fn get(&self, path: &str, handler: Handler, middleware: &[Middleware]) -> Result<(), RouterError> {
        self.handle(Method::GET, path, handler, middleware)
    }

    fn post(&self, path: &str, handler: Handler, middleware: &[Middleware]) -> Result<(), RouterError> {
        self.handle(Method::POST, path, handler, middleware)
    }

    fn put(&self, path: &str, handler: Handler, middleware: &[Middleware]) -> Result<(), RouterError> {
        self.handle(Method::PUT, path, handler, middleware)
    }

    fn delete(&self, path: &str, handler: Handler, middleware: &[Middleware]) -> Result<(), RouterError> {
        self.handle(Method::DELETE, path, handler, middleware)
    }

    fn patch(&self, path: &str, handler: Handler, middleware: &[Middleware]) -> Result<(), RouterError> {
        self.handle(Method::PATCH, path, handler, middleware)
    }

    fn head(&self, path: &str, handler: Handler, middleware: &[Middleware]) -> Result<(), RouterError> {
        self.handle(Method::HEAD, path, handler, middleware)
    }

    fn options(&self, path: &str, handler: Handler, middleware: &[Middleware]) -> Result<(), RouterError> {
        self.handle(Method::OPTIONS, path, handler, middleware)
    }

    /// Register the same handler and middleware under every method in
    /// [`ANY_METHODS`]. If any of them is already taken, none is added.
    fn any(&self, path: &str, handler: Handler, middleware: &[Middleware]) -> Result<(), RouterError> {
        self.handle_methods(&ANY_METHODS, path, handler, middleware)
    }
}

/// Join `path` onto `prefix`, wrap `handler` in `chain ++ middleware` and
/// insert it under every method in one step.
pub(crate) fn register(
    shared: &Shared,
    prefix: &str,
    chain: &MiddlewareChain,
    methods: &[Method],
    path: &str,
    handler: Handler,
    middleware: &[Middleware],
) -> Result<(), RouterError> {
    let full_path = join_route(prefix, path)?;
    let segments = parse_pattern(&full_path)?;
    let chain = chain.extend(middleware.iter().cloned());
    let routes = methods
        .iter()
        .map(|method| {
            let entry = RouteEntry::new(full_path.as_str(), handler.clone(), chain.clone());
            (method.clone(), entry)
        })
        .collect();

    match shared.store.insert(&full_path, &segments, routes) {
        Ok(()) => {
            tracing::debug!(methods = ?methods, path = %full_path, "Route registered");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(methods = ?methods, path = %full_path, error = %e, "Route rejected");
            Err(e)
        }
    }
}

/// A prefixed routing scope over the dispatcher's route table.
#[derive(Clone)]
pub struct Group {
    shared: Arc<Shared>,
    prefix: String,
    chain: MiddlewareChain,
}

impl Group {
    /// A group under `parent_prefix ++ prefix` starting from `chain`.
    pub(crate) fn nested(
        shared: Arc<Shared>,
        parent_prefix: &str,
        prefix: &str,
        chain: MiddlewareChain,
    ) -> Result<Self, RouterError> {
        let prefix = normalize_prefix(prefix)?;
        Ok(Self {
            shared,
            prefix: format!("{parent_prefix}{prefix}"),
            chain,
        })
    }

    /// The accumulated path prefix, without a trailing slash.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("prefix", &self.prefix)
            .field("chain", &self.chain)
            .finish()
    }
}

impl RouteRegistrar for Group {
    fn handle_methods(
        &self,
        methods: &[Method],
        path: &str,
        handler: Handler,
        middleware: &[Middleware],
    ) -> Result<(), RouterError> {
        register(&self.shared, &self.prefix, &self.chain, methods, path, handler, middleware)
    }

    fn group(&self, prefix: &str) -> Result<Group, RouterError> {
        Group::nested(Arc::clone(&self.shared), &self.prefix, prefix, self.chain.clone())
    }

    fn use_middleware<I>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.chain = self.chain.extend(middleware);
        self
    }

    fn chain(&self) -> MiddlewareChain {
        self.chain.clone()
    }
}
