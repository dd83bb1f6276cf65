//! Middleware constructors and chains.
//!
//! # Responsibilities
//! - Represent a middleware as a constructor: `Handler -> Handler`
//! - Keep an ordered, persistent list of constructors
//! - Compose a list around a terminal handler
//!
//! # Design Decisions
//! - `[m1, m2].then(h)` builds `m1(m2(h))`: the first appended sees the
//!   request first and the response last
//! - `append` never mutates the receiver, so groups can hold snapshots
//! - Composition happens once at registration, not per request

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::IntoResponse;

use crate::http::handler::Handler;

/// The downstream handler as seen from inside a middleware.
pub type Next = Handler;

type ConstructorFn = dyn Fn(Handler) -> Handler + Send + Sync;

/// A middleware constructor: wraps a handler to produce a new handler.
#[derive(Clone)]
pub struct Middleware {
    constructor: Arc<ConstructorFn>,
}

impl Middleware {
    /// Build a middleware from a raw constructor.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self {
            constructor: Arc::new(f),
        }
    }

    /// Wrap `next` with this middleware.
    pub fn wrap(&self, next: Handler) -> Handler {
        (self.constructor)(next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware").finish_non_exhaustive()
    }
}

/// Adapt an async `(request, next)` function into a [`Middleware`].
///
/// The function decides whether and when to call `next`; work done after
/// awaiting `next.call(req)` runs on the way out.
pub fn middleware_fn<F, Fut, R>(f: F) -> Middleware
where
    F: Fn(Request<Body>, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    let f = Arc::new(f);
    Middleware::new(move |next: Handler| {
        let f = Arc::clone(&f);
        Handler::new(move |req| {
            let fut = f(req, next.clone());
            Box::pin(async move { fut.await.into_response() })
        })
    })
}

/// An ordered, immutable sequence of middleware constructors.
#[derive(Clone)]
pub struct MiddlewareChain {
    constructors: Arc<[Middleware]>,
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self {
            constructors: Arc::from(Vec::new()),
        }
    }
}

impl MiddlewareChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new chain with `middleware` added at the end.
    #[must_use]
    pub fn append(&self, middleware: Middleware) -> Self {
        self.extend([middleware])
    }

    /// Return a new chain with every item of `middleware` added at the end, in order.
    #[must_use]
    pub fn extend<I>(&self, middleware: I) -> Self
    where
        I: IntoIterator<Item = Middleware>,
    {
        let constructors: Vec<Middleware> = self
            .constructors
            .iter()
            .cloned()
            .chain(middleware)
            .collect();
        Self {
            constructors: constructors.into(),
        }
    }

    /// Compose the chain around `handler`.
    pub fn then(&self, handler: Handler) -> Handler {
        self.constructors
            .iter()
            .rev()
            .fold(handler, |next, middleware| middleware.wrap(next))
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Middleware> {
        self.constructors.iter()
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.len())
            .finish()
    }
}

impl FromIterator<Middleware> for MiddlewareChain {
    fn from_iter<I: IntoIterator<Item = Middleware>>(iter: I) -> Self {
        MiddlewareChain::new().extend(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::handler_fn;
    use std::sync::Mutex;

    fn recorder(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Middleware {
        middleware_fn(move |req, next: Next| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(format!("{name}-enter"));
                let res = next.call(req).await;
                log.lock().unwrap().push(format!("{name}-exit"));
                res
            }
        })
    }

    #[tokio::test]
    async fn test_execution_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = MiddlewareChain::new()
            .append(recorder("A", Arc::clone(&log)))
            .append(recorder("B", Arc::clone(&log)));

        let handler_log = Arc::clone(&log);
        let handler = handler_fn(move |_req| {
            let log = Arc::clone(&handler_log);
            async move {
                log.lock().unwrap().push("H".to_string());
                "ok"
            }
        });

        chain.then(handler).call(Request::new(Body::empty())).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["A-enter", "B-enter", "H", "B-exit", "A-exit"]
        );
    }

    #[test]
    fn test_append_does_not_mutate_original() {
        let base = MiddlewareChain::new().append(Middleware::new(|h| h));
        let longer = base.append(Middleware::new(|h| h));

        assert_eq!(base.len(), 1);
        assert_eq!(longer.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_chain_returns_handler() {
        let handler = handler_fn(|_req| async { "plain" });
        let composed = MiddlewareChain::new().then(handler.clone());
        assert!(composed.ptr_eq(&handler));
    }

    #[tokio::test]
    async fn test_middleware_can_short_circuit() {
        use axum::http::StatusCode;

        let deny = middleware_fn(|_req, _next: Next| async { StatusCode::FORBIDDEN });
        let handler = handler_fn(|_req| async { "unreachable" });
        let res = MiddlewareChain::from_iter([deny])
            .then(handler)
            .call(Request::new(Body::empty()))
            .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
