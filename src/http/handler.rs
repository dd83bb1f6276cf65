//! Request handlers.
//!
//! A [`Handler`] is the terminal unit of work for a route: it takes the
//! request by value and resolves to a response. Handlers are reference
//! counted so the same handler can sit behind many routes and methods.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use futures_util::future::BoxFuture;

type HandlerFn = dyn Fn(Request<Body>) -> BoxFuture<'static, Response<Body>> + Send + Sync;

/// A cloneable, type-erased async request handler.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<HandlerFn>,
}

impl Handler {
    /// Wrap a function that already returns a boxed response future.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Request<Body>) -> BoxFuture<'static, Response<Body>> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Invoke the handler.
    pub fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response<Body>> {
        (self.inner)(req)
    }

    /// Returns true if both values point at the same underlying function.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

/// Adapt an async function into a [`Handler`].
///
/// ```ignore
/// async fn hello(_: Request<Body>) -> &'static str { "hello" }
/// router.get("/", handler_fn(hello), &[])?;
/// ```
pub fn handler_fn<F, Fut, R>(f: F) -> Handler
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    Handler::new(move |req| {
        let fut = f(req);
        Box::pin(async move { fut.await.into_response() })
    })
}
