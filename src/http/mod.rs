//! HTTP-facing pieces of the router.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, TraceLayer, TimeoutLayer)
//!     → routing::Dispatcher (resolve, bind params)
//!     → middleware.rs (composed chain, outermost first)
//!     → handler.rs (terminal handler)
//!     → response.rs (404 / 405 / redirect when nothing runs)
//! ```

pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{handler_fn, Handler};
pub use middleware::{middleware_fn, Middleware, MiddlewareChain, Next};
pub use request::{access_log, request_id, RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
