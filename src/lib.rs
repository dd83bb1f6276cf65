//! Path-routing and middleware-composition core for HTTP servers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::{AppConfig, RouterConfig};
pub use http::{handler_fn, middleware_fn, Handler, HttpServer, Middleware, MiddlewareChain, Next};
pub use lifecycle::Shutdown;
pub use routing::{
    Dispatcher, Group, Options, Params, RequestParamsExt, Resolution, RouteRegistrar, RouterError,
};
