//! Request identification and access logging.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Expose the ID to downstream handlers through request extensions
//! - Echo the ID on the response
//! - Log one line per request with method, path, status and latency
//!
//! # Design Decisions
//! - Both are plain middleware constructors, composable with `use_middleware`
//! - Request ID is added as early as possible for tracing, so it belongs
//!   first in the root chain

use std::time::Instant;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use uuid::Uuid;

use crate::http::middleware::{middleware_fn, Middleware, Next};

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    fn generate() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }
}

/// Read the request ID set by [`request_id`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Middleware that assigns a request ID and echoes it on the response.
pub fn request_id() -> Middleware {
    middleware_fn(|mut req: Request<Body>, next: Next| async move {
        let id = req
            .headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| RequestId(v.to_string()))
            .unwrap_or_else(RequestId::generate);

        let header = HeaderValue::from_str(&id.0).ok();
        if let Some(value) = &header {
            req.headers_mut().insert(X_REQUEST_ID, value.clone());
        }
        req.extensions_mut().insert(id);

        let mut response = next.call(req).await;
        if let Some(value) = header {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        response
    })
}

/// Middleware that logs each request once the response is ready.
pub fn access_log() -> Middleware {
    middleware_fn(|req: Request<Body>, next: Next| async move {
        let start = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let request_id = req
            .request_id()
            .map(|id| id.0.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let response = next.call(req).await;

        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
        response
    })
}
