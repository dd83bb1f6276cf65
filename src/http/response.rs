//! Responses the dispatcher produces itself.
//!
//! # Responsibilities
//! - Default 404 for unmatched paths
//! - 405 with an `Allow` header when only the method is wrong
//! - Redirects to the canonical path, query string preserved

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;

use crate::http::handler::{handler_fn, Handler};
use crate::routing::AllowedMethods;

/// Handler used when no `not_found` handler is configured.
pub fn default_not_found() -> Handler {
    handler_fn(|_req| async { (StatusCode::NOT_FOUND, "404 page not found") })
}

pub fn method_not_allowed(allowed: &AllowedMethods) -> Response<Body> {
    let mut response = (StatusCode::METHOD_NOT_ALLOWED, "405 method not allowed").into_response();
    match HeaderValue::from_str(&allowed.header_value()) {
        Ok(value) => {
            response.headers_mut().insert(header::ALLOW, value);
        }
        Err(e) => tracing::warn!(error = %e, "Allow header value rejected"),
    }
    response
}

pub fn redirect(status: StatusCode, location: &str) -> Response<Body> {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = status.into_response();
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        // The location came from the request URI, so this only happens for
        // bytes the URI accepted but a header value does not.
        Err(_) => (StatusCode::BAD_REQUEST, "invalid redirect target").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let allowed = AllowedMethods::new(vec![Method::GET, Method::POST], true);
        let res = method_not_allowed(&allowed);
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[header::ALLOW], "GET, HEAD, POST");
    }

    #[test]
    fn test_redirect_sets_location() {
        let res = redirect(StatusCode::PERMANENT_REDIRECT, "/items?page=2");
        assert_eq!(res.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(res.headers()[header::LOCATION], "/items?page=2");
    }
}
