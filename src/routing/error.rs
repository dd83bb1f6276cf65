//! Registration-time errors.

use axum::http::Method;
use thiserror::Error;

/// Errors returned by route registration.
///
/// Request-time outcomes (not found, method not allowed, redirects) are not
/// errors; see [`crate::routing::Resolution`].
#[derive(Debug, Error)]
pub enum RouterError {
    /// The exact (method, path) pair is already registered.
    #[error("route {method} {path} is already registered")]
    DuplicateRoute { method: Method, path: String },

    /// A parameter or wildcard name conflicts with one already at that level.
    #[error("segment `{conflicting}` in {path} conflicts with existing `{existing}`")]
    AmbiguousSegment {
        path: String,
        existing: String,
        conflicting: String,
    },

    /// The pattern could not be parsed.
    #[error("invalid route pattern {path:?}: {reason}")]
    InvalidPattern { path: String, reason: &'static str },

    /// The dispatcher is serving and was not built to accept live registrations.
    #[error("cannot register {method} {path}: dispatcher is already serving")]
    RegistrationClosed { method: Method, path: String },

    /// A thread panicked while holding the route table lock.
    #[error("route table lock poisoned")]
    LockPoisoned,
}
