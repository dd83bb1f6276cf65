//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bind address parses)
//! - Check that redirect behavior keys are HTTP method tokens
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::{AppConfig, RedirectBehavior, RouterConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("redirect behavior key {0:?} is not an HTTP method")]
    UnknownMethod(String),
}

/// Validate a whole application config.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.server.bind_address.clone()));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if let Err(mut router_errors) = redirect_table(&config.router) {
        errors.append(&mut router_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Resolve the per-method redirect table, rejecting keys that are not methods.
///
/// Keys are upper-cased first, so `options` and `OPTIONS` are the same entry.
pub fn redirect_table(
    config: &RouterConfig,
) -> Result<HashMap<Method, RedirectBehavior>, Vec<ValidationError>> {
    let mut table = HashMap::new();
    let mut errors = Vec::new();

    for (name, behavior) in &config.redirect_method_behavior {
        match Method::from_bytes(name.to_ascii_uppercase().as_bytes()) {
            Ok(method) if !name.is_empty() => {
                table.insert(method, *behavior);
            }
            _ => errors.push(ValidationError::UnknownMethod(name.clone())),
        }
    }

    if errors.is_empty() {
        Ok(table)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.server.bind_address = "not-an-address".into();
        config.server.request_timeout_secs = 0;
        config
            .router
            .redirect_method_behavior
            .insert("GE T".into(), RedirectBehavior::UseHandler);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("not-an-address".into()),
                ValidationError::ZeroTimeout,
                ValidationError::UnknownMethod("GE T".into()),
            ]
        );
    }

    #[test]
    fn test_redirect_table_normalizes_case() {
        let mut config = RouterConfig::default();
        config.redirect_method_behavior.clear();
        config
            .redirect_method_behavior
            .insert("options".into(), RedirectBehavior::UseHandler);

        let table = redirect_table(&config).unwrap();
        assert_eq!(table.get(&Method::OPTIONS), Some(&RedirectBehavior::UseHandler));
    }
}
