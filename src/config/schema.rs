//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router
//! and the demo server. All types derive Serde traits for deserialization
//! from config files.

use std::collections::BTreeMap;

use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener and request limits.
    pub server: ServerConfig,

    /// Dispatcher behavior.
    pub router: RouterConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// What to do when a request differs from a registered route only by its
/// trailing slash or by path cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectBehavior {
    /// Always redirect with 301 Moved Permanently.
    #[default]
    Redirect301,
    /// 301 for GET, 307 Temporary Redirect otherwise.
    Redirect307,
    /// 301 for GET, 308 Permanent Redirect otherwise.
    Redirect308,
    /// Serve the matched handler without redirecting.
    UseHandler,
}

impl RedirectBehavior {
    /// Status code for a redirect of a `method` request, `None` for `UseHandler`.
    pub fn status_for(self, method: &Method) -> Option<StatusCode> {
        let keep_method = *method != Method::GET;
        match self {
            RedirectBehavior::Redirect301 => Some(StatusCode::MOVED_PERMANENTLY),
            RedirectBehavior::Redirect307 if keep_method => Some(StatusCode::TEMPORARY_REDIRECT),
            RedirectBehavior::Redirect308 if keep_method => Some(StatusCode::PERMANENT_REDIRECT),
            RedirectBehavior::Redirect307 | RedirectBehavior::Redirect308 => {
                Some(StatusCode::MOVED_PERMANENTLY)
            }
            RedirectBehavior::UseHandler => None,
        }
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Guard the route table with a read/write lock so routes can be added
    /// while requests are in flight.
    pub safe_add_routes_while_running: bool,

    /// Redirect (or serve, per method) when only the trailing slash differs.
    pub redirect_trailing_slash: bool,

    /// Redirect (or serve, per method) requests whose path is not clean.
    pub redirect_clean_path: bool,

    /// Serve HEAD with the GET handler when no HEAD handler is registered.
    pub head_can_use_get: bool,

    /// Per-method redirect behavior. Methods not listed use `default_redirect`.
    pub redirect_method_behavior: BTreeMap<String, RedirectBehavior>,

    /// Behavior for methods missing from `redirect_method_behavior`.
    pub default_redirect: RedirectBehavior,
}

impl Default for RouterConfig {
    fn default() -> Self {
        // OPTIONS is exempt so CORS preflight requests reach their handler.
        let mut redirect_method_behavior = BTreeMap::new();
        redirect_method_behavior.insert(Method::OPTIONS.to_string(), RedirectBehavior::UseHandler);

        Self {
            safe_add_routes_while_running: true,
            redirect_trailing_slash: true,
            redirect_clean_path: true,
            head_can_use_get: true,
            redirect_method_behavior,
            default_redirect: RedirectBehavior::Redirect301,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
