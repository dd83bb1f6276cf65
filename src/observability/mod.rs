//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing, http, lifecycle
//!     → tracing events (registration, resolution, redirects)
//!     → logging.rs (subscriber: env filter + fmt layer)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Structured fields, never pre-formatted strings
//! - Request ID flows through `http::request::request_id`

pub mod logging;
