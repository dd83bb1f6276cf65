//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (Dispatcher / Group):
//!     (method, prefix ++ path, handler, chain ++ route middleware)
//!     → path.rs (parse pattern into segments)
//!     → trie.rs (check duplicates/ambiguity, insert RouteEntry)
//!     → store.rs (RwLock or ArcSwap publication)
//!
//! Incoming Request (method, path, query)
//!     → dispatcher.rs (clean path, trie lookup, trailing-slash retry)
//!     → Resolution: Matched | Redirect | MethodNotAllowed | NotFound
//!     → params.rs (bind Params into request extensions)
//!     → composed handler
//! ```
//!
//! # Design Decisions
//! - Static segments beat params, params beat wildcards
//! - Conflicts are rejected at registration, never at request time
//! - Deterministic: same table and input always resolve the same way

pub mod dispatcher;
pub mod error;
pub mod group;
pub mod params;
pub mod path;
mod store;
pub mod trie;

pub use dispatcher::{Dispatcher, Options, Resolution};
pub use error::RouterError;
pub use group::{Group, RouteRegistrar, ANY_METHODS};
pub use params::{Params, RequestParamsExt};
pub use trie::{AllowedMethods, RouteEntry};
