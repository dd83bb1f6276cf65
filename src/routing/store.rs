//! Route table storage and its concurrency discipline.
//!
//! # Design Decisions
//! - Live registration: `RwLock`, lookups share the read lock, inserts
//!   take the write lock
//! - Registration before serving only: inserts go into a staging tree
//!   behind the writer mutex; lookups load a published `ArcSwap` snapshot
//!   with no lock. The staging tree is copied out only when a lookup
//!   follows an insert, so a burst of registrations costs one copy
//! - Once serving has started the published table is final and inserts
//!   are refused
//! - Either way a lookup sees the whole table before or after an insert

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use arc_swap::ArcSwap;
use axum::http::Method;

use crate::routing::error::RouterError;
use crate::routing::path::Segment;
use crate::routing::trie::{Node, RouteEntry};

#[derive(Debug)]
pub(crate) enum RouteStore {
    Locked(RwLock<Node>),
    Published {
        current: ArcSwap<Node>,
        staging: Mutex<Node>,
        dirty: AtomicBool,
        serving: AtomicBool,
    },
}

impl RouteStore {
    pub(crate) fn new(safe_add_routes_while_running: bool) -> Self {
        if safe_add_routes_while_running {
            RouteStore::Locked(RwLock::new(Node::default()))
        } else {
            RouteStore::Published {
                current: ArcSwap::from_pointee(Node::default()),
                staging: Mutex::new(Node::default()),
                dirty: AtomicBool::new(false),
                serving: AtomicBool::new(false),
            }
        }
    }

    /// Insert one entry per method under `path`. Either every entry lands
    /// or none does.
    pub(crate) fn insert(
        &self,
        path: &str,
        segments: &[Segment],
        routes: Vec<(Method, RouteEntry)>,
    ) -> Result<(), RouterError> {
        match self {
            RouteStore::Locked(lock) => {
                let mut root = lock.write().map_err(|_| RouterError::LockPoisoned)?;
                root.insert(path, segments, routes)
            }
            RouteStore::Published {
                staging,
                dirty,
                serving,
                ..
            } => {
                let mut root = staging.lock().map_err(|_| RouterError::LockPoisoned)?;
                if serving.load(Ordering::Acquire) {
                    let method = routes
                        .first()
                        .map(|(method, _)| method.clone())
                        .unwrap_or(Method::GET);
                    return Err(RouterError::RegistrationClosed {
                        method,
                        path: path.to_string(),
                    });
                }
                root.insert(path, segments, routes)?;
                dirty.store(true, Ordering::Release);
                Ok(())
            }
        }
    }

    /// Run `f` against a consistent view of the table.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Node) -> R) -> R {
        match self {
            RouteStore::Locked(lock) => {
                // Inserts validate before mutating, so a panicking writer
                // cannot leave a half-built route behind.
                let root = lock.read().unwrap_or_else(|poisoned| {
                    tracing::warn!("Route table lock poisoned, reading anyway");
                    PoisonError::into_inner(poisoned)
                });
                f(&*root)
            }
            RouteStore::Published {
                current,
                staging,
                dirty,
                ..
            } => {
                if dirty.load(Ordering::Acquire) {
                    publish(current, &lock_staging(staging), dirty);
                }
                let root = current.load();
                f(&**root)
            }
        }
    }

    /// Record that requests are being served. Closes registration for a
    /// published table; a locked table stays open.
    pub(crate) fn mark_serving(&self) {
        if let RouteStore::Published {
            current,
            staging,
            dirty,
            serving,
        } = self
        {
            if serving.load(Ordering::Acquire) {
                return;
            }
            let root = lock_staging(staging);
            publish(current, &root, dirty);
            serving.store(true, Ordering::Release);
        }
    }

    pub(crate) fn accepts_live_registration(&self) -> bool {
        matches!(self, RouteStore::Locked(_))
    }
}

/// Copy the staging tree into the published slot if it changed. The caller
/// holds the staging lock, so no insert can slip in between.
fn publish(current: &ArcSwap<Node>, staging: &Node, dirty: &AtomicBool) {
    if dirty.swap(false, Ordering::AcqRel) {
        current.store(Arc::new(staging.clone()));
    }
}

fn lock_staging(staging: &Mutex<Node>) -> MutexGuard<'_, Node> {
    staging.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("Route staging lock poisoned, publishing anyway");
        PoisonError::into_inner(poisoned)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::handler_fn;
    use crate::http::middleware::MiddlewareChain;
    use crate::routing::params::Params;
    use crate::routing::path::{parse_pattern, split_path};

    fn add(store: &RouteStore, pattern: &str) -> Result<(), RouterError> {
        let segments = parse_pattern(pattern).unwrap();
        let entry = RouteEntry::new(pattern, handler_fn(|_req| async { "" }), MiddlewareChain::new());
        store.insert(pattern, &segments, vec![(Method::GET, entry)])
    }

    fn has(store: &RouteStore, path: &str) -> bool {
        store.read(|root| root.find(&split_path(path), &mut Params::new()).is_some())
    }

    #[test]
    fn test_locked_store_accepts_inserts_after_serving() {
        let store = RouteStore::new(true);
        add(&store, "/a").unwrap();
        store.mark_serving();
        add(&store, "/b").unwrap();

        assert!(has(&store, "/a"));
        assert!(has(&store, "/b"));
        assert!(store.accepts_live_registration());
    }

    #[test]
    fn test_published_store_closes_after_serving() {
        let store = RouteStore::new(false);
        add(&store, "/a").unwrap();
        store.mark_serving();

        let err = add(&store, "/b").unwrap_err();
        assert!(matches!(err, RouterError::RegistrationClosed { .. }));
        assert!(has(&store, "/a"));
        assert!(!has(&store, "/b"));
    }

    #[test]
    fn test_published_store_keeps_table_on_error() {
        let store = RouteStore::new(false);
        add(&store, "/users/:id").unwrap();
        assert!(add(&store, "/users/:id").is_err());
        assert!(add(&store, "/users/:name/x").is_err());
        assert!(has(&store, "/users/1"));
        assert!(!has(&store, "/users/1/x"));
    }

    #[test]
    fn test_published_store_copies_once_per_burst() {
        let store = RouteStore::new(false);
        add(&store, "/a").unwrap();
        add(&store, "/b").unwrap();
        add(&store, "/c").unwrap();

        let first = store.read(|root| root as *const Node);
        let second = store.read(|root| root as *const Node);
        assert_eq!(first, second);
        assert!(has(&store, "/c"));

        add(&store, "/d").unwrap();
        assert!(has(&store, "/d"));
    }

    #[test]
    fn test_published_store_publishes_on_serving() {
        let store = RouteStore::new(false);
        add(&store, "/a").unwrap();
        store.mark_serving();
        if let RouteStore::Published { current, dirty, .. } = &store {
            assert!(!dirty.load(Ordering::Acquire));
            assert!(current.load().find(&split_path("/a"), &mut Params::new()).is_some());
        }
    }
}
