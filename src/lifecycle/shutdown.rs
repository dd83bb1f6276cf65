//! Shutdown coordination for the server.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

/// Stop switch shared by the signal listener, the server and tests.
///
/// Clones share one switch. Once flipped it stays flipped, so a waiter that
/// subscribes after the trigger still resolves.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

struct Inner {
    tx: broadcast::Sender<()>,
    triggered: AtomicBool,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            inner: Arc::new(Inner {
                tx,
                triggered: AtomicBool::new(false),
            }),
        }
    }

    /// Flip the switch. Later calls are no-ops.
    pub fn trigger(&self) {
        if !self.inner.triggered.swap(true, Ordering::AcqRel) {
            tracing::debug!(waiters = self.inner.tx.receiver_count(), "Shutdown triggered");
            let _ = self.inner.tx.send(());
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// Resolves once [`Shutdown::trigger`] has been called, including when
    /// that happened before this call.
    pub fn notified(&self) -> impl Future<Output = ()> + Send + 'static {
        // Subscribe before checking the flag so a trigger in between is seen.
        let mut rx = self.inner.tx.subscribe();
        let inner = Arc::clone(&self.inner);
        async move {
            if inner.triggered.load(Ordering::Acquire) {
                return;
            }
            let _ = rx.recv().await;
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Shutdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shutdown")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}
