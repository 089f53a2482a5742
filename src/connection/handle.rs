//! Shared store handle.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::Notify;

use crate::health::ConnectionState;
use crate::observability::metrics;
use crate::store::Store;

struct Installed {
    store: Arc<dyn Store>,
}

struct Shared {
    current: ArcSwapOption<Installed>,
    state: AtomicU8,
    connections: AtomicU64,
    lost: Notify,
}

/// The one place the live store lives. Cheap to clone; all clones share it.
#[derive(Clone)]
pub struct StoreHandle {
    shared: Arc<Shared>,
}

impl StoreHandle {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                current: ArcSwapOption::empty(),
                state: AtomicU8::new(ConnectionState::Disconnected as u8),
                connections: AtomicU64::new(0),
                lost: Notify::new(),
            }),
        }
    }

    /// The installed store, if any.
    pub fn store(&self) -> Option<Arc<dyn Store>> {
        self.shared
            .current
            .load_full()
            .map(|installed| installed.store.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.shared.current.load().is_some()
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from(self.shared.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: ConnectionState) {
        self.shared.state.store(state as u8, Ordering::Release);
        metrics::set_db_connected(state == ConnectionState::Connected);
    }

    /// Number of successful installs since startup.
    pub fn connection_count(&self) -> u64 {
        self.shared.connections.load(Ordering::Relaxed)
    }

    /// Install a freshly connected store.
    pub fn install(&self, store: Arc<dyn Store>) {
        self.shared.current.store(Some(Arc::new(Installed { store })));
        self.shared.connections.fetch_add(1, Ordering::Relaxed);
        self.set_state(ConnectionState::Connected);
    }

    /// Drop `failed` if it is still the installed store and wake the
    /// connection manager. Returns true when the handle was cleared.
    pub fn mark_lost(&self, failed: &Arc<dyn Store>) -> bool {
        let current = self.shared.current.load();
        let is_current = match &*current {
            Some(installed) => same_store(&installed.store, failed),
            None => false,
        };
        if !is_current {
            return false;
        }

        let previous = self.shared.current.compare_and_swap(&*current, None);
        let cleared = match &*previous {
            Some(installed) => same_store(&installed.store, failed),
            None => false,
        };
        if cleared {
            self.set_state(ConnectionState::Disconnected);
            self.shared.lost.notify_one();
        }
        cleared
    }

    /// Resolves after the next [`mark_lost`](Self::mark_lost) that cleared
    /// the handle.
    pub async fn lost(&self) {
        self.shared.lost.notified().await
    }
}

impl Default for StoreHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("state", &self.state())
            .field("connections", &self.connection_count())
            .finish()
    }
}

fn same_store(a: &Arc<dyn Store>, b: &Arc<dyn Store>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
