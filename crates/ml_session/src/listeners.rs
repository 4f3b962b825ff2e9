//! Auth-state listener registry.
//!
//! Subscribers are keyed by a monotonic id; a BTreeMap keeps fan-out in
//! registration order.  Notification snapshots the callbacks and invokes
//! them after the lock is released, so a subscriber may call back into the
//! session manager without deadlocking (ordering of such re-entrant effects
//! is unspecified).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use ml_proto::Identity;

type Callback = Arc<dyn Fn(Option<&Identity>) + Send + Sync>;

#[derive(Default)]
pub(crate) struct AuthListeners {
    entries: RwLock<BTreeMap<u64, Callback>>,
    next_id: AtomicU64,
}

impl AuthListeners {
    pub(crate) fn subscribe(
        self: &Arc<Self>,
        callback: impl Fn(Option<&Identity>) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.write().insert(id, Arc::new(callback));
        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    pub(crate) fn notify(&self, identity: Option<&Identity>) {
        let snapshot: Vec<Callback> = self.entries.read().values().cloned().collect();
        for callback in snapshot {
            callback(identity);
        }
    }
}

/// Handle returned by `SessionManager::add_listener`.  Removes exactly the
/// subscriber it was issued for; dropping it without calling
/// [`Subscription::unsubscribe`] leaves the subscriber live.
pub struct Subscription {
    id: u64,
    registry: Weak<AuthListeners>,
}

impl Subscription {
    /// Idempotent — a second call is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.entries.write().remove(&self.id);
        }
    }
}
