//! In-flight registry
//!
//! Tracks which order numbers currently have a task queued or running, so a
//! poll cycle that fires before the previous batch drains does not dispatch
//! the same order twice.

use std::sync::Arc;

use dashmap::DashSet;

/// Claim bookkeeping seam. A distributed claim store can replace the
/// in-process registry behind this trait.
pub trait ClaimStore: Send + Sync {
    /// Insert `key` if absent. Returns false when it was already claimed.
    fn try_claim(&self, key: &str) -> bool;

    fn release(&self, key: &str);

    fn is_claimed(&self, key: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local claim set keyed by order number
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    claims: DashSet<String>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClaimStore for InFlightRegistry {
    fn try_claim(&self, key: &str) -> bool {
        self.claims.insert(key.to_string())
    }

    fn release(&self, key: &str) {
        self.claims.remove(key);
    }

    fn is_claimed(&self, key: &str) -> bool {
        self.claims.contains(key)
    }

    fn len(&self) -> usize {
        self.claims.len()
    }
}

/// Live claim on one key, released on drop
pub struct Claim {
    store: Arc<dyn ClaimStore>,
    key: String,
}

impl Claim {
    /// Claim `key`, or `None` if someone else holds it
    pub fn acquire(store: &Arc<dyn ClaimStore>, key: &str) -> Option<Self> {
        store.try_claim(key).then(|| Self {
            store: Arc::clone(store),
            key: key.to_string(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.store.release(&self.key);
    }
}

impl std::fmt::Debug for Claim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Claim").field("key", &self.key).finish()
    }
}
