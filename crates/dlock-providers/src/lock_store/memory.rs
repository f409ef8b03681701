//! In-memory lock store
//!
//! Process-local implementation of the lock protocol on a concurrent map.
//! Each operation runs under the map's per-shard lock, which gives the same
//! check-and-act atomicity the Redis store gets from the server.
//!
//! Expiry is lazy: an expired entry is treated as absent and replaced or
//! dropped the next time its key is touched. Deadlines use the Tokio clock,
//! so paused-time tests control lease expiry.
//!
//! ## Example
//!
//! ```ignore
//! use dlock_providers::lock_store::InMemoryLockStore;
//!
//! let store = Arc::new(InMemoryLockStore::new());
//! let coordinator = LockCoordinator::new(store);
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dlock_domain::error::Result;
use dlock_domain::ports::{AcquireOutcome, LockStore, ReleaseOutcome};
use dlock_domain::value_objects::{LockKey, OwnershipToken};
use tokio::time::Instant;
use tracing::trace;

use super::{lease_millis, new_token};
use crate::constants::LOCK_STORE_MEMORY;

#[derive(Debug, Clone)]
struct LockEntry {
    token: OwnershipToken,
    /// `None` when the lease is too long to represent
    expires_at: Option<Instant>,
}

impl LockEntry {
    fn new(token: OwnershipToken, now: Instant, lease: Duration) -> Self {
        Self {
            token,
            expires_at: now.checked_add(lease),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Process-local lock store
#[derive(Debug, Default)]
pub struct InMemoryLockStore {
    entries: DashMap<String, LockEntry>,
}

impl InMemoryLockStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is currently held
    pub fn is_held(&self, key: &LockKey) -> bool {
        let now = Instant::now();
        self.entries
            .get(key.as_str())
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Number of held keys
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Whether no key is held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn acquire(&self, key: &LockKey, lease: Duration) -> Result<AcquireOutcome> {
        lease_millis(key, lease)?;
        let now = Instant::now();

        let outcome = match self.entries.entry(key.as_str().to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().is_expired(now) => {
                let token = new_token();
                occupied.insert(LockEntry::new(token.clone(), now, lease));
                AcquireOutcome::Acquired(token)
            }
            Entry::Occupied(_) => AcquireOutcome::Busy,
            Entry::Vacant(vacant) => {
                let token = new_token();
                vacant.insert(LockEntry::new(token.clone(), now, lease));
                AcquireOutcome::Acquired(token)
            }
        };
        trace!(key = %key, busy = outcome.is_busy(), "memory acquire");
        Ok(outcome)
    }

    async fn release(&self, key: &LockKey, token: &OwnershipToken) -> Result<ReleaseOutcome> {
        let now = Instant::now();
        let removed = self
            .entries
            .remove_if(key.as_str(), |_, entry| {
                entry.token == *token && !entry.is_expired(now)
            })
            .is_some();
        if !removed {
            self.entries
                .remove_if(key.as_str(), |_, entry| entry.is_expired(now));
        }

        trace!(key = %key, removed, "memory release");
        Ok(if removed {
            ReleaseOutcome::Released
        } else {
            ReleaseOutcome::NotOwner
        })
    }

    fn provider_name(&self) -> &str {
        LOCK_STORE_MEMORY
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use dlock_application::ports::registry::{
    LOCK_STORE_PROVIDERS, LockStoreProviderConfig, LockStoreProviderEntry,
};

#[linkme::distributed_slice(LOCK_STORE_PROVIDERS)]
static MEMORY_LOCK_STORE: LockStoreProviderEntry = LockStoreProviderEntry {
    name: LOCK_STORE_MEMORY,
    description: "Process-local lock store (single process, tests)",
    factory: |_config: &LockStoreProviderConfig| Ok(Arc::new(InMemoryLockStore::new())),
};
