//! Lock Store Port
//!
//! Defines the two atomic primitives the lock protocol needs from the
//! external key-value store.

use crate::error::Result;
use crate::value_objects::{LockKey, OwnershipToken};
use async_trait::async_trait;
use std::time::Duration;

/// Result of a conditional create
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The key was absent and now holds this fresh token
    Acquired(OwnershipToken),
    /// The key is already held
    Busy,
}

impl AcquireOutcome {
    /// The token, if acquired
    pub fn into_token(self) -> Option<OwnershipToken> {
        match self {
            Self::Acquired(token) => Some(token),
            Self::Busy => None,
        }
    }

    /// Whether the key was already held
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Result of a compare-and-delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The record held our token and was deleted
    Released,
    /// The record was absent or held another token; nothing was deleted
    NotOwner,
}

/// Lock store interface
///
/// Both operations must be check-and-act in a single round trip; a
/// read-then-write sequence is unsafe under concurrent holders and lease
/// expiry.
///
/// # Implementations
///
/// - **Redis**: `SET key token NX PX lease` and a compare-and-delete Lua script
/// - **Memory**: process-local store for tests and single-process use
///
/// # Example
///
/// ```ignore
/// use dlock_domain::ports::{AcquireOutcome, LockStore};
///
/// match store.acquire(&key, Duration::from_secs(5)).await? {
///     AcquireOutcome::Acquired(token) => {
///         // protected work
///         store.release(&key, &token).await?;
///     }
///     AcquireOutcome::Busy => { /* someone else holds it */ }
/// }
/// ```
#[async_trait]
pub trait LockStore: Send + Sync + std::fmt::Debug {
    /// Set `key` to a fresh token only if absent, expiring after `lease`
    ///
    /// # Returns
    /// `Acquired(token)` on success, `Busy` if the key is present.
    /// Transport failures are errors, never `Busy`.
    async fn acquire(&self, key: &LockKey, lease: Duration) -> Result<AcquireOutcome>;

    /// Delete `key` only if it still holds `token`
    ///
    /// # Returns
    /// `Released` if deleted, `NotOwner` if the value differs or is absent.
    async fn release(&self, key: &LockKey, token: &OwnershipToken) -> Result<ReleaseOutcome>;

    /// Get the name/identifier of this store implementation
    fn provider_name(&self) -> &str;
}
