//! Lock Coordinator Use Case
//!
//! Public `try_lock` / `unlock` surface composing the lock store and the
//! spin-wait scheduler.
//!
//! # Ownership
//!
//! Every successful acquisition returns a [`LockHandle`] carrying the key
//! and the ownership token minted for it. `unlock` needs that handle, so a
//! lock can be released from any task and a caller can never release a
//! lock it did not acquire.
//!
//! # Reentrancy
//!
//! Locks are **not** reentrant. Calling `try_lock` on a key the same caller
//! already holds is an unrelated acquisition: it reports "not acquired", and
//! a waiting call spins against its own lock until the deadline.
//!
//! # Lease
//!
//! There is no renewal. The lease must cover the whole critical section,
//! including retry latency; once it runs out the store may hand the key to
//! someone else and the late `unlock` becomes a logged no-op.

use std::sync::Arc;
use std::time::Duration;

use dlock_domain::error::{Error, Result};
use dlock_domain::ports::{LockStore, ReleaseOutcome};
use dlock_domain::value_objects::{LockHandle, LockKey, SpinWaitPolicy};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain_services::SpinWaitScheduler;

/// Coordinates distributed locks over one injected lock store
///
/// Cheap to share behind an `Arc`; several coordinators over different
/// stores can coexist in one process.
#[derive(Debug, Clone)]
pub struct LockCoordinator {
    store: Arc<dyn LockStore>,
    scheduler: SpinWaitScheduler,
}

impl LockCoordinator {
    /// Create a coordinator over `store`
    pub fn new(store: Arc<dyn LockStore>) -> Self {
        Self {
            scheduler: SpinWaitScheduler::new(Arc::clone(&store)),
            store,
        }
    }

    /// The underlying lock store
    pub fn store(&self) -> &Arc<dyn LockStore> {
        &self.store
    }

    /// One-shot acquisition
    ///
    /// # Returns
    /// `Ok(Some(handle))` if acquired, `Ok(None)` if the key is held.
    pub async fn try_lock(&self, key: &LockKey, lease: Duration) -> Result<Option<LockHandle>> {
        validate(key, lease)?;
        let token = self.scheduler.acquire_once(key, lease).await?;
        Ok(token.map(|token| LockHandle::new(key.clone(), token, lease)))
    }

    /// Acquisition that polls a busy key for at most `wait`
    ///
    /// A zero `wait` or no `policy` degrades to a single attempt. Running out
    /// of time or attempts is reported as `Ok(None)`, the same as immediate
    /// contention.
    pub async fn try_lock_wait(
        &self,
        key: &LockKey,
        wait: Duration,
        lease: Duration,
        policy: Option<&SpinWaitPolicy>,
    ) -> Result<Option<LockHandle>> {
        self.try_lock_wait_cancellable(key, wait, lease, policy, &CancellationToken::new())
            .await
    }

    /// [`try_lock_wait`](Self::try_lock_wait) that stops waiting once `cancel` fires
    ///
    /// Cancellation reports `Ok(None)`.
    pub async fn try_lock_wait_cancellable(
        &self,
        key: &LockKey,
        wait: Duration,
        lease: Duration,
        policy: Option<&SpinWaitPolicy>,
        cancel: &CancellationToken,
    ) -> Result<Option<LockHandle>> {
        validate(key, lease)?;
        let token = self
            .scheduler
            .acquire(key, wait, lease, policy, cancel)
            .await?;
        Ok(token.map(|token| LockHandle::new(key.clone(), token, lease)))
    }

    /// Release the lock behind `handle`
    ///
    /// Releasing twice, or after the lease expired and someone else took the
    /// key, yields [`ReleaseOutcome::NotOwner`] and a warning; never an error.
    /// Store failures are propagated.
    pub async fn unlock(&self, handle: &LockHandle) -> Result<ReleaseOutcome> {
        let key = handle.key();
        if handle.token().as_str().is_empty() {
            warn!(key = %key, "unlock skipped, no ownership token for key");
            return Ok(ReleaseOutcome::NotOwner);
        }

        let outcome = self.store.release(key, handle.token()).await?;
        match outcome {
            ReleaseOutcome::Released => debug!(key = %key, "lock released"),
            ReleaseOutcome::NotOwner => warn!(
                key = %key,
                lease_elapsed = handle.lease_elapsed(),
                "unlock skipped, lock no longer owned"
            ),
        }
        Ok(outcome)
    }
}

fn validate(key: &LockKey, lease: Duration) -> Result<()> {
    if key.is_empty() {
        return Err(Error::invalid_argument("lock key must not be empty"));
    }
    if lease.as_millis() == 0 {
        return Err(Error::invalid_argument(format!(
            "lease for key={key} must be at least one millisecond"
        )));
    }
    Ok(())
}
