//! Spin-wait retry scheduling
//!
//! Drives repeated `acquire` calls against a busy key until one of:
//! the key is acquired, the policy's attempt cap is reached, the wait
//! deadline passes, or the caller cancels. Only the first is a success;
//! the others all report "not acquired".
//!
//! Waiting suspends the calling task with `tokio::time::sleep`; there is
//! no background poller.

use std::sync::Arc;
use std::time::Duration;

use dlock_domain::error::Result;
use dlock_domain::ports::{AcquireOutcome, LockStore};
use dlock_domain::value_objects::{LockKey, OwnershipToken, SpinWaitPolicy};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Polls a lock store on behalf of callers willing to wait
#[derive(Debug, Clone)]
pub struct SpinWaitScheduler {
    store: Arc<dyn LockStore>,
}

impl SpinWaitScheduler {
    /// Create a scheduler over `store`
    pub fn new(store: Arc<dyn LockStore>) -> Self {
        Self { store }
    }

    /// One conditional create, logged
    pub async fn acquire_once(
        &self,
        key: &LockKey,
        lease: Duration,
    ) -> Result<Option<OwnershipToken>> {
        let outcome = self.store.acquire(key, lease).await?;
        let lease_ms = as_millis(lease);
        match outcome {
            AcquireOutcome::Acquired(token) => {
                debug!(key = %key, lease_ms, "lock acquired");
                Ok(Some(token))
            }
            AcquireOutcome::Busy => {
                debug!(key = %key, lease_ms, "lock busy");
                Ok(None)
            }
        }
    }

    /// Acquire `key`, polling for at most `wait`
    ///
    /// A zero `wait` or a missing `policy` makes exactly one store call.
    /// Otherwise the scheduler sleeps between attempts following the
    /// policy's backoff; each sleep is clamped to the time left before the
    /// deadline and is followed by one more attempt.
    ///
    /// # Returns
    /// `Some(token)` on success, `None` when attempts ran out, the deadline
    /// passed or `cancel` fired. Store failures are returned as errors.
    pub async fn acquire(
        &self,
        key: &LockKey,
        wait: Duration,
        lease: Duration,
        policy: Option<&SpinWaitPolicy>,
        cancel: &CancellationToken,
    ) -> Result<Option<OwnershipToken>> {
        let policy = match policy {
            Some(policy) if !wait.is_zero() => policy,
            _ => return self.acquire_cancellable(key, lease, cancel).await,
        };

        // Too far out to represent: bounded by attempts and cancellation only
        let deadline = Instant::now().checked_add(wait);
        let mut intervals = policy.intervals();
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);
            if let Some(token) = self.acquire_cancellable(key, lease, cancel).await? {
                return Ok(Some(token));
            }
            if cancel.is_cancelled() {
                return Ok(None);
            }
            if policy.attempts_exhausted(attempts) {
                debug!(key = %key, attempts, "spin wait attempts exhausted");
                return Ok(None);
            }

            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        debug!(key = %key, attempts, "spin wait deadline passed");
                        return Ok(None);
                    }
                    Some(deadline - now)
                }
                None => None,
            };
            let Some(interval) = intervals.next() else {
                return Ok(None);
            };
            let sleep_for = remaining.map_or(interval, |remaining| interval.min(remaining));
            debug!(
                key = %key,
                attempt = attempts,
                next_interval_ms = as_millis(sleep_for),
                "spin wait"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(key = %key, attempts, "spin wait cancelled");
                    return Ok(None);
                }
                () = tokio::time::sleep(sleep_for) => {}
            }
        }
    }

    async fn acquire_cancellable(
        &self,
        key: &LockKey,
        lease: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<OwnershipToken>> {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                // The create may already have landed; its lease is left to expire.
                warn!(
                    key = %key,
                    lease_ms = as_millis(lease),
                    "acquire abandoned on cancellation, lock may stay held until lease expiry"
                );
                Ok(None)
            }
            result = self.acquire_once(key, lease) => result,
        }
    }
}

/// Whole milliseconds of `duration`, saturating
pub(crate) fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
