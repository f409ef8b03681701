//! Guarded execution
//!
//! Runs an operation under a distributed lock: derive the key, acquire,
//! run, and release on every exit path, panics included.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use dlock_domain::constants::{LOCK_DEFAULT_EXPIRE_TIME, LOCK_DEFAULT_WAIT_TIME};
use dlock_domain::error::{Error, Result};
use dlock_domain::value_objects::{
    CallArgs, KeyConfig, KeyPart, LockHandle, LockKey, SpinWaitPolicy, TimeUnit,
};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain_services::KeyResolver;
use crate::use_cases::LockCoordinator;

/// Per-call-site lock settings
///
/// A positive `wait_time` selects the waiting path with `spin` as the
/// backoff policy; zero makes a single attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOptions {
    /// Key prefix, delimiter and contributing parts
    #[serde(flatten)]
    pub key: KeyConfig,
    /// Lease, in `time_unit`
    pub expire_time: u64,
    /// Wait budget, in `time_unit`
    pub wait_time: u64,
    /// Unit of `expire_time` and `wait_time`
    pub time_unit: TimeUnit,
    /// Backoff between attempts on the waiting path
    pub spin: SpinWaitPolicy,
}

impl LockOptions {
    /// Default options with the given key parts
    pub fn new(parts: impl IntoIterator<Item = KeyPart>) -> Self {
        let mut options = Self::default();
        options.key.parts.extend(parts);
        options
    }

    /// Set the key prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key.prefix = prefix.into();
        self
    }

    /// Set the key delimiter
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.key.delimiter = delimiter.into();
        self
    }

    /// Append a key part
    pub fn with_part(mut self, part: KeyPart) -> Self {
        self.key.parts.push(part);
        self
    }

    /// Append a key expression
    pub fn with_expression(self, expression: impl Into<String>) -> Self {
        self.with_part(KeyPart::expression(expression))
    }

    /// Set the lease
    pub fn with_expire_time(mut self, expire_time: u64) -> Self {
        self.expire_time = expire_time;
        self
    }

    /// Set the wait budget
    pub fn with_wait_time(mut self, wait_time: u64) -> Self {
        self.wait_time = wait_time;
        self
    }

    /// Set the unit of expire and wait times
    pub fn with_time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.time_unit = time_unit;
        self
    }

    /// Set the spin-wait policy
    pub fn with_spin(mut self, spin: SpinWaitPolicy) -> Self {
        self.spin = spin;
        self
    }

    /// Lease as a duration
    pub fn lease(&self) -> Duration {
        self.time_unit.to_duration(self.expire_time)
    }

    /// Wait budget as a duration
    pub fn wait_budget(&self) -> Duration {
        self.time_unit.to_duration(self.wait_time)
    }
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            key: KeyConfig::default(),
            expire_time: LOCK_DEFAULT_EXPIRE_TIME,
            wait_time: LOCK_DEFAULT_WAIT_TIME,
            time_unit: TimeUnit::default(),
            spin: SpinWaitPolicy::default(),
        }
    }
}

impl LockCoordinator {
    /// Acquire `key` with the lease, wait budget and spin policy of `options`
    ///
    /// A positive wait time polls under `options.spin`; zero makes one attempt.
    pub async fn try_lock_with(
        &self,
        key: &LockKey,
        options: &LockOptions,
    ) -> Result<Option<LockHandle>> {
        debug!(
            key = %key,
            wait = options.wait_time,
            expire = options.expire_time,
            unit = %options.time_unit,
            "try acquire"
        );
        if options.wait_time > 0 {
            self.try_lock_wait(
                key,
                options.wait_budget(),
                options.lease(),
                Some(&options.spin),
            )
            .await
        } else {
            self.try_lock(key, options.lease()).await
        }
    }

    /// Run `op` while holding `key`
    ///
    /// The lock is released when `op` returns or panics. If this future is
    /// dropped while `op` runs (a timeout, a losing `select!` branch, an
    /// aborted task), the release is spawned onto the current runtime.
    ///
    /// # Errors
    /// [`Error::LockNotAcquired`] if the lock could not be taken within the
    /// options' wait budget; store failures from acquire or release.
    ///
    /// # Panics
    /// A panic in `op` is resumed after the lock has been released.
    pub async fn run_locked<F, Fut, T>(
        &self,
        key: &LockKey,
        options: &LockOptions,
        op: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let Some(handle) = self.try_lock_with(key, options).await? else {
            warn!(key = %key, "lock acquire failed");
            return Err(Error::lock_not_acquired(key.as_str()));
        };
        let guard = ReleaseOnDrop::new(self.clone(), handle);

        debug!(key = %key, "lock acquired, proceed");
        let outcome = AssertUnwindSafe(async move { op().await })
            .catch_unwind()
            .await;

        debug!(key = %key, "release lock");
        let released = self.unlock(guard.handle()).await;
        guard.disarm();

        match outcome {
            Ok(value) => {
                released?;
                Ok(value)
            }
            Err(panic) => {
                if let Err(e) = released {
                    warn!(key = %key, error = %e, "release after panic failed");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }
}

/// Releases a held lock when guarded execution is abandoned mid-flight
struct ReleaseOnDrop {
    coordinator: LockCoordinator,
    handle: LockHandle,
    armed: bool,
}

impl ReleaseOnDrop {
    fn new(coordinator: LockCoordinator, handle: LockHandle) -> Self {
        Self {
            coordinator,
            handle,
            armed: true,
        }
    }

    fn handle(&self) -> &LockHandle {
        &self.handle
    }

    /// The inline release ran; nothing left to do on drop
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let key = self.handle.key().clone();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(key = %key, "guarded call dropped outside a runtime, lock left to lease expiry");
            return;
        };

        debug!(key = %key, "guarded call dropped, releasing in background");
        let coordinator = self.coordinator.clone();
        let handle = self.handle.clone();
        runtime.spawn(async move {
            if let Err(e) = coordinator.unlock(&handle).await {
                warn!(key = %key, error = %e, "background release failed");
            }
        });
    }
}

/// Explicit interception wrapper: key derivation plus guarded execution
#[derive(Debug, Clone)]
pub struct LockInterceptor {
    coordinator: Arc<LockCoordinator>,
    resolver: KeyResolver,
}

impl LockInterceptor {
    /// Create an interceptor
    pub fn new(coordinator: Arc<LockCoordinator>, resolver: KeyResolver) -> Self {
        Self {
            coordinator,
            resolver,
        }
    }

    /// The shared coordinator
    pub fn coordinator(&self) -> &Arc<LockCoordinator> {
        &self.coordinator
    }

    /// The key resolver
    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    /// Derive the key for `args` and run `op` under it
    ///
    /// See [`LockCoordinator::run_locked`].
    pub async fn run_locked<F, Fut, T>(
        &self,
        options: &LockOptions,
        args: &CallArgs,
        op: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let key = self.resolver.resolve(&options.key, args);
        self.coordinator.run_locked(&key, options, op).await
    }
}
