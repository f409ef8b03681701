//! Lock Store Implementations
//!
//! ## Available Providers
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`InMemoryLockStore`] | Local | Process-local store for tests and single-process use |
//! | [`RedisLockStore`] | Distributed | Redis-backed for multi-process coordination |
//!
//! Both mint a fresh UUID v4 ownership token per successful acquisition.

#[cfg(feature = "store-memory")]
pub mod memory;
#[cfg(feature = "store-redis")]
pub mod redis;

#[cfg(feature = "store-memory")]
pub use memory::InMemoryLockStore;
#[cfg(feature = "store-redis")]
pub use redis::RedisLockStore;

use dlock_domain::error::{Error, Result};
use dlock_domain::value_objects::{LockKey, OwnershipToken};
use std::time::Duration;

/// Fresh ownership token
pub(crate) fn new_token() -> OwnershipToken {
    OwnershipToken::new(uuid::Uuid::new_v4().to_string())
}

/// Lease in whole milliseconds; stores cannot express sub-millisecond expiry
pub(crate) fn lease_millis(key: &LockKey, lease: Duration) -> Result<u64> {
    let millis = u64::try_from(lease.as_millis()).unwrap_or(u64::MAX);
    if millis == 0 {
        return Err(Error::invalid_argument(format!(
            "lease for key={key} must be at least one millisecond"
        )));
    }
    Ok(millis)
}
