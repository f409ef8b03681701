//! Lock identity value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Opaque string identifying a protected resource
///
/// Used verbatim as the store's record key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockKey(String);

impl LockKey {
    /// Wrap a key string
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LockKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for LockKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for LockKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Opaque value stored under a [`LockKey`] for one acquisition
///
/// Store adapters mint a fresh token per successful acquisition; two
/// concurrently held locks never share one.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnershipToken(String);

impl OwnershipToken {
    /// Wrap a token string (e.g. one printed by `dlock acquire`)
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the token string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnershipToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Tokens are credentials for release; keep them out of debug output.
impl fmt::Debug for OwnershipToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.0.chars().take(8).collect();
        write!(f, "OwnershipToken({visible}…)")
    }
}

/// Proof of a successful acquisition
///
/// Returned by every successful `try_lock` and required by `unlock`, so the
/// release can happen from any task or thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHandle {
    key: LockKey,
    token: OwnershipToken,
    lease: Duration,
    acquired_at: Instant,
}

impl LockHandle {
    /// Create a handle for a lock acquired just now
    pub fn new(key: LockKey, token: OwnershipToken, lease: Duration) -> Self {
        Self {
            key,
            token,
            lease,
            acquired_at: Instant::now(),
        }
    }

    /// Rebuild a handle from a key and token obtained elsewhere
    ///
    /// The lease is unknown, so [`LockHandle::lease_elapsed`] reports `false`.
    pub fn from_parts(key: LockKey, token: OwnershipToken) -> Self {
        Self::new(key, token, Duration::MAX)
    }

    /// The locked key
    pub fn key(&self) -> &LockKey {
        &self.key
    }

    /// The ownership token stored under the key
    pub fn token(&self) -> &OwnershipToken {
        &self.token
    }

    /// Lease requested at acquisition
    pub fn lease(&self) -> Duration {
        self.lease
    }

    /// Local instant at which the acquisition succeeded
    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }

    /// Whether the lease has run out by the local clock
    ///
    /// Advisory only: the store's expiry is authoritative.
    pub fn lease_elapsed(&self) -> bool {
        self.acquired_at.elapsed() >= self.lease
    }
}
