//! Redis lock store
//!
//! Realises the two lock primitives with single Redis round trips:
//!
//! - acquire: `SET key token NX PX <lease_ms>`
//! - release: a Lua compare-and-delete evaluated server-side
//!
//! Any Redis or connection failure is a [`Error::Store`]; a busy key and a
//! release by a non-owner are regular outcomes.
//!
//! ## Example
//!
//! ```ignore
//! use dlock_providers::lock_store::RedisLockStore;
//!
//! let store = RedisLockStore::new("redis://localhost:6379")?;
//! // Or with host/port
//! let store = RedisLockStore::with_host_port("localhost", 6379)?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dlock_domain::error::{Error, Result};
use dlock_domain::ports::{AcquireOutcome, LockStore, ReleaseOutcome};
use dlock_domain::value_objects::{LockKey, OwnershipToken};
use redis::{Client, Script, aio::ConnectionManager};
use tokio::sync::OnceCell;
use tracing::trace;

use super::{lease_millis, new_token};
use crate::constants::{
    LOCK_STORE_REDIS, REDIS_DEFAULT_URI, REDIS_EXPIRY_MILLIS, REDIS_RELEASE_SCRIPT,
    REDIS_SET_IF_ABSENT,
};

/// Redis lock store
///
/// Opens a [`ConnectionManager`] on first use and shares it between calls.
/// The manager re-establishes the connection after the server restarts or
/// the link drops; the call that observed the failure still reports it.
pub struct RedisLockStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    release_script: Script,
    connection_timeout: Option<Duration>,
}

impl RedisLockStore {
    /// Create a store for the given connection string
    ///
    /// No connection is made until the first lock operation.
    ///
    /// # Arguments
    ///
    /// * `connection_string` - Redis connection URL (e.g., "redis://localhost:6379")
    pub fn new(connection_string: &str) -> Result<Self> {
        let client = Client::open(connection_string).map_err(|e| {
            Error::store_with_source(format!("Failed to create Redis client: {e}"), e)
        })?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            release_script: Script::new(REDIS_RELEASE_SCRIPT),
            connection_timeout: None,
        })
    }

    /// Create a store for the given host and port
    pub fn with_host_port(host: &str, port: u16) -> Result<Self> {
        Self::new(&format!("redis://{host}:{port}"))
    }

    /// Bound the time spent opening the connection
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    /// Get the shared connection, opening it on first use
    ///
    /// A failed first connect leaves the cell empty, so the next call retries.
    async fn get_connection(&self) -> Result<ConnectionManager> {
        let connection = self
            .connection
            .get_or_try_init(|| self.connect())
            .await?;
        Ok(connection.clone())
    }

    async fn connect(&self) -> Result<ConnectionManager> {
        let connecting = ConnectionManager::new(self.client.clone());
        let connected = match self.connection_timeout {
            Some(timeout) => tokio::time::timeout(timeout, connecting)
                .await
                .map_err(|_| {
                    Error::store(format!(
                        "Redis connection timed out after {}ms",
                        timeout.as_millis()
                    ))
                })?,
            None => connecting.await,
        };

        connected.map_err(|e| {
            Error::store_with_source(format!("Failed to get Redis connection: {e}"), e)
        })
    }
}

#[async_trait]
impl LockStore for RedisLockStore {
    async fn acquire(&self, key: &LockKey, lease: Duration) -> Result<AcquireOutcome> {
        let lease_ms = lease_millis(key, lease)?;
        let mut conn = self.get_connection().await?;
        let token = new_token();

        let reply: Option<String> = redis::cmd("SET")
            .arg(key.as_str())
            .arg(token.as_str())
            .arg(REDIS_SET_IF_ABSENT)
            .arg(REDIS_EXPIRY_MILLIS)
            .arg(lease_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::store_with_source(format!("Redis SET NX failed: {e}"), e))?;

        trace!(key = %key, acquired = reply.is_some(), "redis acquire");
        Ok(match reply {
            Some(_) => AcquireOutcome::Acquired(token),
            None => AcquireOutcome::Busy,
        })
    }

    async fn release(&self, key: &LockKey, token: &OwnershipToken) -> Result<ReleaseOutcome> {
        let mut conn = self.get_connection().await?;

        let deleted: i64 = self
            .release_script
            .key(key.as_str())
            .arg(token.as_str())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                Error::store_with_source(format!("Redis release script failed: {e}"), e)
            })?;

        trace!(key = %key, deleted, "redis release");
        Ok(if deleted > 0 {
            ReleaseOutcome::Released
        } else {
            ReleaseOutcome::NotOwner
        })
    }

    fn provider_name(&self) -> &str {
        LOCK_STORE_REDIS
    }
}

impl std::fmt::Debug for RedisLockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisLockStore")
            .field("connected", &self.connection.initialized())
            .field("connection_timeout", &self.connection_timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use dlock_application::ports::registry::{
    LOCK_STORE_PROVIDERS, LockStoreProviderConfig, LockStoreProviderEntry,
};

/// Factory function for creating Redis lock store instances.
fn redis_lock_store_factory(
    config: &LockStoreProviderConfig,
) -> std::result::Result<Arc<dyn LockStore>, String> {
    let uri = config.uri.as_deref().unwrap_or(REDIS_DEFAULT_URI);

    let mut store =
        RedisLockStore::new(uri).map_err(|e| format!("Failed to create Redis lock store: {e}"))?;
    if let Some(timeout_ms) = config.connection_timeout_ms {
        store = store.with_connection_timeout(Duration::from_millis(timeout_ms));
    }

    Ok(Arc::new(store))
}

#[linkme::distributed_slice(LOCK_STORE_PROVIDERS)]
static REDIS_LOCK_STORE: LockStoreProviderEntry = LockStoreProviderEntry {
    name: LOCK_STORE_REDIS,
    description: "Redis lock store (SET NX PX + compare-and-delete script)",
    factory: redis_lock_store_factory,
};
