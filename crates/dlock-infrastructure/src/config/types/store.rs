//! Lock store configuration types

use dlock_application::ports::registry::LockStoreProviderConfig;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LOCK_STORE_PROVIDER;

/// Which lock store backs the coordinator, and how to reach it
///
/// ```toml
/// [store]
/// provider = "redis"
/// uri = "redis://localhost:6379"
/// connection_timeout_ms = 2000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Registered provider name (`memory`, `redis`)
    pub provider: String,

    /// Connection URI; providers fall back to their own default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Upper bound on opening the store connection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_timeout_ms: Option<u64>,
}

impl StoreConfig {
    /// Registry lookup config for this store
    pub fn to_provider_config(&self) -> LockStoreProviderConfig {
        let mut config = LockStoreProviderConfig::new(&self.provider);
        if let Some(uri) = &self.uri {
            config = config.with_uri(uri);
        }
        if let Some(timeout_ms) = self.connection_timeout_ms {
            config = config.with_connection_timeout_ms(timeout_ms);
        }
        config
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_LOCK_STORE_PROVIDER.to_string(),
            uri: None,
            connection_timeout_ms: None,
        }
    }
}
