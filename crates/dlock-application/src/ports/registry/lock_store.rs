//! Lock Store Provider Registry
//!
//! Providers register themselves via `#[linkme::distributed_slice]` and are
//! discovered at runtime by iterating [`LOCK_STORE_PROVIDERS`].

use std::sync::Arc;

use dlock_domain::ports::LockStore;

/// Configuration for lock store creation
///
/// Providers use what they need and ignore the rest.
#[derive(Debug, Clone, Default)]
pub struct LockStoreProviderConfig {
    /// Provider name (e.g., "redis", "memory")
    pub provider: String,
    /// Connection URI (for networked stores)
    pub uri: Option<String>,
    /// Connection timeout in milliseconds
    pub connection_timeout_ms: Option<u64>,
}

impl LockStoreProviderConfig {
    /// Create a new config with the given provider name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the connection timeout
    pub fn with_connection_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connection_timeout_ms = Some(timeout_ms);
        self
    }
}

/// Registry entry for lock store providers
pub struct LockStoreProviderEntry {
    /// Unique provider name (e.g., "redis", "memory")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create the store
    pub factory: fn(&LockStoreProviderConfig) -> Result<Arc<dyn LockStore>, String>,
}

#[linkme::distributed_slice]
pub static LOCK_STORE_PROVIDERS: [LockStoreProviderEntry] = [..];

/// Resolve a lock store by name from the registry
///
/// # Returns
/// * `Ok(Arc<dyn LockStore>)` - Created store
/// * `Err(String)` - Provider not found or creation failed
pub fn resolve_lock_store(config: &LockStoreProviderConfig) -> Result<Arc<dyn LockStore>, String> {
    let provider_name = &config.provider;

    if let Some(entry) = LOCK_STORE_PROVIDERS
        .iter()
        .find(|entry| entry.name == provider_name)
    {
        return (entry.factory)(config);
    }

    let available: Vec<&str> = LOCK_STORE_PROVIDERS.iter().map(|e| e.name).collect();
    Err(format!(
        "Unknown lock store provider '{provider_name}'. Available providers: {available:?}"
    ))
}

/// List all registered lock store providers as (name, description) pairs
pub fn list_lock_store_providers() -> Vec<(&'static str, &'static str)> {
    let mut providers: Vec<(&'static str, &'static str)> = LOCK_STORE_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect();
    providers.sort_unstable_by_key(|(name, _)| *name);
    providers
}
