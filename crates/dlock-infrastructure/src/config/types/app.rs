//! Application configuration root

use serde::{Deserialize, Serialize};

use super::{LockDefaultsConfig, LoggingConfig, StoreConfig};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Lock store selection
    pub store: StoreConfig,

    /// Lock defaults
    pub lock: LockDefaultsConfig,
}
