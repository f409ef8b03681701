//! Infrastructure layer constants
//!
//! Lock defaults live in `dlock_domain::constants`; these cover
//! configuration loading and logging only.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "dlock.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "dlock";

/// Environment variable prefix for configuration (`DLOCK__STORE__URI`)
pub const CONFIG_ENV_PREFIX: &str = "DLOCK";

/// Separator between the prefix and nested keys of configuration env vars
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Lock store used when none is configured
pub const DEFAULT_LOCK_STORE_PROVIDER: &str = "memory";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the configured log filter
pub const LOG_FILTER_ENV: &str = "DLOCK_LOG";

/// Maximum number of rotated log files kept
pub const LOG_MAX_FILES: usize = 7;

/// File name used when the configured log path has no stem
pub const LOG_DEFAULT_FILE_STEM: &str = "dlock";
