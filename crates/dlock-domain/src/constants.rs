//! Domain layer constants
//!
//! Defaults mirror the lock annotation the interception layer exposes.
//! Infrastructure-specific constants live in `dlock-infrastructure`.

// ============================================================================
// LOCK KEY CONSTANTS
// ============================================================================

/// Default lock key prefix
pub const LOCK_KEY_DEFAULT_PREFIX: &str = "dl";

/// Default delimiter between key parts
pub const LOCK_KEY_DEFAULT_DELIMITER: &str = ":";

/// Leading sigil of an expression variable reference (`#p0.id`)
pub const EXPRESSION_VARIABLE_SIGIL: char = '#';

/// Name of the scope variable holding every call argument as an array
pub const SCOPE_ARGS_VARIABLE: &str = "args";

/// Positional alias prefixes registered for each call argument
pub const SCOPE_POSITIONAL_ALIASES: [&str; 3] = ["p", "a", "arg"];

// ============================================================================
// LEASE / WAIT CONSTANTS
// ============================================================================

/// Default lease (expire time), in the default time unit
pub const LOCK_DEFAULT_EXPIRE_TIME: u64 = 10;

/// Default wait budget, in the default time unit
pub const LOCK_DEFAULT_WAIT_TIME: u64 = 3;

// ============================================================================
// SPIN-WAIT CONSTANTS
// ============================================================================

/// Default spin-wait base interval (0 = retry at the minimum interval)
pub const SPIN_DEFAULT_INTERVAL: u64 = 0;

/// Default spin-wait attempt cap (0 = bounded only by the deadline)
pub const SPIN_DEFAULT_MAX_ATTEMPTS: u32 = 0;

/// Floor applied to a zero spin interval so a waiting caller never hot-loops the store
pub const SPIN_MIN_INTERVAL_MS: u64 = 1;
