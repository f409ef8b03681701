//! Provider Constants
//!
//! Constants specific to provider implementations. Domain defaults live in
//! `dlock-domain`, infrastructure defaults in `dlock-infrastructure`.

// ============================================================================
// REDIS LOCK STORE CONSTANTS
// ============================================================================

/// Redis URI used when none is configured
pub const REDIS_DEFAULT_URI: &str = "redis://localhost:6379";

/// Compare-and-delete script: delete the key only if it holds the caller's token
pub const REDIS_RELEASE_SCRIPT: &str =
    "if redis.call('get', KEYS[1]) == ARGV[1] then return redis.call('del', KEYS[1]) else return 0 end";

/// `SET` option: only set if the key does not exist
pub const REDIS_SET_IF_ABSENT: &str = "NX";

/// `SET` option: expiry in milliseconds
pub const REDIS_EXPIRY_MILLIS: &str = "PX";

// ============================================================================
// PROVIDER NAMES
// ============================================================================

/// Registry name of the Redis lock store
pub const LOCK_STORE_REDIS: &str = "redis";

/// Registry name of the in-memory lock store
pub const LOCK_STORE_MEMORY: &str = "memory";

/// Name reported by the path expression evaluator
pub const EXPRESSION_EVALUATOR_PATH: &str = "path";
