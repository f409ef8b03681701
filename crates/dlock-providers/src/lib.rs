//! # dlock - Provider Implementations
//!
//! User-selectable implementations of the ports defined in `dlock-domain`.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Lock store | `LockStore` | Redis, InMemory |
//! | Key expressions | `ExpressionEvaluator` | Path |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! dlock-providers = { version = "0.1", default-features = false, features = ["store-redis"] }
//! ```
//!
//! Lock stores register themselves in the application layer's
//! `LOCK_STORE_PROVIDERS` slice; linking this crate is enough to make them
//! resolvable by name.

// Re-export dlock-domain types commonly used with providers
pub use dlock_domain::error::{Error, Result};
pub use dlock_domain::ports::{ExpressionEvaluator, LockStore};

/// Provider-specific constants
pub mod constants;

/// Key expression evaluators
pub mod expression;

/// Lock store implementations
pub mod lock_store;
