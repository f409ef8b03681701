//! Domain Port Interfaces
//!
//! Contracts the lock engine consumes. Implementations live in
//! `dlock-providers`.
//!
//! | Port | Description |
//! |------|-------------|
//! | [`LockStore`] | Atomic conditional create / compare-and-delete against the store |
//! | [`ExpressionEvaluator`] | Evaluates key expressions against a variable scope |

/// Key expression evaluation port
pub mod expression;
/// Lock store port
pub mod lock_store;

pub use expression::ExpressionEvaluator;
pub use lock_store::{AcquireOutcome, LockStore, ReleaseOutcome};
