//! Domain Value Objects
//!
//! Immutable value objects describing locks and how they are requested.
//!
//! ## Value Objects
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`LockKey`] | Store record key of a protected resource |
//! | [`OwnershipToken`] | Per-acquisition value stored under the key |
//! | [`LockHandle`] | Key + token returned by a successful acquisition |
//! | [`SpinWaitPolicy`] | Backoff policy for waiting on a busy lock |
//! | [`KeyConfig`] | Prefix, delimiter and contributing key parts |
//! | [`CallArgs`] | Arguments of one intercepted call |

/// Key derivation inputs
pub mod key;
/// Lock identity value objects
pub mod lock;
/// Spin-wait policy
pub mod spin;
/// Time units
pub mod time_unit;

pub use key::{
    CallArgs, CallArgument, KeyConfig, KeyFields, KeyPart, VariableScope, render_key_part,
    value_at_path,
};
pub use lock::{LockHandle, LockKey, OwnershipToken};
pub use spin::{Backoff, SpinWaitPolicy, SpinWaitStrategy};
pub use time_unit::TimeUnit;
