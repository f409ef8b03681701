//! # dlock - Domain Layer
//!
//! Core types of the distributed lock engine: lock identities, spin-wait
//! policies, key derivation inputs, the error type and the ports that
//! store adapters and expression evaluators implement.
//!
//! This crate has no runtime or transport dependencies.

/// Domain constants
pub mod constants;
/// Error type
pub mod error;
/// Port traits
pub mod ports;
/// Value objects
pub mod value_objects;

pub use error::{Error, Result};
pub use ports::{AcquireOutcome, ExpressionEvaluator, LockStore, ReleaseOutcome};
pub use value_objects::{
    CallArgs, KeyConfig, KeyFields, KeyPart, LockHandle, LockKey, OwnershipToken, SpinWaitPolicy,
    SpinWaitStrategy, TimeUnit, VariableScope,
};
