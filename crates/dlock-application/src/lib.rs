//! Application Layer - dlock
//!
//! Composes the domain ports into the lock coordination engine.
//!
//! ## Architecture
//!
//! The application layer:
//! - Derives lock keys from call arguments ([`KeyResolver`])
//! - Schedules retries for callers willing to wait ([`SpinWaitScheduler`])
//! - Exposes the public `try_lock` / `unlock` surface ([`LockCoordinator`])
//! - Wraps an operation in acquire / run / release ([`LockOptions`], [`LockInterceptor`])
//! - Declares the registry lock store providers submit themselves into
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `dlock-domain`: lock identities, policies and port traits
//! - Pure Rust libraries for async, serialization and logging

pub mod domain_services;
pub mod ports;
pub mod use_cases;

pub use domain_services::*;
pub use ports::*;
pub use use_cases::*;
