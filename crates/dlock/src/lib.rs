//! # dlock
//!
//! Distributed lock coordination over a shared key-value store.
//!
//! A caller derives a lock key, acquires it with a lease through a
//! conditional create, does its work and releases it with a
//! compare-and-delete that only the acquirer's token can satisfy. Busy keys
//! can be polled under a spin-wait policy bounded by a wait budget.
//!
//! ## Example
//!
//! ```ignore
//! use dlock::infrastructure::{AppConfig, LockContext};
//! use dlock::domain::CallArgs;
//!
//! let context = LockContext::bootstrap(&AppConfig::default())?;
//! let options = context.options().with_expression("#p0");
//! let args = CallArgs::new().arg("order_id", &42)?;
//!
//! let shipped = context
//!     .interceptor()
//!     .run_locked(&options, &args, || async { ship(42).await })
//!     .await?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Lock identities, policies, errors and port traits
//! - `application` - Key derivation, spin-wait scheduling, coordinator, guarded execution
//! - `providers` - Redis and in-memory lock stores, path expression evaluator
//! - `infrastructure` - Configuration, logging and bootstrap
//! - `cli` - The `dlock` command line

/// Domain layer - lock identities, policies and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use dlock_domain::*;
}

/// Application layer - coordinator, scheduler and interceptor
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use dlock_application::*;
}

/// Provider implementations - lock stores and expression evaluators
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use dlock_providers::*;
}

/// Infrastructure layer - config, logging and bootstrap
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use dlock_infrastructure::*;
}

pub mod cli;

// Re-export commonly used domain types at the crate root
pub use domain::*;

pub use application::{LockCoordinator, LockInterceptor, LockOptions};
pub use infrastructure::LockContext;
