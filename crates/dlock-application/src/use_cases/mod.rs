//! Use Cases
//!
//! | Use case | Description |
//! |----------|-------------|
//! | [`LockCoordinator`] | `try_lock` / `unlock` over an injected lock store |
//! | [`LockInterceptor`] | Derive the key, then acquire / run / release |

/// Guarded execution and per-call-site lock options
pub mod guarded;
/// Lock coordinator
pub mod lock_coordinator;

pub use guarded::{LockInterceptor, LockOptions};
pub use lock_coordinator::LockCoordinator;
