//! Composition root
//!
//! One lock store per process, resolved from configuration through the
//! provider registry, shared by every coordinator and interceptor.

pub mod bootstrap;

pub use bootstrap::LockContext;
