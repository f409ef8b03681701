//! Domain Services
//!
//! | Service | Description |
//! |---------|-------------|
//! | [`KeyResolver`] | Derives a [`LockKey`](dlock_domain::LockKey) from a key config and call arguments |
//! | [`SpinWaitScheduler`] | Polls a busy key until acquired, out of attempts or past the deadline |

/// Lock key derivation
pub mod key_resolver;
/// Spin-wait retry scheduling
pub mod spin_wait;

pub use key_resolver::KeyResolver;
pub use spin_wait::SpinWaitScheduler;
