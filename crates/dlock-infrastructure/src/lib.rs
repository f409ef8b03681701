//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns around the lock engine.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Layered TOML + environment configuration (figment) |
//! | [`constants`] | Configuration and logging constants |
//! | [`di`] | Composition root wiring config to store to coordinator |
//! | [`error_ext`] | Context helpers mapping foreign errors into domain errors |
//! | [`logging`] | Structured logging with tracing |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod logging;

pub use config::{AppConfig, ConfigLoader};
pub use di::LockContext;
pub use error_ext::ErrorContext;
