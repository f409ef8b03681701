//! Configuration types module

pub mod app;
pub mod lock;
pub mod logging;
pub mod store;

// Re-export main types
pub use app::*;
pub use lock::*;
pub use logging::*;
pub use store::*;
