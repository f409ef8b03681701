//! Provider Registry System
//!
//! Uses the `linkme` crate for compile-time registration of lock store
//! providers that are discovered and instantiated at runtime.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Lock Store Registration Flow                   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  1. Provider defines:  #[linkme::distributed_slice(SLICE)]      │
//! │                        static ENTRY: LockStoreProviderEntry     │
//! │                              ↓                                  │
//! │  2. Registry declares: #[linkme::distributed_slice]             │
//! │                        pub static LOCK_STORE_PROVIDERS          │
//! │                              ↓                                  │
//! │  3. Resolver queries:  LOCK_STORE_PROVIDERS.iter()              │
//! │                              ↓                                  │
//! │  4. Config selects:    "provider = redis" → RedisLockStore      │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ### Registering a Provider (in dlock-providers)
//!
//! ```ignore
//! use dlock_application::ports::registry::{LockStoreProviderEntry, LOCK_STORE_PROVIDERS};
//!
//! #[linkme::distributed_slice(LOCK_STORE_PROVIDERS)]
//! static MEMORY_LOCK_STORE: LockStoreProviderEntry = LockStoreProviderEntry {
//!     name: "memory",
//!     description: "Process-local lock store",
//!     factory: |_config| Ok(Arc::new(InMemoryLockStore::new())),
//! };
//! ```
//!
//! ### Resolving a Provider (in dlock-infrastructure)
//!
//! ```ignore
//! use dlock_application::ports::registry::{resolve_lock_store, LockStoreProviderConfig};
//!
//! let config = LockStoreProviderConfig::new("redis").with_uri("redis://127.0.0.1:6379");
//! let store = resolve_lock_store(&config)?;
//! ```

pub mod lock_store;

pub use lock_store::{
    LOCK_STORE_PROVIDERS, LockStoreProviderConfig, LockStoreProviderEntry,
    list_lock_store_providers, resolve_lock_store,
};
