//! Lock Context Bootstrap
//!
//! Wires configuration to a lock store, a shared [`LockCoordinator`] and a
//! [`LockInterceptor`] using the path expression evaluator.
//!
//! ```text
//! AppConfig.store → resolve_lock_store (linkme registry) → Arc<dyn LockStore>
//!                                                               ↓
//! AppConfig.lock  → LockOptions (defaults)        Arc<LockCoordinator>
//!                                                               ↓
//!                          PathExpressionEvaluator → LockInterceptor
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = ConfigLoader::new().load()?;
//! let context = LockContext::bootstrap(&config)?;
//!
//! let options = context.options().with_expression("#p0");
//! let args = CallArgs::new().arg("order_id", &42)?;
//! context
//!     .interceptor()
//!     .run_locked(&options, &args, || async { ship(42).await })
//!     .await?;
//! ```

use std::sync::Arc;

use dlock_application::domain_services::KeyResolver;
use dlock_application::ports::registry::resolve_lock_store;
use dlock_application::use_cases::{LockCoordinator, LockInterceptor, LockOptions};
use dlock_domain::error::{Error, Result};
use dlock_domain::ports::LockStore;
use dlock_providers::expression::PathExpressionEvaluator;
use tracing::info;

use crate::config::AppConfig;
use crate::config::loader::validate_app_config;

/// Process-wide lock services built from one [`AppConfig`]
#[derive(Debug, Clone)]
pub struct LockContext {
    config: Arc<AppConfig>,
    coordinator: Arc<LockCoordinator>,
    interceptor: LockInterceptor,
    defaults: LockOptions,
}

impl LockContext {
    /// Resolve the configured store and build the lock services over it
    ///
    /// No connection is opened here; networked stores connect on first use.
    pub fn bootstrap(config: &AppConfig) -> Result<Self> {
        validate_app_config(config)?;

        let store = resolve_lock_store(&config.store.to_provider_config()).map_err(|e| {
            Error::config(format!(
                "Failed to resolve lock store '{}': {e}",
                config.store.provider
            ))
        })?;
        info!(provider = store.provider_name(), "Lock store resolved");

        Ok(Self::with_store(config, store))
    }

    /// Build the lock services over an already constructed store
    pub fn with_store(config: &AppConfig, store: Arc<dyn LockStore>) -> Self {
        let coordinator = Arc::new(LockCoordinator::new(store));
        let resolver = KeyResolver::new(Arc::new(PathExpressionEvaluator::new()));
        let interceptor = LockInterceptor::new(Arc::clone(&coordinator), resolver);

        Self {
            config: Arc::new(config.clone()),
            coordinator,
            interceptor,
            defaults: config.lock.to_options(),
        }
    }

    /// The configuration the context was built from
    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    /// The shared coordinator
    pub fn coordinator(&self) -> Arc<LockCoordinator> {
        Arc::clone(&self.coordinator)
    }

    /// The interceptor deriving keys with the path expression evaluator
    pub fn interceptor(&self) -> &LockInterceptor {
        &self.interceptor
    }

    /// Configured lock defaults, without key parts
    pub fn options(&self) -> LockOptions {
        self.defaults.clone()
    }

    /// Name of the backing store provider
    pub fn provider_name(&self) -> &str {
        self.coordinator.store().provider_name()
    }
}
