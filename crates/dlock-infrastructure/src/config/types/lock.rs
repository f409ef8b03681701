//! Process-wide lock defaults

use dlock_application::use_cases::LockOptions;
use dlock_domain::constants::{
    LOCK_DEFAULT_EXPIRE_TIME, LOCK_DEFAULT_WAIT_TIME, LOCK_KEY_DEFAULT_DELIMITER,
    LOCK_KEY_DEFAULT_PREFIX,
};
use dlock_domain::value_objects::{SpinWaitPolicy, TimeUnit};
use serde::{Deserialize, Serialize};

/// Defaults applied to call sites that do not override them
///
/// ```toml
/// [lock]
/// prefix = "dl"
/// delimiter = ":"
/// expire_time = 10
/// wait_time = 3
/// time_unit = "seconds"
///
/// [lock.spin]
/// interval = 100
/// strategy = "exponential"
/// time_unit = "milliseconds"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockDefaultsConfig {
    /// Key prefix
    pub prefix: String,
    /// Key delimiter
    pub delimiter: String,
    /// Lease, in `time_unit`
    pub expire_time: u64,
    /// Wait budget, in `time_unit`
    pub wait_time: u64,
    /// Unit of `expire_time` and `wait_time`
    pub time_unit: TimeUnit,
    /// Backoff between attempts
    pub spin: SpinWaitPolicy,
}

impl LockDefaultsConfig {
    /// Lock options carrying these defaults and no key parts
    pub fn to_options(&self) -> LockOptions {
        LockOptions::default()
            .with_prefix(&self.prefix)
            .with_delimiter(&self.delimiter)
            .with_expire_time(self.expire_time)
            .with_wait_time(self.wait_time)
            .with_time_unit(self.time_unit)
            .with_spin(self.spin)
    }
}

impl Default for LockDefaultsConfig {
    fn default() -> Self {
        Self {
            prefix: LOCK_KEY_DEFAULT_PREFIX.to_string(),
            delimiter: LOCK_KEY_DEFAULT_DELIMITER.to_string(),
            expire_time: LOCK_DEFAULT_EXPIRE_TIME,
            wait_time: LOCK_DEFAULT_WAIT_TIME,
            time_unit: TimeUnit::default(),
            spin: SpinWaitPolicy::default(),
        }
    }
}
