//! Spin-wait policy value objects
//!
//! A [`SpinWaitPolicy`] describes how a caller polls a busy lock: the base
//! interval, how the interval grows between attempts and how many attempts
//! are allowed before giving up. The deadline itself is not part of the
//! policy; it comes from the wait budget of each call.

use crate::constants::{SPIN_DEFAULT_INTERVAL, SPIN_DEFAULT_MAX_ATTEMPTS, SPIN_MIN_INTERVAL_MS};
use crate::error::Error;
use crate::value_objects::TimeUnit;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Backoff strategy between spin-wait attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpinWaitStrategy {
    /// Interval stays at the base interval
    #[default]
    Fixed,
    /// Interval grows by the base interval after every attempt
    Linear,
    /// Interval doubles after every attempt
    Exponential,
}

impl FromStr for SpinWaitStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "linear" => Ok(Self::Linear),
            "exponential" => Ok(Self::Exponential),
            other => Err(Error::invalid_argument(format!(
                "unknown spin-wait strategy '{other}', expected fixed, linear or exponential"
            ))),
        }
    }
}

/// Immutable spin-wait configuration supplied per call
///
/// # Example
///
/// ```
/// use dlock_domain::value_objects::{SpinWaitPolicy, SpinWaitStrategy, TimeUnit};
/// use std::time::Duration;
///
/// let policy = SpinWaitPolicy::new(100, 0, SpinWaitStrategy::Linear, TimeUnit::Milliseconds);
/// let first: Vec<Duration> = policy.intervals().take(3).collect();
/// assert_eq!(first, vec![
///     Duration::from_millis(100),
///     Duration::from_millis(200),
///     Duration::from_millis(300),
/// ]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinWaitPolicy {
    /// Base interval, in `time_unit`
    pub interval: u64,
    /// Maximum number of store round trips (0 = bounded only by the deadline)
    pub max_attempts: u32,
    /// How the interval grows between attempts
    pub strategy: SpinWaitStrategy,
    /// Unit of `interval`
    pub time_unit: TimeUnit,
}

impl SpinWaitPolicy {
    /// Create a policy
    pub fn new(
        interval: u64,
        max_attempts: u32,
        strategy: SpinWaitStrategy,
        time_unit: TimeUnit,
    ) -> Self {
        Self {
            interval,
            max_attempts,
            strategy,
            time_unit,
        }
    }

    /// Fixed interval in milliseconds, unbounded attempts
    pub fn fixed_millis(interval: u64) -> Self {
        Self::new(interval, 0, SpinWaitStrategy::Fixed, TimeUnit::Milliseconds)
    }

    /// Linearly growing interval in milliseconds, unbounded attempts
    pub fn linear_millis(interval: u64) -> Self {
        Self::new(interval, 0, SpinWaitStrategy::Linear, TimeUnit::Milliseconds)
    }

    /// Doubling interval in milliseconds, unbounded attempts
    pub fn exponential_millis(interval: u64) -> Self {
        Self::new(
            interval,
            0,
            SpinWaitStrategy::Exponential,
            TimeUnit::Milliseconds,
        )
    }

    /// Set the attempt cap
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Base interval as a duration, floored at [`SPIN_MIN_INTERVAL_MS`]
    pub fn base_interval(&self) -> Duration {
        self.time_unit
            .to_duration(self.interval)
            .max(Duration::from_millis(SPIN_MIN_INTERVAL_MS))
    }

    /// Whether `attempts` store round trips exhaust the attempt cap
    pub fn attempts_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts > 0 && attempts >= self.max_attempts
    }

    /// Interval that follows `current` under this policy's strategy
    pub fn next_interval(&self, current: Duration) -> Duration {
        match self.strategy {
            SpinWaitStrategy::Fixed => current,
            SpinWaitStrategy::Linear => current.saturating_add(self.base_interval()),
            SpinWaitStrategy::Exponential => current.checked_mul(2).unwrap_or(Duration::MAX),
        }
    }

    /// Successive sleep intervals, starting at the base interval
    pub fn intervals(&self) -> Backoff {
        Backoff {
            policy: *self,
            next: self.base_interval(),
        }
    }
}

impl Default for SpinWaitPolicy {
    fn default() -> Self {
        Self {
            interval: SPIN_DEFAULT_INTERVAL,
            max_attempts: SPIN_DEFAULT_MAX_ATTEMPTS,
            strategy: SpinWaitStrategy::Fixed,
            time_unit: TimeUnit::Milliseconds,
        }
    }
}

/// Infinite iterator over the sleep intervals of a [`SpinWaitPolicy`]
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: SpinWaitPolicy,
    next: Duration,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = self.policy.next_interval(current);
        Some(current)
    }
}
