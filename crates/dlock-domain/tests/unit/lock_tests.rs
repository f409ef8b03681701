//! Unit tests for lock identity value objects

use dlock_domain::{LockHandle, LockKey, OwnershipToken, TimeUnit};
use std::time::Duration;

#[test]
fn test_lock_key_is_transparent_string() {
    let key = LockKey::new("dl:orders:9");
    assert_eq!(key.as_str(), "dl:orders:9");
    assert_eq!(key.to_string(), "dl:orders:9");
    assert_eq!(
        serde_json::to_string(&key).unwrap(),
        "\"dl:orders:9\"".to_string()
    );
    assert!(LockKey::from("").is_empty());
}

#[test]
fn test_token_debug_is_redacted() {
    let token = OwnershipToken::new("0123456789abcdef-secret");
    let debug = format!("{token:?}");
    assert!(debug.starts_with("OwnershipToken(01234567"));
    assert!(!debug.contains("secret"));
    assert_eq!(token.to_string(), "0123456789abcdef-secret");
}

#[test]
fn test_handle_exposes_key_and_token() {
    let handle = LockHandle::new(
        LockKey::new("dl:1"),
        OwnershipToken::new("t-1"),
        Duration::from_secs(5),
    );
    assert_eq!(handle.key().as_str(), "dl:1");
    assert_eq!(handle.token().as_str(), "t-1");
    assert_eq!(handle.lease(), Duration::from_secs(5));
    assert!(!handle.lease_elapsed());
}

#[test]
fn test_handle_lease_elapsed_with_zero_lease() {
    let handle = LockHandle::new(LockKey::new("k"), OwnershipToken::new("t"), Duration::ZERO);
    assert!(handle.lease_elapsed());
}

#[test]
fn test_handle_from_parts_never_elapses_locally() {
    let handle = LockHandle::from_parts(LockKey::new("k"), OwnershipToken::new("t"));
    assert!(!handle.lease_elapsed());
}

#[test]
fn test_time_unit_conversions() {
    assert_eq!(TimeUnit::Milliseconds.to_duration(250), Duration::from_millis(250));
    assert_eq!(TimeUnit::Seconds.to_duration(3), Duration::from_secs(3));
    assert_eq!(TimeUnit::Minutes.to_duration(2), Duration::from_secs(120));
    assert_eq!(TimeUnit::Days.to_duration(1), Duration::from_secs(86_400));
    assert_eq!(TimeUnit::default(), TimeUnit::Seconds);
}

#[test]
fn test_time_unit_serde_is_lowercase() {
    let unit: TimeUnit = serde_json::from_str("\"milliseconds\"").unwrap();
    assert_eq!(unit, TimeUnit::Milliseconds);
    assert_eq!(serde_json::to_string(&TimeUnit::Hours).unwrap(), "\"hours\"");
}
