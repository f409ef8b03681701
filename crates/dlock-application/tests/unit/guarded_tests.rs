//! Guarded execution tests

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dlock_application::domain_services::KeyResolver;
use dlock_application::use_cases::{LockCoordinator, LockInterceptor, LockOptions};
use dlock_domain::error::Error;
use dlock_domain::value_objects::{
    CallArgs, KeyPart, LockKey, SpinWaitPolicy, SpinWaitStrategy, TimeUnit,
};
use dlock_providers::expression::PathExpressionEvaluator;
use dlock_providers::lock_store::InMemoryLockStore;
use futures::FutureExt;

use crate::support::{CountingStore, UnreachableStore};

fn interceptor(coordinator: Arc<LockCoordinator>) -> LockInterceptor {
    LockInterceptor::new(
        coordinator,
        KeyResolver::new(Arc::new(PathExpressionEvaluator::new())),
    )
}

fn order_args(order_id: u64) -> CallArgs {
    CallArgs::new()
        .arg("user_id", &1_u64)
        .unwrap()
        .arg("order_id", &order_id)
        .unwrap()
}

fn place_options() -> LockOptions {
    LockOptions::new([KeyPart::argument("user_id")])
        .with_expression("#order_id")
        .with_wait_time(0)
        .with_expire_time(5)
}

async fn crash() {
    panic!("order service crashed");
}

#[test]
fn test_options_defaults() {
    let options = LockOptions::default();
    assert_eq!(options.key.prefix, "dl");
    assert_eq!(options.key.delimiter, ":");
    assert_eq!(options.expire_time, 10);
    assert_eq!(options.wait_time, 3);
    assert_eq!(options.time_unit, TimeUnit::Seconds);
    assert_eq!(options.spin, SpinWaitPolicy::default());
    assert_eq!(options.lease(), Duration::from_secs(10));
    assert_eq!(options.wait_budget(), Duration::from_secs(3));
}

#[test]
fn test_options_deserialize_flat_key_config() {
    let options: LockOptions = serde_json::from_str(
        r##"{
            "prefix": "orders",
            "parts": [{"source": "expression", "expression": "#p0"}],
            "wait_time": 2,
            "spin": {"interval": 100, "strategy": "linear"}
        }"##,
    )
    .unwrap();

    assert_eq!(options.key.prefix, "orders");
    assert_eq!(options.key.delimiter, ":");
    assert_eq!(options.key.parts, vec![KeyPart::expression("#p0")]);
    assert_eq!(options.wait_time, 2);
    assert_eq!(options.expire_time, 10);
    assert_eq!(options.spin.strategy, SpinWaitStrategy::Linear);
}

#[tokio::test]
async fn test_runs_operation_and_releases() {
    let store = CountingStore::in_memory();
    let coordinator = Arc::new(LockCoordinator::new(store.clone()));
    let interceptor = interceptor(Arc::clone(&coordinator));

    let placed = interceptor
        .run_locked(&place_options(), &order_args(9), || async { "placed" })
        .await
        .unwrap();

    assert_eq!(placed, "placed");
    assert_eq!(store.releases(), 1);
    assert!(
        coordinator
            .try_lock(&LockKey::new("dl:1:9"), Duration::from_secs(1))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_operation_sees_lock_held() {
    let coordinator = Arc::new(LockCoordinator::new(Arc::new(InMemoryLockStore::new())));
    let interceptor = interceptor(Arc::clone(&coordinator));

    let inner = Arc::clone(&coordinator);
    let busy_inside = interceptor
        .run_locked(&place_options(), &order_args(9), move || async move {
            inner
                .try_lock(&LockKey::new("dl:1:9"), Duration::from_secs(1))
                .await
                .unwrap()
                .is_none()
        })
        .await
        .unwrap();

    assert!(busy_inside);
}

#[tokio::test]
async fn test_not_acquired_names_key_and_skips_operation() {
    let coordinator = Arc::new(LockCoordinator::new(Arc::new(InMemoryLockStore::new())));
    let interceptor = interceptor(Arc::clone(&coordinator));
    let _held = coordinator
        .try_lock(&LockKey::new("dl:1:9"), Duration::from_secs(5))
        .await
        .unwrap()
        .unwrap();

    let ran = AtomicBool::new(false);
    let flag = &ran;
    let result = interceptor
        .run_locked(&place_options(), &order_args(9), move || async move {
            flag.store(true, Ordering::SeqCst);
        })
        .await;

    assert!(!ran.load(Ordering::SeqCst));
    match result {
        Err(Error::LockNotAcquired { key }) => assert_eq!(key, "dl:1:9"),
        other => panic!("Expected LockNotAcquired, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_waiting_path_acquires_after_release() {
    let coordinator = Arc::new(LockCoordinator::new(Arc::new(InMemoryLockStore::new())));
    let interceptor = interceptor(Arc::clone(&coordinator));
    let key = LockKey::new("dl:1:9");
    let held = coordinator
        .try_lock(&key, Duration::from_secs(5))
        .await
        .unwrap()
        .unwrap();

    let releaser = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            coordinator.unlock(&held).await.unwrap();
        })
    };

    let options = place_options()
        .with_wait_time(2)
        .with_spin(SpinWaitPolicy::linear_millis(100));
    let result = interceptor
        .run_locked(&options, &order_args(9), || async { 42 })
        .await
        .unwrap();

    assert_eq!(result, 42);
    releaser.await.unwrap();
}

#[tokio::test]
async fn test_panic_releases_then_propagates() {
    let store = CountingStore::in_memory();
    let coordinator = Arc::new(LockCoordinator::new(store.clone()));
    let interceptor = interceptor(Arc::clone(&coordinator));
    let options = place_options();
    let args = order_args(9);

    let outcome = AssertUnwindSafe(interceptor.run_locked(&options, &args, crash))
        .catch_unwind()
        .await;

    assert!(outcome.is_err());
    assert_eq!(store.releases(), 1);
    assert!(
        coordinator
            .try_lock(&LockKey::new("dl:1:9"), Duration::from_secs(1))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let coordinator = Arc::new(LockCoordinator::new(Arc::new(UnreachableStore)));
    let interceptor = interceptor(coordinator);

    let result = interceptor
        .run_locked(&place_options(), &order_args(9), || async {})
        .await;

    assert!(matches!(result, Err(ref e) if e.is_store()));
}

#[tokio::test(start_paused = true)]
async fn test_try_lock_with_follows_wait_time() {
    let store = CountingStore::in_memory();
    let coordinator = LockCoordinator::new(store.clone());
    let key = LockKey::new("dl:with");
    let _held = coordinator
        .try_lock(&key, Duration::from_secs(30))
        .await
        .unwrap()
        .unwrap();

    let one_shot = place_options();
    assert!(coordinator.try_lock_with(&key, &one_shot).await.unwrap().is_none());
    assert_eq!(store.acquires(), 2);

    let waiting = one_shot
        .with_wait_time(300)
        .with_time_unit(TimeUnit::Milliseconds)
        .with_spin(SpinWaitPolicy::fixed_millis(100));
    let started = tokio::time::Instant::now();
    assert!(coordinator.try_lock_with(&key, &waiting).await.unwrap().is_none());
    assert_eq!(started.elapsed(), Duration::from_millis(300));
    assert_eq!(store.acquires(), 2 + 4);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_call_releases_lock() {
    let store = CountingStore::in_memory();
    let coordinator = Arc::new(LockCoordinator::new(store.clone()));
    let interceptor = interceptor(Arc::clone(&coordinator));
    let options = place_options().with_expire_time(60);
    let args = order_args(7);

    let timed_out = tokio::time::timeout(
        Duration::from_millis(50),
        interceptor.run_locked(&options, &args, || {
            tokio::time::sleep(Duration::from_secs(5))
        }),
    )
    .await
    .is_err();
    assert!(timed_out);

    // Let the background release run
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(store.releases(), 1);
    assert!(
        coordinator
            .try_lock(&LockKey::new("dl:1:7"), Duration::from_secs(1))
            .await
            .unwrap()
            .is_some(),
        "lock must be free once the guarded call is dropped"
    );
}

#[tokio::test(start_paused = true)]
async fn test_completed_call_releases_once() {
    let store = CountingStore::in_memory();
    let coordinator = Arc::new(LockCoordinator::new(store.clone()));
    let interceptor = interceptor(coordinator);

    interceptor
        .run_locked(&place_options(), &order_args(8), || async {})
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(store.releases(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_saturated_wait_time_does_not_overflow() {
    let coordinator = LockCoordinator::new(Arc::new(InMemoryLockStore::new()));
    let key = LockKey::new("dl:patient");
    let _held = coordinator
        .try_lock(&key, Duration::from_secs(30))
        .await
        .unwrap()
        .unwrap();

    let options = place_options()
        .with_wait_time(u64::MAX)
        .with_time_unit(TimeUnit::Days)
        .with_spin(SpinWaitPolicy::fixed_millis(100).with_max_attempts(2));
    assert_eq!(options.wait_budget(), Duration::from_secs(u64::MAX));
    assert!(coordinator.try_lock_with(&key, &options).await.unwrap().is_none());
}
