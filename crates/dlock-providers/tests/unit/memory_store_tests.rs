//! In-memory lock store tests

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dlock_domain::error::Error;
use dlock_domain::ports::{AcquireOutcome, LockStore, ReleaseOutcome};
use dlock_domain::value_objects::{LockKey, OwnershipToken};
use dlock_providers::lock_store::InMemoryLockStore;

const LEASE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_acquire_then_busy() {
    let store = InMemoryLockStore::new();
    let key = LockKey::new("dl:order:1");

    let first = store.acquire(&key, LEASE).await.unwrap();
    assert!(matches!(first, AcquireOutcome::Acquired(_)));
    assert!(store.is_held(&key));

    let second = store.acquire(&key, LEASE).await.unwrap();
    assert_eq!(second, AcquireOutcome::Busy);
}

#[tokio::test]
async fn test_release_requires_matching_token() {
    let store = InMemoryLockStore::new();
    let key = LockKey::new("dl:order:2");
    let token = store.acquire(&key, LEASE).await.unwrap().into_token().unwrap();

    let wrong = store
        .release(&key, &OwnershipToken::new("someone-else"))
        .await
        .unwrap();
    assert_eq!(wrong, ReleaseOutcome::NotOwner);
    assert!(store.is_held(&key));

    assert_eq!(
        store.release(&key, &token).await.unwrap(),
        ReleaseOutcome::Released
    );
    assert!(!store.is_held(&key));
    assert_eq!(
        store.release(&key, &token).await.unwrap(),
        ReleaseOutcome::NotOwner
    );
}

#[tokio::test]
async fn test_release_of_absent_key_is_not_owner() {
    let store = InMemoryLockStore::new();
    let outcome = store
        .release(&LockKey::new("dl:never"), &OwnershipToken::new("t"))
        .await
        .unwrap();
    assert_eq!(outcome, ReleaseOutcome::NotOwner);
}

#[tokio::test(start_paused = true)]
async fn test_lease_expiry_frees_key() {
    let store = InMemoryLockStore::new();
    let key = LockKey::new("dl:expiring");
    let stale = store
        .acquire(&key, Duration::from_millis(100))
        .await
        .unwrap()
        .into_token()
        .unwrap();

    tokio::time::advance(Duration::from_millis(99)).await;
    assert!(store.is_held(&key));
    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(!store.is_held(&key));

    // The expired holder cannot release, and the key can be taken again.
    assert_eq!(
        store.release(&key, &stale).await.unwrap(),
        ReleaseOutcome::NotOwner
    );
    let fresh = store.acquire(&key, LEASE).await.unwrap().into_token().unwrap();
    assert_ne!(fresh, stale);
}

#[tokio::test(start_paused = true)]
async fn test_purge_expired() {
    let store = InMemoryLockStore::new();
    store
        .acquire(&LockKey::new("dl:a"), Duration::from_millis(10))
        .await
        .unwrap();
    store
        .acquire(&LockKey::new("dl:b"), LEASE)
        .await
        .unwrap();
    assert_eq!(store.len(), 2);

    tokio::time::advance(Duration::from_millis(20)).await;
    store.purge_expired();
    assert_eq!(store.len(), 1);
    assert!(!store.is_empty());
}

#[tokio::test]
async fn test_sub_millisecond_lease_is_rejected() {
    let store = InMemoryLockStore::new();
    let result = store
        .acquire(&LockKey::new("dl:zero"), Duration::from_micros(500))
        .await;
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_huge_lease_does_not_overflow() {
    let store = InMemoryLockStore::new();
    let key = LockKey::new("dl:forever");
    let outcome = store.acquire(&key, Duration::MAX).await.unwrap();
    assert!(!outcome.is_busy());
    assert!(store.is_held(&key));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquire_has_single_winner() {
    let store = Arc::new(InMemoryLockStore::new());
    let key = LockKey::new("dl:race");

    let mut tasks = Vec::new();
    for _ in 0..32 {
        let store = Arc::clone(&store);
        let key = key.clone();
        tasks.push(tokio::spawn(async move {
            store.acquire(&key, LEASE).await.unwrap()
        }));
    }

    let mut winners = 0;
    for task in tasks {
        if !task.await.unwrap().is_busy() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_tokens_are_unique() {
    let store = InMemoryLockStore::new();
    let mut tokens = HashSet::new();
    for i in 0..100 {
        let key = LockKey::new(format!("dl:unique:{i}"));
        let token = store.acquire(&key, LEASE).await.unwrap().into_token().unwrap();
        assert!(tokens.insert(token));
    }
    assert_eq!(store.provider_name(), "memory");
}
