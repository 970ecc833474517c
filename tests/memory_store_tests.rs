//! Tests for the in-memory coordination store: set-if-absent atomicity and
//! TTL-driven expiry.

use std::time::Duration;

use foreman::store::{CoordinationStore, MemoryStore};

const TTL: Duration = Duration::from_secs(60);

#[foreman::test]
async fn set_if_absent_wins_only_once() {
    let store = MemoryStore::new();

    assert!(store.set_if_absent("k", "first", TTL).await.unwrap());
    assert!(!store.set_if_absent("k", "second", TTL).await.unwrap());

    // The losing write left no trace.
    assert_eq!(store.get("k").await.unwrap(), Some("first".to_string()));
}

#[foreman::test]
async fn get_missing_key_is_none() {
    let store = MemoryStore::new();
    assert_eq!(store.get("absent").await.unwrap(), None);
}

#[foreman::test(start_paused = true)]
async fn expired_key_is_absent() {
    let store = MemoryStore::new();
    store.set_if_absent("k", "v", TTL).await.unwrap();

    tokio::time::advance(Duration::from_secs(59)).await;
    assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[foreman::test(start_paused = true)]
async fn expired_key_can_be_reacquired() {
    let store = MemoryStore::new();
    store.set_if_absent("k", "old", TTL).await.unwrap();

    tokio::time::advance(TTL).await;
    assert!(store.set_if_absent("k", "new", TTL).await.unwrap());
    assert_eq!(store.get("k").await.unwrap(), Some("new".to_string()));
}

#[foreman::test(start_paused = true)]
async fn expire_refreshes_deadline_in_place() {
    let store = MemoryStore::new();
    store.set_if_absent("k", "v", TTL).await.unwrap();

    tokio::time::advance(Duration::from_secs(40)).await;
    assert!(store.expire("k", TTL).await.unwrap());

    // Past the original deadline, still inside the refreshed one.
    tokio::time::advance(Duration::from_secs(40)).await;
    assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

    tokio::time::advance(Duration::from_secs(21)).await;
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[foreman::test]
async fn expire_missing_key_is_false() {
    let store = MemoryStore::new();
    assert!(!store.expire("absent", TTL).await.unwrap());
}

#[foreman::test(start_paused = true)]
async fn expire_after_deadline_is_false() {
    let store = MemoryStore::new();
    store.set_if_absent("k", "v", TTL).await.unwrap();

    tokio::time::advance(TTL).await;
    assert!(!store.expire("k", TTL).await.unwrap());
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[foreman::test]
async fn remove_drops_key() {
    let store = MemoryStore::new();
    store.set_if_absent("k", "v", TTL).await.unwrap();
    store.remove("k").await;
    assert_eq!(store.get("k").await.unwrap(), None);
    assert!(store.set_if_absent("k", "v2", TTL).await.unwrap());
}
