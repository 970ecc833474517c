//! In-memory coordination store for tests and single-process simulation.
//!
//! Matches the observable semantics of the Redis client: keys expire at a
//! deadline, and an expired key is indistinguishable from an absent one.
//! One async mutex serializes every operation, which makes set-if-absent
//! linearizable with respect to expiry.
//!
//! Deadlines use `tokio::time::Instant`, so tests running under
//! `tokio::time::pause` drive expiry deterministically.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{CoordinationStore, StoreError};

struct Record {
    value: String,
    deadline: Instant,
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a key unconditionally. Lets tests simulate lease loss without
    /// waiting out the TTL.
    pub async fn remove(&self, key: &str) {
        self.records.lock().await.remove(key);
    }
}

#[async_trait]
impl CoordinationStore for MemoryStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let now = Instant::now();
        let held = records.get(key).is_some_and(|r| r.deadline > now);
        if held {
            return Ok(false);
        }
        records.insert(
            key.to_string(),
            Record {
                value: value.to_string(),
                deadline: now + ttl,
            },
        );
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let records = self.records.lock().await;
        let now = Instant::now();
        Ok(records
            .get(key)
            .filter(|r| r.deadline > now)
            .map(|r| r.value.clone()))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let now = Instant::now();
        match records.get_mut(key) {
            Some(r) if r.deadline > now => {
                r.deadline = now + ttl;
                Ok(true)
            }
            Some(_) => {
                // Expired but not yet purged: same as absent.
                records.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}
