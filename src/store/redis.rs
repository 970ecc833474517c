//! Redis-backed coordination store.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;
use tracing::debug;

use super::{CoordinationStore, StoreError};

/// Store client backed by a Redis-compatible server.
///
/// Commands go through a `ConnectionManager`, which reconnects in the
/// background after transient drops; individual command failures surface as
/// `StoreError` and are absorbed by the electors as "not leader".
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the store. Fails fast when the endpoint is unreachable, so
    /// a misconfigured multi-node deployment halts at startup instead of
    /// running without mutual exclusion.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        debug!(url, "connected to coordination store");
        Ok(Self { conn })
    }
}

fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CoordinationStore for RedisStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        // SET key value NX EX ttl: OK when written, nil when the key is held.
        let written: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;
        Ok(written.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;
        Ok(value)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let refreshed: bool = conn
            .expire(key, ttl_secs(ttl) as i64)
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;
        Ok(refreshed)
    }
}
