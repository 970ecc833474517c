//! Coordination store clients.
//!
//! The election protocol needs exactly three primitives from the shared
//! store: an atomic set-if-absent with expiry, a plain read, and a TTL
//! refresh. Available backends:
//!
//! - `redis`: production client speaking SET NX EX / GET / EXPIRE
//! - `memory`: in-process store with real TTL semantics, for tests and
//!   single-process simulation

use async_trait::async_trait;
use std::time::Duration;

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

/// Error type for store round-trips.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    ConnectionFailed(String),
    #[error("store request failed: {0}")]
    RequestFailed(String),
}

/// Minimal contract the election protocol needs from a shared key-value store.
///
/// `set_if_absent` must be linearizable with respect to TTL-driven deletion:
/// two callers racing on an absent key must never both observe a successful
/// write.
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    /// Atomically write `value` under `key` with an expiry, only if the key
    /// is currently absent. Returns true when the write happened.
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// Read the current value, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Reset the key's expiry without touching its value.
    /// Returns false when the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;
}
