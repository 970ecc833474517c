//! Leader election for cluster-singleton work.
//!
//! Every node runs one `LeaderElector`; the variant is picked once at
//! construction time from configuration:
//!
//! - `standalone`: single-node mode, this node is always the leader
//! - `lease`: multi-node mode, leadership held as a self-expiring key in a
//!   shared coordination store
//!
//! The electors own no background tasks. Staying leader is scheduler work:
//! see the `renewal` module for the self-resubmitting election and renewal
//! jobs.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::settings::{CoordinationBackend, CoordinationConfig};
use crate::store::RedisStore;

pub mod lease;
pub mod renewal;
pub mod standalone;

pub use lease::LeaseElector;
pub use standalone::StandaloneElector;

/// Error type for elector construction. Election and renewal failures at
/// runtime are never surfaced this way; they degrade to "not leader".
#[derive(Debug, thiserror::Error)]
pub enum CoordinationError {
    #[error("coordinated mode requires a store URL")]
    MissingStoreConfig,
    #[error("store connection failed: {0}")]
    ConnectionFailed(String),
}

/// Per-node leadership authority.
///
/// `is_leader` must stay cheap and infallible: one store round-trip at most,
/// any failure reported as `false`. `elect` and `renew` are idempotent and
/// safe to call on any schedule; a lost round has no side effects beyond the
/// store round-trip.
#[async_trait]
pub trait LeaderElector: Send + Sync {
    /// Read-only check: does this node currently hold leadership?
    async fn is_leader(&self) -> bool;

    /// Attempt to become leader. Returns the node's leadership state as
    /// observed after the attempt.
    async fn elect(&self) -> bool;

    /// Extend the lease TTL, only when this node is the current holder.
    /// Returns whether the lease is believed held afterward.
    async fn renew(&self) -> bool;

    /// This node's process-lifetime identity.
    fn node_uuid(&self) -> &str;

    /// This node's human-assigned label.
    fn node_id(&self) -> &str;

    /// Identity of the last-observed leader. Best-effort: not guaranteed
    /// fresh beyond the most recent store read.
    async fn leader_node_uuid(&self) -> Option<String>;

    /// Label of the last-observed leader, where known.
    async fn leader_node_id(&self) -> Option<String>;

    /// Poll until this node observes itself as leader, or the timeout
    /// lapses. Returns true when leadership was observed.
    async fn wait_leader(&self, timeout: Duration) -> bool {
        let start = tokio::time::Instant::now();
        while start.elapsed() < timeout {
            if self.is_leader().await {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        false
    }
}

/// Build the leader elector selected by configuration.
///
/// Standalone mode provides no mutual exclusion and must only be used where
/// exactly one node exists. Redis mode connects eagerly: a missing URL or an
/// unreachable store is a hard startup error, never a silent fallback to
/// always-leader.
pub async fn create_elector(
    config: &CoordinationConfig,
    node_id: impl Into<String>,
) -> Result<Arc<dyn LeaderElector>, CoordinationError> {
    let node_id = node_id.into();
    match config.backend {
        CoordinationBackend::Standalone => Ok(Arc::new(StandaloneElector::new(node_id))),
        CoordinationBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .ok_or(CoordinationError::MissingStoreConfig)?;
            let store = RedisStore::connect(url)
                .await
                .map_err(|e| CoordinationError::ConnectionFailed(e.to_string()))?;
            Ok(Arc::new(LeaseElector::new(
                Arc::new(store),
                &config.cluster_prefix,
                node_id,
                config.lease_ttl(),
            )))
        }
    }
}

/// Helpers to build key paths used for coordination.
pub mod keys {
    /// Key holding the cluster-wide leader lease.
    pub fn leader_lease_key(cluster_prefix: &str) -> String {
        format!("{}/coord/leader", cluster_prefix)
    }
}
