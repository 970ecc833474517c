//! Store-backed leader elector.
//!
//! One well-known key holds the UUID of the current leader and expires on
//! the store side after the configured TTL. Election is a single atomic
//! set-if-absent; renewal refreshes the expiry in place and only ever runs
//! while this node is the observed holder. A node is the leader iff reading
//! the key returns its own UUID; there is no local "I am leader" bit to
//! drift out of sync.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::coordination::{LeaderElector, keys};
use crate::store::CoordinationStore;

pub struct LeaseElector {
    store: Arc<dyn CoordinationStore>,
    lease_key: String,
    node_uuid: String,
    node_id: String,
    ttl: Duration,
    /// Holder UUID seen by the most recent successful store read.
    /// Diagnostics only; allowed to lag behind the store.
    last_seen_holder: Mutex<Option<String>>,
}

impl LeaseElector {
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        cluster_prefix: &str,
        node_id: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            lease_key: keys::leader_lease_key(cluster_prefix),
            node_uuid: Uuid::new_v4().to_string(),
            node_id: node_id.into(),
            ttl,
            last_seen_holder: Mutex::new(None),
        }
    }

    pub fn lease_key(&self) -> &str {
        &self.lease_key
    }

    pub fn lease_ttl(&self) -> Duration {
        self.ttl
    }

    async fn read_holder(&self) -> Option<String> {
        match self.store.get(&self.lease_key).await {
            Ok(holder) => {
                *self.last_seen_holder.lock().await = holder.clone();
                holder
            }
            Err(err) => {
                // Uncertainty means "not leader". The cache keeps the last
                // successful read for diagnostics.
                debug!(key = %self.lease_key, error = %err, "lease read failed");
                None
            }
        }
    }
}

#[async_trait]
impl LeaderElector for LeaseElector {
    async fn is_leader(&self) -> bool {
        self.read_holder().await.as_deref() == Some(self.node_uuid.as_str())
    }

    async fn elect(&self) -> bool {
        match self
            .store
            .set_if_absent(&self.lease_key, &self.node_uuid, self.ttl)
            .await
        {
            Ok(true) => {
                info!(node_id = %self.node_id, node_uuid = %self.node_uuid, "acquired leadership")
            }
            Ok(false) => debug!(node_id = %self.node_id, "lease already held"),
            Err(err) => warn!(node_id = %self.node_id, error = %err, "election attempt failed"),
        }
        // Whatever the write reported, trust only what the store reads back.
        self.is_leader().await
    }

    async fn renew(&self) -> bool {
        // Never refresh a lease this node does not hold.
        if !self.is_leader().await {
            debug!(node_id = %self.node_id, "skipping renewal; lease not held");
            return false;
        }
        match self.store.expire(&self.lease_key, self.ttl).await {
            Ok(true) => {
                debug!(node_id = %self.node_id, "lease renewed");
                true
            }
            Ok(false) => {
                warn!(node_id = %self.node_id, "lease vanished during renewal");
                false
            }
            Err(err) => {
                warn!(node_id = %self.node_id, error = %err, "lease renewal failed");
                false
            }
        }
    }

    fn node_uuid(&self) -> &str {
        &self.node_uuid
    }

    fn node_id(&self) -> &str {
        &self.node_id
    }

    async fn leader_node_uuid(&self) -> Option<String> {
        match self.read_holder().await {
            Some(holder) => Some(holder),
            // Read failed or key absent: fall back to the last successful read.
            None => self.last_seen_holder.lock().await.clone(),
        }
    }

    async fn leader_node_id(&self) -> Option<String> {
        // The lease stores the UUID alone, so the label is only known when
        // it is this node's own.
        if self.leader_node_uuid().await.as_deref() == Some(self.node_uuid.as_str()) {
            Some(self.node_id.clone())
        } else {
            None
        }
    }
}
