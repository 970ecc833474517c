//! Single-node elector for deployments without a shared store.
//!
//! Degenerates to "this node is always the leader" with zero store
//! interactions. Provides no mutual exclusion, so it must only be selected
//! where exactly one node exists.

use async_trait::async_trait;
use uuid::Uuid;

use crate::coordination::LeaderElector;

pub struct StandaloneElector {
    node_uuid: String,
    node_id: String,
}

impl StandaloneElector {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_uuid: Uuid::new_v4().to_string(),
            node_id: node_id.into(),
        }
    }
}

#[async_trait]
impl LeaderElector for StandaloneElector {
    async fn is_leader(&self) -> bool {
        true
    }

    async fn elect(&self) -> bool {
        true
    }

    async fn renew(&self) -> bool {
        true
    }

    fn node_uuid(&self) -> &str {
        &self.node_uuid
    }

    fn node_id(&self) -> &str {
        &self.node_id
    }

    async fn leader_node_uuid(&self) -> Option<String> {
        Some(self.node_uuid.clone())
    }

    async fn leader_node_id(&self) -> Option<String> {
        Some(self.node_id.clone())
    }
}
