//! Node assembly: configuration in, running node out.
//!
//! Used by `main.rs` and by integration tests that want a whole node
//! without a process.

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use crate::coordination::{self, LeaderElector, renewal};
use crate::scheduler::{JobScheduler, SchedulerHandle};
use crate::settings::AppConfig;

/// A running node: the leadership elector plus the scheduler loop that keeps
/// elections and renewals flowing.
pub struct NodeHandle {
    elector: Arc<dyn LeaderElector>,
    scheduler: JobScheduler,
}

impl NodeHandle {
    pub fn elector(&self) -> &Arc<dyn LeaderElector> {
        &self.elector
    }

    pub fn scheduler(&self) -> SchedulerHandle {
        self.scheduler.handle()
    }

    /// Stop scheduling. A held lease is not relinquished; it simply stops
    /// being renewed and lapses on the store side.
    pub async fn shutdown(self) {
        info!(node_id = %self.elector.node_id(), "shutting down node");
        self.scheduler.shutdown().await;
    }
}

/// Build the elector and scheduler from configuration, run the first
/// election round, and arm the recurring election job.
pub async fn start(cfg: &AppConfig) -> anyhow::Result<NodeHandle> {
    let elector = coordination::create_elector(&cfg.coordination, cfg.node.id.clone())
        .await
        .context("constructing leader elector")?;

    info!(
        node_id = %elector.node_id(),
        node_uuid = %elector.node_uuid(),
        backend = ?cfg.coordination.backend,
        "node starting"
    );

    let scheduler = JobScheduler::start(elector.clone());
    let handle = scheduler.handle();

    let ttl = cfg.coordination.lease_ttl();
    // Seed the election loop; it re-arms itself from here on.
    renewal::run_election(&handle, &elector, ttl).await;
    renewal::schedule_election(
        &handle,
        elector.clone(),
        ttl,
        cfg.coordination.election_interval(),
    );

    Ok(NodeHandle { elector, scheduler })
}
