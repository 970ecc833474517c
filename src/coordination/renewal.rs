//! Self-perpetuating election and renewal jobs.
//!
//! The electors own no timers. Staying leader is expressed as scheduler
//! work: a leader-only renewal job that re-arms itself every half TTL, and
//! an election job every node keeps pending on its own cadence. The renewal
//! chain dies on its own the moment leadership lapses, because its next link
//! is leader-only and the scheduler gate skips it.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::coordination::LeaderElector;
use crate::scheduler::{ScheduledJob, SchedulerHandle};

/// Name of the leader-only lease renewal job. At most one is pending.
pub const RENEWAL_JOB: &str = "leadership-renewal";
/// Name of the per-node election job. At most one is pending.
pub const ELECTION_JOB: &str = "leadership-election";

/// Half the TTL, so one missed renewal still leaves a full half-TTL margin
/// before the lease lapses.
pub fn renewal_interval(ttl: Duration) -> Duration {
    ttl / 2
}

/// Arrange the next lease renewal at now + TTL/2.
///
/// The job renews and, while leadership holds, resubmits itself for the
/// following window.
pub fn schedule_renewal(
    scheduler: &SchedulerHandle,
    elector: Arc<dyn LeaderElector>,
    ttl: Duration,
) {
    let run_at = Instant::now() + renewal_interval(ttl);
    scheduler.submit(ScheduledJob::one_shot(
        RENEWAL_JOB,
        run_at,
        true,
        move |ctx| {
            let elector = elector.clone();
            async move {
                elector.renew().await;
                if elector.is_leader().await {
                    schedule_renewal(&ctx.scheduler, elector, ttl);
                } else {
                    debug!(node_id = %elector.node_id(), "leadership lost; renewal chain stops");
                }
            }
        },
    ));
}

/// One full election round: attempt to take the lease, and when this node
/// comes out leader, normalize the expiry immediately and arm the renewal
/// chain.
pub async fn run_election(
    scheduler: &SchedulerHandle,
    elector: &Arc<dyn LeaderElector>,
    ttl: Duration,
) {
    if elector.elect().await {
        elector.renew().await;
        schedule_renewal(scheduler, elector.clone(), ttl);
    }
}

/// Keep a recurring election attempt pending. Losing rounds cost one store
/// round-trip and nothing else; a winning round arms the renewal chain.
pub fn schedule_election(
    scheduler: &SchedulerHandle,
    elector: Arc<dyn LeaderElector>,
    ttl: Duration,
    interval: Duration,
) {
    let run_at = Instant::now() + interval;
    scheduler.submit(ScheduledJob::one_shot(
        ELECTION_JOB,
        run_at,
        false,
        move |ctx| {
            let elector = elector.clone();
            async move {
                run_election(&ctx.scheduler, &elector, ttl).await;
                schedule_election(&ctx.scheduler, elector, ttl, interval);
            }
        },
    ));
}
