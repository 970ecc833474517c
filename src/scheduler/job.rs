//! Scheduled job types.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;

use super::SchedulerHandle;

/// Context handed to every job body, so jobs can resubmit follow-up work.
#[derive(Clone)]
pub struct JobContext {
    pub scheduler: SchedulerHandle,
}

pub(crate) type JobFn = Arc<dyn Fn(JobContext) -> BoxFuture<'static, ()> + Send + Sync>;

/// A named unit of work bound to an instant.
///
/// Names are unique among pending jobs: submitting under a name that is
/// already pending replaces the earlier submission.
#[derive(Clone)]
pub struct ScheduledJob {
    pub name: String,
    pub run_at: Instant,
    /// Skip silently at run time unless this node is the leader.
    pub leader_only: bool,
    pub(crate) run: JobFn,
}

impl ScheduledJob {
    /// Build a one-shot job. `f` runs at or after `run_at`; work that should
    /// recur resubmits itself through the context.
    pub fn one_shot<F, Fut>(
        name: impl Into<String>,
        run_at: Instant,
        leader_only: bool,
        f: F,
    ) -> Self
    where
        F: Fn(JobContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name: name.into(),
            run_at,
            leader_only,
            run: Arc::new(move |ctx| -> BoxFuture<'static, ()> { Box::pin(f(ctx)) }),
        }
    }
}

impl std::fmt::Debug for ScheduledJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledJob")
            .field("name", &self.name)
            .field("run_at", &self.run_at)
            .field("leader_only", &self.leader_only)
            .finish_non_exhaustive()
    }
}
