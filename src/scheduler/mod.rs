//! Minimal leader-aware job scheduler.
//!
//! The coordination core needs exactly one capability from its scheduler:
//! run a named unit of work once, no earlier than a given instant, with an
//! optional "skip silently unless leader" flag. One background loop serves
//! all jobs; job bodies resubmit through their `JobContext` to recur.
//!
//! The leader-only gate lives here, immediately before a due job's body
//! runs. A skipped run is a trivially successful one, not an error.
//! Ordinary jobs are unaffected and run on every node independently.

pub mod job;

pub use job::{JobContext, ScheduledJob};

use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::coordination::LeaderElector;

struct SchedulerInner {
    /// Pending jobs, unordered; the loop scans for due entries.
    /// Guarded by a sync mutex, never held across an await.
    pending: Mutex<Vec<ScheduledJob>>,
    notify: Notify,
}

/// Cloneable handle for submitting work.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Arc<SchedulerInner>,
}

impl SchedulerHandle {
    /// Queue a job. At most one pending job exists per name; a resubmission
    /// under a pending name replaces it.
    pub fn submit(&self, job: ScheduledJob) {
        {
            let mut pending = self.inner.pending.lock().expect("scheduler queue poisoned");
            pending.retain(|j| j.name != job.name);
            debug!(job = %job.name, leader_only = job.leader_only, "job submitted");
            pending.push(job);
        }
        self.inner.notify.notify_one();
    }

    /// Names of jobs waiting to run, soonest first.
    pub fn pending_jobs(&self) -> Vec<String> {
        let mut pending: Vec<(Instant, String)> = self
            .inner
            .pending
            .lock()
            .expect("scheduler queue poisoned")
            .iter()
            .map(|j| (j.run_at, j.name.clone()))
            .collect();
        pending.sort_by_key(|(run_at, _)| *run_at);
        pending.into_iter().map(|(_, name)| name).collect()
    }
}

/// The scheduler loop plus its submission handle.
pub struct JobScheduler {
    handle: SchedulerHandle,
    shutdown_tx: watch::Sender<bool>,
    runner: JoinHandle<()>,
}

impl JobScheduler {
    /// Spawn the scheduler loop. The elector backs the leader-only gate.
    pub fn start(elector: Arc<dyn LeaderElector>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let inner = Arc::new(SchedulerInner {
            pending: Mutex::new(Vec::new()),
            notify: Notify::new(),
        });
        let handle = SchedulerHandle {
            inner: inner.clone(),
        };
        let runner = tokio::spawn(run_loop(inner, handle.clone(), elector, shutdown_rx));
        Self {
            handle,
            shutdown_tx,
            runner,
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    /// Stop the loop and wait for it to exit. Pending jobs are dropped.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.runner.await;
    }
}

async fn run_loop(
    inner: Arc<SchedulerInner>,
    handle: SchedulerHandle,
    elector: Arc<dyn LeaderElector>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            debug!("scheduler loop stopping");
            break;
        }

        // Pull everything due; remember the next deadline otherwise.
        let now = Instant::now();
        let (due, next_at) = {
            let mut pending = inner.pending.lock().expect("scheduler queue poisoned");
            let mut due: Vec<ScheduledJob> = Vec::new();
            let mut i = 0;
            while i < pending.len() {
                if pending[i].run_at <= now {
                    due.push(pending.remove(i));
                } else {
                    i += 1;
                }
            }
            // Stable by run_at; submission order breaks ties.
            due.sort_by_key(|j| j.run_at);
            let next_at = pending.iter().map(|j| j.run_at).min();
            (due, next_at)
        };

        for job in due {
            if job.leader_only && !elector.is_leader().await {
                debug!(job = %job.name, "skipping leader-only job; not leader");
                continue;
            }
            debug!(job = %job.name, "running job");
            (job.run)(JobContext {
                scheduler: handle.clone(),
            })
            .await;
        }

        tokio::select! {
            _ = inner.notify.notified() => {}
            _ = shutdown_rx.changed() => {}
            _ = async {
                match next_at {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            } => {}
        }
    }
}
