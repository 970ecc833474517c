//! Tests for the self-perpetuating election/renewal jobs, ending with the
//! two-node failover scenario.

use std::sync::Arc;
use std::time::Duration;

use foreman::coordination::renewal::{
    ELECTION_JOB, RENEWAL_JOB, renewal_interval, run_election, schedule_election,
};
use foreman::coordination::{LeaderElector, LeaseElector};
use foreman::scheduler::JobScheduler;
use foreman::store::{CoordinationStore, MemoryStore};

const TTL: Duration = Duration::from_secs(60);

async fn drain() {
    for _ in 0..25 {
        tokio::task::yield_now().await;
    }
}

fn node(
    store: &Arc<MemoryStore>,
    label: &str,
) -> (Arc<LeaseElector>, Arc<dyn LeaderElector>, JobScheduler) {
    let lease = Arc::new(LeaseElector::new(store.clone(), "cluster", label, TTL));
    let elector: Arc<dyn LeaderElector> = lease.clone();
    let scheduler = JobScheduler::start(elector.clone());
    (lease, elector, scheduler)
}

#[foreman::test]
fn renewal_cadence_is_half_the_ttl() {
    assert_eq!(renewal_interval(TTL), Duration::from_secs(30));
}

#[foreman::test(start_paused = true)]
async fn winning_election_arms_the_renewal_chain() {
    let store = Arc::new(MemoryStore::new());
    let (_lease, elector, scheduler) = node(&store, "node-a");
    let handle = scheduler.handle();

    run_election(&handle, &elector, TTL).await;

    assert!(elector.is_leader().await);
    assert_eq!(handle.pending_jobs(), vec![RENEWAL_JOB.to_string()]);

    scheduler.shutdown().await;
}

#[foreman::test(start_paused = true)]
async fn losing_election_arms_nothing() {
    let store = Arc::new(MemoryStore::new());
    let (_a_lease, a, a_scheduler) = node(&store, "node-a");
    let (_b_lease, b, b_scheduler) = node(&store, "node-b");
    let a_handle = a_scheduler.handle();
    let b_handle = b_scheduler.handle();

    run_election(&a_handle, &a, TTL).await;
    run_election(&b_handle, &b, TTL).await;

    assert!(!b.is_leader().await);
    assert!(b_handle.pending_jobs().is_empty());

    a_scheduler.shutdown().await;
    b_scheduler.shutdown().await;
}

#[foreman::test(start_paused = true)]
async fn renewal_chain_keeps_the_lease_past_its_ttl() {
    let store = Arc::new(MemoryStore::new());
    let (lease, elector, scheduler) = node(&store, "node-a");
    let handle = scheduler.handle();

    run_election(&handle, &elector, TTL).await;
    assert!(elector.is_leader().await);

    // Four renewal windows: t = 120s, twice the TTL.
    for _ in 0..4 {
        tokio::time::advance(renewal_interval(TTL)).await;
        drain().await;
        assert!(elector.is_leader().await);
    }

    // Still the same holder, and the next link is already pending.
    assert_eq!(
        store.get(lease.lease_key()).await.unwrap().as_deref(),
        Some(lease.node_uuid())
    );
    assert_eq!(handle.pending_jobs(), vec![RENEWAL_JOB.to_string()]);

    scheduler.shutdown().await;
}

#[foreman::test(start_paused = true)]
async fn renewal_chain_stops_once_leadership_is_lost() {
    let store = Arc::new(MemoryStore::new());
    let (lease, elector, scheduler) = node(&store, "node-a");
    let handle = scheduler.handle();

    run_election(&handle, &elector, TTL).await;
    assert!(elector.is_leader().await);

    // Simulate losing the lease out from under the node.
    store.remove(lease.lease_key()).await;

    tokio::time::advance(renewal_interval(TTL)).await;
    drain().await;

    // The leader-only gate skipped the renewal body, so no new link exists.
    assert!(!elector.is_leader().await);
    assert!(handle.pending_jobs().is_empty());

    scheduler.shutdown().await;
}

#[foreman::test(start_paused = true)]
async fn election_job_keeps_rearming_itself() {
    let store = Arc::new(MemoryStore::new());
    let (_lease, elector, scheduler) = node(&store, "node-a");
    let handle = scheduler.handle();

    schedule_election(&handle, elector.clone(), TTL, Duration::from_secs(30));
    assert_eq!(handle.pending_jobs(), vec![ELECTION_JOB.to_string()]);

    tokio::time::advance(Duration::from_secs(30)).await;
    drain().await;

    // The round won, armed renewal, and re-armed itself.
    assert!(elector.is_leader().await);
    let mut pending = handle.pending_jobs();
    pending.sort();
    assert_eq!(
        pending,
        vec![ELECTION_JOB.to_string(), RENEWAL_JOB.to_string()]
    );

    scheduler.shutdown().await;
}

/// Two nodes, one lease: A leads and renews, crashes mid-window, and B takes
/// over only after the TTL runs out.
#[foreman::test(start_paused = true)]
async fn end_to_end_failover() {
    let store = Arc::new(MemoryStore::new());
    let (_a_lease, a, a_scheduler) = node(&store, "node-a");
    let (b_lease, b, b_scheduler) = node(&store, "node-b");
    let a_handle = a_scheduler.handle();
    let b_handle = b_scheduler.handle();

    // t=0: A elects first and wins; B's concurrent attempt loses.
    run_election(&a_handle, &a, TTL).await;
    run_election(&b_handle, &b, TTL).await;
    assert!(a.is_leader().await);
    assert!(!b.is_leader().await);

    // B keeps trying on its election cadence.
    schedule_election(&b_handle, b.clone(), TTL, Duration::from_secs(30));

    // t=30: A renews (lease now runs to t=90); B's attempt fails.
    tokio::time::advance(Duration::from_secs(30)).await;
    drain().await;
    assert!(a.is_leader().await);
    assert!(!b.is_leader().await);

    // t=45: A crashes. Its pending renewal dies with its scheduler.
    tokio::time::advance(Duration::from_secs(15)).await;
    drain().await;
    a_scheduler.shutdown().await;

    // t=60: the lease A last renewed is still live, so B must keep waiting.
    tokio::time::advance(Duration::from_secs(15)).await;
    drain().await;
    assert!(!b.is_leader().await);
    assert!(a.is_leader().await);

    // t=90: the lease has lapsed; B's next round wins exactly once.
    tokio::time::advance(Duration::from_secs(30)).await;
    drain().await;
    assert!(b.is_leader().await);

    // A is still running, and observes that it lost.
    assert!(!a.is_leader().await);
    assert!(!a.elect().await);
    assert_eq!(
        a.leader_node_uuid().await.as_deref(),
        Some(b_lease.node_uuid())
    );

    b_scheduler.shutdown().await;
}
