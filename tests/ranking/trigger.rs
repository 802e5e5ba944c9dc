//! Passes triggered by committed score writes.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use highscore::{
    DocumentStore, Enqueued, InMemoryDocumentStore, RankRecalculator, RecalcConfig, RecalcQueue,
    RecalculatorThread, ScoreWriter,
};

use crate::support::{assert_dense_standing, master_key, rank_of, ranks, store};

fn subscribed_queue(store: &InMemoryDocumentStore, max_cascade_depth: u32) -> Arc<RecalcQueue> {
    let queue = Arc::new(RecalcQueue::new(max_cascade_depth));
    store.subscribe(queue.clone()).unwrap();
    queue
}

fn player(store: &InMemoryDocumentStore, owner: &str) -> ScoreWriter<InMemoryDocumentStore> {
    let writer = ScoreWriter::new(store.clone(), owner);
    writer.create(owner).unwrap();
    writer
}

#[test]
fn score_writes_are_coalesced_into_one_pending_pass() {
    let store = store();
    let queue = subscribed_queue(&store, 8);

    let alice = player(&store, "alice");
    let bob = player(&store, "bob");
    alice.set_score(10.0).unwrap();
    bob.set_score(20.0).unwrap();

    // Four commits, one pending job.
    assert_eq!(queue.stats().coalesced, 3);
    assert!(!queue.is_idle());

    let stats = queue.drain(&RankRecalculator::new(store.clone(), master_key()));

    assert!(queue.is_idle());
    assert_eq!(stats.passes, 2);
    assert_eq!(stats.ranks_corrected, 2);
    assert_eq!(rank_of(&store, "bob"), 1);
    assert_eq!(rank_of(&store, "alice"), 2);
}

#[test]
fn sequential_score_changes_converge() {
    let store = store();
    let queue = subscribed_queue(&store, 8);
    let recalculator = RankRecalculator::new(store.clone(), master_key());

    let writers: Vec<_> = ["p1", "p2", "p3", "p4"]
        .iter()
        .map(|owner| player(&store, owner))
        .collect();
    queue.drain(&recalculator);

    let changes = [(0, 5.0), (2, 9.0), (1, 7.0), (0, 3.0), (3, 11.0), (2, 1.0)];
    for (who, delta) in changes {
        writers[who].add_score(delta).unwrap();
        queue.drain(&recalculator);
    }

    // p1 = 8, p2 = 7, p3 = 10, p4 = 11
    assert_eq!(
        ranks(&store),
        vec![
            ("p4".into(), 1),
            ("p3".into(), 2),
            ("p1".into(), 3),
            ("p2".into(), 4),
        ]
    );
    assert!(recalculator.run_pass().unwrap().is_quiescent());
}

#[test]
fn rank_writes_retrigger_one_level_deeper() {
    let store = store();
    let queue = subscribed_queue(&store, 8);
    player(&store, "solo");

    let recalculator = RankRecalculator::new(store.clone(), master_key());
    let job = queue.try_take().unwrap();
    assert_eq!(job.depth, 0);
    queue.run(&recalculator, job);

    let follow_up = queue.try_take().unwrap();
    assert_eq!(follow_up.depth, 1);
    queue.run(&recalculator, follow_up);
    assert!(queue.try_take().is_none());
}

#[test]
fn cascade_depth_limit_drops_retriggers() {
    let store = store();
    let queue = subscribed_queue(&store, 0);
    player(&store, "a");
    player(&store, "b");

    let stats = queue.drain(&RankRecalculator::new(store.clone(), master_key()));

    assert_eq!(stats.passes, 1);
    assert_eq!(stats.ranks_corrected, 2);
    assert_eq!(stats.dropped, 2);
    assert_eq!(queue.schedule(1), Enqueued::Dropped);
    assert_eq!(queue.schedule(0), Enqueued::Scheduled);
    assert_eq!(queue.schedule(0), Enqueued::Coalesced);
}

#[test]
fn background_thread_keeps_ranks_current() {
    let store = store();
    let config = RecalcConfig {
        coalesce_window_ms: 5,
        poll_interval_ms: 10,
        ..RecalcConfig::default()
    };
    let queue = subscribed_queue(&store, config.max_cascade_depth);
    let worker = RecalculatorThread::spawn(
        RankRecalculator::new(store.clone(), master_key()),
        queue.clone(),
        &config,
    );

    let low = player(&store, "low");
    let high = player(&store, "high");
    low.set_score(1.0).unwrap();
    high.set_score(2.0).unwrap();
    assert!(worker.wait_idle(Duration::from_secs(5)));
    assert_eq!(rank_of(&store, "high"), 1);
    assert_eq!(rank_of(&store, "low"), 2);

    low.set_score(3.0).unwrap();
    assert!(worker.wait_idle(Duration::from_secs(5)));
    assert_eq!(rank_of(&store, "low"), 1);
    assert_eq!(rank_of(&store, "high"), 2);

    let stats = worker.stop();
    assert_eq!(stats.failed_passes, 0);
    assert!(stats.passes >= 2);
}

#[test]
fn concurrent_writers_converge() {
    let store = store();
    let config = RecalcConfig {
        poll_interval_ms: 10,
        ..RecalcConfig::default()
    };
    let queue = subscribed_queue(&store, config.max_cascade_depth);
    let worker = RecalculatorThread::spawn(
        RankRecalculator::new(store.clone(), master_key()),
        queue.clone(),
        &config,
    );

    let writers: Vec<_> = (0..6).map(|i| player(&store, &format!("w{}", i))).collect();

    for round in 0..5 {
        let handles: Vec<_> = writers
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, writer)| {
                thread::spawn(move || {
                    for step in 0..20 {
                        let delta = ((i * 7 + step * 3 + round) % 11) as f64;
                        writer.add_score(delta).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(worker.wait_idle(Duration::from_secs(10)));
        assert_dense_standing(&store);
    }

    let stats = worker.stop();
    assert_eq!(stats.failed_passes, 0);
    assert_eq!(stats.dropped, 0);
}
