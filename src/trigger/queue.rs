//! RecalcQueue - coalescing trigger queue between score commits and passes.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crate::document::Document;
use crate::ranking::RankRecalculator;
use crate::score::ScoreRecord;
use crate::store::{CommitHook, CommitNotice, DocumentStore};

/// A request to run one recalculation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecalcJob {
    /// 0 for a pass triggered by a client score write; n + 1 for a pass
    /// triggered by the rank writes of a depth-n pass.
    pub depth: u32,
    /// Commits folded into this job.
    pub triggers: usize,
}

impl RecalcJob {
    fn absorb(&mut self, other: RecalcJob) {
        self.depth = self.depth.min(other.depth);
        self.triggers += other.triggers;
    }
}

/// What happened to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// A new job is now pending.
    Scheduled,
    /// A job was already pending; the trigger was merged into it.
    Coalesced,
    /// The cascade depth limit was exceeded; the trigger was dropped.
    Dropped,
}

/// Counters across the lifetime of a queue.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecalcStats {
    /// Passes that completed their read.
    pub passes: usize,
    /// Passes aborted because the read failed.
    pub failed_passes: usize,
    /// Rank writes that committed.
    pub ranks_corrected: usize,
    /// Rank writes that failed and were skipped.
    pub failed_writes: usize,
    /// Triggers merged into an already pending job.
    pub coalesced: usize,
    /// Triggers dropped by the cascade depth limit.
    pub dropped: usize,
}

/// The pass currently running and the thread running it.
#[derive(Debug, Clone, Copy)]
struct RunningPass {
    depth: u32,
    thread: ThreadId,
}

impl RunningPass {
    fn here(depth: u32) -> Self {
        Self {
            depth,
            thread: thread::current().id(),
        }
    }
}

#[derive(Default)]
struct QueueState {
    pending: Option<RecalcJob>,
    running: Option<RunningPass>,
    /// Set by `close`; waiting takers stop waiting for jobs.
    closed: bool,
    stats: RecalcStats,
}

/// Bounded, coalescing work queue of recalculation passes.
///
/// Subscribed to a store as a `CommitHook`, it turns every committed score
/// write into at most one pending job: while a job is pending, further
/// triggers are merged into it instead of queuing another pass. A pass
/// always reads the current scores, so one pending pass covers every
/// trigger folded into it.
///
/// Rank writes made by a running pass re-trigger the queue one level
/// deeper. They are recognized as elevated commits delivered on the thread
/// that took the running job, which relies on store hooks running on the
/// writing thread. Triggers deeper than `max_cascade_depth` are dropped, which
/// bounds how long passes can keep re-triggering each other.
///
/// ```
/// use std::sync::Arc;
/// use highscore::{Acl, Credential, DocumentStore, InMemoryDocumentStore, MasterKey};
/// use highscore::{RankRecalculator, RecalcQueue, ScoreRecord};
///
/// let key = MasterKey::new("master");
/// let store = InMemoryDocumentStore::new(key.clone());
/// let queue = Arc::new(RecalcQueue::new(8));
/// store.subscribe(queue.clone()).unwrap();
///
/// store.insert(&Credential::user("u1"), &ScoreRecord::new("u1", "alice"), Acl::public_read("u1")).unwrap();
///
/// let recalculator = RankRecalculator::new(store, key);
/// let stats = queue.drain(&recalculator);
/// assert_eq!(stats.passes, 2);
/// assert_eq!(stats.ranks_corrected, 1);
/// ```
pub struct RecalcQueue {
    state: Mutex<QueueState>,
    wake: Condvar,
    max_cascade_depth: u32,
}

impl RecalcQueue {
    pub fn new(max_cascade_depth: u32) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            wake: Condvar::new(),
            max_cascade_depth,
        }
    }

    // The state is plain counters and flags; a panic elsewhere cannot leave it
    // half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Request a pass at the given cascade depth.
    pub fn schedule(&self, depth: u32) -> Enqueued {
        let mut state = self.lock();

        if depth > self.max_cascade_depth {
            state.stats.dropped += 1;
            tracing::warn!(
                depth,
                max = self.max_cascade_depth,
                "rank recalculation cascade limit reached; trigger dropped"
            );
            return Enqueued::Dropped;
        }

        let job = RecalcJob { depth, triggers: 1 };
        let outcome = match state.pending.as_mut() {
            Some(pending) => {
                pending.absorb(job);
                state.stats.coalesced += 1;
                Enqueued::Coalesced
            }
            None => {
                state.pending = Some(job);
                Enqueued::Scheduled
            }
        };

        self.wake.notify_all();
        outcome
    }

    /// Take the pending job, if any, and mark it running.
    pub fn try_take(&self) -> Option<RecalcJob> {
        let mut state = self.lock();
        let job = state.pending.take()?;
        state.running = Some(RunningPass::here(job.depth));
        Some(job)
    }

    /// Wait up to `timeout` for a pending job, then take it and mark it running.
    ///
    /// Returns `None` without waiting once the queue is closed.
    pub fn take_timeout(&self, timeout: Duration) -> Option<RecalcJob> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();

        loop {
            if state.closed {
                return None;
            }
            if let Some(job) = state.pending.take() {
                state.running = Some(RunningPass::here(job.depth));
                return Some(job);
            }

            let now = Instant::now();
            if now >= deadline || state.closed {
                return None;
            }

            state = self
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Fold a job that became pending meanwhile into `job`.
    pub fn absorb_pending(&self, job: &mut RecalcJob) {
        let mut state = self.lock();
        if let Some(pending) = state.pending.take() {
            job.absorb(pending);
            state.stats.coalesced += 1;
            state.running = Some(RunningPass::here(job.depth));
        }
    }

    /// Run one pass for `job`, record its outcome and clear the running mark.
    pub fn run<S: DocumentStore>(&self, recalculator: &RankRecalculator<S>, job: RecalcJob) {
        let result = recalculator.run_pass();

        let mut state = self.lock();
        match result {
            Ok(report) => {
                state.stats.passes += 1;
                state.stats.ranks_corrected += report.corrected;
                state.stats.failed_writes += report.failed.len();
            }
            Err(err) => {
                state.stats.failed_passes += 1;
                tracing::warn!(
                    depth = job.depth,
                    triggers = job.triggers,
                    error = %err,
                    "rank recalculation pass aborted"
                );
            }
        }
        state.running = None;
        self.wake.notify_all();
    }

    /// Run pending jobs on the calling thread until none is left.
    ///
    /// Returns the queue's cumulative stats.
    pub fn drain<S: DocumentStore>(&self, recalculator: &RankRecalculator<S>) -> RecalcStats {
        while let Some(job) = self.try_take() {
            self.run(recalculator, job);
        }
        self.stats()
    }

    /// No job pending and no pass running.
    pub fn is_idle(&self) -> bool {
        let state = self.lock();
        state.pending.is_none() && state.running.is_none()
    }

    /// Block until the queue is idle or `timeout` elapses. Returns whether it is idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();

        loop {
            if state.pending.is_none() && state.running.is_none() {
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }

            state = self
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Make `take_timeout` return `None` immediately, now and from then on.
    /// Pending jobs stay queued for `try_take` and `drain`.
    pub fn close(&self) {
        self.lock().closed = true;
        self.wake.notify_all();
    }

    pub fn stats(&self) -> RecalcStats {
        self.lock().stats.clone()
    }
}

impl CommitHook for RecalcQueue {
    fn after_commit(&self, notice: &CommitNotice) {
        if notice.collection != ScoreRecord::COLLECTION {
            return;
        }

        // Passes write from the thread that took their job, so an elevated
        // commit on that thread is one of the pass's own rank writes. Any
        // other commit starts a fresh cascade.
        let running = self.lock().running;
        let depth = match running {
            Some(pass) if notice.elevated && pass.thread == thread::current().id() => {
                pass.depth + 1
            }
            _ => 0,
        };

        self.schedule(depth);
    }
}
