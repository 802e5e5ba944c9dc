//! Background thread running recalculation passes as triggers arrive.

use std::sync::mpsc::{channel, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::RecalcConfig;
use crate::ranking::RankRecalculator;
use crate::store::DocumentStore;

use super::queue::{RecalcQueue, RecalcStats};

/// A background thread that drains a `RecalcQueue`.
///
/// Passes run one at a time, each to completion. Follows the usual worker
/// shape: spawn, let it work, stop and collect stats.
///
/// ## Example
///
/// ```ignore
/// let queue = Arc::new(RecalcQueue::new(config.max_cascade_depth));
/// store.subscribe(queue.clone())?;
///
/// let worker = RecalculatorThread::spawn(
///     RankRecalculator::new(store.clone(), master_key),
///     queue.clone(),
///     &config,
/// );
///
/// // ... players write scores ...
///
/// let stats = worker.stop();
/// println!("ran {} passes", stats.passes);
/// ```
pub struct RecalculatorThread {
    queue: Arc<RecalcQueue>,
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl RecalculatorThread {
    /// Spawn the worker.
    ///
    /// With a non-zero `coalesce_window`, the worker waits that long after
    /// picking up a job and folds any trigger that arrived meanwhile into the
    /// same pass.
    pub fn spawn<S>(
        recalculator: RankRecalculator<S>,
        queue: Arc<RecalcQueue>,
        config: &RecalcConfig,
    ) -> Self
    where
        S: DocumentStore + 'static,
    {
        let (stop_tx, stop_rx) = channel();
        let poll_interval = config.poll_interval();
        let window = config.coalesce_window();
        let worker_queue = Arc::clone(&queue);

        let handle = thread::spawn(move || loop {
            match stop_rx.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            let Some(mut job) = worker_queue.take_timeout(poll_interval) else {
                continue;
            };

            if window > Duration::ZERO {
                thread::sleep(window);
                worker_queue.absorb_pending(&mut job);
            }

            worker_queue.run(&recalculator, job);
        });

        Self {
            queue,
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Block until no pass is pending or running, or `timeout` elapses.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.queue.wait_idle(timeout)
    }

    /// Signal the worker to stop and wait for it to finish.
    /// Returns the queue statistics.
    pub fn stop(mut self) -> RecalcStats {
        self.signal_stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("rank recalculator thread panicked");
            }
        }
        self.queue.stats()
    }

    /// Signal the worker to stop without waiting.
    ///
    /// Closes the queue so an idle worker exits at once instead of waiting
    /// out its poll interval.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
        self.queue.close();
    }
}

impl Drop for RecalculatorThread {
    fn drop(&mut self) {
        // Don't join on drop - let the thread finish naturally
        self.signal_stop();
    }
}
