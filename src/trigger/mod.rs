//! Trigger - turning committed score writes into recalculation passes.
//!
//! ```text
//! score write ──► store commit ──► RecalcQueue (CommitHook)
//!                                      │  ≤ 1 pending job, coalesced
//!                                      ▼
//!                        drain() on the caller's thread
//!                        or RecalculatorThread in the background
//!                                      │
//!                                      ▼
//!                      RankRecalculator::run_pass ──► rank writes
//!                                      │                  │
//!                                      └── re-trigger ◄───┘ (depth + 1)
//! ```

mod queue;
mod thread;

pub use queue::{Enqueued, RecalcJob, RecalcQueue, RecalcStats};
pub use thread::RecalculatorThread;
