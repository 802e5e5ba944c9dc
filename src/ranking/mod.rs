//! Ranking - recomputing the dense leaderboard ranking after score writes.
//!
//! A pass reads every score record, orders them by standing (score
//! descending, non-finite last, creation order breaking ties) and writes the
//! rank of exactly the records whose stored rank is wrong.
//!
//! Rank writes never change the ordering, because ordering depends only on
//! scores and creation order. A pass over a snapshot whose scores are final
//! therefore leaves nothing for the next pass to do; repeated passes are
//! only needed while client score writes keep racing with them.
//!
//! ## Example
//!
//! ```
//! use highscore::{Acl, Credential, DocumentStore, InMemoryDocumentStore, MasterKey};
//! use highscore::{RankRecalculator, ScoreRecord};
//!
//! let key = MasterKey::new("master");
//! let store = InMemoryDocumentStore::new(key.clone());
//! let mut record = ScoreRecord::new("u1", "alice");
//! record.score = 10.0;
//! store.insert(&Credential::user("u1"), &record, Acl::public_read("u1")).unwrap();
//!
//! let recalculator = RankRecalculator::new(store, key);
//! let report = recalculator.run_pass().unwrap();
//! assert_eq!(report.corrected, 1);
//! assert!(recalculator.run_pass().unwrap().is_quiescent());
//! ```

mod error;
mod plan;
mod recalculator;
pub mod standing;

pub use error::RecalcError;
pub use plan::{plan_corrections, RankCorrection};
pub use recalculator::{PassReport, RankRecalculator, RankWriteFailure};
