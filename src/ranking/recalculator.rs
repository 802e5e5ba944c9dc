//! RankRecalculator - one pass of rank recomputation over every score record.

use crate::document::{Credential, MasterKey};
use crate::error::StoreError;
use crate::score::ScoreRecord;
use crate::store::{DocumentStore, Query};

use super::plan::plan_corrections;
use super::RecalcError;

/// A corrective write that did not commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankWriteFailure {
    pub id: String,
    pub error: StoreError,
}

/// Outcome of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Score records read.
    pub scanned: usize,
    /// Corrective writes that committed.
    pub corrected: usize,
    /// Corrective writes that failed and were skipped.
    pub failed: Vec<RankWriteFailure>,
}

impl PassReport {
    /// The pass found every rank already correct.
    pub fn is_quiescent(&self) -> bool {
        self.corrected == 0 && self.failed.is_empty()
    }
}

/// Recomputes the dense 1..N ranking from stored scores.
///
/// Holds the store and a master credential: a pass reads and writes every
/// player's record, which per-record ACLs would otherwise forbid.
pub struct RankRecalculator<S> {
    store: S,
    credential: Credential,
}

impl<S: DocumentStore> RankRecalculator<S> {
    pub fn new(store: S, master_key: MasterKey) -> Self {
        Self {
            store,
            credential: Credential::master(master_key),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one pass: read every record, then write `rank` on exactly the
    /// records whose stored rank differs from their position.
    ///
    /// Each write is conditioned on the version that was read, so a pass
    /// never overwrites a score that changed under it. Such a write fails
    /// with a conflict, is logged and skipped, and the conflicting score
    /// write's own trigger brings the rank up to date.
    pub fn run_pass(&self) -> Result<PassReport, RecalcError> {
        let records = self
            .store
            .query::<ScoreRecord>(&self.credential, &Query::new())
            .map_err(RecalcError::Read)?;

        let mut report = PassReport {
            scanned: records.len(),
            ..PassReport::default()
        };

        for correction in plan_corrections(records) {
            let fixed = correction.corrected();
            match self
                .store
                .update(&self.credential, &fixed, correction.record.version)
            {
                Ok(_) => {
                    tracing::trace!(
                        id = %correction.id(),
                        from = correction.previous_rank(),
                        to = correction.rank,
                        "rank corrected"
                    );
                    report.corrected += 1;
                }
                Err(error) if error.is_conflict() => {
                    // The score changed after the read; its own commit
                    // triggers the pass that ranks it.
                    tracing::debug!(
                        id = %correction.id(),
                        rank = correction.rank,
                        error = %error,
                        "rank write lost a race with a score write; skipping"
                    );
                    report.failed.push(RankWriteFailure {
                        id: correction.id().to_string(),
                        error,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        id = %correction.id(),
                        rank = correction.rank,
                        error = %error,
                        "rank write failed; skipping"
                    );
                    report.failed.push(RankWriteFailure {
                        id: correction.id().to_string(),
                        error,
                    });
                }
            }
        }

        tracing::debug!(
            scanned = report.scanned,
            corrected = report.corrected,
            failed = report.failed.len(),
            "high score ranking recomputed from {} scores",
            report.scanned
        );

        Ok(report)
    }
}
