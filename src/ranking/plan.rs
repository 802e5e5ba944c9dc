//! Diffing stored ranks against the ranks the current scores imply.

use crate::document::Stored;
use crate::score::ScoreRecord;

use super::standing;

/// A record whose stored rank disagrees with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct RankCorrection {
    /// The record as it was read, including the version to write against.
    pub record: Stored<ScoreRecord>,
    /// The rank it should have.
    pub rank: u64,
}

impl RankCorrection {
    pub fn id(&self) -> &str {
        &self.record.data.id
    }

    pub fn previous_rank(&self) -> u64 {
        self.record.data.rank
    }

    /// The record with its rank fixed and every other field untouched.
    pub fn corrected(&self) -> ScoreRecord {
        let mut data = self.record.data.clone();
        data.rank = self.rank;
        data
    }
}

/// Order `records` by standing and return the ones whose rank is wrong.
///
/// The record at position `i` should have rank `i + 1`. Records that already
/// carry the right rank are left out, so applying every correction is the
/// smallest write set that makes the ranking dense and correct.
pub fn plan_corrections(mut records: Vec<Stored<ScoreRecord>>) -> Vec<RankCorrection> {
    records.sort_by(standing::compare);

    records
        .into_iter()
        .zip(1u64..)
        .filter(|(record, expected)| record.data.rank != *expected)
        .map(|(record, rank)| RankCorrection { record, rank })
        .collect()
}
