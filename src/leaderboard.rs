//! Leaderboard - read-only views over ranked score records.

use crate::document::{Credential, Stored};
use crate::error::ClientError;
use crate::score::ScoreRecord;
use crate::store::{DocumentStore, Query};

/// First rank of a `limit`-sized window centered on `rank`, never below 1.
///
/// ```
/// assert_eq!(highscore::leaderboard::window_start(10, 5), 8);
/// assert_eq!(highscore::leaderboard::window_start(2, 10), 1);
/// ```
pub fn window_start(rank: u64, limit: usize) -> u64 {
    rank.saturating_sub(limit as u64 / 2).max(1)
}

/// Reads slices of the ranking.
///
/// Only records the recalculator has ranked (rank 1 and up) are listed.
/// Ranks shown may briefly lag behind scores while a pass is pending.
pub struct Leaderboard<S> {
    store: S,
    credential: Credential,
}

impl<S: DocumentStore> Leaderboard<S> {
    pub fn new(store: S, credential: Credential) -> Self {
        Self { store, credential }
    }

    /// The `limit` best-ranked records, best first.
    pub fn top(&self, limit: usize) -> Result<Vec<Stored<ScoreRecord>>, ClientError> {
        self.from_rank(1, limit)
    }

    /// Up to `limit` records starting `floor(limit / 2)` ranks above
    /// `owner`'s record, so the owner sits in the middle when possible.
    pub fn centered(
        &self,
        owner: &str,
        limit: usize,
    ) -> Result<Vec<Stored<ScoreRecord>>, ClientError> {
        let owner_filter = owner.to_string();
        let record = self
            .store
            .query(
                &self.credential,
                &Query::<ScoreRecord>::new()
                    .filter(move |record| record.owner == owner_filter)
                    .limit(1),
            )?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::MissingScoreRecord {
                owner: owner.to_string(),
            })?;

        let start = window_start(record.data.rank, limit);
        tracing::debug!(owner, rank = record.data.rank, start, "loading centered leaderboard");
        self.from_rank(start, limit)
    }

    fn from_rank(
        &self,
        start: u64,
        limit: usize,
    ) -> Result<Vec<Stored<ScoreRecord>>, ClientError> {
        let start = start.max(1);
        let board = self.store.query(
            &self.credential,
            &Query::<ScoreRecord>::new()
                .filter(move |record| record.rank >= start)
                .order_by(|a, b| a.data.rank.cmp(&b.data.rank))
                .limit(limit),
        )?;
        Ok(board)
    }
}
