//! ScoreWriter - a player's own score writes.

use std::sync::Arc;

use serde_json::Value;

use crate::document::{Acl, Credential, Stored};
use crate::error::{ClientError, StoreError};
use crate::score::ScoreRecord;
use crate::store::{DocumentStore, Query};

/// How many times a score write re-reads the record after losing a version
/// race, usually to a rank write.
const WRITE_ATTEMPTS: usize = 5;

/// Callback that may edit a record's `score_details` right before it is saved.
pub type ScoreDetailsHook = Arc<dyn Fn(&mut Value, &ScoreRecord) + Send + Sync>;

/// Writes the signed-in player's score record.
///
/// Only `score`, `last_score` and `score_details` are touched; `rank` is
/// left for the recalculator, which the store triggers on every commit.
#[derive(Clone)]
pub struct ScoreWriter<S> {
    store: S,
    owner: String,
    credential: Credential,
    details_hook: Option<ScoreDetailsHook>,
}

impl<S: DocumentStore> ScoreWriter<S> {
    pub fn new(store: S, owner: impl Into<String>) -> Self {
        let owner = owner.into();
        Self {
            store,
            credential: Credential::user(owner.clone()),
            owner,
            details_hook: None,
        }
    }

    pub fn with_details_hook(mut self, hook: ScoreDetailsHook) -> Self {
        self.details_hook = Some(hook);
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Create the player's zeroed, unranked record, readable by everyone.
    pub fn create(&self, username: &str) -> Result<Stored<ScoreRecord>, StoreError> {
        let record = ScoreRecord::new(self.owner.clone(), username);
        let saved = self
            .store
            .insert(&self.credential, &record, Acl::public_read(self.owner.clone()))?;
        tracing::debug!(id = %saved.data.id, owner = %self.owner, "created score record");
        Ok(saved)
    }

    /// The player's record, if they have one.
    pub fn current(&self) -> Result<Option<Stored<ScoreRecord>>, StoreError> {
        let owner = self.owner.clone();
        let found = self.store.query(
            &self.credential,
            &Query::<ScoreRecord>::new()
                .filter(move |record| record.owner == owner)
                .limit(1),
        )?;
        Ok(found.into_iter().next())
    }

    /// Set the score to `value`.
    pub fn set_score(&self, value: f64) -> Result<Stored<ScoreRecord>, ClientError> {
        self.write(|record| record.record_score(value))
    }

    /// Add `delta` to the current score.
    pub fn add_score(&self, delta: f64) -> Result<Stored<ScoreRecord>, ClientError> {
        self.write(|record| record.add_to_score(delta))
    }

    fn write(&self, apply: impl Fn(&mut ScoreRecord)) -> Result<Stored<ScoreRecord>, ClientError> {
        let mut attempt = 1;
        loop {
            match self.try_write(&apply) {
                Err(ClientError::Store(err)) if err.is_conflict() && attempt < WRITE_ATTEMPTS => {
                    tracing::debug!(owner = %self.owner, attempt, error = %err, "score write conflicted; retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn try_write(
        &self,
        apply: &impl Fn(&mut ScoreRecord),
    ) -> Result<Stored<ScoreRecord>, ClientError> {
        let current = self
            .current()?
            .ok_or_else(|| ClientError::MissingScoreRecord {
                owner: self.owner.clone(),
            })?;

        let mut record = current.data;
        apply(&mut record);

        if let Some(hook) = &self.details_hook {
            let mut details = std::mem::take(&mut record.score_details);
            hook(&mut details, &record);
            record.score_details = details;
        }

        let saved = self
            .store
            .update(&self.credential, &record, current.version)?;
        tracing::debug!(
            id = %saved.data.id,
            score = saved.data.score,
            last_score = saved.data.last_score,
            "saved high score"
        );
        Ok(saved)
    }
}
