//! Achievements - private per-player records that also award score.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Acl, Credential, Stored};
use crate::error::ClientError;
use crate::store::{DocumentStore, Query};
use crate::writer::ScoreWriter;
use crate::Document;

/// An achievement unlocked by a player. Visible to its owner only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "achievements")]
pub struct Achievement {
    #[serde(default)]
    pub id: String,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Score awarded on top of the player's high score.
    pub score: f64,
    #[serde(default)]
    pub details: Value,
}

/// The signed-in player's achievements.
pub struct Achievements<S> {
    store: S,
    credential: Credential,
    writer: ScoreWriter<S>,
}

impl<S: DocumentStore + Clone> Achievements<S> {
    pub fn new(writer: ScoreWriter<S>, store: S) -> Self {
        Self {
            credential: Credential::user(writer.owner().to_string()),
            store,
            writer,
        }
    }

    /// Save an achievement, then add its score to the player's high score.
    ///
    /// The achievement is kept even if the score update fails; the error is
    /// returned so the caller can retry the score part.
    pub fn record(
        &self,
        name: &str,
        description: &str,
        score: f64,
        details: Value,
    ) -> Result<Stored<Achievement>, ClientError> {
        let owner = self.writer.owner().to_string();
        let achievement = Achievement {
            id: String::new(),
            owner: owner.clone(),
            name: name.to_string(),
            description: description.to_string(),
            score,
            details,
        };

        let saved = self
            .store
            .insert(&self.credential, &achievement, Acl::private(owner))?;
        tracing::debug!(id = %saved.data.id, name, "saved achievement");

        self.writer.add_score(score)?;
        Ok(saved)
    }

    /// Every achievement of the player, oldest first.
    pub fn list(&self) -> Result<Vec<Stored<Achievement>>, ClientError> {
        let owner = self.writer.owner().to_string();
        let found = self.store.query(
            &self.credential,
            &Query::<Achievement>::new().filter(move |a| a.owner == owner),
        )?;
        tracing::debug!(count = found.len(), "loaded achievements");
        Ok(found)
    }
}
