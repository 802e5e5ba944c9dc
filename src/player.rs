//! Players - profiles, enrollment and play time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Acl, Credential, Stored};
use crate::error::{ClientError, StoreError};
use crate::score::ScoreRecord;
use crate::store::{DocumentStore, Query};
use crate::writer::ScoreWriter;
use crate::Document;

/// Callback that may edit a profile's `details` right before it is saved.
pub type PlayerDetailsHook = Arc<dyn Fn(&mut Value, &PlayerProfile) + Send + Sync>;

/// Public profile of a player. The id is the player's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "players")]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub time_played_ms: u64,
    #[serde(default)]
    pub details: Value,
}

/// Wall-clock play time since the last reset.
#[derive(Debug, Clone, Copy)]
pub struct PlayClock {
    started: Instant,
}

impl Default for PlayClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.started = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Result of enrolling a player.
#[derive(Debug, Clone)]
pub struct Enrollment {
    pub profile: Stored<PlayerProfile>,
    pub score: Stored<ScoreRecord>,
    /// The profile was created by this call.
    pub created: bool,
}

/// Player profile operations.
pub struct Players<S> {
    store: S,
}

impl<S: DocumentStore + Clone> Players<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Whether any player uses `username`.
    pub fn exists(&self, viewer: &Credential, username: &str) -> Result<bool, StoreError> {
        let wanted = username.to_string();
        let found = self.store.query(
            viewer,
            &Query::<PlayerProfile>::new()
                .filter(move |p| p.username == wanted)
                .limit(1),
        )?;
        Ok(!found.is_empty())
    }

    /// Make sure `user_id` has a profile and a score record.
    ///
    /// A returning player gets their existing documents back; a missing score
    /// record is recreated. A new player gets both created, unless another
    /// player already holds `username`.
    pub fn enroll(&self, user_id: &str, username: &str) -> Result<Enrollment, ClientError> {
        let credential = Credential::user(user_id);
        let writer = ScoreWriter::new(self.store.clone(), user_id);

        if let Some(profile) = self.store.get::<PlayerProfile>(&credential, user_id)? {
            tracing::debug!(user_id, "player exists");
            let score = match writer.current()? {
                Some(score) => score,
                None => writer.create(&profile.data.username)?,
            };
            return Ok(Enrollment {
                profile,
                score,
                created: false,
            });
        }

        if self.exists(&credential, username)? {
            return Err(ClientError::UsernameTaken {
                username: username.to_string(),
            });
        }

        let profile = PlayerProfile {
            id: user_id.to_string(),
            username: username.to_string(),
            time_played_ms: 0,
            details: Value::Object(Default::default()),
        };
        let profile = self
            .store
            .insert(&credential, &profile, Acl::public_read(user_id))?;
        let score = writer.create(username)?;
        tracing::debug!(user_id, username, "created player");

        Ok(Enrollment {
            profile,
            score,
            created: true,
        })
    }

    /// Add `played` to the player's total play time.
    pub fn add_play_time(
        &self,
        user_id: &str,
        played: Duration,
        details_hook: Option<&PlayerDetailsHook>,
    ) -> Result<Stored<PlayerProfile>, ClientError> {
        let credential = Credential::user(user_id);
        let current = self
            .store
            .get::<PlayerProfile>(&credential, user_id)?
            .ok_or_else(|| StoreError::NotFound {
                collection: PlayerProfile::COLLECTION.to_string(),
                id: user_id.to_string(),
            })?;

        let mut profile = current.data;
        let played_ms = u64::try_from(played.as_millis()).unwrap_or(u64::MAX);
        profile.time_played_ms = profile.time_played_ms.saturating_add(played_ms);

        if let Some(hook) = details_hook {
            let mut details = std::mem::take(&mut profile.details);
            hook(&mut details, &profile);
            profile.details = details;
        }

        let saved = self.store.update(&credential, &profile, current.version)?;
        tracing::debug!(user_id, time_played_ms = saved.data.time_played_ms, "play time set");
        Ok(saved)
    }
}
