//! HighScoreClient - the player-facing facade.
//!
//! Bundles sign-in, score writes, leaderboard reads, achievements and play
//! time tracking for one player session at a time.

use std::time::Duration;

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;
use serde_json::Value;

use crate::achievement::{Achievement, Achievements};
use crate::config::LeaderboardConfig;
use crate::document::{Credential, Stored};
use crate::error::ClientError;
use crate::leaderboard::Leaderboard;
use crate::player::{Enrollment, PlayClock, PlayerDetailsHook, Players};
use crate::score::ScoreRecord;
use crate::store::DocumentStore;
use crate::writer::{ScoreDetailsHook, ScoreWriter};

/// Event fired after the signed-in player's score record is saved.
#[cfg(feature = "emitter")]
pub const SCORE_SAVED: &str = "score_saved";

struct Session {
    user_id: String,
    username: String,
    clock: PlayClock,
}

/// One player's view of the leaderboard service.
pub struct HighScoreClient<S> {
    store: S,
    config: LeaderboardConfig,
    players: Players<S>,
    session: Option<Session>,
    score_details_hook: Option<ScoreDetailsHook>,
    player_details_hook: Option<PlayerDetailsHook>,
    #[cfg(feature = "emitter")]
    event_emitter: EventEmitter,
}

impl<S: DocumentStore + Clone> HighScoreClient<S> {
    pub fn new(store: S, config: LeaderboardConfig) -> Self {
        Self {
            players: Players::new(store.clone()),
            store,
            config,
            session: None,
            score_details_hook: None,
            player_details_hook: None,
            #[cfg(feature = "emitter")]
            event_emitter: EventEmitter::new(),
        }
    }

    /// Edit `score_details` before every score save.
    pub fn with_score_details_hook(mut self, hook: ScoreDetailsHook) -> Self {
        self.score_details_hook = Some(hook);
        self
    }

    /// Edit the profile `details` before every play time save.
    pub fn with_player_details_hook(mut self, hook: PlayerDetailsHook) -> Self {
        self.player_details_hook = Some(hook);
        self
    }

    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    /// Start a session for `user_id`, enrolling the player on first use.
    ///
    /// Signing in while another session is open replaces it.
    pub fn sign_in(&mut self, user_id: &str, username: &str) -> Result<Enrollment, ClientError> {
        let exists = self
            .players
            .exists(&Credential::user(user_id), username)?;
        self.trace(format_args!("user {} exists: {}", username, exists));

        let enrollment = self.players.enroll(user_id, username)?;
        self.session = Some(Session {
            user_id: user_id.to_string(),
            username: enrollment.profile.data.username.clone(),
            clock: PlayClock::new(),
        });
        tracing::info!(user_id, created = enrollment.created, "signed in");
        Ok(enrollment)
    }

    pub fn sign_out(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(user_id = %session.user_id, "signed out");
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user_id.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.username.as_str())
    }

    /// The signed-in player's score record.
    pub fn high_score(&self) -> Result<Stored<ScoreRecord>, ClientError> {
        let writer = self.writer()?;
        writer
            .current()?
            .ok_or_else(|| ClientError::MissingScoreRecord {
                owner: writer.owner().to_string(),
            })
    }

    /// Replace the player's score.
    pub fn set_score(&mut self, score: f64) -> Result<Stored<ScoreRecord>, ClientError> {
        let saved = self.writer()?.set_score(score)?;
        self.after_score_saved(&saved);
        Ok(saved)
    }

    /// Add to the player's score.
    pub fn add_score(&mut self, delta: f64) -> Result<Stored<ScoreRecord>, ClientError> {
        let saved = self.writer()?.add_score(delta)?;
        self.after_score_saved(&saved);
        Ok(saved)
    }

    /// `limit` records from the top, or centered on the player when
    /// `center_player` is set.
    pub fn leaderboard(
        &self,
        limit: usize,
        center_player: bool,
    ) -> Result<Vec<Stored<ScoreRecord>>, ClientError> {
        let user_id = self.session()?.user_id.clone();
        let board = Leaderboard::new(self.store.clone(), Credential::user(user_id.clone()));
        let records = if center_player {
            board.centered(&user_id, limit)?
        } else {
            board.top(limit)?
        };
        self.trace(format_args!("leaderboard has {} entries", records.len()));
        Ok(records)
    }

    pub fn achievements(&self) -> Result<Vec<Stored<Achievement>>, ClientError> {
        self.achievement_book()?.list()
    }

    /// Save an achievement and add its score to the player's score.
    pub fn add_achievement(
        &mut self,
        name: &str,
        description: &str,
        score: f64,
        details: Value,
    ) -> Result<Stored<Achievement>, ClientError> {
        let saved = self
            .achievement_book()?
            .record(name, description, score, details)?;
        if let Some(record) = self.writer()?.current()? {
            self.after_score_saved(&record);
        }
        Ok(saved)
    }

    /// Time since sign-in or the last score save.
    pub fn play_time(&self) -> Result<Duration, ClientError> {
        Ok(self.session()?.clock.elapsed())
    }

    pub fn reset_play_time(&mut self) -> Result<(), ClientError> {
        self.session_mut()?.clock.reset();
        Ok(())
    }

    /// Register a listener for [`SCORE_SAVED`]; it receives the saved
    /// record as JSON on an emitter thread.
    #[cfg(feature = "emitter")]
    pub fn on_score_saved<F>(&mut self, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.event_emitter.on(SCORE_SAVED, listener);
    }

    fn after_score_saved(&mut self, saved: &Stored<ScoreRecord>) {
        let played = self.session.as_mut().map(|session| {
            let played = session.clock.elapsed();
            session.clock.reset();
            (session.user_id.clone(), played)
        });
        if let Some((user_id, played)) = played {
            let hook = self.player_details_hook.as_ref();
            if let Err(e) = self.players.add_play_time(&user_id, played, hook) {
                tracing::warn!(user_id = %user_id, error = %e, "failed to save play time");
            }
        }

        #[cfg(feature = "emitter")]
        match serde_json::to_string(&saved.data) {
            Ok(json) => {
                self.event_emitter.emit(SCORE_SAVED, json);
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode saved score"),
        }
        #[cfg(not(feature = "emitter"))]
        let _ = saved;
    }

    fn writer(&self) -> Result<ScoreWriter<S>, ClientError> {
        let session = self.session()?;
        let writer = ScoreWriter::new(self.store.clone(), session.user_id.clone());
        Ok(match &self.score_details_hook {
            Some(hook) => writer.with_details_hook(hook.clone()),
            None => writer,
        })
    }

    fn achievement_book(&self) -> Result<Achievements<S>, ClientError> {
        Ok(Achievements::new(self.writer()?, self.store.clone()))
    }

    fn session(&self) -> Result<&Session, ClientError> {
        self.session.as_ref().ok_or(ClientError::NotSignedIn)
    }

    fn session_mut(&mut self) -> Result<&mut Session, ClientError> {
        self.session.as_mut().ok_or(ClientError::NotSignedIn)
    }

    fn trace(&self, message: std::fmt::Arguments<'_>) {
        if self.config.debug {
            tracing::info!("{}", message);
        } else {
            tracing::trace!("{}", message);
        }
    }
}
