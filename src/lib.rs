//! Game leaderboard on top of a hosted document store.
//!
//! Players write their own score records; a [`RankRecalculator`], triggered
//! after every score commit through a [`RecalcQueue`], keeps each record's
//! `rank` equal to its 1-based position under descending score order.

extern crate self as highscore;

mod achievement;
mod client;
mod config;
mod document;
mod error;
pub mod leaderboard;
pub mod logging;
mod player;
mod ranking;
mod score;
pub mod store;
mod trigger;
mod writer;

pub use achievement::{Achievement, Achievements};
#[cfg(feature = "emitter")]
pub use client::SCORE_SAVED;
pub use client::HighScoreClient;
pub use config::{ConfigError, LeaderboardConfig, RecalcConfig};
pub use document::{Acl, Credential, Document, MasterKey, Stored};
pub use error::{ClientError, StoreError};
pub use leaderboard::Leaderboard;
pub use player::{Enrollment, PlayClock, PlayerDetailsHook, PlayerProfile, Players};
pub use ranking::{
    plan_corrections, standing, PassReport, RankCorrection, RankRecalculator, RankWriteFailure,
    RecalcError,
};
pub use score::ScoreRecord;
pub use store::{CommitHook, CommitKind, CommitNotice, DocumentStore, InMemoryDocumentStore, Query};
pub use trigger::{Enqueued, RecalcJob, RecalcQueue, RecalcStats, RecalculatorThread};
pub use writer::{ScoreDetailsHook, ScoreWriter};

// Derive macro for `Document`; shares the trait's name like serde's derives.
pub use highscore_macros::Document;
