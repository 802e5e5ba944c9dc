//! ScoreRecord - one per player, holding the score and its derived rank.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Document;

/// A player's high score.
///
/// `rank` is derived state: the recalculator is its only writer. Clients set
/// `score` (and, through the writer, `last_score`); everything else about
/// ordering follows from the stored scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[document(collection = "high_scores")]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    #[serde(default)]
    pub id: String,
    /// User id of the owning player.
    pub owner: String,
    #[serde(default)]
    pub username: String,
    /// Higher is better. Missing or non-numeric values decode as NaN and rank last.
    #[serde(default = "missing_score", deserialize_with = "lenient_number")]
    pub score: f64,
    #[serde(default = "missing_score", deserialize_with = "lenient_number")]
    pub last_score: f64,
    /// 1-based position under descending score order, 0 until first ranked.
    #[serde(default)]
    pub rank: u64,
    /// Game-specific payload, not interpreted here.
    #[serde(default = "empty_details")]
    pub score_details: Value,
}

impl ScoreRecord {
    /// A fresh, unranked record with a zero score.
    pub fn new(owner: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            owner: owner.into(),
            username: username.into(),
            score: 0.0,
            last_score: 0.0,
            rank: 0,
            score_details: empty_details(),
        }
    }

    /// Whether this record takes part in score ordering, as opposed to
    /// sorting after every finite score.
    pub fn has_finite_score(&self) -> bool {
        self.score.is_finite()
    }

    /// Replace the score, remembering the previous value in `last_score`.
    pub fn record_score(&mut self, score: f64) {
        self.last_score = self.score;
        self.score = score;
    }

    /// Add `delta` to the score. A non-finite current score counts as zero.
    pub fn add_to_score(&mut self, delta: f64) {
        let base = if self.score.is_finite() { self.score } else { 0.0 };
        self.record_score(base + delta);
    }
}

fn missing_score() -> f64 {
    f64::NAN
}

fn empty_details() -> Value {
    Value::Object(Default::default())
}

/// Accept any JSON value for a number field: numbers decode as-is,
/// anything else (null, strings, objects) decodes as NaN.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or(f64::NAN))
}
