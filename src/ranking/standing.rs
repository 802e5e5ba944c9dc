//! Total order of score records on the leaderboard.

use std::cmp::Ordering;

use crate::document::Stored;
use crate::score::ScoreRecord;

/// Compare two records by standing: the record that ranks higher is `Less`.
///
/// Finite scores come first, highest first. Non-finite scores (NaN, the
/// infinities, missing values) all come after every finite score and tie
/// with each other. Ties are broken by creation order, then by id, so no
/// two distinct records in one store ever compare equal.
pub fn compare(a: &Stored<ScoreRecord>, b: &Stored<ScoreRecord>) -> Ordering {
    compare_scores(a.data.score, b.data.score)
        .then_with(|| a.created.cmp(&b.created))
        .then_with(|| a.data.id.cmp(&b.data.id))
}

fn compare_scores(a: f64, b: f64) -> Ordering {
    match (a.is_finite(), b.is_finite()) {
        // + 0.0 folds -0.0 into 0.0 so they tie
        (true, true) => (b + 0.0).total_cmp(&(a + 0.0)),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}
