//! Leaderboard ordering over per-participant best results.
//!
//! Ranking is a pure computation: callers load the best-result rows for one
//! competition and hand them in. Ordering is total, so ranks are strict
//! 1-based positions with no shared ranks even on exact score ties. Ties are
//! broken by earliest `best_evaluated_at` (whoever reached the score first
//! stays ahead), then by participant id so two rows never compare equal.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use common::MetricDirection;
use uuid::Uuid;

use crate::entity::best_result;

/// One participant's best result, as fed into the leaderboard sort.
#[derive(Debug, Clone, PartialEq)]
pub struct BestRow {
    pub participant_id: Uuid,
    pub best_submission_id: Uuid,
    pub best_score: f64,
    pub best_evaluated_at: DateTime<Utc>,
    pub evaluated_count: i32,
}

impl From<best_result::Model> for BestRow {
    fn from(model: best_result::Model) -> Self {
        Self {
            participant_id: model.participant_id,
            best_submission_id: model.best_submission_id,
            best_score: model.best_score,
            best_evaluated_at: model.best_evaluated_at,
            evaluated_count: model.evaluated_count,
        }
    }
}

/// A leaderboard row with its computed 1-based rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub rank: u32,
    pub participant_id: Uuid,
    pub best_submission_id: Uuid,
    pub best_score: f64,
    pub best_evaluated_at: DateTime<Utc>,
    pub submission_count: i32,
}

/// Total order over best rows: better score first, then earliest
/// `best_evaluated_at`, then participant id.
///
/// Both [`rank_entries`] and [`position_of`] go through this single
/// comparator, so an incremental position always agrees with a full sort.
fn leaderboard_cmp(direction: MetricDirection, a: &BestRow, b: &BestRow) -> Ordering {
    direction
        .rank_ordering(a.best_score, b.best_score)
        .then_with(|| a.best_evaluated_at.cmp(&b.best_evaluated_at))
        .then_with(|| a.participant_id.cmp(&b.participant_id))
}

/// Sort best rows into leaderboard order and assign strict 1-based ranks.
pub fn rank_entries(direction: MetricDirection, mut rows: Vec<BestRow>) -> Vec<RankedEntry> {
    rows.sort_by(|a, b| leaderboard_cmp(direction, a, b));

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| RankedEntry {
            rank: (i + 1) as u32,
            participant_id: row.participant_id,
            best_submission_id: row.best_submission_id,
            best_score: row.best_score,
            best_evaluated_at: row.best_evaluated_at,
            submission_count: row.evaluated_count,
        })
        .collect()
}

/// Compute one participant's rank without sorting the whole board.
///
/// Counts rows that order strictly ahead of the participant's row; a single
/// pass instead of an O(n log n) sort. Returns `None` if the participant has
/// no best result in `rows`.
pub fn position_of(
    direction: MetricDirection,
    rows: &[BestRow],
    participant_id: Uuid,
) -> Option<u32> {
    let mine = rows.iter().find(|r| r.participant_id == participant_id)?;

    let ahead = rows
        .iter()
        .filter(|other| leaderboard_cmp(direction, other, mine) == Ordering::Less)
        .count();

    Some(ahead as u32 + 1)
}
