use chrono::{DateTime, Utc};
use common::MetricDirection;
use serde::Serialize;
use uuid::Uuid;

use crate::evaluation::RepairReport;

/// One row of a competition leaderboard.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardEntryResponse {
    /// Strict 1-based rank; ties never share a number.
    #[schema(example = 1)]
    pub rank: u32,
    pub participant_id: Uuid,
    #[schema(example = "Ada L.")]
    pub display_name: String,
    #[schema(example = 0.91)]
    pub best_score: f64,
    /// Number of this participant's evaluated submissions.
    #[schema(example = 4)]
    pub submission_count: i32,
    pub best_submission_id: Uuid,
    /// When the best submission was evaluated; the tie-break key.
    #[schema(example = "2026-03-01T12:00:00Z")]
    pub best_evaluated_at: DateTime<Utc>,
}

/// A competition leaderboard.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardResponse {
    pub competition_id: Uuid,
    pub metric_direction: MetricDirection,
    pub entries: Vec<LeaderboardEntryResponse>,
    #[schema(example = "2026-03-01T12:00:00Z")]
    pub generated_at: DateTime<Utc>,
}

/// Outcome of a competition-wide best-result repair sweep.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RepairReportResponse {
    /// Pairs whose stored best result was checked against submissions.
    #[schema(example = 12)]
    pub pairs_checked: u32,
    /// Pairs whose stored best result had to be corrected.
    #[schema(example = 1)]
    pub pairs_repaired: u32,
}

impl From<RepairReport> for RepairReportResponse {
    fn from(report: RepairReport) -> Self {
        Self {
            pairs_checked: report.pairs_checked,
            pairs_repaired: report.pairs_repaired,
        }
    }
}
