use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Materialized best evaluated score per (participant, competition) pair.
///
/// Derived state: always reconstructable from evaluated submissions (see
/// `evaluation::recovery`). Writers must go through the best-result tracker,
/// which serializes concurrent updates for the same pair by compare-and-swap
/// on `version`; no other code writes this table.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "best_result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub competition_id: Uuid,
    #[sea_orm(primary_key)]
    pub participant_id: Uuid,
    #[sea_orm(belongs_to, from = "competition_id", to = "id")]
    pub competition: HasOne<super::competition::Entity>,
    #[sea_orm(belongs_to, from = "participant_id", to = "id")]
    pub participant: HasOne<super::participant::Entity>,

    pub best_submission_id: Uuid,
    pub best_score: f64,
    /// `evaluated_at` of the best submission, denormalized for the
    /// leaderboard tie-break so ranking never joins back to submissions.
    pub best_evaluated_at: DateTimeUtc,

    /// Number of evaluated submissions for this pair.
    pub evaluated_count: i32,

    /// Optimistic-concurrency counter, bumped by every write.
    pub version: i32,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
