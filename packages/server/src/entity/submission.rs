use common::EvaluationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One uploaded artifact for a competition, evaluated at most once.
///
/// `status`, `score`, `evaluator_id`, `feedback` and `evaluated_at` are
/// written together by a single guarded transition out of `Pending`:
/// `Evaluated` rows carry a score and an evaluator, `Rejected` rows carry
/// neither.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub competition_id: Uuid,
    #[sea_orm(belongs_to, from = "competition_id", to = "id")]
    pub competition: HasOne<super::competition::Entity>,

    pub participant_id: Uuid,
    #[sea_orm(belongs_to, from = "participant_id", to = "id")]
    pub participant: HasOne<super::participant::Entity>,

    /// Opaque object-storage reference to the uploaded artifact. The engine
    /// never reads artifact bytes; the reference is resolved to a URL by the
    /// artifact collaborator when a submission is displayed.
    pub artifact_reference: String,
    /// Artifact size in bytes, as reported by the upload flow.
    pub file_size: i64,

    pub status: EvaluationStatus,
    pub score: Option<f64>,
    pub evaluator_id: Option<Uuid>,
    pub feedback: Option<String>,

    pub submitted_at: DateTimeUtc,
    pub evaluated_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
