use chrono::{DateTime, Utc};
use common::EvaluationStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::submission;
use crate::error::AppError;

use super::shared::Pagination;

/// Request body for recording an uploaded submission.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubmissionRequest {
    pub participant_id: Uuid,
    /// Opaque storage reference for the uploaded artifact
    /// (e.g., an object key). The engine never reads artifact contents.
    #[schema(example = "2026/03/submission-7f3a.zip")]
    pub artifact_reference: String,
    /// Declared artifact size in bytes.
    #[schema(example = 1048576)]
    pub file_size: i64,
}

/// Query parameters for submission listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SubmissionListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
    /// Only submissions by this participant.
    pub participant_id: Option<Uuid>,
    /// Only submissions in this status.
    pub status: Option<EvaluationStatus>,
}

/// Full submission details.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub participant_id: Uuid,
    #[schema(example = "2026/03/submission-7f3a.zip")]
    pub artifact_reference: String,
    /// Resolved download URL for the artifact.
    #[schema(example = "http://localhost:9000/artifacts/2026/03/submission-7f3a.zip")]
    pub artifact_url: String,
    #[schema(example = 1048576)]
    pub file_size: i64,
    pub status: EvaluationStatus,
    /// Assigned score if evaluated, null otherwise.
    #[schema(example = 0.85)]
    pub score: Option<f64>,
    /// Reviewer who evaluated, null while pending or when rejected.
    pub evaluator_id: Option<Uuid>,
    /// Reviewer feedback, or the rejection reason for rejected submissions.
    pub feedback: Option<String>,
    #[schema(example = "2026-03-01T12:00:00Z")]
    pub submitted_at: DateTime<Utc>,
    /// When the submission left the pending state, null while pending.
    pub evaluated_at: Option<DateTime<Utc>>,
}

/// Paginated list of submissions.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionListResponse {
    pub data: Vec<SubmissionResponse>,
    pub pagination: Pagination,
}

/// Validate a submission creation request.
pub fn validate_create_submission(
    req: &CreateSubmissionRequest,
    max_file_size: i64,
) -> Result<(), AppError> {
    let reference = req.artifact_reference.trim();
    if reference.is_empty() || reference.chars().count() > 1024 {
        return Err(AppError::Validation(
            "Artifact reference must be 1-1024 characters".into(),
        ));
    }

    if req.file_size <= 0 {
        return Err(AppError::Validation("File size must be positive".into()));
    }
    if req.file_size > max_file_size {
        return Err(AppError::Validation(format!(
            "File size ({} bytes) exceeds maximum ({} bytes)",
            req.file_size, max_file_size
        )));
    }

    Ok(())
}

impl SubmissionResponse {
    /// Build a response from a stored row plus its resolved artifact URL.
    pub fn from_parts(m: submission::Model, artifact_url: String) -> Self {
        Self {
            id: m.id,
            competition_id: m.competition_id,
            participant_id: m.participant_id,
            artifact_reference: m.artifact_reference,
            artifact_url,
            file_size: m.file_size,
            status: m.status,
            score: m.score,
            evaluator_id: m.evaluator_id,
            feedback: m.feedback,
            submitted_at: m.submitted_at,
            evaluated_at: m.evaluated_at,
        }
    }
}
