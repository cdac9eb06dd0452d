use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

use super::shared::validate_text_length;
use super::submission::SubmissionResponse;

/// Request body for evaluating a pending submission.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct EvaluateSubmissionRequest {
    /// Raw score; must be finite and inside the competition's metric range.
    #[schema(example = 0.85)]
    pub score: f64,
    /// Reviewer performing the evaluation.
    pub evaluator_id: Uuid,
    /// Optional feedback shown to the participant.
    #[schema(example = "Strong baseline, weak on the holdout set")]
    pub feedback: Option<String>,
}

/// Request body for rejecting a pending submission.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RejectSubmissionRequest {
    /// Reviewer performing the rejection.
    pub evaluator_id: Uuid,
    /// Why the submission was rejected. Required.
    #[schema(example = "Archive is corrupted and cannot be opened")]
    pub reason: String,
}

/// Outcome of a successful evaluation.
#[derive(Serialize, utoipa::ToSchema)]
pub struct EvaluationResponse {
    pub submission: SubmissionResponse,
    /// The validated score that was recorded.
    #[schema(example = 0.85)]
    pub score: f64,
    /// The participant's 1-based rank after this evaluation.
    #[schema(example = 3)]
    pub rank: u32,
    /// Whether this submission became the participant's new best.
    pub is_new_best: bool,
    /// The participant's best score before this evaluation, null on their
    /// first evaluated submission.
    #[schema(example = 0.80)]
    pub previous_best: Option<f64>,
}

/// Validate an evaluation request's shape.
///
/// Range checking of the score itself is the scorer's job; only the
/// free-text field is bounded here.
pub fn validate_evaluate_submission(req: &EvaluateSubmissionRequest) -> Result<(), AppError> {
    if let Some(ref feedback) = req.feedback {
        validate_text_length(feedback, "Feedback", 4096)?;
    }
    Ok(())
}

/// Validate a rejection request.
pub fn validate_reject_submission(req: &RejectSubmissionRequest) -> Result<(), AppError> {
    let reason = req.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("Rejection reason is required".into()));
    }
    validate_text_length(reason, "Rejection reason", 4096)?;
    Ok(())
}
