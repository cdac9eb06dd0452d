use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::evaluation::EvaluationService;
use crate::extractors::json::AppJson;
use crate::models::evaluation::*;
use crate::models::submission::SubmissionResponse;
use crate::state::AppState;

fn evaluation_service(state: &AppState) -> EvaluationService<'_> {
    EvaluationService::new(
        &state.db,
        state.events.as_ref(),
        state.config.evaluation.max_tracker_retries,
    )
}

#[utoipa::path(
    post,
    path = "/{id}/evaluate",
    tag = "Evaluation",
    operation_id = "evaluateSubmission",
    summary = "Evaluate a pending submission",
    description = "Assigns a score to a pending submission, updates the participant's best result and returns their rank. Each submission can be evaluated exactly once; a second call fails with INVALID_TRANSITION.",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = EvaluateSubmissionRequest,
    responses(
        (status = 200, description = "Submission evaluated", body = EvaluationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already terminal or lost concurrency race (INVALID_TRANSITION, CONCURRENCY_CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(submission_id = %id, evaluator_id = %payload.evaluator_id))]
pub async fn evaluate_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<EvaluateSubmissionRequest>,
) -> Result<Json<EvaluationResponse>, AppError> {
    validate_evaluate_submission(&payload)?;

    let outcome = evaluation_service(&state)
        .evaluate(id, payload.score, payload.evaluator_id, payload.feedback)
        .await?;

    let artifact_url = state
        .artifacts
        .download_url(&outcome.submission.artifact_reference);

    Ok(Json(EvaluationResponse {
        submission: SubmissionResponse::from_parts(outcome.submission, artifact_url),
        score: outcome.score,
        rank: outcome.rank,
        is_new_best: outcome.is_new_best,
        previous_best: outcome.previous_best,
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/reject",
    tag = "Evaluation",
    operation_id = "rejectSubmission",
    summary = "Reject a pending submission",
    description = "Closes a pending submission without a score. Rejection never touches best results or the leaderboard.",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = RejectSubmissionRequest,
    responses(
        (status = 200, description = "Submission rejected", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Submission already terminal (INVALID_TRANSITION)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(submission_id = %id, evaluator_id = %payload.evaluator_id))]
pub async fn reject_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<RejectSubmissionRequest>,
) -> Result<Json<SubmissionResponse>, AppError> {
    validate_reject_submission(&payload)?;

    let model = evaluation_service(&state)
        .reject(id, payload.evaluator_id, payload.reason.trim().to_string())
        .await?;

    let artifact_url = state.artifacts.download_url(&model.artifact_reference);
    Ok(Json(SubmissionResponse::from_parts(model, artifact_url)))
}
