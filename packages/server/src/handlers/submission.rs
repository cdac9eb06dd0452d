use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::evaluation::store::submission_store;
use crate::extractors::json::AppJson;
use crate::handlers::competition::find_competition;
use crate::handlers::participant::find_participant;
use crate::models::shared::Pagination;
use crate::models::submission::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/submissions",
    tag = "Submissions",
    operation_id = "createSubmission",
    summary = "Record an uploaded submission",
    description = "Registers an uploaded artifact as a pending submission for a competition. The artifact itself lives in external storage; only its reference is recorded here.",
    params(("id" = Uuid, Path, description = "Competition ID")),
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission recorded", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Competition or participant not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(competition_id = %id, participant_id = %payload.participant_id))]
pub async fn create_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_submission(&payload, state.config.artifacts.max_file_size)?;

    find_competition(&state.db, id).await?;
    find_participant(&state.db, payload.participant_id).await?;

    let store = submission_store(&state.db);
    let model = store
        .create(
            id,
            payload.participant_id,
            payload.artifact_reference.trim().to_string(),
            payload.file_size,
        )
        .await?;

    let artifact_url = state.artifacts.download_url(&model.artifact_reference);
    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::from_parts(model, artifact_url)),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/submissions",
    tag = "Submissions",
    operation_id = "listCompetitionSubmissions",
    summary = "List a competition's submissions",
    description = "Returns a paginated list of a competition's submissions, newest first, optionally filtered by participant or status.",
    params(
        ("id" = Uuid, Path, description = "Competition ID"),
        SubmissionListQuery,
    ),
    responses(
        (status = 200, description = "List of submissions", body = SubmissionListResponse),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(competition_id = %id))]
pub async fn list_competition_submissions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    find_competition(&state.db, id).await?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let store = submission_store(&state.db);
    let (submissions, total) = store
        .list_for_competition(id, query.participant_id, query.status, page, per_page)
        .await?;

    let data = submissions
        .into_iter()
        .map(|m| {
            let artifact_url = state.artifacts.download_url(&m.artifact_reference);
            SubmissionResponse::from_parts(m, artifact_url)
        })
        .collect();

    Ok(Json(SubmissionListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get a submission by ID",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission details", body = SubmissionResponse),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(%id))]
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let store = submission_store(&state.db);
    let model = store
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Submission {id} not found")))?;

    let artifact_url = state.artifacts.download_url(&model.artifact_reference);
    Ok(Json(SubmissionResponse::from_parts(model, artifact_url)))
}
