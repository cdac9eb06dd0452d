use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::participant;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::participant::*;
use crate::models::shared::Pagination;
use crate::state::AppState;

/// Look up a participant or fail with NotFound.
pub async fn find_participant<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<participant::Model, AppError> {
    participant::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Participant {id} not found")))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Participants",
    operation_id = "createParticipant",
    summary = "Register a participant",
    request_body = CreateParticipantRequest,
    responses(
        (status = 201, description = "Participant registered", body = ParticipantResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn create_participant(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateParticipantRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_participant(&payload)?;

    let new_participant = participant::ActiveModel {
        id: Set(Uuid::now_v7()),
        display_name: Set(payload.display_name.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_participant.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(ParticipantResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Participants",
    operation_id = "listParticipants",
    summary = "List participants",
    description = "Returns a paginated list of registered participants, newest first.",
    params(ParticipantListQuery),
    responses(
        (status = 200, description = "List of participants", body = ParticipantListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_participants(
    State(state): State<AppState>,
    Query(query): Query<ParticipantListQuery>,
) -> Result<Json<ParticipantListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let select = participant::Entity::find();
    let total = select.clone().count(&state.db).await?;

    let data = select
        .order_by_desc(participant::Column::CreatedAt)
        .offset((page - 1) * per_page)
        .limit(per_page)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ParticipantResponse::from)
        .collect();

    Ok(Json(ParticipantListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Participants",
    operation_id = "getParticipant",
    summary = "Get a participant by ID",
    params(("id" = Uuid, Path, description = "Participant ID")),
    responses(
        (status = 200, description = "Participant details", body = ParticipantResponse),
        (status = 404, description = "Participant not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(%id))]
pub async fn get_participant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ParticipantResponse>, AppError> {
    let model = find_participant(&state.db, id).await?;
    Ok(Json(model.into()))
}
