use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::competition;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::competition::*;
use crate::models::shared::Pagination;
use crate::state::AppState;

/// Look up a competition or fail with NotFound.
pub async fn find_competition<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<competition::Model, AppError> {
    competition::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Competition {id} not found")))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Competitions",
    operation_id = "createCompetition",
    summary = "Create a new competition",
    description = "Creates a competition with a metric direction and an inclusive score range. Scores submitted to the competition must fall inside that range.",
    request_body = CreateCompetitionRequest,
    responses(
        (status = 201, description = "Competition created", body = CompetitionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(title = %payload.title))]
pub async fn create_competition(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCompetitionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_competition(&payload)?;

    let new_competition = competition::ActiveModel {
        id: Set(Uuid::now_v7()),
        title: Set(payload.title.trim().to_string()),
        metric_direction: Set(payload.metric_direction),
        score_min: Set(payload.score_min.unwrap_or(0.0)),
        score_max: Set(payload.score_max.unwrap_or(1.0)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_competition.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(CompetitionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Competitions",
    operation_id = "listCompetitions",
    summary = "List competitions",
    description = "Returns a paginated list of competitions, newest first.",
    params(CompetitionListQuery),
    responses(
        (status = 200, description = "List of competitions", body = CompetitionListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_competitions(
    State(state): State<AppState>,
    Query(query): Query<CompetitionListQuery>,
) -> Result<Json<CompetitionListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let select = competition::Entity::find();
    let total = select.clone().count(&state.db).await?;

    let data = select
        .order_by_desc(competition::Column::CreatedAt)
        .offset((page - 1) * per_page)
        .limit(per_page)
        .all(&state.db)
        .await?
        .into_iter()
        .map(CompetitionResponse::from)
        .collect();

    Ok(Json(CompetitionListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Competitions",
    operation_id = "getCompetition",
    summary = "Get a competition by ID",
    params(("id" = Uuid, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Competition details", body = CompetitionResponse),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(%id))]
pub async fn get_competition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompetitionResponse>, AppError> {
    let model = find_competition(&state.db, id).await?;
    Ok(Json(model.into()))
}
