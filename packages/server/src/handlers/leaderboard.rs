use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::evaluation::EvaluationService;
use crate::handlers::competition::find_competition;
use crate::models::leaderboard::*;
use crate::state::AppState;

fn evaluation_service(state: &AppState) -> EvaluationService<'_> {
    EvaluationService::new(
        &state.db,
        state.events.as_ref(),
        state.config.evaluation.max_tracker_retries,
    )
}

#[utoipa::path(
    get,
    path = "/{id}/leaderboard",
    tag = "Leaderboard",
    operation_id = "getLeaderboard",
    summary = "Get a competition's leaderboard",
    description = "Returns every participant's best result in rank order. Ranks are strict: exact score ties are ordered by earliest evaluation time, so repeated reads of the same state produce the same order.",
    params(("id" = Uuid, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Leaderboard in rank order", body = LeaderboardResponse),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(competition_id = %id))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let competition = find_competition(&state.db, id).await?;

    let ranked = evaluation_service(&state).leaderboard(&competition).await?;

    let participant_ids: Vec<Uuid> = ranked.iter().map(|e| e.participant_id).collect();
    let names = state.profiles.display_names(&participant_ids).await?;

    let entries = ranked
        .into_iter()
        .map(|e| LeaderboardEntryResponse {
            rank: e.rank,
            participant_id: e.participant_id,
            display_name: names
                .get(&e.participant_id)
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            best_score: e.best_score,
            submission_count: e.submission_count,
            best_submission_id: e.best_submission_id,
            best_evaluated_at: e.best_evaluated_at,
        })
        .collect();

    Ok(Json(LeaderboardResponse {
        competition_id: competition.id,
        metric_direction: competition.metric_direction,
        entries,
        generated_at: Utc::now(),
    }))
}

#[utoipa::path(
    post,
    path = "/{id}/repair",
    tag = "Leaderboard",
    operation_id = "repairLeaderboard",
    summary = "Recompute best results from submissions",
    description = "Rebuilds every best result in the competition from its evaluated submissions and reports how many rows had diverged. Safe to run at any time; a clean competition reports zero repairs.",
    params(("id" = Uuid, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Repair sweep finished", body = RepairReportResponse),
        (status = 404, description = "Competition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(competition_id = %id))]
pub async fn repair_leaderboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RepairReportResponse>, AppError> {
    let competition = find_competition(&state.db, id).await?;

    let report = evaluation_service(&state)
        .repair_competition(&competition)
        .await?;

    Ok(Json(RepairReportResponse::from(report)))
}
