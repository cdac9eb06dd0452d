use utoipa_axum::{router::OpenApiRouter, routes};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/competitions", competition_routes())
        .nest("/participants", participant_routes())
        .nest("/submissions", submission_routes())
}

fn competition_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::competition::list_competitions,
            handlers::competition::create_competition
        ))
        .routes(routes!(handlers::competition::get_competition))
        .routes(routes!(
            handlers::submission::list_competition_submissions,
            handlers::submission::create_submission
        ))
        .routes(routes!(handlers::leaderboard::get_leaderboard))
        .routes(routes!(handlers::leaderboard::repair_leaderboard))
}

fn participant_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::participant::list_participants,
            handlers::participant::create_participant
        ))
        .routes(routes!(handlers::participant::get_participant))
}

fn submission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::submission::get_submission))
        .routes(routes!(handlers::evaluation::evaluate_submission))
        .routes(routes!(handlers::evaluation::reject_submission))
}
