use sea_orm::*;
use sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::entity::submission;

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Composite index for best-result recomputation and evaluated counts:
    // SELECT .. FROM submission WHERE competition_id = ? AND participant_id = ? AND status = ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_submission_pair_status")
        .table(submission::Entity)
        .col(submission::Column::CompetitionId)
        .col(submission::Column::ParticipantId)
        .col(submission::Column::Status)
        .to_string(PostgresQueryBuilder);

    let result = db.execute_unprepared(&stmt).await;

    match result {
        Ok(_) => {
            info!("Ensured index idx_submission_pair_status exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_submission_pair_status: {}", e);
        }
    }

    // Composite index for submission listings:
    // newest-first pages within one competition
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_submission_competition_submitted")
        .table(submission::Entity)
        .col(submission::Column::CompetitionId)
        .col(submission::Column::SubmittedAt)
        .to_string(PostgresQueryBuilder);

    let result = db.execute_unprepared(&stmt).await;
    match result {
        Ok(_) => {
            info!("Ensured index idx_submission_competition_submitted exists");
        }
        Err(e) => {
            tracing::warn!(
                "Failed to create index idx_submission_competition_submitted: {}",
                e
            );
        }
    }

    Ok(())
}
