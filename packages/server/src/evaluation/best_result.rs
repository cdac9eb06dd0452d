use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use common::{MetricDirection, backoff::backoff_delay};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr,
    sea_query::Expr,
};
use tracing::debug;
use uuid::Uuid;

use crate::entity::best_result;
use crate::error::AppError;

/// Base delay for the compare-and-swap retry backoff.
const RETRY_BASE_MS: u64 = 5;
/// Cap on a single retry delay.
const RETRY_MAX_MS: u64 = 100;

/// What the tracker decided about one newly evaluated score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerOutcome {
    /// Whether this submission became the pair's new best.
    pub is_new_best: bool,
    /// The best score before this evaluation, if the participant had one.
    pub previous_best: Option<f64>,
}

/// Maintains the per-(competition, participant) best result rows.
///
/// Writers race: two evaluations for the same pair may run concurrently, and
/// each must compare against a current best, not a stale one. Every write is
/// a single statement guarded on the `version` column (or on primary-key
/// uniqueness for the first insert); a failed guard means another writer got
/// in between, so the loop re-reads and compares again. Different pairs
/// never share a row and proceed without contention.
pub struct BestResultTracker<'a, C: ConnectionTrait> {
    conn: &'a C,
    max_retries: u32,
}

impl<'a, C: ConnectionTrait> BestResultTracker<'a, C> {
    pub fn new(conn: &'a C, max_retries: u32) -> Self {
        Self { conn, max_retries }
    }

    /// Fold one evaluated submission into the pair's best result.
    ///
    /// A better score (per `direction`) replaces the best; ties on score
    /// fall to the earlier `evaluated_at`, then the smaller submission id,
    /// the same election `recovery::canonical_best` makes when rebuilding a
    /// row. A candidate that loses the election only bumps
    /// `evaluated_count`, so the normal later-arriving equal score keeps
    /// the earlier submission canonical.
    pub async fn consider(
        &self,
        direction: MetricDirection,
        competition_id: Uuid,
        participant_id: Uuid,
        submission_id: Uuid,
        score: f64,
        evaluated_at: DateTime<Utc>,
    ) -> Result<TrackerOutcome, AppError> {
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(attempt, RETRY_BASE_MS, RETRY_MAX_MS)).await;
            }

            let current = best_result::Entity::find_by_id((competition_id, participant_id))
                .one(self.conn)
                .await?;

            let Some(current) = current else {
                let model = best_result::ActiveModel {
                    competition_id: Set(competition_id),
                    participant_id: Set(participant_id),
                    best_submission_id: Set(submission_id),
                    best_score: Set(score),
                    best_evaluated_at: Set(evaluated_at),
                    evaluated_count: Set(1),
                    version: Set(1),
                    updated_at: Set(Utc::now()),
                    ..Default::default()
                };

                match model.insert(self.conn).await {
                    Ok(_) => {
                        return Ok(TrackerOutcome {
                            is_new_best: true,
                            previous_best: None,
                        });
                    }
                    // Another evaluation created the row first; re-read and
                    // compare against what it wrote.
                    Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                        debug!(
                            %competition_id,
                            %participant_id,
                            attempt,
                            "Lost first-insert race for best result, retrying"
                        );
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            // Same total order as recovery::canonical_best; the live path
            // and repair must elect the same submission.
            let is_new_best = direction
                .rank_ordering(score, current.best_score)
                .then_with(|| evaluated_at.cmp(&current.best_evaluated_at))
                .then_with(|| submission_id.cmp(&current.best_submission_id))
                == Ordering::Less;

            let mut update = best_result::Entity::update_many()
                .col_expr(
                    best_result::Column::EvaluatedCount,
                    Expr::value(current.evaluated_count + 1),
                )
                .col_expr(
                    best_result::Column::Version,
                    Expr::value(current.version + 1),
                )
                .col_expr(best_result::Column::UpdatedAt, Expr::value(Utc::now()));

            if is_new_best {
                update = update
                    .col_expr(
                        best_result::Column::BestSubmissionId,
                        Expr::value(submission_id),
                    )
                    .col_expr(best_result::Column::BestScore, Expr::value(score))
                    .col_expr(
                        best_result::Column::BestEvaluatedAt,
                        Expr::value(evaluated_at),
                    );
            }

            let update_result = update
                .filter(best_result::Column::CompetitionId.eq(competition_id))
                .filter(best_result::Column::ParticipantId.eq(participant_id))
                .filter(best_result::Column::Version.eq(current.version))
                .exec(self.conn)
                .await?;

            if update_result.rows_affected > 0 {
                return Ok(TrackerOutcome {
                    is_new_best,
                    previous_best: Some(current.best_score),
                });
            }

            debug!(
                %competition_id,
                %participant_id,
                attempt,
                read_version = current.version,
                "Best result version moved under us, retrying"
            );
        }

        Err(AppError::ConcurrencyConflict(format!(
            "Best result for participant {participant_id} in competition {competition_id} \
             kept changing; gave up after {} attempts",
            self.max_retries + 1
        )))
    }
}
