//! Rebuilds best-result rows from the submission table.
//!
//! Submissions are the source of truth; best results are derived. If the
//! process dies between a submission commit and its best-result update, or a
//! row is damaged by hand, recomputing from evaluated submissions restores
//! the invariant. Writes use the same version guard as the live tracker, so
//! repair can run next to ongoing evaluations without clobbering a newer
//! best with a stale read.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::{MetricDirection, backoff::backoff_delay};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set, SqlErr, sea_query::Expr,
};
use tracing::info;
use uuid::Uuid;

use crate::entity::{best_result, submission};
use crate::error::AppError;
use crate::evaluation::store::SubmissionStore;

const RETRY_BASE_MS: u64 = 5;
const RETRY_MAX_MS: u64 = 100;

/// Result of recomputing one (competition, participant) pair.
#[derive(Debug, Clone)]
pub struct PairRepair {
    /// Whether the stored row had to be corrected.
    pub repaired: bool,
    /// The authoritative best result after the check, if the pair has any
    /// evaluated submissions.
    pub best: Option<best_result::Model>,
}

/// Summary of a competition-wide repair sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairReport {
    pub pairs_checked: u32,
    pub pairs_repaired: u32,
}

/// The best result a pair's evaluated submissions imply.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CanonicalBest {
    pub submission_id: Uuid,
    pub score: f64,
    pub evaluated_at: DateTime<Utc>,
}

/// Pick the canonical best among evaluated submissions: better score first,
/// then earliest evaluation, then submission id. Rows missing a score or
/// timestamp cannot be ranked and are skipped.
pub(crate) fn canonical_best(
    direction: MetricDirection,
    evaluated: &[submission::Model],
) -> Option<CanonicalBest> {
    let mut best: Option<CanonicalBest> = None;

    for row in evaluated {
        let (Some(score), Some(evaluated_at)) = (row.score, row.evaluated_at) else {
            continue;
        };
        let candidate = CanonicalBest {
            submission_id: row.id,
            score,
            evaluated_at,
        };

        best = Some(match best {
            None => candidate,
            Some(current) => {
                let ord = direction
                    .rank_ordering(candidate.score, current.score)
                    .then_with(|| candidate.evaluated_at.cmp(&current.evaluated_at))
                    .then_with(|| candidate.submission_id.cmp(&current.submission_id));
                if ord == Ordering::Less {
                    candidate
                } else {
                    current
                }
            }
        });
    }

    best
}

fn row_matches(row: &best_result::Model, want: &CanonicalBest, evaluated_count: i32) -> bool {
    row.best_submission_id == want.submission_id
        && row.best_score == want.score
        && row.best_evaluated_at == want.evaluated_at
        && row.evaluated_count == evaluated_count
}

pub struct RecoveryService<'a, C: ConnectionTrait> {
    conn: &'a C,
    max_retries: u32,
}

impl<'a, C: ConnectionTrait> RecoveryService<'a, C> {
    pub fn new(conn: &'a C, max_retries: u32) -> Self {
        Self { conn, max_retries }
    }

    /// Recompute one pair's best result from its evaluated submissions.
    ///
    /// Reads the stored row first and guards every write on the version seen
    /// in that read; a lost race re-reads both sides and tries again.
    pub async fn recompute_pair(
        &self,
        direction: MetricDirection,
        competition_id: Uuid,
        participant_id: Uuid,
    ) -> Result<PairRepair, AppError> {
        let store = SubmissionStore::new(self.conn);

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(attempt, RETRY_BASE_MS, RETRY_MAX_MS)).await;
            }

            let current = best_result::Entity::find_by_id((competition_id, participant_id))
                .one(self.conn)
                .await?;
            let evaluated = store
                .evaluated_for_pair(competition_id, participant_id)
                .await?;
            let expected = canonical_best(direction, &evaluated);
            let evaluated_count = evaluated.len() as i32;

            match (expected, current) {
                (None, None) => {
                    return Ok(PairRepair {
                        repaired: false,
                        best: None,
                    });
                }
                (None, Some(row)) => {
                    // Row with no evaluated submissions behind it.
                    let delete_result = best_result::Entity::delete_many()
                        .filter(best_result::Column::CompetitionId.eq(competition_id))
                        .filter(best_result::Column::ParticipantId.eq(participant_id))
                        .filter(best_result::Column::Version.eq(row.version))
                        .exec(self.conn)
                        .await?;

                    if delete_result.rows_affected > 0 {
                        info!(
                            %competition_id,
                            %participant_id,
                            "Removed best result with no evaluated submissions"
                        );
                        return Ok(PairRepair {
                            repaired: true,
                            best: None,
                        });
                    }
                }
                (Some(want), None) => {
                    let model = best_result::ActiveModel {
                        competition_id: Set(competition_id),
                        participant_id: Set(participant_id),
                        best_submission_id: Set(want.submission_id),
                        best_score: Set(want.score),
                        best_evaluated_at: Set(want.evaluated_at),
                        evaluated_count: Set(evaluated_count),
                        version: Set(1),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    };

                    match model.insert(self.conn).await {
                        Ok(inserted) => {
                            info!(
                                %competition_id,
                                %participant_id,
                                best_score = want.score,
                                "Rebuilt missing best result"
                            );
                            return Ok(PairRepair {
                                repaired: true,
                                best: Some(inserted),
                            });
                        }
                        Err(e)
                            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                (Some(want), Some(row)) => {
                    if row_matches(&row, &want, evaluated_count) {
                        return Ok(PairRepair {
                            repaired: false,
                            best: Some(row),
                        });
                    }

                    let update_result = best_result::Entity::update_many()
                        .col_expr(
                            best_result::Column::BestSubmissionId,
                            Expr::value(want.submission_id),
                        )
                        .col_expr(best_result::Column::BestScore, Expr::value(want.score))
                        .col_expr(
                            best_result::Column::BestEvaluatedAt,
                            Expr::value(want.evaluated_at),
                        )
                        .col_expr(
                            best_result::Column::EvaluatedCount,
                            Expr::value(evaluated_count),
                        )
                        .col_expr(best_result::Column::Version, Expr::value(row.version + 1))
                        .col_expr(best_result::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(best_result::Column::CompetitionId.eq(competition_id))
                        .filter(best_result::Column::ParticipantId.eq(participant_id))
                        .filter(best_result::Column::Version.eq(row.version))
                        .exec(self.conn)
                        .await?;

                    if update_result.rows_affected > 0 {
                        let repaired = best_result::Entity::find_by_id((
                            competition_id,
                            participant_id,
                        ))
                        .one(self.conn)
                        .await?
                        .ok_or_else(|| {
                            DbErr::Custom("Best result disappeared after repair".to_string())
                        })?;

                        info!(
                            %competition_id,
                            %participant_id,
                            best_score = want.score,
                            "Corrected diverged best result"
                        );
                        return Ok(PairRepair {
                            repaired: true,
                            best: Some(repaired),
                        });
                    }
                }
            }
        }

        Err(AppError::ConcurrencyConflict(format!(
            "Repair of best result for participant {participant_id} in competition \
             {competition_id} kept losing races; gave up after {} attempts",
            self.max_retries + 1
        )))
    }

    /// Sweep every pair in a competition and repair what diverged.
    ///
    /// Covers both directions of drift: pairs with evaluated submissions but
    /// a missing or wrong row, and rows whose pair has no evaluated
    /// submissions at all.
    pub async fn recompute_competition(
        &self,
        direction: MetricDirection,
        competition_id: Uuid,
    ) -> Result<RepairReport, AppError> {
        let store = SubmissionStore::new(self.conn);

        let mut participants: BTreeSet<Uuid> = store
            .evaluated_participant_ids(competition_id)
            .await?
            .into_iter()
            .collect();

        let tracked: Vec<Uuid> = best_result::Entity::find()
            .select_only()
            .column(best_result::Column::ParticipantId)
            .filter(best_result::Column::CompetitionId.eq(competition_id))
            .into_tuple()
            .all(self.conn)
            .await?;
        participants.extend(tracked);

        let mut report = RepairReport {
            pairs_checked: 0,
            pairs_repaired: 0,
        };

        for participant_id in participants {
            let outcome = self
                .recompute_pair(direction, competition_id, participant_id)
                .await?;
            report.pairs_checked += 1;
            if outcome.repaired {
                report.pairs_repaired += 1;
            }
        }

        if report.pairs_repaired > 0 {
            info!(
                %competition_id,
                checked = report.pairs_checked,
                repaired = report.pairs_repaired,
                "Repaired diverged best results"
            );
        }

        Ok(report)
    }
}
