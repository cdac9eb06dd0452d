use chrono::Utc;
use common::MetricDirection;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{info, warn};
use uuid::Uuid;

use crate::collaborators::{EvaluationEvent, EventSink, RejectionEvent};
use crate::entity::{best_result, competition, submission};
use crate::error::AppError;
use crate::evaluation::best_result::{BestResultTracker, TrackerOutcome};
use crate::evaluation::ranking::{self, BestRow, RankedEntry};
use crate::evaluation::recovery::{self, RecoveryService, RepairReport};
use crate::evaluation::store::{SubmissionStore, Transition, TransitionOutcome};

/// Composite result of a successful evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub submission: submission::Model,
    pub score: f64,
    pub rank: u32,
    pub is_new_best: bool,
    pub previous_best: Option<f64>,
}

/// Entry point for reviewer actions.
///
/// Sequences validate, submission transition, best-result update, rank
/// lookup and event publication. Anything failing before the transition
/// leaves no trace; once the transition commits, derived-state trouble is
/// answered with a rebuild from submissions rather than a rollback.
pub struct EvaluationService<'a> {
    db: &'a DatabaseConnection,
    events: &'a dyn EventSink,
    max_tracker_retries: u32,
}

impl<'a> EvaluationService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        events: &'a dyn EventSink,
        max_tracker_retries: u32,
    ) -> Self {
        Self {
            db,
            events,
            max_tracker_retries,
        }
    }

    /// Score a pending submission and fold it into the leaderboard.
    pub async fn evaluate(
        &self,
        submission_id: Uuid,
        raw_score: f64,
        evaluator_id: Uuid,
        feedback: Option<String>,
    ) -> Result<EvaluationOutcome, AppError> {
        let store = SubmissionStore::new(self.db);

        let submission = store
            .get_by_id(submission_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {submission_id} not found")))?;

        let competition = competition::Entity::find_by_id(submission.competition_id)
            .one(self.db)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Competition {} referenced by submission {submission_id} does not exist",
                    submission.competition_id
                ))
            })?;

        // Score validation comes before any write; a bad score leaves the
        // submission pending and the leaderboard untouched.
        let score = competition.metric().validate_score(raw_score)?;
        let direction = competition.metric_direction;

        let updated = match store
            .transition(
                submission_id,
                Transition::Evaluate {
                    score,
                    evaluator_id,
                    feedback,
                },
            )
            .await?
        {
            TransitionOutcome::Applied(updated) => updated,
            TransitionOutcome::NotFound => {
                return Err(AppError::NotFound(format!(
                    "Submission {submission_id} not found"
                )));
            }
            TransitionOutcome::AlreadyTerminal(status) => {
                return Err(AppError::InvalidTransition { status });
            }
        };

        let evaluated_at = updated.evaluated_at.ok_or_else(|| {
            AppError::Internal(format!(
                "Submission {submission_id} carries no evaluation timestamp after transition"
            ))
        })?;

        let tracker = BestResultTracker::new(self.db, self.max_tracker_retries);
        let tracked = match tracker
            .consider(
                direction,
                competition.id,
                updated.participant_id,
                updated.id,
                score,
                evaluated_at,
            )
            .await
        {
            Ok(outcome) => outcome,
            // The submission is already committed as evaluated, so give the
            // derived state one rebuild from source before giving up.
            Err(AppError::ConcurrencyConflict(detail)) => {
                warn!(
                    %submission_id,
                    detail = %detail,
                    "Best-result update exhausted retries, rebuilding pair from submissions"
                );
                self.tracked_via_repair(direction, &competition, &updated)
                    .await?
            }
            Err(e) => return Err(e),
        };

        let rank = self
            .rank_of(direction, competition.id, updated.participant_id)
            .await?;

        let event = EvaluationEvent {
            submission_id: updated.id,
            competition_id: competition.id,
            participant_id: updated.participant_id,
            evaluator_id,
            score,
            rank,
            is_new_best: tracked.is_new_best,
            evaluated_at,
        };
        if let Err(e) = self.events.submission_evaluated(&event).await {
            warn!(%submission_id, error = %e, "Failed to publish evaluation event");
        }

        info!(
            %submission_id,
            score,
            rank,
            is_new_best = tracked.is_new_best,
            "Evaluated submission"
        );

        Ok(EvaluationOutcome {
            submission: updated,
            score,
            rank,
            is_new_best: tracked.is_new_best,
            previous_best: tracked.previous_best,
        })
    }

    /// Close a pending submission without scoring it.
    ///
    /// Never touches best results or the leaderboard.
    pub async fn reject(
        &self,
        submission_id: Uuid,
        evaluator_id: Uuid,
        reason: String,
    ) -> Result<submission::Model, AppError> {
        let store = SubmissionStore::new(self.db);

        let updated = match store
            .transition(
                submission_id,
                Transition::Reject {
                    reason: reason.clone(),
                },
            )
            .await?
        {
            TransitionOutcome::Applied(updated) => updated,
            TransitionOutcome::NotFound => {
                return Err(AppError::NotFound(format!(
                    "Submission {submission_id} not found"
                )));
            }
            TransitionOutcome::AlreadyTerminal(status) => {
                return Err(AppError::InvalidTransition { status });
            }
        };

        let event = RejectionEvent {
            submission_id: updated.id,
            competition_id: updated.competition_id,
            participant_id: updated.participant_id,
            evaluator_id,
            reason,
            rejected_at: updated.evaluated_at.unwrap_or_else(Utc::now),
        };
        if let Err(e) = self.events.submission_rejected(&event).await {
            warn!(%submission_id, error = %e, "Failed to publish rejection event");
        }

        info!(%submission_id, "Rejected submission");
        Ok(updated)
    }

    /// The competition's leaderboard in rank order.
    pub async fn leaderboard(
        &self,
        competition: &competition::Model,
    ) -> Result<Vec<RankedEntry>, AppError> {
        let rows = self.board_rows(competition.id).await?;
        Ok(ranking::rank_entries(competition.metric_direction, rows))
    }

    /// Recompute every best result in the competition from submissions.
    pub async fn repair_competition(
        &self,
        competition: &competition::Model,
    ) -> Result<RepairReport, AppError> {
        let recovery = RecoveryService::new(self.db, self.max_tracker_retries);
        recovery
            .recompute_competition(competition.metric_direction, competition.id)
            .await
    }

    /// Fallback when the tracker lost every retry: rebuild the pair's best
    /// result from submissions and derive the outcome from the rebuilt row.
    async fn tracked_via_repair(
        &self,
        direction: MetricDirection,
        competition: &competition::Model,
        updated: &submission::Model,
    ) -> Result<TrackerOutcome, AppError> {
        let recovery = RecoveryService::new(self.db, self.max_tracker_retries);
        let repair = recovery
            .recompute_pair(direction, competition.id, updated.participant_id)
            .await?;

        let best = repair.best.ok_or_else(|| {
            AppError::Inconsistency(format!(
                "No best result for participant {} after evaluating submission {}",
                updated.participant_id, updated.id
            ))
        })?;

        let store = SubmissionStore::new(self.db);
        let mut others = store
            .evaluated_for_pair(competition.id, updated.participant_id)
            .await?;
        others.retain(|s| s.id != updated.id);
        let previous_best = recovery::canonical_best(direction, &others).map(|b| b.score);

        Ok(TrackerOutcome {
            is_new_best: best.best_submission_id == updated.id,
            previous_best,
        })
    }

    /// One participant's current rank, repairing their row if it is missing.
    async fn rank_of(
        &self,
        direction: MetricDirection,
        competition_id: Uuid,
        participant_id: Uuid,
    ) -> Result<u32, AppError> {
        let rows = self.board_rows(competition_id).await?;
        if let Some(rank) = ranking::position_of(direction, &rows, participant_id) {
            return Ok(rank);
        }

        let recovery = RecoveryService::new(self.db, self.max_tracker_retries);
        recovery
            .recompute_pair(direction, competition_id, participant_id)
            .await?;

        let rows = self.board_rows(competition_id).await?;
        ranking::position_of(direction, &rows, participant_id).ok_or_else(|| {
            AppError::Inconsistency(format!(
                "Participant {participant_id} missing from leaderboard of competition \
                 {competition_id} after repair"
            ))
        })
    }

    async fn board_rows(&self, competition_id: Uuid) -> Result<Vec<BestRow>, AppError> {
        let rows = best_result::Entity::find()
            .filter(best_result::Column::CompetitionId.eq(competition_id))
            .all(self.db)
            .await?;
        Ok(rows.into_iter().map(BestRow::from).collect())
    }
}
