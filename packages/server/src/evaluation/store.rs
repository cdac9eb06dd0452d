use chrono::Utc;
use common::EvaluationStatus;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, sea_query::Expr,
};
use uuid::Uuid;

use crate::entity::submission;

/// Terminal state written by [`SubmissionStore::transition`].
///
/// `Evaluate` carries the score and evaluator; `Reject` stores the reason as
/// feedback and leaves score and evaluator empty, so a row's status can
/// always be cross-checked against which of those fields are set.
#[derive(Debug, Clone)]
pub enum Transition {
    Evaluate {
        score: f64,
        evaluator_id: Uuid,
        feedback: Option<String>,
    },
    Reject {
        reason: String,
    },
}

/// Result of attempting a terminal transition.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The row left `Pending`; carries the updated submission.
    Applied(submission::Model),
    /// No submission with that id exists.
    NotFound,
    /// The submission was already evaluated or rejected; carries its status.
    AlreadyTerminal(EvaluationStatus),
}

pub struct SubmissionStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SubmissionStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Record a new upload in `Pending` state.
    pub async fn create(
        &self,
        competition_id: Uuid,
        participant_id: Uuid,
        artifact_reference: String,
        file_size: i64,
    ) -> Result<submission::Model, DbErr> {
        let model = submission::ActiveModel {
            id: Set(Uuid::now_v7()),
            competition_id: Set(competition_id),
            participant_id: Set(participant_id),
            artifact_reference: Set(artifact_reference),
            file_size: Set(file_size),
            status: Set(EvaluationStatus::Pending),
            score: Set(None),
            evaluator_id: Set(None),
            feedback: Set(None),
            submitted_at: Set(Utc::now()),
            evaluated_at: Set(None),
            ..Default::default()
        };

        model.insert(self.conn).await
    }

    /// Get a single submission by id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<submission::Model>, DbErr> {
        submission::Entity::find_by_id(id).one(self.conn).await
    }

    /// Move a `Pending` submission into a terminal state.
    ///
    /// The status guard rides on the UPDATE itself, so all terminal fields
    /// land in one atomic statement and concurrent calls for the same
    /// submission resolve to exactly one `Applied`.
    pub async fn transition(
        &self,
        id: Uuid,
        transition: Transition,
    ) -> Result<TransitionOutcome, DbErr> {
        let (status, score, evaluator_id, feedback) = match transition {
            Transition::Evaluate {
                score,
                evaluator_id,
                feedback,
            } => (
                EvaluationStatus::Evaluated,
                Some(score),
                Some(evaluator_id),
                feedback,
            ),
            Transition::Reject { reason } => (EvaluationStatus::Rejected, None, None, Some(reason)),
        };

        loop {
            let update_result = submission::Entity::update_many()
                .col_expr(submission::Column::Status, Expr::value(status))
                .col_expr(submission::Column::Score, Expr::value(score))
                .col_expr(submission::Column::EvaluatorId, Expr::value(evaluator_id))
                .col_expr(submission::Column::Feedback, Expr::value(feedback.clone()))
                .col_expr(submission::Column::EvaluatedAt, Expr::value(Some(Utc::now())))
                .filter(submission::Column::Id.eq(id))
                .filter(submission::Column::Status.eq(EvaluationStatus::Pending))
                .exec(self.conn)
                .await?;

            if update_result.rows_affected > 0 {
                let updated = self.get_by_id(id).await?.ok_or_else(|| {
                    DbErr::Custom("Submission disappeared after transition".to_string())
                })?;
                return Ok(TransitionOutcome::Applied(updated));
            }

            match self.get_by_id(id).await? {
                None => return Ok(TransitionOutcome::NotFound),
                Some(existing) if existing.status.is_terminal() => {
                    return Ok(TransitionOutcome::AlreadyTerminal(existing.status));
                }
                // Row became visible as Pending between the guarded update
                // and the re-read; take another shot at the update.
                Some(_) => continue,
            }
        }
    }

    /// List submissions for a competition, newest first, optionally narrowed
    /// to one participant or one status.
    pub async fn list_for_competition(
        &self,
        competition_id: Uuid,
        participant_id: Option<Uuid>,
        status: Option<EvaluationStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<submission::Model>, u64), DbErr> {
        let mut query = submission::Entity::find()
            .filter(submission::Column::CompetitionId.eq(competition_id));

        if let Some(participant_id) = participant_id {
            query = query.filter(submission::Column::ParticipantId.eq(participant_id));
        }
        if let Some(status) = status {
            query = query.filter(submission::Column::Status.eq(status));
        }

        let total = query.clone().count(self.conn).await?;

        let submissions = query
            .order_by_desc(submission::Column::SubmittedAt)
            .offset((page.saturating_sub(1)) * per_page)
            .limit(per_page)
            .all(self.conn)
            .await?;

        Ok((submissions, total))
    }

    /// All evaluated submissions for one (competition, participant) pair.
    pub async fn evaluated_for_pair(
        &self,
        competition_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Vec<submission::Model>, DbErr> {
        submission::Entity::find()
            .filter(submission::Column::CompetitionId.eq(competition_id))
            .filter(submission::Column::ParticipantId.eq(participant_id))
            .filter(submission::Column::Status.eq(EvaluationStatus::Evaluated))
            .all(self.conn)
            .await
    }

    /// Distinct participants with at least one evaluated submission in a
    /// competition.
    pub async fn evaluated_participant_ids(
        &self,
        competition_id: Uuid,
    ) -> Result<Vec<Uuid>, DbErr> {
        submission::Entity::find()
            .select_only()
            .column(submission::Column::ParticipantId)
            .distinct()
            .filter(submission::Column::CompetitionId.eq(competition_id))
            .filter(submission::Column::Status.eq(EvaluationStatus::Evaluated))
            .into_tuple()
            .all(self.conn)
            .await
    }
}

/// Create a SubmissionStore with a DatabaseConnection.
pub fn submission_store(db: &DatabaseConnection) -> SubmissionStore<'_, DatabaseConnection> {
    SubmissionStore::new(db)
}
