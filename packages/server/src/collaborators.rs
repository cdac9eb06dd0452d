//! Seams to the systems the evaluation engine talks to but does not own:
//! the participant directory, artifact storage and the event bus. Each is a
//! trait behind `Arc<dyn ..>` in [`crate::state::AppState`] so tests can
//! swap in fakes without a network.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::entity::participant;
use crate::error::AppError;

/// Read-only access to participant display data.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Resolve display names for a batch of participant ids.
    ///
    /// Unknown ids are simply absent from the returned map; callers decide
    /// how to render missing profiles.
    async fn display_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, AppError>;
}

/// [`ProfileLookup`] backed by the local participant table.
pub struct DirectoryProfiles {
    db: DatabaseConnection,
}

impl DirectoryProfiles {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileLookup for DirectoryProfiles {
    async fn display_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = participant::Entity::find()
            .filter(participant::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|p| (p.id, p.display_name)).collect())
    }
}

/// Turns opaque artifact references into download URLs.
pub trait ArtifactResolver: Send + Sync {
    fn download_url(&self, reference: &str) -> String;
}

/// [`ArtifactResolver`] that joins references onto a configured base URL.
pub struct StorageUrlResolver {
    base_url: String,
}

impl StorageUrlResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

impl ArtifactResolver for StorageUrlResolver {
    fn download_url(&self, reference: &str) -> String {
        format!("{}/{}", self.base_url, reference.trim_start_matches('/'))
    }
}

/// Emitted after a submission is scored and the leaderboard has absorbed it.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationEvent {
    pub submission_id: Uuid,
    pub competition_id: Uuid,
    pub participant_id: Uuid,
    pub evaluator_id: Uuid,
    pub score: f64,
    pub rank: u32,
    pub is_new_best: bool,
    pub evaluated_at: DateTime<Utc>,
}

/// Emitted after a submission is rejected without a score.
#[derive(Debug, Clone, Serialize)]
pub struct RejectionEvent {
    pub submission_id: Uuid,
    pub competition_id: Uuid,
    pub participant_id: Uuid,
    pub evaluator_id: Uuid,
    pub reason: String,
    pub rejected_at: DateTime<Utc>,
}

/// Outbound notification channel for evaluation outcomes.
///
/// Publication is best-effort: callers log failures and carry on, so an
/// unavailable bus never turns a completed evaluation into an error.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn submission_evaluated(&self, event: &EvaluationEvent) -> Result<(), anyhow::Error>;
    async fn submission_rejected(&self, event: &RejectionEvent) -> Result<(), anyhow::Error>;
}

/// [`EventSink`] that writes structured log lines instead of publishing.
///
/// Stands in until a message-queue transport is wired up; also what the
/// integration tests run against.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn submission_evaluated(&self, event: &EvaluationEvent) -> Result<(), anyhow::Error> {
        info!(
            submission_id = %event.submission_id,
            competition_id = %event.competition_id,
            participant_id = %event.participant_id,
            score = event.score,
            rank = event.rank,
            is_new_best = event.is_new_best,
            "Submission evaluated"
        );
        Ok(())
    }

    async fn submission_rejected(&self, event: &RejectionEvent) -> Result<(), anyhow::Error> {
        info!(
            submission_id = %event.submission_id,
            competition_id = %event.competition_id,
            participant_id = %event.participant_id,
            reason = %event.reason,
            "Submission rejected"
        );
        Ok(())
    }
}
