use chrono::{DateTime, Utc};
use common::MetricDirection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::competition;
use crate::error::AppError;

use super::shared::{Pagination, validate_title};

/// Request body for creating a competition.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCompetitionRequest {
    #[schema(example = "House Price Prediction")]
    pub title: String,
    /// Whether higher or lower scores win. Defaults to `Maximize`.
    #[serde(default)]
    pub metric_direction: MetricDirection,
    /// Lower bound of valid scores. Defaults to 0.
    #[schema(example = 0.0)]
    pub score_min: Option<f64>,
    /// Upper bound of valid scores. Defaults to 1.
    #[schema(example = 1.0)]
    pub score_max: Option<f64>,
}

/// Query parameters for competition listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CompetitionListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

/// Full competition details.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionResponse {
    pub id: Uuid,
    #[schema(example = "House Price Prediction")]
    pub title: String,
    pub metric_direction: MetricDirection,
    #[schema(example = 0.0)]
    pub score_min: f64,
    #[schema(example = 1.0)]
    pub score_max: f64,
    #[schema(example = "2026-03-01T12:00:00Z")]
    pub created_at: DateTime<Utc>,
}

/// Paginated list of competitions.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CompetitionListResponse {
    pub data: Vec<CompetitionResponse>,
    pub pagination: Pagination,
}

/// Validate a competition creation request.
pub fn validate_create_competition(req: &CreateCompetitionRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;

    let score_min = req.score_min.unwrap_or(0.0);
    let score_max = req.score_max.unwrap_or(1.0);

    if !score_min.is_finite() || !score_max.is_finite() {
        return Err(AppError::Validation(
            "Score bounds must be finite numbers".into(),
        ));
    }
    if score_min >= score_max {
        return Err(AppError::Validation(
            "score_min must be strictly less than score_max".into(),
        ));
    }

    Ok(())
}

impl From<competition::Model> for CompetitionResponse {
    fn from(m: competition::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            metric_direction: m.metric_direction,
            score_min: m.score_min,
            score_max: m.score_max,
            created_at: m.created_at,
        }
    }
}
