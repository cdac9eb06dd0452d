use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::participant;
use crate::error::AppError;

use super::shared::Pagination;

/// Request body for registering a participant.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateParticipantRequest {
    #[schema(example = "Ada L.")]
    pub display_name: String,
}

/// Query parameters for participant listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ParticipantListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

/// Participant directory entry.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ParticipantResponse {
    pub id: Uuid,
    #[schema(example = "Ada L.")]
    pub display_name: String,
    #[schema(example = "2026-03-01T12:00:00Z")]
    pub created_at: DateTime<Utc>,
}

/// Paginated list of participants.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ParticipantListResponse {
    pub data: Vec<ParticipantResponse>,
    pub pagination: Pagination,
}

/// Validate a participant registration request.
pub fn validate_create_participant(req: &CreateParticipantRequest) -> Result<(), AppError> {
    let name = req.display_name.trim();
    if name.is_empty() || name.chars().count() > 128 {
        return Err(AppError::Validation(
            "Display name must be 1-128 characters".into(),
        ));
    }
    Ok(())
}

impl From<participant::Model> for ParticipantResponse {
    fn from(m: participant::Model) -> Self {
        Self {
            id: m.id,
            display_name: m.display_name,
            created_at: m.created_at,
        }
    }
}
