use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{EvaluationStatus, ScoreError};
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `INVALID_TRANSITION`, `CONCURRENCY_CONFLICT`,
    /// `DERIVED_STATE_INCONSISTENCY`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Score must be a finite number")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    /// A terminal submission received a second evaluation or rejection.
    /// Carries the status the submission was actually in.
    InvalidTransition {
        status: EvaluationStatus,
    },
    /// Concurrent writers exhausted the best-result retry budget.
    ConcurrencyConflict(String),
    /// Stored best results disagree with the evaluated submissions they are
    /// derived from. Surfaced instead of silently serving a wrong leaderboard.
    Inconsistency(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::InvalidTransition { status } => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "INVALID_TRANSITION",
                    message: format!("Submission has already been {status}"),
                },
            ),
            AppError::ConcurrencyConflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONCURRENCY_CONFLICT",
                    message: msg,
                },
            ),
            AppError::Inconsistency(detail) => {
                tracing::error!("Derived state inconsistency: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "DERIVED_STATE_INCONSISTENCY",
                        message: "Leaderboard state is inconsistent; repair required".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        AppError::Validation(err.to_string())
    }
}
