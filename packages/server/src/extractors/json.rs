use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// `Json<T>` wrapper whose rejection is the service's structured error body.
///
/// A reviewer posting a malformed score or submission payload gets a
/// `VALIDATION_ERROR` response instead of axum's plain-text rejection, and a
/// request missing the JSON content type gets a message naming the header it
/// needs.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                JsonRejection::MissingJsonContentType(_) => AppError::Validation(
                    "Request body must be sent with content type `application/json`".to_string(),
                ),
                other => AppError::Validation(other.body_text()),
            })?;
        Ok(AppJson(value))
    }
}
