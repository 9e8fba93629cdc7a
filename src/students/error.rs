use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::repo::StoreError;

/// Errors surfaced by the student service. Storage causes are hidden behind
/// the generic variants except on delete.
#[derive(Debug, thiserror::Error)]
pub enum StudentError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("{0}")]
    InvalidInput(String),
    #[error("no student found")]
    NotFound,
    #[error("failed to create student")]
    CreateFailed,
    #[error("failed to fetch student by ID")]
    FetchFailed,
    #[error("failed to update student")]
    UpdateFailed,
    #[error("failed to delete student: {0}")]
    DeleteFailed(#[source] StoreError),
    #[error("request timed out")]
    Cancelled,
    #[error("storage is not ready")]
    Unavailable,
}

impl StudentError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::CreateFailed | Self::FetchFailed | Self::UpdateFailed | Self::DeleteFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Cancelled => StatusCode::GATEWAY_TIMEOUT,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for StudentError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}
