use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

use super::models::ErrorResponse;
use crate::extract::ExtractError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No URL provided")]
    InvalidInput,
    #[error("Download failed: {0}")]
    ExtractionFailed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput => StatusCode::BAD_REQUEST,
            ApiError::ExtractionFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            detail: self.to_string(),
        };

        (status, Json(json!(body))).into_response()
    }
}

impl From<ExtractError> for ApiError {
    fn from(value: ExtractError) -> Self {
        // A reported success with no artifact reaches the client the same
        // way as any other delegate failure
        ApiError::ExtractionFailed(value.to_string())
    }
}
