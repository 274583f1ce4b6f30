use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("History store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("RAG engine error: {0}")]
    RagError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    /// Category name surfaced to callers in the 500 body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::StoreUnavailable(_) => "StoreUnavailable",
            ApiError::RagError(_) => "RagError",
            ApiError::Internal(_) => "InternalError",
        }
    }

    fn wire_message(&self) -> String {
        format!(
            "Internal server error during RAG process. Check backend logs for details. Error: {}",
            self.kind()
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            other => {
                tracing::error!("{}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.wire_message())
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
