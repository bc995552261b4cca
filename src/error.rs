use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::database::store::StoreError;
use crate::models::layout::ScopeKey;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Wire-level error body.
///
/// `message` is a plain string for most failures and an array of
/// per-field strings for request validation, which is the shape the
/// dashboard and SDK clients consume.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: ErrorMessage,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    Many(Vec<String>),
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request payload failed field validation. Carries one message per
    /// failed constraint, in declaration order.
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    /// No layouts exist in the addressed scope.
    #[error("no layouts found for organization {} environment {}", .0.organization_id, .0.environment_id)]
    ScopeNotFound(ScopeKey),

    /// The promotion candidate does not belong to the addressed scope.
    #[error("layout {0} not found in scope")]
    CandidateNotFound(Uuid),

    /// A competing promotion for the same scope kept winning past the
    /// retry budget.
    #[error("conflicting default-layout update for this scope, please retry")]
    Conflict,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Layout".to_string()),
            StoreError::Conflict => ApiError::Conflict,
            StoreError::Database(e) => ApiError::Database(e),
        }
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) | ApiError::ScopeNotFound(_) | ApiError::CandidateNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> ErrorMessage {
        match self {
            ApiError::Validation(messages) => ErrorMessage::Many(messages.clone()),
            // Never leak driver-level detail to clients.
            ApiError::Database(_) => {
                ErrorMessage::Single("An internal server error occurred".to_string())
            }
            other => ErrorMessage::Single(other.to_string()),
        }
    }

    fn log(&self, request_id: &str) {
        match self.status_code() {
            status if status.is_server_error() => {
                error!(
                    request_id = %request_id,
                    error = %self,
                    "Server error occurred"
                );
            }
            status if status.is_client_error() => {
                warn!(
                    request_id = %request_id,
                    error = %self,
                    "Client error occurred"
                );
            }
            _ => {}
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let status = self.status_code();

        self.log(&request_id);

        let body = ErrorResponse {
            status_code: status.as_u16(),
            message: self.message(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Convert Axum JSON extraction rejections into the API error shape.
pub fn handle_rejection(err: JsonRejection) -> ApiError {
    match err {
        JsonRejection::JsonSyntaxError(_) => {
            ApiError::BadRequest("Invalid JSON format".to_string())
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::BadRequest("JSON content type required".to_string())
        }
        _ => ApiError::BadRequest("Invalid request body".to_string()),
    }
}
