//! Error Handling
//!
//! Application error type mapped onto the uniform JSON failure envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Main application error type surfaced by handlers and services.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource lookup failed
    #[error("{0}")]
    NotFound(String),

    /// Business-rule violation or malformed request
    #[error("{0}")]
    BadRequest(String),

    /// Missing, invalid, or expired credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Resource permanently unavailable (closed/expired auctions)
    #[error("{0}")]
    Gone(String),

    /// Field-level validation failure (422 with a field-keyed data map)
    #[error("{message}")]
    InvalidEntry {
        message: String,
        data: serde_json::Map<String, Value>,
    },

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing errors
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Token issuance failures (decode failures surface as Unauthorized)
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Generic internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    /// Single-field 422 with the API's "Invalid Entry" message.
    pub fn invalid_entry(field: &str, message: &str) -> Self {
        let mut data = serde_json::Map::new();
        data.insert(field.to_string(), Value::String(message.to_string()));
        AppError::InvalidEntry {
            message: "Invalid Entry".to_string(),
            data,
        }
    }
}

/// Failure envelope: `{"status": "failure", "message": ..., "data": ...?}`.
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            status: "failure",
            message: message.to_string(),
            data: None,
        }
    }

    pub fn with_data(message: &str, data: Value) -> Self {
        Self {
            status: "failure",
            message: message.to_string(),
            data: Some(data),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(&msg)),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorResponse::new(&msg)),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorResponse::new(&msg)),
            AppError::Gone(msg) => (StatusCode::GONE, ErrorResponse::new(&msg)),
            AppError::InvalidEntry { message, data } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::with_data(&message, Value::Object(data)),
            ),
            AppError::Database(e) => {
                log::error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Server Error"),
                )
            }
            AppError::Hashing(e) => {
                log::error!("bcrypt error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Server Error"),
                )
            }
            AppError::Token(e) => {
                log::error!("token error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Server Error"),
                )
            }
            AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Server Error"),
                )
            }
            AppError::Configuration(msg) => {
                log::error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Server Error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for operations that can return AppError
pub type AppResult<T> = Result<T, AppError>;

/// Converts validator output into the field-keyed 422 envelope.
pub fn from_validation_errors(errors: validator::ValidationErrors) -> AppError {
    let mut data = serde_json::Map::new();
    for (field, errs) in errors.field_errors() {
        if let Some(err) = errs.first() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid value".to_string());
            data.insert(field.to_string(), Value::String(message));
        }
    }
    AppError::InvalidEntry {
        message: "Invalid Entry".to_string(),
        data,
    }
}
