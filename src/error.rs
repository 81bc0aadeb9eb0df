// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Global Application Error Enum.
/// Every stage of the export returns this type so `?` works across store,
/// filesystem and CSV calls.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store access failure (fetch or status write-back).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure (directory creation, file write).
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A store call did not finish within the configured bound.
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    /// Missing or invalid environment configuration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal server error: {0}")]
    InternalServerError(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Short, stable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "store",
            AppError::Io(_) | AppError::Csv(_) => "filesystem",
            AppError::Timeout { .. } => "timeout",
            AppError::Config(_) => "config",
            AppError::InternalServerError(_) => "internal",
            AppError::NotFound(_) => "not_found",
        }
    }
}

/// Converts the error into a JSON response with appropriate HTTP status code.
/// Server-side failures are logged and answered with their kind only.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Timeout { .. } => {
                tracing::error!("Gateway timeout: {}", self);
                (StatusCode::GATEWAY_TIMEOUT, self.to_string())
            }
            _ => {
                tracing::error!("Internal Server Error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };
        let body = Json(json!({
            "error": error_message,
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_separate_store_and_filesystem_failures() {
        let io = AppError::from(std::io::Error::other("disk full"));
        assert_eq!(io.kind(), "filesystem");

        let db = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(db.kind(), "store");

        let timeout = AppError::Timeout {
            operation: "fetch tests",
            seconds: 3,
        };
        assert_eq!(timeout.kind(), "timeout");
        assert_eq!(timeout.to_string(), "fetch tests timed out after 3s");
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let response = AppError::Timeout {
            operation: "fetch subjects",
            seconds: 1,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn io_failure_maps_to_internal_error() {
        let response = AppError::from(std::io::Error::other("denied")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
