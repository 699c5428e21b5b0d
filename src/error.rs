//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    /// Rejected before any write
    #[error(transparent)]
    InvalidAmount(#[from] crate::domain::AmountError),

    #[error("Survey entry not found: {0}")]
    EntryNotFound(i64),

    #[error("Invalid admin password")]
    Unauthorized,

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The entry was rolled back; the stored total is unchanged
    #[error("Running total overflow adding {0} cents")]
    TotalOverflow(i64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EntryNotFound(id) => AppError::EntryNotFound(id),
            StoreError::TotalOverflow(cents) => AppError::TotalOverflow(cents),
            StoreError::Database(e) => AppError::Database(e),
            StoreError::CorruptRow(msg) => AppError::Internal(msg),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidAmount(e) => {
                (StatusCode::BAD_REQUEST, "invalid_amount", Some(e.to_string()))
            }

            // 401 Unauthorized
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "invalid_admin_password", None)
            }

            // 404 Not Found - stale or garbled contact link
            AppError::EntryNotFound(_) => (
                StatusCode::NOT_FOUND,
                "entry_not_found",
                Some("Please submit your estimate again via the survey form".to_string()),
            ),

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::TotalOverflow(cents) => {
                tracing::error!(cents, "Running total would overflow, entry rolled back");
                (StatusCode::INTERNAL_SERVER_ERROR, "total_overflow", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AmountError;
    use rust_decimal::Decimal;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::InvalidAmount(AmountError::Negative(Decimal::NEGATIVE_ONE)), StatusCode::BAD_REQUEST),
            (AppError::EntryNotFound(7), StatusCode::NOT_FOUND),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::Database(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_store_error_conversion() {
        let err: AppError = StoreError::EntryNotFound(3).into();
        assert!(matches!(err, AppError::EntryNotFound(3)));

        let err: AppError = StoreError::Database(sqlx::Error::PoolClosed).into();
        assert!(matches!(err, AppError::Database(_)));

        let err: AppError = StoreError::TotalOverflow(100).into();
        assert!(matches!(err, AppError::TotalOverflow(100)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
