use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::constants::NO_VALID_DATES_MESSAGE;
use crate::shared::types::ErrorBody;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Row source error: {0}")]
    RowSource(String),

    #[error("{}", NO_VALID_DATES_MESSAGE)]
    NoValidDates,

    #[error("No data available")]
    NoData,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    /// Only a malformed request is a transport-level failure; every other
    /// error is a report outcome answered with 200 and an error body.
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest(ref msg) => {
                tracing::warn!("Rejected request: {}", msg);
                StatusCode::BAD_REQUEST
            }
            AppError::NoValidDates | AppError::NoData => {
                tracing::warn!("Report unavailable: {}", self);
                StatusCode::OK
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                StatusCode::OK
            }
            AppError::RowSource(ref msg) | AppError::Internal(ref msg) => {
                tracing::error!("Report failed: {}", msg);
                StatusCode::OK
            }
        };

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_valid_dates_message_is_verbatim() {
        assert_eq!(
            AppError::NoValidDates.to_string(),
            "No valid dates found in Date_of_report column"
        );
        assert_eq!(AppError::NoData.to_string(), "No data available");
    }

    #[test]
    fn test_bad_request_status() {
        let response = AppError::BadRequest("missing status_filter".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_report_failures_answer_with_ok_status() {
        for error in [
            AppError::RowSource("connection refused".to_string()),
            AppError::Internal("bad row".to_string()),
            AppError::NoValidDates,
            AppError::NoData,
        ] {
            assert_eq!(error.into_response().status(), StatusCode::OK);
        }
    }
}
