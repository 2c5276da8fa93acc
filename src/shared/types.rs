use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::AppError;

/// Error payload returned by every report endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Result of a report handler.
///
/// Both arms render as HTTP 200, with either the report body or the
/// [`ErrorBody`] produced by [`AppError`].
#[derive(Debug)]
pub struct ReportOutcome<T>(pub Result<T, AppError>);

impl<T> From<Result<T, AppError>> for ReportOutcome<T> {
    fn from(result: Result<T, AppError>) -> Self {
        Self(result)
    }
}

impl<T: Serialize> IntoResponse for ReportOutcome<T> {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(body) => Json(body).into_response(),
            Err(e) => e.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_failed_outcome_is_still_ok_status() {
        let outcome: ReportOutcome<u64> = ReportOutcome(Err(AppError::RowSource("unreachable".into())));
        assert_eq!(outcome.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn test_error_body_shape() {
        let body = serde_json::to_value(ErrorBody::new("boom")).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "boom" }));
    }
}
