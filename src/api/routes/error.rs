//! API error handling utilities.
//!
//! Maps the core error taxonomy onto HTTP status codes. Handlers return
//! `Result<_, ApiError>` and use `?` on core operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::storage::error::{FieldViolation, ProblemError};

/// API error response
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub fields: Option<Vec<FieldViolation>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<ProblemError> for ApiError {
    fn from(error: ProblemError) -> Self {
        let status = match &error {
            ProblemError::Validation { .. } | ProblemError::IncompleteSolution => {
                StatusCode::BAD_REQUEST
            }
            ProblemError::NotFound { .. } => StatusCode::NOT_FOUND,
            ProblemError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ProblemError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        let fields = match &error {
            ProblemError::Validation { fields } => Some(fields.clone()),
            _ => None,
        };
        Self {
            status,
            message: error.to_string(),
            fields,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.message,
            "status": self.status.as_u16(),
        });
        if let Some(fields) = self.fields {
            body["fields"] = json!(fields);
        }

        (self.status, axum::Json(body)).into_response()
    }
}
