//! Core error taxonomy shared by models, services and storage backends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single violated field, reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Join the violated field names for the error message.
fn field_list(fields: &[FieldViolation]) -> String {
    fields
        .iter()
        .map(|f| f.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors produced by the problem/solution core.
///
/// Every operation is total from the caller's perspective: failures come back
/// as one of these variants, never as a panic. The HTTP layer owns the
/// mapping to status codes.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProblemError {
    /// Missing, oversized or malformed input, with field-level detail.
    #[error("validation failed: {}", field_list(.fields))]
    Validation { fields: Vec<FieldViolation> },
    /// Neither a non-empty workspace graph nor non-empty written text.
    #[error("solution must include a workspace design or written text")]
    IncompleteSolution,
    /// Problem or solution id did not resolve.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
    /// Ownership check failed for edit/delete/promote.
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },
    /// Image storage or persistence layer failure.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl ProblemError {
    /// Validation error for a single field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            fields: vec![FieldViolation::new(field, message)],
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }
}
