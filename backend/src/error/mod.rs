use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{AssignmentId, LicensedBusinessId, QualifierId};

const OPEN_PAIR_CONSTRAINT: &str = "assignments_open_pair_key";
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Conflict(String),
    BadRequest(String),
    /// Business-rule rejection carrying a stable code and diagnostics.
    Rule {
        code: &'static str,
        message: String,
        details: Option<Value>,
    },
    InternalServerError(anyhow::Error),
    Validation(Vec<String>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code, details) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND".to_string(), None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT".to_string(), None),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                msg,
                "BAD_REQUEST".to_string(),
                None,
            ),
            AppError::Rule {
                code,
                message,
                details,
            } => (StatusCode::CONFLICT, message, code.to_string(), details),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR".to_string(),
                    None,
                )
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                "VALIDATION_ERROR".to_string(),
                Some(serde_json::json!({ "errors": errors })),
            ),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code,
            details,
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::InternalServerError(err.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let code = e.code.as_ref();
                    format!("{}: {}", field, code)
                })
            })
            .collect();
        AppError::Validation(messages)
    }
}

/// A business holding one of the qualifier's slots in the proposed window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ConflictingBusiness {
    pub assignment_id: AssignmentId,
    pub business_id: LicensedBusinessId,
    pub business_code: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Failures raised by the enforcement core.
#[derive(Debug, Error)]
pub enum ComplianceError {
    #[error("qualifier holds {current_count} of {max_allowed} allowed licenses")]
    CapacityExceeded {
        current_count: i64,
        max_allowed: i32,
        conflicting: Vec<ConflictingBusiness>,
    },
    #[error("qualifier {qualifier_id} already has an open assignment to business {business_id}")]
    DuplicateActiveRelationship {
        qualifier_id: QualifierId,
        business_id: LicensedBusinessId,
        existing_assignment_id: Option<AssignmentId>,
    },
    #[error("action dated {action_date} falls after the cutoff of assignment {assignment_id}")]
    CutoffViolation {
        assignment_id: AssignmentId,
        action_date: NaiveDate,
        end_date: Option<NaiveDate>,
        cutoff_date: Option<NaiveDate>,
    },
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    NotFound(String),
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ComplianceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ComplianceError::Validation(vec![message.into()])
    }

    /// Translates storage errors whose constraint is known to the core.
    ///
    /// Anything else stays a generic database failure.
    pub fn from_constraint(
        err: sqlx::Error,
        qualifier_id: QualifierId,
        business_id: LicensedBusinessId,
    ) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.constraint() == Some(OPEN_PAIR_CONSTRAINT) {
                return ComplianceError::DuplicateActiveRelationship {
                    qualifier_id,
                    business_id,
                    existing_assignment_id: None,
                };
            }
        }
        ComplianceError::Database(err)
    }

    /// Maps a unique-key violation on `constraint` to a `Conflict`.
    pub fn unique_conflict(err: sqlx::Error, constraint: &str, message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
            {
                return ComplianceError::Conflict(message.to_string());
            }
        }
        ComplianceError::Database(err)
    }

    pub fn code(&self) -> &'static str {
        match self {
            ComplianceError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            ComplianceError::DuplicateActiveRelationship { .. } => "DUPLICATE_ACTIVE_RELATIONSHIP",
            ComplianceError::CutoffViolation { .. } => "CUTOFF_VIOLATION",
            ComplianceError::InvalidTransition(_) => "INVALID_TRANSITION",
            ComplianceError::NotFound(_) => "NOT_FOUND",
            ComplianceError::Validation(_) => "VALIDATION_ERROR",
            ComplianceError::Conflict(_) => "CONFLICT",
            ComplianceError::Database(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<ComplianceError> for AppError {
    fn from(err: ComplianceError) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            ComplianceError::CapacityExceeded {
                current_count,
                max_allowed,
                conflicting,
            } => AppError::Rule {
                code,
                message,
                details: Some(serde_json::json!({
                    "current_count": current_count,
                    "max_allowed": max_allowed,
                    "conflicting_businesses": conflicting,
                })),
            },
            ComplianceError::DuplicateActiveRelationship {
                qualifier_id,
                business_id,
                existing_assignment_id,
            } => AppError::Rule {
                code,
                message,
                details: Some(serde_json::json!({
                    "qualifier_id": qualifier_id,
                    "business_id": business_id,
                    "existing_assignment_id": existing_assignment_id,
                })),
            },
            ComplianceError::CutoffViolation {
                assignment_id,
                action_date,
                end_date,
                cutoff_date,
            } => AppError::Rule {
                code,
                message,
                details: Some(serde_json::json!({
                    "assignment_id": assignment_id,
                    "action_date": action_date,
                    "end_date": end_date,
                    "cutoff_date": cutoff_date,
                })),
            },
            ComplianceError::InvalidTransition(_) => AppError::Rule {
                code,
                message,
                details: None,
            },
            ComplianceError::NotFound(msg) => AppError::NotFound(msg),
            ComplianceError::Validation(errors) => AppError::Validation(errors),
            ComplianceError::Conflict(msg) => AppError::Conflict(msg),
            ComplianceError::Database(err) => AppError::InternalServerError(err.into()),
        }
    }
}
