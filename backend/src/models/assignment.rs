use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::services::overlap::DateRange;
use crate::types::{AssignmentId, JustificationId, LicensedBusinessId, QualifierId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    #[default]
    Qualifying,
    Secondary,
    Advisor,
}

/// Timed relationship between one qualifier and one licensed business.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Assignment {
    pub id: AssignmentId,
    pub assignment_code: String,
    pub qualifier_id: QualifierId,
    pub business_id: LicensedBusinessId,
    pub relationship_kind: RelationshipKind,
    pub start_date: NaiveDate,
    /// `None` while the relationship is open.
    pub end_date: Option<NaiveDate>,
    /// Last date an oversight action may be attributed to this assignment.
    pub cutoff_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub override_justification_id: Option<JustificationId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(assignment_code: String, payload: AssignQualifierPayload) -> Self {
        let now = Utc::now();
        Self {
            id: AssignmentId::new(),
            assignment_code,
            qualifier_id: payload.qualifier_id,
            business_id: payload.business_id,
            relationship_kind: payload.relationship_kind.unwrap_or_default(),
            start_date: payload.start_date,
            end_date: payload.end_date,
            cutoff_date: payload.cutoff_date,
            notes: payload.notes,
            override_justification_id: payload.override_justification_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }
}

/// Row used by the capacity validator: an assignment plus its business code.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AssignmentSlot {
    pub id: AssignmentId,
    pub business_id: LicensedBusinessId,
    pub business_code: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl AssignmentSlot {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignQualifierPayload {
    pub qualifier_id: QualifierId,
    pub business_id: LicensedBusinessId,
    #[serde(default)]
    pub relationship_kind: Option<RelationshipKind>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub cutoff_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Justification authorizing a capacity exception.
    #[serde(default)]
    pub override_justification_id: Option<JustificationId>,
}

impl AssignQualifierPayload {
    /// Date ordering checks that do not need storage.
    pub fn date_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if matches!(self.end_date, Some(end) if end < self.start_date) {
            errors.push("end_date: before_start_date".to_string());
        }
        if matches!(self.cutoff_date, Some(cutoff) if cutoff < self.start_date) {
            errors.push("cutoff_date: before_start_date".to_string());
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAssignmentPayload {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub relationship_kind: Option<RelationshipKind>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CloseAssignmentPayload {
    pub end_date: NaiveDate,
    #[serde(default)]
    pub cutoff_date: Option<NaiveDate>,
}

/// Query of `DELETE /api/assignments/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct RemoveAssignmentQuery {
    pub justification_id: JustificationId,
}

/// Outcome of an authorized assignment removal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentRemoval {
    pub assignment: Assignment,
    pub justification_id: JustificationId,
    /// Oversight actions whose assignment link was cleared.
    pub detached_actions: i64,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct AssignmentListQuery {
    /// Only return assignments without an end date.
    #[serde(default)]
    pub active_only: bool,
}
