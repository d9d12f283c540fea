use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::types::{
    AccountId, AssignmentId, JustificationId, LicensedBusinessId, OversightActionId, ProjectId,
    QualifierId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OversightActionType {
    SiteVisit,
    PlanReview,
    PermitReview,
    ClientMeeting,
    Inspection,
    PhoneConsultation,
    DocumentReview,
    Other,
}

/// Append-only record of a supervisory event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OversightAction {
    pub id: OversightActionId,
    pub action_code: String,
    pub project_id: ProjectId,
    pub business_id: LicensedBusinessId,
    pub qualifier_id: QualifierId,
    /// Assignment the action was recorded under, if it still exists.
    pub assignment_id: Option<AssignmentId>,
    pub action_type: OversightActionType,
    pub action_date: NaiveDate,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub attendees: Json<Vec<String>>,
    #[schema(value_type = Vec<String>)]
    pub photos: Json<Vec<String>>,
    pub notes: Option<String>,
    /// Set when the action was recorded without an assignment link.
    pub needs_reconciliation: bool,
    pub override_justification_id: Option<JustificationId>,
    pub created_by: AccountId,
    pub created_at: DateTime<Utc>,
}

impl OversightAction {
    pub fn new(action_code: String, payload: RecordOversightActionPayload) -> Self {
        Self {
            id: OversightActionId::new(),
            action_code,
            project_id: payload.project_id,
            business_id: payload.business_id,
            qualifier_id: payload.qualifier_id,
            needs_reconciliation: payload.assignment_id.is_none(),
            assignment_id: payload.assignment_id,
            action_type: payload.action_type,
            action_date: payload.action_date,
            duration_minutes: payload.duration_minutes,
            location: payload.location,
            attendees: Json(payload.attendees),
            photos: Json(payload.photos),
            notes: payload.notes,
            override_justification_id: payload.override_justification_id,
            created_by: payload.created_by,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordOversightActionPayload {
    pub project_id: ProjectId,
    pub business_id: LicensedBusinessId,
    pub qualifier_id: QualifierId,
    #[serde(default)]
    pub assignment_id: Option<AssignmentId>,
    pub action_type: OversightActionType,
    pub action_date: NaiveDate,
    #[serde(default)]
    #[validate(range(min = 0, max = 1440))]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub attendees: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub photos: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
    pub created_by: AccountId,
    /// Justification authorizing a cutoff exception.
    #[serde(default)]
    pub override_justification_id: Option<JustificationId>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct OversightActionFilters {
    #[serde(default)]
    pub qualifier_id: Option<QualifierId>,
    #[serde(default)]
    pub business_id: Option<LicensedBusinessId>,
    #[serde(default)]
    pub assignment_id: Option<AssignmentId>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    /// Only actions still awaiting an assignment link.
    #[serde(default)]
    pub unreconciled_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(assignment_id: Option<AssignmentId>) -> RecordOversightActionPayload {
        RecordOversightActionPayload {
            project_id: ProjectId::new(),
            business_id: LicensedBusinessId::new(),
            qualifier_id: QualifierId::new(),
            assignment_id,
            action_type: OversightActionType::SiteVisit,
            action_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            duration_minutes: Some(90),
            location: Some("412 Oak St".into()),
            attendees: vec!["Site foreman".into()],
            photos: vec![],
            notes: None,
            created_by: AccountId::new(),
            override_justification_id: None,
        }
    }

    #[test]
    fn unlinked_action_is_flagged_for_reconciliation() {
        let action = OversightAction::new("OA-00001".into(), payload(None));
        assert!(action.needs_reconciliation);
        assert!(action.assignment_id.is_none());

        let linked = OversightAction::new("OA-00002".into(), payload(Some(AssignmentId::new())));
        assert!(!linked.needs_reconciliation);
    }

    #[test]
    fn payload_rejects_negative_duration() {
        let mut invalid = payload(None);
        invalid.duration_minutes = Some(-5);
        assert!(invalid.validate().is_err());
        assert!(payload(None).validate().is_ok());
    }
}
