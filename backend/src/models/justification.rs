use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::types::{AccountId, JustificationId};
use crate::validation::rules;

/// Rules an administrator may authorize an exception to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OverrideRule {
    CapacityLimit,
    OversightCutoff,
    AssignmentHistoryRetention,
}

impl OverrideRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideRule::CapacityLimit => "capacity_limit",
            OverrideRule::OversightCutoff => "oversight_cutoff",
            OverrideRule::AssignmentHistoryRetention => "assignment_history_retention",
        }
    }
}

/// Audit record of an approved exception to a compliance rule.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ComplianceJustification {
    pub id: JustificationId,
    pub justification_code: String,
    pub rule_violated: OverrideRule,
    pub reason: String,
    pub approved_by: AccountId,
    pub approved_at: DateTime<Utc>,
}

impl ComplianceJustification {
    pub fn new(
        justification_code: String,
        rule_violated: OverrideRule,
        reason: String,
        approved_by: AccountId,
    ) -> Self {
        Self {
            id: JustificationId::new(),
            justification_code,
            rule_violated,
            reason: reason.trim().to_string(),
            approved_by,
            approved_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordOverridePayload {
    pub rule_violated: OverrideRule,
    #[validate(
        length(min = 10, max = 4000),
        custom(function = "rules::validate_not_blank")
    )]
    pub reason: String,
    pub approver_id: AccountId,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct OverrideListQuery {
    #[serde(default)]
    pub rule: Option<OverrideRule>,
}
