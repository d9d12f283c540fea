//! Append-only oversight audit trail.

use sqlx::PgPool;

use crate::config::EnforcementSettings;
use crate::error::ComplianceError;
use crate::models::justification::OverrideRule;
use crate::models::oversight_action::{
    OversightAction, OversightActionFilters, RecordOversightActionPayload,
};
use crate::models::{PaginatedResponse, PaginationQuery};
use crate::repositories::justification::{OverrideOperation, OverrideTarget};
use crate::repositories::oversight_action as action_repo;
use crate::repositories::transaction::{begin_enforcement_transaction, commit_transaction};
use crate::repositories::{AssignmentRepository, BusinessRepository, QualifierRepository};
use crate::services::business_id::{next_business_id, IdPrefix};
use crate::services::cutoff::{predates_assignment, validate_oversight_action, CutoffOutcome};
use crate::services::override_ledger::{self, OVERRIDE_LOG_TARGET};
use crate::types::OversightActionId;

pub const RECONCILIATION_LOG_TARGET: &str = "compliance_reconciliation";

#[derive(Debug, Clone)]
pub struct OversightService {
    pool: PgPool,
    settings: EnforcementSettings,
}

impl OversightService {
    pub fn new(pool: PgPool, settings: EnforcementSettings) -> Self {
        Self { pool, settings }
    }

    pub async fn record(
        &self,
        payload: RecordOversightActionPayload,
    ) -> Result<OversightAction, ComplianceError> {
        let mut tx =
            begin_enforcement_transaction(&self.pool, self.settings.lock_timeout_ms).await?;

        if QualifierRepository::new()
            .find_by_id(&mut *tx, payload.qualifier_id)
            .await?
            .is_none()
        {
            return Err(ComplianceError::NotFound("Qualifier not found".into()));
        }
        if BusinessRepository::new()
            .find_by_id(&mut *tx, payload.business_id)
            .await?
            .is_none()
        {
            return Err(ComplianceError::NotFound("Business not found".into()));
        }

        // Share lock keeps the end and cutoff dates stable until commit.
        let assignment = match payload.assignment_id {
            Some(id) => {
                let assignment = AssignmentRepository::new()
                    .find_for_share(&mut tx, id)
                    .await?
                    .ok_or_else(|| ComplianceError::NotFound("Assignment not found".into()))?;
                if assignment.qualifier_id != payload.qualifier_id
                    || assignment.business_id != payload.business_id
                {
                    return Err(ComplianceError::validation(
                        "assignment_id: does_not_match_qualifier_and_business",
                    ));
                }
                Some(assignment)
            }
            None => None,
        };

        let justification = match payload.override_justification_id {
            Some(id) => Some(
                override_ledger::load_for_rule(&mut tx, id, OverrideRule::OversightCutoff).await?,
            ),
            None => None,
        };

        let outcome = match (
            validate_oversight_action(assignment.as_ref(), payload.action_date),
            justification.as_ref(),
        ) {
            (Ok(outcome), None) => outcome,
            (Ok(_), Some(_)) => {
                return Err(ComplianceError::validation(
                    "override_justification_id: not_required",
                ))
            }
            (Err(ComplianceError::CutoffViolation { .. }), Some(_)) => CutoffOutcome::Within,
            (Err(err), _) => return Err(err),
        };

        let predates = assignment
            .as_ref()
            .is_some_and(|assignment| predates_assignment(assignment, payload.action_date));

        let code = next_business_id(&mut *tx, IdPrefix::OversightAction).await?;
        let action = OversightAction::new(code, payload);
        action_repo::insert_oversight_action(&mut tx, &action).await?;

        if let Some(justification) = justification.as_ref() {
            override_ledger::claim(
                &mut tx,
                justification,
                OverrideTarget::OversightActions,
                &action.id.to_string(),
                OverrideOperation::Create,
            )
            .await?;
        }

        commit_transaction(tx).await?;

        if outcome == CutoffOutcome::Unlinked {
            tracing::warn!(
                target: RECONCILIATION_LOG_TARGET,
                action_id = %action.id,
                action_code = %action.action_code,
                qualifier_id = %action.qualifier_id,
                business_id = %action.business_id,
                action_date = %action.action_date,
                "Oversight action recorded without assignment link"
            );
        } else if predates {
            tracing::warn!(
                target: RECONCILIATION_LOG_TARGET,
                action_id = %action.id,
                action_code = %action.action_code,
                assignment_id = ?action.assignment_id,
                action_date = %action.action_date,
                "Oversight action dated before its assignment started"
            );
        } else if justification.is_some() {
            tracing::warn!(
                target: OVERRIDE_LOG_TARGET,
                action_id = %action.id,
                action_code = %action.action_code,
                assignment_id = ?action.assignment_id,
                action_date = %action.action_date,
                "Oversight action recorded past cutoff"
            );
        } else {
            tracing::info!(
                action_id = %action.id,
                action_code = %action.action_code,
                action_type = ?action.action_type,
                "Oversight action recorded"
            );
        }

        Ok(action)
    }

    pub async fn get(&self, id: OversightActionId) -> Result<OversightAction, ComplianceError> {
        action_repo::fetch_oversight_action(&self.pool, id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Oversight action not found".into()))
    }

    pub async fn list(
        &self,
        filters: &OversightActionFilters,
        page: &PaginationQuery,
    ) -> Result<PaginatedResponse<OversightAction>, ComplianceError> {
        if let (Some(from), Some(to)) = (filters.from, filters.to) {
            if from > to {
                return Err(ComplianceError::validation("from: after_to"));
            }
        }
        let (limit, offset) = (page.limit(), page.offset());
        let total = action_repo::count_oversight_actions(&self.pool, filters).await?;
        let data = action_repo::list_oversight_actions(&self.pool, filters, limit, offset).await?;
        Ok(PaginatedResponse::new(data, total, limit, offset))
    }
}
