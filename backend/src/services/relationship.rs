//! Relationship store: the only writer of assignment rows.
//!
//! Every write runs in one enforcement transaction that first locks the
//! qualifier row, then re-reads whatever it validates against.

use sqlx::PgPool;

use crate::config::EnforcementSettings;
use crate::error::ComplianceError;
use crate::models::assignment::{
    AssignQualifierPayload, Assignment, AssignmentRemoval, CloseAssignmentPayload,
    UpdateAssignmentPayload,
};
use crate::models::justification::OverrideRule;
use crate::models::qualifier::{ActiveBusiness, QualifierCapacity};
use crate::repositories::justification::{OverrideOperation, OverrideTarget};
use crate::repositories::oversight_action::{
    count_for_assignment, latest_attributed_action_date,
};
use crate::repositories::transaction::{begin_enforcement_transaction, commit_transaction};
use crate::repositories::{AssignmentRepository, BusinessRepository, QualifierRepository};
use crate::services::business_id::{next_business_id, IdPrefix};
use crate::services::capacity::{
    admit_assignment, lock_qualifier, validate_assignment, Admission, AssignmentProposal,
};
use crate::services::cutoff::close_keeps_actions_attributable;
use crate::services::override_ledger::{self, OVERRIDE_LOG_TARGET};
use crate::services::overlap::DateRange;
use crate::types::{AssignmentId, JustificationId, LicensedBusinessId, QualifierId};
use crate::utils::time::today_local;

#[derive(Debug, Clone)]
pub struct RelationshipStore {
    write_pool: PgPool,
    read_pool: PgPool,
    settings: EnforcementSettings,
}

impl RelationshipStore {
    pub fn new(write_pool: PgPool, read_pool: PgPool, settings: EnforcementSettings) -> Self {
        Self {
            write_pool,
            read_pool,
            settings,
        }
    }

    pub async fn assign_qualifier(
        &self,
        payload: AssignQualifierPayload,
    ) -> Result<Assignment, ComplianceError> {
        let date_errors = payload.date_errors();
        if !date_errors.is_empty() {
            return Err(ComplianceError::Validation(date_errors));
        }

        let mut tx =
            begin_enforcement_transaction(&self.write_pool, self.settings.lock_timeout_ms).await?;

        let lock = lock_qualifier(&mut tx, payload.qualifier_id).await?;
        if !lock.qualifier().is_active {
            return Err(ComplianceError::InvalidTransition(format!(
                "Qualifier {} is inactive",
                lock.qualifier().qualifier_code
            )));
        }

        let business = BusinessRepository::new()
            .find_for_share(&mut tx, payload.business_id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Business not found".into()))?;
        if !business.is_active {
            return Err(ComplianceError::InvalidTransition(format!(
                "Business {} is inactive",
                business.business_code
            )));
        }

        let justification = match payload.override_justification_id {
            Some(id) => {
                Some(override_ledger::load_for_rule(&mut tx, id, OverrideRule::CapacityLimit).await?)
            }
            None => None,
        };

        let proposal = AssignmentProposal {
            qualifier_id: payload.qualifier_id,
            business_id: payload.business_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
            exclude: None,
        };
        let admission = admit_assignment(&mut tx, &lock, &proposal, justification.as_ref()).await?;

        let code = next_business_id(&mut *tx, IdPrefix::Assignment).await?;
        let assignment = AssignmentRepository::new()
            .create(&mut tx, &Assignment::new(code, payload))
            .await
            .map_err(|err| {
                ComplianceError::from_constraint(err, proposal.qualifier_id, proposal.business_id)
            })?;

        if let Some(justification) = justification.as_ref() {
            override_ledger::claim(
                &mut tx,
                justification,
                OverrideTarget::Assignments,
                &assignment.id.to_string(),
                OverrideOperation::Create,
            )
            .await?;
        }

        commit_transaction(tx).await?;

        match admission {
            Admission::Admitted => tracing::info!(
                assignment_id = %assignment.id,
                assignment_code = %assignment.assignment_code,
                qualifier_id = %assignment.qualifier_id,
                business_id = %assignment.business_id,
                "Qualifier assigned"
            ),
            Admission::Overridden {
                current_count,
                max_allowed,
            } => tracing::warn!(
                target: OVERRIDE_LOG_TARGET,
                assignment_id = %assignment.id,
                assignment_code = %assignment.assignment_code,
                qualifier_id = %assignment.qualifier_id,
                current_count,
                max_allowed,
                "Qualifier assigned over capacity"
            ),
        }

        Ok(assignment)
    }

    /// Changes an open assignment and re-runs the capacity check without
    /// counting the assignment against itself.
    ///
    /// An assignment admitted through a capacity override keeps that
    /// admission as long as its window does not grow.
    pub async fn update_assignment(
        &self,
        id: AssignmentId,
        payload: UpdateAssignmentPayload,
    ) -> Result<Assignment, ComplianceError> {
        let repo = AssignmentRepository::new();
        let mut tx =
            begin_enforcement_transaction(&self.write_pool, self.settings.lock_timeout_ms).await?;

        // Qualifier first, then the assignment, matching assign_qualifier.
        let qualifier_id = repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Assignment not found".into()))?
            .qualifier_id;
        let lock = lock_qualifier(&mut tx, qualifier_id).await?;
        let current = repo
            .lock_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Assignment not found".into()))?;
        if !current.is_open() {
            return Err(ComplianceError::InvalidTransition(format!(
                "Assignment {} is closed and can no longer change",
                current.assignment_code
            )));
        }

        let start_date = payload.start_date.unwrap_or(current.start_date);
        if matches!(current.cutoff_date, Some(cutoff) if cutoff < start_date) {
            return Err(ComplianceError::validation("start_date: after_cutoff_date"));
        }

        let proposal = AssignmentProposal {
            qualifier_id: current.qualifier_id,
            business_id: current.business_id,
            start_date,
            end_date: current.end_date,
            exclude: Some(current.id),
        };
        match validate_assignment(&mut tx, &lock, &proposal).await {
            Ok(()) => {}
            Err(ComplianceError::CapacityExceeded { .. })
                if current.override_justification_id.is_some()
                    && start_date >= current.start_date => {}
            Err(err) => return Err(err),
        }

        let notes = payload.notes.as_deref().or(current.notes.as_deref());
        let updated = repo
            .update_open(
                &mut tx,
                id,
                start_date,
                payload.relationship_kind.unwrap_or(current.relationship_kind),
                notes,
            )
            .await?
            .ok_or_else(|| {
                ComplianceError::InvalidTransition("Assignment closed concurrently".into())
            })?;

        commit_transaction(tx).await?;
        tracing::info!(
            assignment_id = %updated.id,
            assignment_code = %updated.assignment_code,
            "Assignment updated"
        );
        Ok(updated)
    }

    /// Sets the end date. Once closed, the end and cutoff dates are frozen.
    pub async fn close_assignment(
        &self,
        id: AssignmentId,
        payload: CloseAssignmentPayload,
    ) -> Result<Assignment, ComplianceError> {
        let repo = AssignmentRepository::new();
        let mut tx =
            begin_enforcement_transaction(&self.write_pool, self.settings.lock_timeout_ms).await?;

        let current = repo
            .lock_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Assignment not found".into()))?;
        if !current.is_open() {
            return Err(ComplianceError::InvalidTransition(format!(
                "Assignment {} is already closed",
                current.assignment_code
            )));
        }
        if payload.end_date < current.start_date {
            return Err(ComplianceError::InvalidTransition(format!(
                "end_date {} is before start_date {}",
                payload.end_date, current.start_date
            )));
        }
        if let Some(cutoff) = payload.cutoff_date {
            if cutoff < current.start_date {
                return Err(ComplianceError::validation("cutoff_date: before_start_date"));
            }
            if current.cutoff_date.is_some_and(|existing| existing != cutoff) {
                return Err(ComplianceError::InvalidTransition(format!(
                    "Assignment {} already has a cutoff date",
                    current.assignment_code
                )));
            }
        }

        let cutoff_date = payload.cutoff_date.or(current.cutoff_date);
        let latest_action = latest_attributed_action_date(&mut *tx, id).await?;
        if !close_keeps_actions_attributable(payload.end_date, cutoff_date, latest_action) {
            return Err(ComplianceError::InvalidTransition(format!(
                "Assignment {} has oversight recorded on {}; it cannot end before that",
                current.assignment_code,
                latest_action.map(|d| d.to_string()).unwrap_or_default()
            )));
        }

        let closed = repo
            .close(&mut tx, id, payload.end_date, payload.cutoff_date)
            .await?
            .ok_or_else(|| ComplianceError::InvalidTransition("Assignment already closed".into()))?;

        commit_transaction(tx).await?;
        tracing::info!(
            assignment_id = %closed.id,
            assignment_code = %closed.assignment_code,
            end_date = %payload.end_date,
            cutoff_date = ?closed.cutoff_date,
            "Assignment closed"
        );
        Ok(closed)
    }

    /// Deletes assignment history under an `assignment_history_retention`
    /// justification. Dependent oversight actions keep their rows with the
    /// assignment link cleared.
    pub async fn remove_assignment(
        &self,
        id: AssignmentId,
        justification_id: JustificationId,
    ) -> Result<AssignmentRemoval, ComplianceError> {
        let repo = AssignmentRepository::new();
        let mut tx =
            begin_enforcement_transaction(&self.write_pool, self.settings.lock_timeout_ms).await?;

        let assignment = repo
            .lock_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Assignment not found".into()))?;
        let justification = override_ledger::load_for_rule(
            &mut tx,
            justification_id,
            OverrideRule::AssignmentHistoryRetention,
        )
        .await?;

        let detached_actions = count_for_assignment(&mut *tx, id).await?;
        repo.delete(&mut tx, id).await?;
        override_ledger::claim(
            &mut tx,
            &justification,
            OverrideTarget::Assignments,
            &id.to_string(),
            OverrideOperation::Delete,
        )
        .await?;

        commit_transaction(tx).await?;
        tracing::warn!(
            target: OVERRIDE_LOG_TARGET,
            assignment_id = %assignment.id,
            assignment_code = %assignment.assignment_code,
            detached_actions,
            "Assignment history removed"
        );

        Ok(AssignmentRemoval {
            assignment,
            justification_id,
            detached_actions,
        })
    }

    pub async fn get_assignment(&self, id: AssignmentId) -> Result<Assignment, ComplianceError> {
        AssignmentRepository::new()
            .find_by_id(&self.write_pool, id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Assignment not found".into()))
    }

    pub async fn list_for_qualifier(
        &self,
        qualifier_id: QualifierId,
        active_only: bool,
    ) -> Result<Vec<Assignment>, ComplianceError> {
        if QualifierRepository::new()
            .find_by_id(&self.write_pool, qualifier_id)
            .await?
            .is_none()
        {
            return Err(ComplianceError::NotFound("Qualifier not found".into()));
        }
        Ok(AssignmentRepository::new()
            .list_for_qualifier(&self.write_pool, qualifier_id, active_only)
            .await?)
    }

    pub async fn list_for_business(
        &self,
        business_id: LicensedBusinessId,
        active_only: bool,
    ) -> Result<Vec<Assignment>, ComplianceError> {
        if BusinessRepository::new()
            .find_by_id(&self.write_pool, business_id)
            .await?
            .is_none()
        {
            return Err(ComplianceError::NotFound("Business not found".into()));
        }
        Ok(AssignmentRepository::new()
            .list_for_business(&self.write_pool, business_id, active_only)
            .await?)
    }

    /// Display-only capacity snapshot read from the read pool.
    ///
    /// Counts assignments that overlap `[today, +inf)` in the configured
    /// time zone, so future-dated assignments already hold a slot.
    pub async fn get_qualifier_capacity(
        &self,
        qualifier_id: QualifierId,
    ) -> Result<QualifierCapacity, ComplianceError> {
        let qualifier = QualifierRepository::new()
            .find_by_id(&self.read_pool, qualifier_id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Qualifier not found".into()))?;

        let window = DateRange::open_from(today_local(&self.settings.time_zone));
        let active_businesses = AssignmentRepository::new()
            .slots_for_qualifier(&self.read_pool, qualifier_id, None)
            .await?
            .into_iter()
            .filter(|slot| slot.range().overlaps(&window))
            .map(|slot| ActiveBusiness {
                business_id: slot.business_id,
                business_code: slot.business_code,
                start_date: slot.start_date,
                end_date: slot.end_date,
            })
            .collect();

        Ok(QualifierCapacity::new(
            qualifier.id,
            qualifier.max_licenses_allowed,
            active_businesses,
        ))
    }
}
