//! Compliance override ledger.
//!
//! A rule may only be bypassed by a justification recorded here first. Each
//! justification authorizes exactly one write; the claim is stored in
//! `override_applications`, whose primary key rejects a second use.

use sqlx::{PgConnection, PgPool};

use crate::error::ComplianceError;
use crate::models::justification::{
    ComplianceJustification, OverrideRule, RecordOverridePayload,
};
use crate::repositories::justification::{
    self as justification_repo, OverrideOperation, OverrideTarget, APPLICATION_PKEY,
};
use crate::repositories::transaction::{begin_transaction, commit_transaction};
use crate::services::business_id::{next_business_id, IdPrefix};
use crate::types::JustificationId;

pub const OVERRIDE_LOG_TARGET: &str = "compliance_override";

#[derive(Debug, Clone)]
pub struct OverrideLedger {
    pool: PgPool,
}

impl OverrideLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record_override(
        &self,
        payload: RecordOverridePayload,
    ) -> Result<ComplianceJustification, ComplianceError> {
        let mut tx = begin_transaction(&self.pool).await?;
        let code = next_business_id(&mut *tx, IdPrefix::Justification).await?;
        let justification = ComplianceJustification::new(
            code,
            payload.rule_violated,
            payload.reason,
            payload.approver_id,
        );
        justification_repo::insert_justification(&mut tx, &justification).await?;
        commit_transaction(tx).await?;

        tracing::warn!(
            target: OVERRIDE_LOG_TARGET,
            justification_id = %justification.id,
            justification_code = %justification.justification_code,
            rule = justification.rule_violated.as_str(),
            approved_by = %justification.approved_by,
            "Compliance override approved"
        );
        Ok(justification)
    }

    pub async fn get(&self, id: JustificationId) -> Result<ComplianceJustification, ComplianceError> {
        justification_repo::fetch_justification(&self.pool, id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Justification not found".into()))
    }

    pub async fn list(
        &self,
        rule: Option<OverrideRule>,
    ) -> Result<Vec<ComplianceJustification>, ComplianceError> {
        Ok(justification_repo::list_justifications(&self.pool, rule).await?)
    }
}

/// Loads a justification and checks it covers `rule`.
pub async fn load_for_rule(
    conn: &mut PgConnection,
    id: JustificationId,
    rule: OverrideRule,
) -> Result<ComplianceJustification, ComplianceError> {
    let justification = justification_repo::fetch_justification(&mut *conn, id)
        .await?
        .ok_or_else(|| ComplianceError::NotFound("Justification not found".into()))?;
    if justification.rule_violated != rule {
        return Err(ComplianceError::Validation(vec![format!(
            "override_justification_id: covers {} not {}",
            justification.rule_violated.as_str(),
            rule.as_str()
        )]));
    }
    Ok(justification)
}

/// Marks `justification` as spent by the write to `target_id`.
pub async fn claim(
    conn: &mut PgConnection,
    justification: &ComplianceJustification,
    target: OverrideTarget,
    target_id: &str,
    operation: OverrideOperation,
) -> Result<(), ComplianceError> {
    justification_repo::insert_application(conn, justification.id, target, target_id, operation)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.constraint() == Some(APPLICATION_PKEY) => {
                ComplianceError::InvalidTransition(format!(
                    "Justification {} has already been applied",
                    justification.justification_code
                ))
            }
            _ => ComplianceError::Database(err),
        })?;

    tracing::warn!(
        target: OVERRIDE_LOG_TARGET,
        justification_id = %justification.id,
        justification_code = %justification.justification_code,
        rule = justification.rule_violated.as_str(),
        table = target.as_str(),
        row_id = target_id,
        operation = operation.as_str(),
        "Override write applied"
    );
    Ok(())
}
