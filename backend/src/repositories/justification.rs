use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};

use crate::models::justification::{ComplianceJustification, OverrideRule};
use crate::types::JustificationId;

pub const APPLICATION_PKEY: &str = "override_applications_pkey";

/// Table an override write landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideTarget {
    Assignments,
    OversightActions,
}

impl OverrideTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideTarget::Assignments => "assignments",
            OverrideTarget::OversightActions => "oversight_actions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideOperation {
    Create,
    Delete,
}

impl OverrideOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideOperation::Create => "create",
            OverrideOperation::Delete => "delete",
        }
    }
}

/// Row of `override_applications`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OverrideApplication {
    pub justification_id: JustificationId,
    pub target_table: String,
    pub target_id: String,
    pub operation: String,
    pub applied_at: DateTime<Utc>,
}

pub async fn insert_justification(
    conn: &mut PgConnection,
    justification: &ComplianceJustification,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO compliance_justifications \
         (id, justification_code, rule_violated, reason, approved_by, approved_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(justification.id)
    .bind(&justification.justification_code)
    .bind(justification.rule_violated)
    .bind(&justification.reason)
    .bind(justification.approved_by)
    .bind(justification.approved_at)
    .execute(conn)
    .await
    .map(|_| ())
}

pub async fn fetch_justification<'e, E>(
    db: E,
    id: JustificationId,
) -> Result<Option<ComplianceJustification>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ComplianceJustification>(
        "SELECT id, justification_code, rule_violated, reason, approved_by, approved_at \
         FROM compliance_justifications WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list_justifications<'e, E>(
    db: E,
    rule: Option<OverrideRule>,
) -> Result<Vec<ComplianceJustification>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ComplianceJustification>(
        "SELECT id, justification_code, rule_violated, reason, approved_by, approved_at \
         FROM compliance_justifications \
         WHERE ($1::text IS NULL OR rule_violated = $1) \
         ORDER BY approved_at DESC, justification_code DESC",
    )
    .bind(rule.map(|r| r.as_str()))
    .fetch_all(db)
    .await
}

/// Records that `justification_id` authorized a write.
///
/// Fails with a unique violation on [`APPLICATION_PKEY`] if it was already used.
pub async fn insert_application(
    conn: &mut PgConnection,
    justification_id: JustificationId,
    target: OverrideTarget,
    target_id: &str,
    operation: OverrideOperation,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO override_applications \
         (justification_id, target_table, target_id, operation, applied_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(justification_id)
    .bind(target.as_str())
    .bind(target_id)
    .bind(operation.as_str())
    .bind(Utc::now())
    .execute(conn)
    .await
    .map(|_| ())
}

pub async fn fetch_application<'e, E>(
    db: E,
    justification_id: JustificationId,
) -> Result<Option<OverrideApplication>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, OverrideApplication>(
        "SELECT justification_id, target_table, target_id, operation, applied_at \
         FROM override_applications WHERE justification_id = $1",
    )
    .bind(justification_id)
    .fetch_optional(db)
    .await
}
