//! Transaction management utilities for repositories.

use crate::error::ComplianceError;
use sqlx::postgres::PgTransaction;
use sqlx::PgPool;

/// Begin a new database transaction.
///
/// Returns a transaction handle that can be used for multiple database operations.
/// Commit it via [`commit_transaction`]; dropping it rolls back.
pub async fn begin_transaction(db: &PgPool) -> Result<PgTransaction<'static>, ComplianceError> {
    db.begin().await.map_err(ComplianceError::Database)
}

/// Begin a transaction for an enforcement write.
///
/// Row locks taken inside it wait at most `lock_timeout_ms` before the
/// statement fails, so a stuck writer cannot block callers indefinitely.
pub async fn begin_enforcement_transaction(
    db: &PgPool,
    lock_timeout_ms: u64,
) -> Result<PgTransaction<'static>, ComplianceError> {
    let mut tx = begin_transaction(db).await?;
    // SET does not accept bind parameters; the value is a plain integer.
    sqlx::query(&format!("SET LOCAL lock_timeout = {}", lock_timeout_ms))
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// Commit a transaction.
///
/// Commits all changes made within the transaction to the database.
pub async fn commit_transaction(tx: PgTransaction<'_>) -> Result<(), ComplianceError> {
    tx.commit().await.map_err(ComplianceError::Database)
}
