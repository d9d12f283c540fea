//! Assignment repository.
//!
//! The relationship service is the only caller that writes through here; it
//! holds the qualifier lock while doing so.

use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, PgExecutor};

use crate::models::assignment::{Assignment, AssignmentSlot, RelationshipKind};
use crate::types::{AssignmentId, LicensedBusinessId, QualifierId};

const TABLE_NAME: &str = "assignments";
const SELECT_COLUMNS: &str = "id, assignment_code, qualifier_id, business_id, relationship_kind, \
     start_date, end_date, cutoff_date, notes, override_justification_id, created_at, updated_at";

#[derive(Debug, Default, Clone, Copy)]
pub struct AssignmentRepository;

impl AssignmentRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create(
        &self,
        conn: &mut PgConnection,
        item: &Assignment,
    ) -> Result<Assignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (id, assignment_code, qualifier_id, business_id, relationship_kind, \
             start_date, end_date, cutoff_date, notes, override_justification_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(item.id)
            .bind(&item.assignment_code)
            .bind(item.qualifier_id)
            .bind(item.business_id)
            .bind(item.relationship_kind)
            .bind(item.start_date)
            .bind(item.end_date)
            .bind(item.cutoff_date)
            .bind(&item.notes)
            .bind(item.override_justification_id)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id<'e, E>(
        &self,
        db: E,
        id: AssignmentId,
    ) -> Result<Option<Assignment>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {} FROM {} WHERE id = $1", SELECT_COLUMNS, TABLE_NAME);
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn lock_for_update(
        &self,
        conn: &mut PgConnection,
        id: AssignmentId,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
            SELECT_COLUMNS, TABLE_NAME
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Share lock: blocks a concurrent close until the caller commits.
    pub async fn find_for_share(
        &self,
        conn: &mut PgConnection,
        id: AssignmentId,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 FOR SHARE",
            SELECT_COLUMNS, TABLE_NAME
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// All assignments of a qualifier with their business codes, minus `exclude`.
    pub async fn slots_for_qualifier<'e, E>(
        &self,
        db: E,
        qualifier_id: QualifierId,
        exclude: Option<AssignmentId>,
    ) -> Result<Vec<AssignmentSlot>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, AssignmentSlot>(
            r#"
            SELECT a.id, a.business_id, b.business_code, a.start_date, a.end_date
            FROM assignments a
            JOIN licensed_businesses b ON b.id = a.business_id
            WHERE a.qualifier_id = $1
              AND ($2::text IS NULL OR a.id <> $2)
            ORDER BY a.start_date, a.assignment_code
            "#,
        )
        .bind(qualifier_id)
        .bind(exclude)
        .fetch_all(db)
        .await
    }

    pub async fn list_for_qualifier<'e, E>(
        &self,
        db: E,
        qualifier_id: QualifierId,
        active_only: bool,
    ) -> Result<Vec<Assignment>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {} FROM {} WHERE qualifier_id = $1 AND (NOT $2 OR end_date IS NULL) \
             ORDER BY start_date DESC, assignment_code DESC",
            SELECT_COLUMNS, TABLE_NAME
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(qualifier_id)
            .bind(active_only)
            .fetch_all(db)
            .await
    }

    pub async fn list_for_business<'e, E>(
        &self,
        db: E,
        business_id: LicensedBusinessId,
        active_only: bool,
    ) -> Result<Vec<Assignment>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {} FROM {} WHERE business_id = $1 AND (NOT $2 OR end_date IS NULL) \
             ORDER BY start_date DESC, assignment_code DESC",
            SELECT_COLUMNS, TABLE_NAME
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(business_id)
            .bind(active_only)
            .fetch_all(db)
            .await
    }

    pub async fn count_open_for_business<'e, E>(
        &self,
        db: E,
        business_id: LicensedBusinessId,
    ) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM assignments WHERE business_id = $1 AND end_date IS NULL",
        )
        .bind(business_id)
        .fetch_one(db)
        .await
    }

    pub async fn count_open_for_qualifier<'e, E>(
        &self,
        db: E,
        qualifier_id: QualifierId,
    ) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM assignments WHERE qualifier_id = $1 AND end_date IS NULL",
        )
        .bind(qualifier_id)
        .fetch_one(db)
        .await
    }

    /// Updates the mutable fields of an open assignment.
    pub async fn update_open(
        &self,
        conn: &mut PgConnection,
        id: AssignmentId,
        start_date: NaiveDate,
        relationship_kind: RelationshipKind,
        notes: Option<&str>,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET start_date = $2, relationship_kind = $3, notes = $4, updated_at = $5 \
             WHERE id = $1 AND end_date IS NULL RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .bind(start_date)
            .bind(relationship_kind)
            .bind(notes)
            .bind(Utc::now())
            .fetch_optional(conn)
            .await
    }

    /// Sets the end date (and optionally the cutoff) of an open assignment.
    ///
    /// Returns `None` when the row was already closed.
    pub async fn close(
        &self,
        conn: &mut PgConnection,
        id: AssignmentId,
        end_date: NaiveDate,
        cutoff_date: Option<NaiveDate>,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET end_date = $2, cutoff_date = COALESCE(cutoff_date, $3), updated_at = $4 \
             WHERE id = $1 AND end_date IS NULL RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .bind(end_date)
            .bind(cutoff_date)
            .bind(Utc::now())
            .fetch_optional(conn)
            .await
    }

    pub async fn delete(
        &self,
        conn: &mut PgConnection,
        id: AssignmentId,
    ) -> Result<u64, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE id = $1", TABLE_NAME);
        sqlx::query(&query)
            .bind(id)
            .execute(conn)
            .await
            .map(|res| res.rows_affected())
    }
}
