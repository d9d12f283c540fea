//! Qualifier repository.

use chrono::Utc;
use sqlx::{PgConnection, PgExecutor};

use crate::models::qualifier::Qualifier;
use crate::types::QualifierId;

const TABLE_NAME: &str = "qualifiers";
const SELECT_COLUMNS: &str = "id, qualifier_code, account_id, max_licenses_allowed, \
     license_number, license_type, license_expiration_date, is_active, extensions, \
     created_at, updated_at";

pub const ACCOUNT_CONSTRAINT: &str = "qualifiers_account_id_key";

#[derive(Debug, Default, Clone, Copy)]
pub struct QualifierRepository;

impl QualifierRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create(
        &self,
        conn: &mut PgConnection,
        item: &Qualifier,
    ) -> Result<Qualifier, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (id, qualifier_code, account_id, max_licenses_allowed, license_number, \
             license_type, license_expiration_date, is_active, extensions, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, Qualifier>(&query)
            .bind(item.id)
            .bind(&item.qualifier_code)
            .bind(item.account_id)
            .bind(item.max_licenses_allowed)
            .bind(&item.license_number)
            .bind(&item.license_type)
            .bind(item.license_expiration_date)
            .bind(item.is_active)
            .bind(&item.extensions)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id<'e, E>(
        &self,
        db: E,
        id: QualifierId,
    ) -> Result<Option<Qualifier>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {} FROM {} WHERE id = $1", SELECT_COLUMNS, TABLE_NAME);
        sqlx::query_as::<_, Qualifier>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Takes the row lock that serializes every capacity-affecting write for
    /// this qualifier. Held until commit or rollback.
    pub async fn lock_for_update(
        &self,
        conn: &mut PgConnection,
        id: QualifierId,
    ) -> Result<Option<Qualifier>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
            SELECT_COLUMNS, TABLE_NAME
        );
        sqlx::query_as::<_, Qualifier>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn update_capacity(
        &self,
        conn: &mut PgConnection,
        id: QualifierId,
        max_licenses_allowed: i32,
    ) -> Result<Qualifier, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET max_licenses_allowed = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, Qualifier>(&query)
            .bind(id)
            .bind(max_licenses_allowed)
            .bind(Utc::now())
            .fetch_one(conn)
            .await
    }

    pub async fn deactivate(
        &self,
        conn: &mut PgConnection,
        id: QualifierId,
    ) -> Result<Qualifier, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET is_active = FALSE, updated_at = $2 WHERE id = $1 RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, Qualifier>(&query)
            .bind(id)
            .bind(Utc::now())
            .fetch_one(conn)
            .await
    }
}
