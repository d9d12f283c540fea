//! Licensed business repository.
//!
//! Businesses are never hard-deleted; deactivation flips `is_active`.

use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, PgExecutor};

use crate::models::business::{LicenseStatus, LicensedBusiness};
use crate::types::LicensedBusinessId;

const TABLE_NAME: &str = "licensed_businesses";
const SELECT_COLUMNS: &str = "id, business_code, name, license_number, license_status, \
     license_issue_date, license_expiration_date, is_active, extensions, created_at, updated_at";

pub const LICENSE_NUMBER_CONSTRAINT: &str = "licensed_businesses_license_number_key";

#[derive(Debug, Default, Clone, Copy)]
pub struct BusinessRepository;

impl BusinessRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create(
        &self,
        conn: &mut PgConnection,
        item: &LicensedBusiness,
    ) -> Result<LicensedBusiness, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (id, business_code, name, license_number, license_status, \
             license_issue_date, license_expiration_date, is_active, extensions, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, LicensedBusiness>(&query)
            .bind(item.id)
            .bind(&item.business_code)
            .bind(&item.name)
            .bind(&item.license_number)
            .bind(item.license_status)
            .bind(item.license_issue_date)
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
        id: LicensedBusinessId,
    ) -> Result<Option<LicensedBusiness>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {} FROM {} WHERE id = $1", SELECT_COLUMNS, TABLE_NAME);
        sqlx::query_as::<_, LicensedBusiness>(&query)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Reads the business and holds a share lock until the transaction ends,
    /// so it cannot be deactivated underneath an assignment being written.
    pub async fn find_for_share(
        &self,
        conn: &mut PgConnection,
        id: LicensedBusinessId,
    ) -> Result<Option<LicensedBusiness>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 FOR SHARE",
            SELECT_COLUMNS, TABLE_NAME
        );
        sqlx::query_as::<_, LicensedBusiness>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn lock_for_update(
        &self,
        conn: &mut PgConnection,
        id: LicensedBusinessId,
    ) -> Result<Option<LicensedBusiness>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
            SELECT_COLUMNS, TABLE_NAME
        );
        sqlx::query_as::<_, LicensedBusiness>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn update_license(
        &self,
        conn: &mut PgConnection,
        id: LicensedBusinessId,
        status: LicenseStatus,
        expiration_date: Option<NaiveDate>,
    ) -> Result<LicensedBusiness, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET license_status = $2, \
             license_expiration_date = COALESCE($3, license_expiration_date), updated_at = $4 \
             WHERE id = $1 RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, LicensedBusiness>(&query)
            .bind(id)
            .bind(status)
            .bind(expiration_date)
            .bind(Utc::now())
            .fetch_one(conn)
            .await
    }

    pub async fn deactivate(
        &self,
        conn: &mut PgConnection,
        id: LicensedBusinessId,
    ) -> Result<LicensedBusiness, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET is_active = FALSE, updated_at = $2 WHERE id = $1 RETURNING {}",
            TABLE_NAME, SELECT_COLUMNS
        );
        sqlx::query_as::<_, LicensedBusiness>(&query)
            .bind(id)
            .bind(Utc::now())
            .fetch_one(conn)
            .await
    }
}
