//! Registry of licensed businesses and qualifiers.

use sqlx::PgPool;

use crate::config::EnforcementSettings;
use crate::error::ComplianceError;
use crate::models::business::{LicensedBusiness, RegisterBusinessPayload, UpdateLicensePayload};
use crate::models::qualifier::{Qualifier, RegisterQualifierPayload};
use crate::repositories::business::LICENSE_NUMBER_CONSTRAINT;
use crate::repositories::qualifier::ACCOUNT_CONSTRAINT;
use crate::repositories::transaction::{
    begin_enforcement_transaction, begin_transaction, commit_transaction,
};
use crate::repositories::{AssignmentRepository, BusinessRepository, QualifierRepository};
use crate::services::business_id::{next_business_id, IdPrefix};
use crate::services::capacity::{lock_qualifier, peak_concurrency};
use crate::services::overlap::DateRange;
use crate::types::{LicensedBusinessId, QualifierId};
use crate::utils::time::today_local;

#[derive(Debug, Clone)]
pub struct RegistryService {
    pool: PgPool,
    settings: EnforcementSettings,
}

impl RegistryService {
    pub fn new(pool: PgPool, settings: EnforcementSettings) -> Self {
        Self { pool, settings }
    }

    pub async fn register_business(
        &self,
        payload: RegisterBusinessPayload,
    ) -> Result<LicensedBusiness, ComplianceError> {
        if let (Some(issued), Some(expires)) =
            (payload.license_issue_date, payload.license_expiration_date)
        {
            if expires < issued {
                return Err(ComplianceError::validation(
                    "license_expiration_date: before_issue_date",
                ));
            }
        }

        let mut tx = begin_transaction(&self.pool).await?;
        let code = next_business_id(&mut *tx, IdPrefix::Business).await?;
        let business = BusinessRepository::new()
            .create(&mut tx, &LicensedBusiness::new(code, payload))
            .await
            .map_err(|err| {
                ComplianceError::unique_conflict(
                    err,
                    LICENSE_NUMBER_CONSTRAINT,
                    "License number already registered",
                )
            })?;
        commit_transaction(tx).await?;

        tracing::info!(
            business_id = %business.id,
            business_code = %business.business_code,
            "Business registered"
        );
        Ok(business)
    }

    /// License renewal or status change.
    pub async fn update_license(
        &self,
        id: LicensedBusinessId,
        payload: UpdateLicensePayload,
    ) -> Result<LicensedBusiness, ComplianceError> {
        let repo = BusinessRepository::new();
        let mut tx = begin_enforcement_transaction(&self.pool, self.settings.lock_timeout_ms).await?;
        let current = repo
            .lock_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Business not found".into()))?;

        if let (Some(issued), Some(expires)) =
            (current.license_issue_date, payload.license_expiration_date)
        {
            if expires < issued {
                return Err(ComplianceError::validation(
                    "license_expiration_date: before_issue_date",
                ));
            }
        }

        let updated = repo
            .update_license(&mut tx, id, payload.license_status, payload.license_expiration_date)
            .await?;
        commit_transaction(tx).await?;

        tracing::info!(
            business_id = %updated.id,
            from = current.license_status.as_str(),
            to = updated.license_status.as_str(),
            "Business license updated"
        );
        Ok(updated)
    }

    /// Soft delete. Refused while any assignment to the business is open.
    pub async fn deactivate_business(
        &self,
        id: LicensedBusinessId,
    ) -> Result<LicensedBusiness, ComplianceError> {
        let repo = BusinessRepository::new();
        let mut tx = begin_enforcement_transaction(&self.pool, self.settings.lock_timeout_ms).await?;
        let current = repo
            .lock_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Business not found".into()))?;
        if !current.is_active {
            return Err(ComplianceError::InvalidTransition(format!(
                "Business {} is already inactive",
                current.business_code
            )));
        }

        let open = AssignmentRepository::new()
            .count_open_for_business(&mut *tx, id)
            .await?;
        if open > 0 {
            return Err(ComplianceError::InvalidTransition(format!(
                "Business {} still has {} open assignment(s)",
                current.business_code, open
            )));
        }

        let business = repo.deactivate(&mut tx, id).await?;
        commit_transaction(tx).await?;
        tracing::info!(business_id = %business.id, "Business deactivated");
        Ok(business)
    }

    pub async fn get_business(
        &self,
        id: LicensedBusinessId,
    ) -> Result<LicensedBusiness, ComplianceError> {
        BusinessRepository::new()
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Business not found".into()))
    }

    pub async fn register_qualifier(
        &self,
        payload: RegisterQualifierPayload,
    ) -> Result<Qualifier, ComplianceError> {
        let mut tx = begin_transaction(&self.pool).await?;
        let code = next_business_id(&mut *tx, IdPrefix::Qualifier).await?;
        let qualifier = QualifierRepository::new()
            .create(
                &mut tx,
                &Qualifier::new(code, payload, self.settings.default_max_licenses),
            )
            .await
            .map_err(|err| {
                ComplianceError::unique_conflict(
                    err,
                    ACCOUNT_CONSTRAINT,
                    "Account is already registered as a qualifier",
                )
            })?;
        commit_transaction(tx).await?;

        tracing::info!(
            qualifier_id = %qualifier.id,
            qualifier_code = %qualifier.qualifier_code,
            max_licenses_allowed = qualifier.max_licenses_allowed,
            "Qualifier registered"
        );
        Ok(qualifier)
    }

    /// Changes the capacity limit under the qualifier lock.
    ///
    /// Lowering it below the peak number of assignments overlapping
    /// `[today, +inf)` would break the capacity invariant and is refused.
    pub async fn set_qualifier_capacity(
        &self,
        id: QualifierId,
        max_licenses_allowed: i32,
    ) -> Result<Qualifier, ComplianceError> {
        let mut tx = begin_enforcement_transaction(&self.pool, self.settings.lock_timeout_ms).await?;
        let lock = lock_qualifier(&mut tx, id).await?;
        let previous = lock.qualifier().max_licenses_allowed;

        let slots = AssignmentRepository::new()
            .slots_for_qualifier(&mut *tx, id, None)
            .await?;
        let window = DateRange::open_from(today_local(&self.settings.time_zone));
        let peak = peak_concurrency(&slots, &window);
        if peak > i64::from(max_licenses_allowed) {
            return Err(ComplianceError::InvalidTransition(format!(
                "Qualifier {} holds {} concurrent assignment(s); cannot lower capacity to {}",
                lock.qualifier().qualifier_code,
                peak,
                max_licenses_allowed
            )));
        }

        let qualifier = QualifierRepository::new()
            .update_capacity(&mut tx, id, max_licenses_allowed)
            .await?;
        commit_transaction(tx).await?;

        tracing::info!(
            qualifier_id = %qualifier.id,
            from = previous,
            to = qualifier.max_licenses_allowed,
            "Qualifier capacity changed"
        );
        Ok(qualifier)
    }

    /// Soft delete. Refused while the qualifier holds open assignments.
    pub async fn deactivate_qualifier(&self, id: QualifierId) -> Result<Qualifier, ComplianceError> {
        let mut tx = begin_enforcement_transaction(&self.pool, self.settings.lock_timeout_ms).await?;
        let lock = lock_qualifier(&mut tx, id).await?;
        let code = lock.qualifier().qualifier_code.clone();
        if !lock.qualifier().is_active {
            return Err(ComplianceError::InvalidTransition(format!(
                "Qualifier {} is already inactive",
                code
            )));
        }

        let open = AssignmentRepository::new()
            .count_open_for_qualifier(&mut *tx, id)
            .await?;
        if open > 0 {
            return Err(ComplianceError::InvalidTransition(format!(
                "Qualifier {} still has {} open assignment(s)",
                code, open
            )));
        }

        let qualifier = QualifierRepository::new().deactivate(&mut tx, id).await?;
        commit_transaction(tx).await?;
        tracing::info!(qualifier_id = %qualifier.id, "Qualifier deactivated");
        Ok(qualifier)
    }

    pub async fn get_qualifier(&self, id: QualifierId) -> Result<Qualifier, ComplianceError> {
        QualifierRepository::new()
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ComplianceError::NotFound("Qualifier not found".into()))
    }
}
