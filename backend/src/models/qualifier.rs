use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::ExtensionMap;
use crate::types::{AccountId, LicensedBusinessId, QualifierId};
use crate::validation::rules;

/// A person authorized to qualify licensed businesses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Qualifier {
    pub id: QualifierId,
    /// Immutable human-readable identifier (`QLF-00001`).
    pub qualifier_code: String,
    pub account_id: AccountId,
    pub max_licenses_allowed: i32,
    pub license_number: Option<String>,
    pub license_type: Option<String>,
    pub license_expiration_date: Option<NaiveDate>,
    pub is_active: bool,
    #[schema(value_type = Object)]
    pub extensions: Json<ExtensionMap>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Qualifier {
    pub fn new(
        qualifier_code: String,
        payload: RegisterQualifierPayload,
        default_max_licenses: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: QualifierId::new(),
            qualifier_code,
            account_id: payload.account_id,
            max_licenses_allowed: payload
                .max_licenses_allowed
                .unwrap_or(default_max_licenses),
            license_number: payload.license_number.map(|n| n.trim().to_string()),
            license_type: payload.license_type,
            license_expiration_date: payload.license_expiration_date,
            is_active: true,
            extensions: Json(payload.extensions),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterQualifierPayload {
    pub account_id: AccountId,
    #[serde(default)]
    #[validate(range(min = 1, max = 50))]
    pub max_licenses_allowed: Option<i32>,
    #[serde(default)]
    #[validate(custom(function = "rules::validate_license_number"))]
    pub license_number: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub license_type: Option<String>,
    #[serde(default)]
    pub license_expiration_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(custom(function = "rules::validate_extension_keys"))]
    #[schema(value_type = Object)]
    pub extensions: ExtensionMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SetCapacityPayload {
    #[validate(range(min = 1, max = 50))]
    pub max_licenses_allowed: i32,
}

/// A business currently occupying one of the qualifier's slots.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActiveBusiness {
    pub business_id: LicensedBusinessId,
    pub business_code: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Capacity snapshot for display. Never used to gate a write.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QualifierCapacity {
    pub qualifier_id: QualifierId,
    pub current_count: i64,
    pub max_allowed: i32,
    pub available_slots: i64,
    pub at_capacity: bool,
    pub active_businesses: Vec<ActiveBusiness>,
}

impl QualifierCapacity {
    pub fn new(
        qualifier_id: QualifierId,
        max_allowed: i32,
        active_businesses: Vec<ActiveBusiness>,
    ) -> Self {
        let current_count = active_businesses.len() as i64;
        let available_slots = (i64::from(max_allowed) - current_count).max(0);
        Self {
            qualifier_id,
            current_count,
            max_allowed,
            available_slots,
            at_capacity: available_slots == 0,
            active_businesses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(max: Option<i32>) -> RegisterQualifierPayload {
        RegisterQualifierPayload {
            account_id: AccountId::new(),
            max_licenses_allowed: max,
            license_number: None,
            license_type: Some("General Building".into()),
            license_expiration_date: None,
            extensions: ExtensionMap::new(),
        }
    }

    #[test]
    fn new_qualifier_uses_default_capacity() {
        let qualifier = Qualifier::new("QLF-00001".into(), payload(None), 2);
        assert_eq!(qualifier.max_licenses_allowed, 2);
        assert!(qualifier.is_active);

        let qualifier = Qualifier::new("QLF-00002".into(), payload(Some(4)), 2);
        assert_eq!(qualifier.max_licenses_allowed, 4);
    }

    #[test]
    fn register_payload_rejects_zero_capacity() {
        assert!(payload(Some(0)).validate().is_err());
        assert!(payload(Some(3)).validate().is_ok());
    }

    #[test]
    fn capacity_snapshot_reports_available_slots() {
        let business = ActiveBusiness {
            business_id: LicensedBusinessId::new(),
            business_code: "BUS-00001".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
        };
        let snapshot = QualifierCapacity::new(QualifierId::new(), 2, vec![business.clone()]);
        assert_eq!(snapshot.current_count, 1);
        assert_eq!(snapshot.available_slots, 1);
        assert!(!snapshot.at_capacity);

        let full = QualifierCapacity::new(QualifierId::new(), 2, vec![business.clone(), business]);
        assert_eq!(full.available_slots, 0);
        assert!(full.at_capacity);
    }

    #[test]
    fn capacity_snapshot_never_reports_negative_slots() {
        let business = ActiveBusiness {
            business_id: LicensedBusinessId::new(),
            business_code: "BUS-00002".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
        };
        let snapshot =
            QualifierCapacity::new(QualifierId::new(), 1, vec![business.clone(), business]);
        assert_eq!(snapshot.available_slots, 0);
        assert!(snapshot.at_capacity);
    }
}
