use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::ExtensionMap;
use crate::types::LicensedBusinessId;
use crate::validation::rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Revoked,
}

impl LicenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Active => "active",
            LicenseStatus::Inactive => "inactive",
            LicenseStatus::Suspended => "suspended",
            LicenseStatus::Revoked => "revoked",
        }
    }
}

/// A regulated business that must be qualified by a qualifier.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LicensedBusiness {
    pub id: LicensedBusinessId,
    /// Immutable human-readable identifier (`BUS-00001`).
    pub business_code: String,
    pub name: String,
    pub license_number: String,
    pub license_status: LicenseStatus,
    pub license_issue_date: Option<NaiveDate>,
    pub license_expiration_date: Option<NaiveDate>,
    pub is_active: bool,
    #[schema(value_type = Object)]
    pub extensions: Json<ExtensionMap>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LicensedBusiness {
    pub fn new(business_code: String, payload: RegisterBusinessPayload) -> Self {
        let now = Utc::now();
        Self {
            id: LicensedBusinessId::new(),
            business_code,
            name: payload.name.trim().to_string(),
            license_number: payload.license_number.trim().to_string(),
            license_status: payload.license_status.unwrap_or_default(),
            license_issue_date: payload.license_issue_date,
            license_expiration_date: payload.license_expiration_date,
            is_active: true,
            extensions: Json(payload.extensions),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterBusinessPayload {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "rules::validate_not_blank")
    )]
    pub name: String,
    #[validate(custom(function = "rules::validate_license_number"))]
    pub license_number: String,
    #[serde(default)]
    pub license_status: Option<LicenseStatus>,
    #[serde(default)]
    pub license_issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub license_expiration_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(custom(function = "rules::validate_extension_keys"))]
    #[schema(value_type = Object)]
    pub extensions: ExtensionMap,
}

/// License renewal or status change.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateLicensePayload {
    pub license_status: LicenseStatus,
    #[serde(default)]
    pub license_expiration_date: Option<NaiveDate>,
}
