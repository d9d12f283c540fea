//! Common validation rules shared across request payloads.

use validator::ValidationError;

/// Upper bound accepted for `max_licenses_allowed`.
pub const MAX_LICENSES_CEILING: i32 = 50;

/// Validates license number format.
///
/// Requirements:
/// - 3-40 characters after trimming
/// - Only ASCII alphanumerics, `-` and `/`
pub fn validate_license_number(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.len() < 3 || trimmed.len() > 40 {
        return Err(ValidationError::new("license_number_invalid_length"));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '/')
    {
        return Err(ValidationError::new("license_number_invalid_characters"));
    }
    Ok(())
}

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Validates a qualifier capacity limit.
pub fn validate_max_licenses(value: i32) -> Result<(), ValidationError> {
    if !(1..=MAX_LICENSES_CEILING).contains(&value) {
        return Err(ValidationError::new("max_licenses_out_of_range"));
    }
    Ok(())
}

/// Validates that every key of an extension map is a short snake_case token.
pub fn validate_extension_keys(
    map: &crate::models::ExtensionMap,
) -> Result<(), ValidationError> {
    let valid = map.keys().all(|key| {
        !key.is_empty()
            && key.len() <= 64
            && key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    });
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("extension_key_invalid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtensionMap;

    #[test]
    fn license_number_rejects_short_values() {
        assert!(validate_license_number("ab").is_err());
    }

    #[test]
    fn license_number_rejects_special_chars() {
        assert!(validate_license_number("CSLB#1234").is_err());
    }

    #[test]
    fn license_number_accepts_valid() {
        assert!(validate_license_number("CSLB-1029384").is_ok());
        assert!(validate_license_number(" B/12345 ").is_ok());
    }

    #[test]
    fn not_blank_rejects_whitespace() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank(" reason ").is_ok());
    }

    #[test]
    fn max_licenses_bounds() {
        assert!(validate_max_licenses(0).is_err());
        assert!(validate_max_licenses(1).is_ok());
        assert!(validate_max_licenses(MAX_LICENSES_CEILING).is_ok());
        assert!(validate_max_licenses(MAX_LICENSES_CEILING + 1).is_err());
    }

    #[test]
    fn extension_keys_must_be_snake_case() {
        let mut map = ExtensionMap::new();
        map.insert("bond_number".into(), serde_json::json!("B-1"));
        assert!(validate_extension_keys(&map).is_ok());

        map.insert("Bond Number".into(), serde_json::json!("B-2"));
        assert!(validate_extension_keys(&map).is_err());
    }
}
