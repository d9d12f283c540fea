use std::str::FromStr;

use crate::error::AppError;

/// Parses a typed id taken from the request path.
pub fn parse_id<T: FromStr>(raw: &str, label: &str) -> Result<T, AppError> {
    T::from_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} ID", label)))
}
