//! Sequential human-readable identifiers (`BUS-00001`).
//!
//! Each prefix owns a PostgreSQL sequence. `nextval` is not rolled back with
//! the surrounding transaction, so concurrent callers never share a value and
//! an aborted insert leaves a gap instead of a reusable id.

use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

const DIGITS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdPrefix {
    Business,
    Qualifier,
    Assignment,
    OversightAction,
    Justification,
}

impl IdPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Business => "BUS",
            IdPrefix::Qualifier => "QLF",
            IdPrefix::Assignment => "ASN",
            IdPrefix::OversightAction => "OA",
            IdPrefix::Justification => "CJ",
        }
    }

    fn sequence_name(&self) -> &'static str {
        match self {
            IdPrefix::Business => "business_code_seq_bus",
            IdPrefix::Qualifier => "business_code_seq_qlf",
            IdPrefix::Assignment => "business_code_seq_asn",
            IdPrefix::OversightAction => "business_code_seq_oa",
            IdPrefix::Justification => "business_code_seq_cj",
        }
    }
}

/// Formats `value` as `PREFIX-00001`. Values past five digits widen.
pub fn format_business_id(prefix: IdPrefix, value: i64) -> String {
    format!("{}-{:0width$}", prefix.as_str(), value, width = DIGITS)
}

/// Draws the next identifier for `prefix`.
pub async fn next_business_id<'e, E>(db: E, prefix: IdPrefix) -> Result<String, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let value = sqlx::query_scalar::<_, i64>("SELECT nextval($1::regclass)")
        .bind(prefix.sequence_name())
        .fetch_one(db)
        .await?;
    Ok(format_business_id(prefix, value))
}
