use anyhow::{anyhow, Context};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;

use crate::validation::rules::validate_max_licenses;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub read_database_url: Option<String>,
    pub feature_read_replica_enabled: bool,
    pub db_max_connections: u32,
    pub db_lock_timeout_ms: u64,
    pub time_zone: Tz,
    pub default_max_licenses: i32,
    pub bind_address: SocketAddr,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/compliance".to_string());

        let read_database_url = env::var("READ_DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let feature_read_replica_enabled =
            parse_bool("FEATURE_READ_REPLICA_ENABLED", false)?;

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .context("Invalid DB_MAX_CONNECTIONS value")?;
        if db_max_connections == 0 {
            return Err(anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }

        let db_lock_timeout_ms = env::var("DB_LOCK_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u64>()
            .context("Invalid DB_LOCK_TIMEOUT_MS value")?;

        let time_zone_name = env::var("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        let default_max_licenses = env::var("DEFAULT_MAX_LICENSES")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<i32>()
            .context("Invalid DEFAULT_MAX_LICENSES value")?;
        validate_max_licenses(default_max_licenses)
            .map_err(|_| anyhow!("DEFAULT_MAX_LICENSES out of range: {}", default_max_licenses))?;

        let bind_address = env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .context("Invalid BIND_ADDRESS value")?;

        Ok(Config {
            database_url,
            read_database_url,
            feature_read_replica_enabled,
            db_max_connections,
            db_lock_timeout_ms,
            time_zone,
            default_max_licenses,
            bind_address,
        })
    }

    pub fn enforcement(&self) -> EnforcementSettings {
        EnforcementSettings {
            lock_timeout_ms: self.db_lock_timeout_ms,
            default_max_licenses: self.default_max_licenses,
            time_zone: self.time_zone,
        }
    }
}

/// Subset of the configuration the enforcement services need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnforcementSettings {
    pub lock_timeout_ms: u64,
    pub default_max_licenses: i32,
    pub time_zone: Tz,
}

impl Default for EnforcementSettings {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5_000,
            default_max_licenses: 2,
            time_zone: chrono_tz::UTC,
        }
    }
}

fn parse_bool(key: &str, default: bool) -> anyhow::Result<bool> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => Err(anyhow!("Invalid {} value: {}", key, other)),
        },
    }
}
