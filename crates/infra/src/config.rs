//! Process configuration, read from environment variables.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
pub const MAX_SESSION_TTL_DAYS: i64 = 365;
pub const DEFAULT_BCRYPT_COST: u32 = 12;
const DEV_JWT_SECRET: &str = "payables-dev-secret-change-me";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub session_ttl: Duration,
    pub bcrypt_cost: u32,
    /// Mark the session cookie `Secure`.
    pub cookie_secure: bool,
    /// Postgres connection string. Only honoured when built with the
    /// `postgres` feature.
    pub database_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset and blank variables take
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match var("BIND_ADDR") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::invalid("BIND_ADDR", &raw, e.to_string()))?,
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET is not set; using an insecure development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let session_ttl = match var("SESSION_TTL_DAYS") {
            Some(raw) => {
                let days: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::invalid("SESSION_TTL_DAYS", &raw, "expected a whole number of days"))?;
                if !(1..=MAX_SESSION_TTL_DAYS).contains(&days) {
                    return Err(ConfigError::invalid(
                        "SESSION_TTL_DAYS",
                        &raw,
                        format!("must be between 1 and {MAX_SESSION_TTL_DAYS}"),
                    ));
                }
                Duration::try_days(days)
                    .ok_or_else(|| ConfigError::invalid("SESSION_TTL_DAYS", &raw, "out of range"))?
            }
            None => Duration::days(DEFAULT_SESSION_TTL_DAYS),
        };

        let bcrypt_cost = match var("BCRYPT_COST") {
            Some(raw) => {
                let cost: u32 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::invalid("BCRYPT_COST", &raw, "expected an integer"))?;
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::invalid("BCRYPT_COST", &raw, "must be between 4 and 31"));
                }
                cost
            }
            None => DEFAULT_BCRYPT_COST,
        };

        let cookie_secure = match var("COOKIE_SECURE") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(ConfigError::invalid("COOKIE_SECURE", &raw, "expected true or false")),
            },
            None => false,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            session_ttl,
            bcrypt_cost,
            cookie_secure,
            database_url: var("DATABASE_URL"),
        })
    }
}

impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cookie_secure", &self.cookie_secure)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
