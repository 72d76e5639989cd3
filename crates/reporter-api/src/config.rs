//! Service configuration, read from the environment (after `.env`, which
//! the binary loads with dotenvy).
//!
//! | Variable | Default |
//! |---|---|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `8000` |
//! | `JWT_SECRET` | `dev-secret-change-me` (set but empty is an error) |
//! | `CORS_ALLOWED_ORIGINS` | `*`, or a comma-separated origin list |
//! | `TOKEN_TTL_HOURS` | `24` |

use axum::http::HeaderValue;
use chrono::Duration;
use thiserror::Error;

/// Signing secret used when `JWT_SECRET` is unset. Fine for local runs only.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("JWT_SECRET is set but empty")]
    EmptySecret,
    #[error("invalid origin in CORS_ALLOWED_ORIGINS: {0:?}")]
    InvalidOrigin(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl AllowedOrigins {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim() == "*" {
            return Ok(Self::Any);
        }
        raw.split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|o| HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidOrigin(o.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::List)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub allowed_origins: AllowedOrigins,
    pub token_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset,
    /// except for `JWT_SECRET`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                expected: "a port number",
                value: raw,
            })?,
            None => 8000,
        };

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if secret.trim().is_empty() => return Err(ConfigError::EmptySecret),
            Some(secret) => secret,
            None => DEV_JWT_SECRET.to_string(),
        };

        let allowed_origins =
            AllowedOrigins::parse(&var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".into()))?;

        let ttl_hours: i64 = match var("TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse()
                .ok()
                .filter(|h| *h > 0)
                .ok_or(ConfigError::Invalid {
                    key: "TOKEN_TTL_HOURS",
                    expected: "a positive number of hours",
                    value: raw,
                })?,
            None => 24,
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            allowed_origins,
            token_ttl: Duration::hours(ttl_hours),
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
