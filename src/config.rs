// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Runtime Configuration
//!
//! Configuration is read from the environment exactly once, in `main`,
//! into an explicit [`AppConfig`] that is injected into the components
//! that need it. No component performs ambient environment lookups.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `DATA_DIR` | Directory holding the redb database file | `./data` |
//! | `JWT_SECRET` | HS256 token signing secret | Required |
//! | `BCRYPT_COST` | bcrypt cost factor for password hashing | `10` |
//! | `FCM_SERVER_KEY` | FCM server key; push disabled when unset | Optional |
//! | `FCM_API_URL` | FCM endpoint override (testing) | FCM default |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;

/// Application configuration, built once at startup.
///
/// The token time-to-live is intentionally not configurable; see
/// [`crate::auth::TOKEN_TTL_SECS`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server bind address.
    pub host: String,
    /// Server bind port.
    pub port: u16,
    /// Directory holding the database file.
    pub data_dir: PathBuf,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    /// bcrypt cost factor for password hashing.
    pub bcrypt_cost: u32,
    /// FCM server key; `None` disables push dispatch.
    pub fcm_server_key: Option<String>,
    /// FCM endpoint override for tests.
    pub fcm_api_url: Option<String>,
    /// Logging format, `json` or `pretty`.
    pub log_format: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

impl AppConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", "0.0.0.0");
        let port = parse_env("PORT", 3000)?;
        let data_dir = PathBuf::from(env_or_default("DATA_DIR", "./data"));
        let jwt_secret = env_required("JWT_SECRET")?;
        let bcrypt_cost = parse_env("BCRYPT_COST", 10)?;
        let fcm_server_key = env::var("FCM_SERVER_KEY").ok().filter(|v| !v.is_empty());
        let fcm_api_url = env::var("FCM_API_URL").ok().filter(|v| !v.is_empty());
        let log_format = env_or_default("LOG_FORMAT", "pretty");

        Ok(Self {
            host,
            port,
            data_dir,
            jwt_secret,
            bcrypt_cost,
            fcm_server_key,
            fcm_api_url,
            log_format,
        })
    }

    /// Path of the database file inside the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("ledger.redb")
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid(name, e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_joins_data_dir() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            data_dir: PathBuf::from("/tmp/gastos"),
            jwt_secret: "secret".to_string(),
            bcrypt_cost: 10,
            fcm_server_key: None,
            fcm_api_url: None,
            log_format: "pretty".to_string(),
        };
        assert_eq!(config.database_path(), PathBuf::from("/tmp/gastos/ledger.redb"));
    }

    #[test]
    fn env_or_default_falls_back_when_unset() {
        assert_eq!(env_or_default("GASTO_LEDGER_UNSET_VAR", "pretty"), "pretty");
    }
}
