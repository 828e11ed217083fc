// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup and then held
//! as immutable process-wide state (moved into the token service and the card
//! codec; never mutated afterwards).
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory for the redb database | unset (in-memory store) |
//! | `JWT_SECRET` | HS256 signing secret, at least 32 bytes | Required |
//! | `JWT_EXPIRATION_MS` | Token lifetime in milliseconds, a multiple of 1000 | `3600000` |
//! | `CARD_ENCRYPTION_SECRET` | Card number encryption secret, at least 16 bytes | Required |
//! | `AUTH_ALLOWLIST` | Comma-separated path prefixes served without authentication | `/api/auth,/swagger-ui,/v3/api-docs,/health` |
//! | `SEED_ADMIN_USERNAME` | Admin account created at startup if missing | Optional |
//! | `SEED_ADMIN_PASSWORD` | Password for the seeded admin | Required with `SEED_ADMIN_USERNAME` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the database directory.
///
/// When unset the server runs on the in-memory store and loses all data on
/// restart.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_EXPIRATION_ENV: &str = "JWT_EXPIRATION_MS";
pub const CARD_SECRET_ENV: &str = "CARD_ENCRYPTION_SECRET";
pub const AUTH_ALLOWLIST_ENV: &str = "AUTH_ALLOWLIST";
pub const SEED_ADMIN_USERNAME_ENV: &str = "SEED_ADMIN_USERNAME";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Default token lifetime (one hour).
pub const DEFAULT_TOKEN_LIFETIME_MS: i64 = 3_600_000;

/// HS256 keys shorter than the hash output are rejected.
pub const MIN_SIGNING_SECRET_LEN: usize = 32;

pub const MIN_CARD_SECRET_LEN: usize = 16;

/// Path prefixes that skip authentication: login/registration and API docs.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &["/api/auth", "/swagger-ui", "/v3/api-docs", "/health"];

/// File name of the redb database inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "bankcards.redb";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{var} must be at least {min} bytes long")]
    SecretTooShort { var: &'static str, min: usize },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Credentials for the admin account seeded at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Fully validated application configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: Option<PathBuf>,
    pub jwt_secret: String,
    pub token_lifetime: Duration,
    pub card_secret: String,
    pub public_paths: Vec<String>,
    pub seed_admin: Option<SeedAdmin>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("token_lifetime", &self.token_lifetime)
            .field("public_paths", &self.public_paths)
            .field("seed_admin", &self.seed_admin)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match non_empty(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        let jwt_secret = non_empty(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if jwt_secret.len() < MIN_SIGNING_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                var: JWT_SECRET_ENV,
                min: MIN_SIGNING_SECRET_LEN,
            });
        }

        let card_secret = non_empty(CARD_SECRET_ENV).ok_or(ConfigError::Missing(CARD_SECRET_ENV))?;
        if card_secret.len() < MIN_CARD_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                var: CARD_SECRET_ENV,
                min: MIN_CARD_SECRET_LEN,
            });
        }

        let lifetime_ms = match non_empty(JWT_EXPIRATION_ENV) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                var: JWT_EXPIRATION_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_TOKEN_LIFETIME_MS,
        };
        // Token timestamps are whole seconds.
        if lifetime_ms < 1_000 || lifetime_ms % 1_000 != 0 {
            return Err(ConfigError::Invalid {
                var: JWT_EXPIRATION_ENV,
                reason: "token lifetime must be a positive whole number of seconds (multiple of 1000 ms)"
                    .to_string(),
            });
        }
        let token_lifetime =
            Duration::try_milliseconds(lifetime_ms).ok_or_else(|| ConfigError::Invalid {
                var: JWT_EXPIRATION_ENV,
                reason: "token lifetime out of range".to_string(),
            })?;

        let public_paths = match non_empty(AUTH_ALLOWLIST_ENV) {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
        };

        let seed_admin = match non_empty(SEED_ADMIN_USERNAME_ENV) {
            Some(username) => {
                let password = non_empty(SEED_ADMIN_PASSWORD_ENV)
                    .ok_or(ConfigError::Missing(SEED_ADMIN_PASSWORD_ENV))?;
                Some(SeedAdmin { username, password })
            }
            None => None,
        };

        let log_format = match non_empty(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        Ok(Self {
            host,
            port,
            data_dir: non_empty(DATA_DIR_ENV).map(PathBuf::from),
            jwt_secret,
            token_lifetime,
            card_secret,
            public_paths,
            seed_admin,
            log_format,
        })
    }

    /// Parse the bind address from `host` and `port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: HOST_ENV,
                reason: e.to_string(),
            })
    }

    /// Path of the redb database file, if persistence is enabled.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(DATABASE_FILE))
    }
}
