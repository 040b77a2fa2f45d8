// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the loader. Configuration is
//! read once at startup; a missing signing secret refuses startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HS256 signing secret | Required |
//! | `TOKEN_ISSUER` | `iss` claim written and checked | `backoffice-authority` |
//! | `TOKEN_TTL_SECS` | Access token and session lifetime | `3600` |
//! | `VERIFICATION_TOKEN_TTL_SECS` | Signup verification token lifetime | `86400` |
//! | `RESET_CODE_TTL_SECS` | Credential-recovery code lifetime | `300` |
//! | `BACKEND_TIMEOUT_MS` | Deadline for each ledger/store call | `2000` |
//! | `SESSION_CAPACITY` | In-memory ledger capacity | `100000` |
//! | `REDIS_URL` | Shared ledger (needs the `redis` feature) | Optional |
//! | `PUBLIC_BASE_URL` | Base of links sent by mail | `http://localhost:{PORT}` |
//! | `BOOTSTRAP_ADMIN_NAME` | First super-admin display name | `Super Admin` |
//! | `BOOTSTRAP_ADMIN_EMAIL` | First super-admin contact | Optional |
//! | `BOOTSTRAP_ADMIN_PASSWORD` | First super-admin secret | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::time::Duration;

use thiserror::Error;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const TOKEN_ISSUER_ENV: &str = "TOKEN_ISSUER";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const VERIFICATION_TTL_ENV: &str = "VERIFICATION_TOKEN_TTL_SECS";
pub const RESET_CODE_TTL_ENV: &str = "RESET_CODE_TTL_SECS";
pub const BACKEND_TIMEOUT_ENV: &str = "BACKEND_TIMEOUT_MS";
pub const SESSION_CAPACITY_ENV: &str = "SESSION_CAPACITY";
pub const REDIS_URL_ENV: &str = "REDIS_URL";
pub const PUBLIC_BASE_URL_ENV: &str = "PUBLIC_BASE_URL";
pub const BOOTSTRAP_NAME_ENV: &str = "BOOTSTRAP_ADMIN_NAME";
pub const BOOTSTRAP_EMAIL_ENV: &str = "BOOTSTRAP_ADMIN_EMAIL";
pub const BOOTSTRAP_PASSWORD_ENV: &str = "BOOTSTRAP_ADMIN_PASSWORD";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_ISSUER: &str = "backoffice-authority";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
pub const DEFAULT_VERIFICATION_TTL_SECS: u64 = 86_400;
pub const DEFAULT_RESET_CODE_TTL_SECS: u64 = 300;
pub const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 2000;

/// Upper bound for every `*_TTL_SECS` value (one year).
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;
pub const DEFAULT_SESSION_CAPACITY: usize = 100_000;
pub const DEFAULT_BOOTSTRAP_NAME: &str = "Super Admin";

/// Secrets shorter than this are accepted with a warning.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Credentials for seeding the first super-admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_issuer: String,
    pub token_ttl: Duration,
    pub verification_ttl: Duration,
    pub reset_code_ttl: Duration,
    pub backend_timeout: Duration,
    pub session_capacity: usize,
    pub redis_url: Option<String>,
    pub public_base_url: String,
    pub bootstrap: Option<BootstrapAdmin>,
}

impl AuthorityConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        let port = parse_or(&get, PORT_ENV, DEFAULT_PORT)?;
        let token_ttl = parse_or(&get, TOKEN_TTL_ENV, DEFAULT_TOKEN_TTL_SECS)?;
        let verification_ttl = parse_or(&get, VERIFICATION_TTL_ENV, DEFAULT_VERIFICATION_TTL_SECS)?;
        let reset_code_ttl = parse_or(&get, RESET_CODE_TTL_ENV, DEFAULT_RESET_CODE_TTL_SECS)?;
        let backend_timeout = parse_or(&get, BACKEND_TIMEOUT_ENV, DEFAULT_BACKEND_TIMEOUT_MS)?;
        let session_capacity = parse_or(&get, SESSION_CAPACITY_ENV, DEFAULT_SESSION_CAPACITY)?;

        for (var, value) in [
            (TOKEN_TTL_ENV, token_ttl),
            (VERIFICATION_TTL_ENV, verification_ttl),
            (RESET_CODE_TTL_ENV, reset_code_ttl),
            (BACKEND_TIMEOUT_ENV, backend_timeout),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    var,
                    value: "0".to_string(),
                });
            }
        }

        for (var, value) in [
            (TOKEN_TTL_ENV, token_ttl),
            (VERIFICATION_TTL_ENV, verification_ttl),
            (RESET_CODE_TTL_ENV, reset_code_ttl),
        ] {
            if value > MAX_TTL_SECS {
                return Err(ConfigError::Invalid {
                    var,
                    value: value.to_string(),
                });
            }
        }

        let bootstrap = match (get(BOOTSTRAP_EMAIL_ENV), get(BOOTSTRAP_PASSWORD_ENV)) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                name: get(BOOTSTRAP_NAME_ENV).unwrap_or_else(|| DEFAULT_BOOTSTRAP_NAME.to_string()),
                email,
                password,
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(BOOTSTRAP_PASSWORD_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(BOOTSTRAP_EMAIL_ENV)),
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            jwt_secret,
            token_issuer: get(TOKEN_ISSUER_ENV).unwrap_or_else(|| DEFAULT_TOKEN_ISSUER.to_string()),
            token_ttl: Duration::from_secs(token_ttl),
            verification_ttl: Duration::from_secs(verification_ttl),
            reset_code_ttl: Duration::from_secs(reset_code_ttl),
            backend_timeout: Duration::from_millis(backend_timeout),
            session_capacity,
            redis_url: get(REDIS_URL_ENV),
            public_base_url: get(PUBLIC_BASE_URL_ENV)
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            bootstrap,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn weak_secret(&self) -> bool {
        self.jwt_secret.len() < RECOMMENDED_SECRET_LEN
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
