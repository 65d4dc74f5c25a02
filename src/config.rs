// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup. Secrets are
//! never embedded in source; missing required variables abort startup
//! before any request is served.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `HMAC_SECRET` | Pre-shared secret gating mutating requests | Required |
//! | `KEYSTORE_PATH` | Path to the encrypted keystore (V3 JSON) | Required |
//! | `KEYSTORE_PASSPHRASE` | Passphrase for the keystore | Required |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the HMAC pre-shared secret.
///
/// The secret authenticates the exchange frontend to this service; every
/// mutating request must carry an `X-HMAC-Signature` tag computed with it.
pub const HMAC_SECRET_ENV: &str = "HMAC_SECRET";

/// Environment variable name for the encrypted keystore file path.
pub const KEYSTORE_PATH_ENV: &str = "KEYSTORE_PATH";

/// Environment variable name for the keystore passphrase.
pub const KEYSTORE_PASSPHRASE_ENV: &str = "KEYSTORE_PASSPHRASE";

/// Environment variable name selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for environment variable {0}")]
    InvalidVar(&'static str),
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub hmac_secret: String,
    pub keystore_path: PathBuf,
    pub keystore_passphrase: String,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Fails when a required secret is absent or empty, so a broken
    /// deployment never serves traffic with a missing authentication gate.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var(PORT_ENV) {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar(PORT_ENV))?,
            Err(_) => 8080,
        };

        Ok(Self {
            host,
            port,
            hmac_secret: require(HMAC_SECRET_ENV)?,
            keystore_path: PathBuf::from(require(KEYSTORE_PATH_ENV)?),
            keystore_passphrase: require(KEYSTORE_PASSPHRASE_ENV)?,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
