// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`Config`] snapshot loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for document storage | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HMAC secret for token signing | Required for production |
//! | `JWT_EXPIRES_IN` | Access token lifetime (`8h`, `30m`, `7d`, seconds) | `8h` |
//! | `DEFAULT_ADMIN_EMAIL` | Bootstrap super admin email | `admin@opsdesk.local` |
//! | `DEFAULT_ADMIN_PASSWORD` | Bootstrap super admin password | `Admin123!` |
//! | `RATE_LIMIT_MAX` | Requests per rate-limit window per identifier | `100` |
//! | `RATE_LIMIT_WINDOW_SECS` | Rate-limit window length in seconds | `900` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable name for the document storage root.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the token signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the access token lifetime.
pub const JWT_EXPIRES_IN_ENV: &str = "JWT_EXPIRES_IN";

/// Environment variable names for the bootstrap admin credentials.
pub const DEFAULT_ADMIN_EMAIL_ENV: &str = "DEFAULT_ADMIN_EMAIL";
pub const DEFAULT_ADMIN_PASSWORD_ENV: &str = "DEFAULT_ADMIN_PASSWORD";

/// Refresh token lifetime. Fixed at 30 days; not configurable.
pub const REFRESH_TOKEN_LIFETIME: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Fallback access token lifetime when `JWT_EXPIRES_IN` is unset or invalid.
pub const DEFAULT_ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(8 * 60 * 60);

/// Configuration snapshot loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub access_token_lifetime: Duration,
    pub default_admin_email: String,
    pub default_admin_password: String,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let access_token_lifetime = env::var(JWT_EXPIRES_IN_ENV)
            .ok()
            .and_then(|s| parse_lifetime(&s))
            .unwrap_or(DEFAULT_ACCESS_TOKEN_LIFETIME);

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            data_dir: env::var(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/data")),
            jwt_secret: env::var(JWT_SECRET_ENV)
                .unwrap_or_else(|_| "insecure-dev-secret-change-me".to_string()),
            access_token_lifetime,
            default_admin_email: env::var(DEFAULT_ADMIN_EMAIL_ENV)
                .unwrap_or_else(|_| "admin@opsdesk.local".to_string()),
            default_admin_password: env::var(DEFAULT_ADMIN_PASSWORD_ENV)
                .unwrap_or_else(|_| "Admin123!".to_string()),
            rate_limit_max: env::var("RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            rate_limit_window: Duration::from_secs(
                env::var("RATE_LIMIT_WINDOW_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(900),
            ),
        }
    }
}

/// Parse a lifetime string: `"8h"`, `"30m"`, `"7d"`, `"90s"`, or a bare
/// number of seconds. Returns `None` for anything unparsable so the caller
/// can fall back to the default.
pub fn parse_lifetime(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(secs) = s.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let (value, unit) = s.split_at(s.len() - 1);
    let value: u64 = value.parse().ok()?;
    let secs = match unit {
        "s" => value,
        "m" => value * 60,
        "h" => value * 60 * 60,
        "d" => value * 24 * 60 * 60,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}
