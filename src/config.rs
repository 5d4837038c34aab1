//! Configuration
//! Mission: Environment-driven settings with safe defaults

use anyhow::{Context, Result};
use std::env;

/// Runtime configuration, read once at startup.
pub struct AppConfig {
    /// Shared HMAC secret for both token kinds. No default: refusing to
    /// start beats silently signing with a well-known value.
    pub jwt_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let jwt_secret =
            env::var("ATTIRE_JWT_SECRET").context("ATTIRE_JWT_SECRET must be set")?;

        let access_ttl_minutes = env::var("ATTIRE_ACCESS_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(60);

        let refresh_ttl_days = env::var("ATTIRE_REFRESH_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(7);

        Ok(Self {
            jwt_secret,
            access_ttl_minutes,
            refresh_ttl_days,
        })
    }
}
