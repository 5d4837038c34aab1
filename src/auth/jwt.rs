//! Token Issuance
//! Mission: Sign and validate HMAC access and refresh tokens

use crate::auth::models::{AccessClaims, RefreshClaims, User};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Issues and validates the two token kinds.
///
/// Access tokens carry email, role, and user id and are validated purely
/// cryptographically by the auth gate. Refresh tokens are signed too, but a
/// valid signature is never sufficient on the refresh path: revocation is
/// store-based, so the service must always consult the RefreshTokenStore
/// before honoring one. Deleting the store row is the only way to revoke.
pub struct TokenIssuer {
    secret: String,
    access_ttl_minutes: i64,
    refresh_ttl_days: i64,
}

impl TokenIssuer {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            access_ttl_minutes: 60,
            refresh_ttl_days: 7,
        }
    }

    pub fn with_ttls(secret: String, access_ttl_minutes: i64, refresh_ttl_days: i64) -> Self {
        Self {
            secret,
            access_ttl_minutes,
            refresh_ttl_days,
        }
    }

    /// Server-side lifetime for the refresh-token row, the authoritative
    /// expiry check.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_ttl_days)
    }

    /// Generate a short-lived access token for a user.
    pub fn issue_access_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::minutes(self.access_ttl_minutes))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = AccessClaims {
            sub: user.email.clone(),
            role: user.role,
            user_id: user.id.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration,
        };

        debug!(
            "Issuing access token for {} ({}), expires in {}m",
            user.email, user.id, self.access_ttl_minutes
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign access token")
    }

    /// Generate a long-lived refresh token carrying only the subject email.
    pub fn issue_refresh_token(&self, email: &str) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.refresh_ttl())
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = RefreshClaims {
            sub: email.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign refresh token")
    }

    /// Validate an access token and extract its claims.
    ///
    /// Fails closed: signature mismatch, tampering, and expiry all come back
    /// as an error, never a panic.
    pub fn validate(&self, token: &str) -> Result<AccessClaims> {
        let decoded = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .context("Invalid or expired token")?;

        debug!("Validated access token for {}", decoded.claims.sub);

        Ok(decoded.claims)
    }
}
