//! Authentication Service
//! Mission: Orchestrate signup, login, token refresh, and logout

use crate::auth::jwt::TokenIssuer;
use crate::auth::models::{
    AccountState, AuthResponse, ChangePasswordRequest, LoginRequest, ProfileResponse,
    RegisterOutcome, SignUpRequest, TokenRequest, UpdateProfileRequest, User, UserRole,
};
use crate::auth::password::PasswordHasher;
use crate::auth::token_store::RefreshTokenStore;
use crate::auth::user_store::UserStore;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const MIN_PASSWORD_LEN: usize = 8;

/// Domain failure taxonomy for every auth operation.
///
/// Credential failures always carry the same generic message so callers
/// cannot tell "no such user" from "wrong password". Storage faults are the
/// only infrastructure kind and are never retried here.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AuthError {
    fn invalid_credentials() -> Self {
        AuthError::Authentication("Invalid email or password".to_string())
    }

    fn invalid_refresh_token() -> Self {
        AuthError::Authentication("Invalid refresh token".to_string())
    }
}

/// Orchestrates the credential stores, hasher, and token issuer.
pub struct AuthService {
    users: Arc<UserStore>,
    tokens: Arc<RefreshTokenStore>,
    hasher: PasswordHasher,
    issuer: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(
        users: Arc<UserStore>,
        tokens: Arc<RefreshTokenStore>,
        hasher: PasswordHasher,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            issuer,
        }
    }

    /// Create a new account, or reactivate a soft-deleted one.
    ///
    /// The email's lifecycle state drives the transition: Nonexistent
    /// creates, Active conflicts, SoftDeleted revives the SAME row with the
    /// submitted name/phone/password and the role reset to customer. No
    /// tokens are issued on this path.
    pub fn register(&self, req: &SignUpRequest) -> Result<RegisterOutcome, AuthError> {
        validate_signup(req)?;

        let existing = self.users.find_by_email(&req.email)?;
        match (AccountState::of(existing.as_ref()), existing) {
            (AccountState::Active, _) => Err(AuthError::Conflict(
                "Email already registered".to_string(),
            )),
            (AccountState::SoftDeleted, Some(mut user)) => {
                user.is_deleted = false;
                user.full_name = req.full_name.clone();
                user.phone = req.phone.clone();
                user.password_hash = self.hasher.hash(&req.password)?;
                user.role = UserRole::Customer; // safety reset
                self.users.update(&user)?;

                info!("Reactivated account: {}", user.email);
                Ok(RegisterOutcome::Reactivated)
            }
            _ => {
                let hash = self.hasher.hash(&req.password)?;
                let user = User::new_customer(&req.email, &req.full_name, hash, &req.phone);
                self.users.create(&user)?;
                Ok(RegisterOutcome::Created)
            }
        }
    }

    /// Verify credentials, stamp the login time, and open the session.
    ///
    /// Issues both tokens and upserts the user's single refresh-token row;
    /// a second login replaces the previous session's token value.
    pub fn login(&self, req: &LoginRequest) -> Result<AuthResponse, AuthError> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            return Err(AuthError::invalid_credentials());
        }

        let mut user = self
            .users
            .find_active_by_email(&req.email)?
            .ok_or_else(AuthError::invalid_credentials)?;

        if !self.hasher.verify(&req.password, &user.password_hash)? {
            warn!("Failed login attempt: {}", req.email);
            return Err(AuthError::invalid_credentials());
        }

        user.last_login = Some(Utc::now());
        self.users.update(&user)?;

        let access_token = self.issuer.issue_access_token(&user)?;
        let refresh_token = self.issuer.issue_refresh_token(&user.email)?;
        let expiry = Utc::now() + self.issuer.refresh_ttl();
        self.tokens.upsert(&user.id, &refresh_token, expiry)?;

        info!("Login successful: {} ({})", user.email, user.role.as_str());

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user_id: user.id,
            email: user.email,
            role: user.role,
            full_name: user.full_name,
        })
    }

    /// Mint a new access token for a live session.
    ///
    /// The store row is the authoritative check: a cryptographically valid
    /// refresh token whose row is missing or past its server-side expiry is
    /// rejected. The refresh token itself is returned unchanged.
    pub fn refresh(&self, req: &TokenRequest) -> Result<AuthResponse, AuthError> {
        let row = self
            .tokens
            .find_by_token(&req.refresh_token)?
            .ok_or_else(AuthError::invalid_refresh_token)?;

        if row.is_expired() {
            self.tokens.delete(&row.token)?;
            return Err(AuthError::Authentication(
                "Refresh token expired".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_id(&row.user_id)?
            .ok_or_else(AuthError::invalid_refresh_token)?;

        let access_token = self.issuer.issue_access_token(&user)?;

        Ok(AuthResponse {
            access_token,
            refresh_token: row.token,
            user_id: user.id,
            email: user.email,
            role: user.role,
            full_name: user.full_name,
        })
    }

    /// Close the session by deleting its row.
    ///
    /// A second logout with the same token fails with "invalid refresh
    /// token" because the row is already gone. That is the expected shape of
    /// idempotent failure, not something to suppress.
    pub fn logout(&self, req: &TokenRequest) -> Result<(), AuthError> {
        if !self.tokens.delete(&req.refresh_token)? {
            return Err(AuthError::invalid_refresh_token());
        }
        Ok(())
    }

    /// Profile of the authenticated principal.
    pub fn profile(&self, email: &str) -> Result<ProfileResponse, AuthError> {
        let user = self
            .users
            .find_active_by_email(email)?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;
        Ok(ProfileResponse::from_user(&user))
    }

    pub fn update_profile(&self, email: &str, req: &UpdateProfileRequest) -> Result<(), AuthError> {
        if req.full_name.trim().is_empty() {
            return Err(AuthError::Validation("Full name is required".to_string()));
        }
        if req.phone.trim().is_empty() {
            return Err(AuthError::Validation("Phone number is required".to_string()));
        }

        let mut user = self
            .users
            .find_active_by_email(email)?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;
        user.full_name = req.full_name.clone();
        user.phone = req.phone.clone();
        self.users.update(&user)?;
        Ok(())
    }

    /// Rotate the account password after re-verifying the current one.
    pub fn change_password(&self, email: &str, req: &ChangePasswordRequest) -> Result<(), AuthError> {
        if req.new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if req.new_password != req.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }

        let mut user = self
            .users
            .find_active_by_email(email)?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        if !self.hasher.verify(&req.current_password, &user.password_hash)? {
            return Err(AuthError::Authentication(
                "Current password is incorrect".to_string(),
            ));
        }

        user.password_hash = self.hasher.hash(&req.new_password)?;
        self.users.update(&user)?;
        info!("Password changed: {}", email);
        Ok(())
    }

    /// Self soft-delete: the row (and its email) stays occupied, the session
    /// row is removed, and active-login lookups no longer see the account.
    pub fn deactivate(&self, email: &str) -> Result<(), AuthError> {
        let mut user = self
            .users
            .find_active_by_email(email)?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        user.is_deleted = true;
        self.users.update(&user)?;

        if let Some(row) = self.tokens.find_by_user(&user.id)? {
            self.tokens.delete(&row.token)?;
        }

        info!("Account deactivated: {}", email);
        Ok(())
    }
}

fn validate_signup(req: &SignUpRequest) -> Result<(), AuthError> {
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(AuthError::Validation("Invalid email address".to_string()));
    }
    if req.full_name.trim().is_empty() {
        return Err(AuthError::Validation("Full name is required".to_string()));
    }
    if req.phone.trim().is_empty() {
        return Err(AuthError::Validation("Phone number is required".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
