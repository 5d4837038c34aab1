//! Authentication Models
//! Mission: Define user accounts, token claims, and wire-format DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: UserRole,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Build a fresh active customer account.
    pub fn new_customer(email: &str, full_name: &str, password_hash: String, phone: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            phone: phone.to_string(),
            password_hash,
            role: UserRole::Customer,
            is_deleted: false,
            created_at: Utc::now(),
            last_login: None,
        }
    }
}

/// User roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "CUSTOMER")]
    Customer, // Default role for every signup and reactivation
    #[serde(rename = "ADMIN")]
    Admin, // Catalog management, granted out-of-band
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::Customer => "CUSTOMER",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CUSTOMER" => Some(UserRole::Customer),
            "ADMIN" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Lifecycle of an email address as seen by registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Nonexistent,
    Active,
    SoftDeleted,
}

impl AccountState {
    pub fn of(user: Option<&User>) -> Self {
        match user {
            None => AccountState::Nonexistent,
            Some(u) if u.is_deleted => AccountState::SoftDeleted,
            Some(_) => AccountState::Active,
        }
    }
}

/// Outcome of a successful registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created,
    Reactivated,
}

/// Access token claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String, // subject (email)
    pub role: UserRole,
    pub user_id: String,
    pub iat: usize,
    pub exp: usize, // expiration timestamp
}

/// Refresh token claims payload (subject only; revocation is store-based)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Request-scoped identity attached by the auth gate
#[derive(Debug, Clone)]
pub struct Principal {
    pub email: String,
    pub role: UserRole,
    pub user_id: String,
}

impl Principal {
    pub fn from_claims(claims: &AccessClaims) -> Self {
        Self {
            email: claims.sub.clone(),
            role: claims.role,
            user_id: claims.user_id.clone(),
        }
    }
}

/// Refresh token row - at most one per user
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expiry_date
    }
}

/// Signup request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub phone: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh/logout request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub refresh_token: String,
}

/// Login and refresh response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub full_name: String,
}

/// Generic message envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Profile of the authenticated user (sanitized)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Profile update request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: String,
    pub phone: String,
}

/// Password change request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}
