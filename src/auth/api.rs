//! Authentication API Endpoints
//! Mission: HTTP surface for signup, login, token refresh, logout, and profile

use crate::auth::jwt::TokenIssuer;
use crate::auth::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, Principal,
    ProfileResponse, SignUpRequest, TokenRequest, UpdateProfileRequest,
};
use crate::auth::service::{AuthError, AuthService};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub service: Arc<AuthService>,
    pub issuer: Arc<TokenIssuer>,
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AuthState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    info!("Signup attempt: {}", payload.email);
    state.service.register(&payload)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    info!("Login attempt: {}", payload.email);
    let response = state.service.login(&payload)?;
    Ok(Json(response))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AuthState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state.service.refresh(&payload)?;
    Ok(Json(response))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AuthState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    state.service.logout(&payload)?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AuthState>,
    principal: Principal,
) -> Result<Json<ProfileResponse>, AuthError> {
    let profile = state.service.profile(&principal.email)?;
    Ok(Json(profile))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<AuthState>,
    principal: Principal,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    state.service.update_profile(&principal.email, &payload)?;
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}

/// PUT /api/profile/password
pub async fn change_password(
    State(state): State<AuthState>,
    principal: Principal,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    state.service.change_password(&principal.email, &payload)?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// DELETE /api/profile
pub async fn deactivate_account(
    State(state): State<AuthState>,
    principal: Principal,
) -> Result<Json<MessageResponse>, AuthError> {
    state.service.deactivate(&principal.email)?;
    Ok(Json(MessageResponse::new("Account deleted successfully")))
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            // The duplicate-active-email failure is a 400 on this API
            AuthError::Conflict(m) => (StatusCode::BAD_REQUEST, m.clone()),
            AuthError::Authentication(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            AuthError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            AuthError::Storage(e) => {
                error!("Storage failure: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(MessageResponse::new(message))).into_response()
    }
}
