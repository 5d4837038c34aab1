//! Authentication Gate
//! Mission: Validate bearer tokens and attach a request-scoped principal

use crate::auth::jwt::TokenIssuer;
use crate::auth::models::Principal;
use crate::auth::service::AuthError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Per-request gate over every route.
///
/// Fails open to "anonymous": a missing, malformed, or invalid bearer token
/// leaves the request without a principal and lets downstream extractors
/// reject it. A valid token yields a `Principal` in the request extensions.
/// The gate never consults the RefreshTokenStore, so an access token stays
/// honored until its own (short) expiry even after logout.
pub async fn auth_gate(
    State(issuer): State<Arc<TokenIssuer>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        if let Ok(claims) = issuer.validate(&token) {
            req.extensions_mut().insert(Principal::from_claims(&claims));
        }
        // Invalid or expired tokens fall through as anonymous
    }

    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Handlers take `Principal` as an argument to require authentication;
/// requests the gate left anonymous are rejected with 401 here.
#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AuthError::Authentication("Authentication required".to_string()))
    }
}
