//! HTTP Server Assembly
//! Mission: Wire public auth routes and gated profile routes into one app

use crate::auth::{api as auth_api, auth_gate, AuthState};
use crate::middleware::request_logging;
use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

/// Create the API router.
///
/// The auth gate runs over every route and fails open to anonymous; the
/// profile handlers enforce authentication via the `Principal` extractor,
/// while the /api/auth routes and /health stay usable without a token.
pub fn create_router(state: AuthState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/signup", post(auth_api::signup))
        .route("/api/auth/login", post(auth_api::login))
        .route("/api/auth/refresh", post(auth_api::refresh))
        .route("/api/auth/logout", post(auth_api::logout))
        .route(
            "/api/profile",
            get(auth_api::get_profile)
                .put(auth_api::update_profile)
                .delete(auth_api::deactivate_account),
        )
        .route("/api/profile/password", put(auth_api::change_password))
        .layer(middleware::from_fn_with_state(
            state.issuer.clone(),
            auth_gate,
        ))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
