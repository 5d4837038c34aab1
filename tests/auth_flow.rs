//! End-to-end auth flows over the HTTP surface.
//!
//! Builds the real router on a temp SQLite database and drives it with
//! tower's `oneshot`, covering the signup → login → refresh → logout
//! lifecycle plus soft-delete reactivation.

use attire_backend::auth::{
    AuthService, AuthState, PasswordHasher, RefreshTokenStore, TokenIssuer, UserStore,
};
use attire_backend::server::create_router;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

fn test_app() -> (Router, NamedTempFile) {
    let temp = NamedTempFile::new().unwrap();
    let db_path = temp.path().to_str().unwrap();

    let users = Arc::new(UserStore::new(db_path).unwrap());
    let tokens = Arc::new(RefreshTokenStore::new(db_path).unwrap());
    let issuer = Arc::new(TokenIssuer::new("integration-test-secret".to_string()));
    let service = Arc::new(AuthService::new(
        users,
        tokens,
        PasswordHasher::with_cost(bcrypt::MIN_COST),
        issuer.clone(),
    ));

    (create_router(AuthState { service, issuer }), temp)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn signup_body(email: &str, password: &str, full_name: &str, phone: &str) -> Value {
    json!({
        "email": email,
        "fullName": full_name,
        "password": password,
        "phone": phone,
    })
}

#[tokio::test]
async fn test_signup_login_refresh_logout_lifecycle() {
    let (app, _temp) = test_app();

    // Signup
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            signup_body("a@x.com", "password1", "Ann", "0770000000"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");

    // Duplicate active email
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            signup_body("a@x.com", "password1", "Ann", "0770000000"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Login
    let (status, session) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "password1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["email"], "a@x.com");
    assert_eq!(session["role"], "CUSTOMER");
    let access_token = session["accessToken"].as_str().unwrap().to_string();
    let refresh_token = session["refreshToken"].as_str().unwrap().to_string();

    // Protected route with bearer token
    let (status, profile) = send(&app, bearer_request("GET", "/api/profile", &access_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["fullName"], "Ann");

    // Anonymous request is rejected by the handler, not the gate
    let (status, _) = send(
        &app,
        Request::builder()
            .method("GET")
            .uri("/api/profile")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Garbage bearer token falls through as anonymous
    let (status, _) = send(&app, bearer_request("GET", "/api/profile", "not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Refresh: new access token, unchanged refresh token
    let (status, refreshed) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/refresh",
            json!({"refreshToken": refresh_token}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["refreshToken"], refresh_token.as_str());
    assert_eq!(refreshed["userId"], session["userId"]);

    // Logout, then the refresh token is dead
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/logout",
            json!({"refreshToken": refresh_token}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/refresh",
            json!({"refreshToken": refresh_token}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/logout",
            json!({"refreshToken": refresh_token}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The access token is still honored until its own expiry
    let (status, _) = send(&app, bearer_request("GET", "/api/profile", &access_token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_soft_delete_and_reactivation_over_http() {
    let (app, _temp) = test_app();

    send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            signup_body("a@x.com", "password1", "Ann", "0770000000"),
        ),
    )
    .await;

    let (_, session) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "password1"}),
        ),
    )
    .await;
    let access_token = session["accessToken"].as_str().unwrap().to_string();

    // Self soft-delete
    let (status, _) = send(&app, bearer_request("DELETE", "/api/profile", &access_token)).await;
    assert_eq!(status, StatusCode::OK);

    // Correct password, but the account is invisible to active lookup
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "password1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    // Re-signup on the occupied email reactivates the same account
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            signup_body("a@x.com", "newpass99", "Ann B", "0779999999"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, revived) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "newpass99"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revived["role"], "CUSTOMER");
    assert_eq!(revived["fullName"], "Ann B");
    // Reactivation preserved the row identity
    assert_eq!(revived["userId"], session["userId"]);
}

#[tokio::test]
async fn test_login_failures_are_generic() {
    let (app, _temp) = test_app();

    send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            signup_body("a@x.com", "password1", "Ann", "0770000000"),
        ),
    )
    .await;

    let (status, wrong_password) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "wrong-one"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_user) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "nobody@x.com", "password": "password1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Indistinguishable responses for "no such user" and "wrong password"
    assert_eq!(wrong_password["message"], unknown_user["message"]);
}

#[tokio::test]
async fn test_profile_update_and_password_change() {
    let (app, _temp) = test_app();

    send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            signup_body("a@x.com", "password1", "Ann", "0770000000"),
        ),
    )
    .await;
    let (_, session) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "password1"}),
        ),
    )
    .await;
    let access_token = session["accessToken"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri("/api/profile")
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"fullName": "Ann B", "phone": "0779999999"}).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, profile) = send(&app, bearer_request("GET", "/api/profile", &access_token)).await;
    assert_eq!(profile["fullName"], "Ann B");
    assert_eq!(profile["phone"], "0779999999");

    let (status, _) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri("/api/profile/password")
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "currentPassword": "password1",
                    "newPassword": "newpass99",
                    "confirmPassword": "newpass99",
                })
                .to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "newpass99"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
