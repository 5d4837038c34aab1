//! Authentication Module
//! Mission: Credential verification, token lifecycle, and per-request identity

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod token_store;
pub mod user_store;

pub use api::AuthState;
pub use jwt::TokenIssuer;
pub use middleware::auth_gate;
pub use models::Principal;
pub use password::PasswordHasher;
pub use service::{AuthError, AuthService};
pub use token_store::RefreshTokenStore;
pub use user_store::UserStore;
