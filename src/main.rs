//! Attire Backend - dress rental catalog service
//! Mission: Authentication and session lifecycle for the catalog API

use anyhow::{Context, Result};
use attire_backend::{
    auth::{AuthService, AuthState, PasswordHasher, RefreshTokenStore, TokenIssuer, UserStore},
    config::AppConfig,
    server::create_router,
};
use clap::Parser;
use dotenv::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "attire", about = "Attire catalog backend")]
struct Args {
    /// Address to bind the API server on
    #[arg(long, env = "ATTIRE_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Path to the SQLite database file
    #[arg(long, env = "ATTIRE_DB", default_value = "attire.db")]
    db: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    init_tracing();

    let args = Args::parse();
    let config = AppConfig::from_env()?;

    let users = Arc::new(UserStore::new(&args.db)?);
    let tokens = Arc::new(RefreshTokenStore::new(&args.db)?);
    let issuer = Arc::new(TokenIssuer::with_ttls(
        config.jwt_secret,
        config.access_ttl_minutes,
        config.refresh_ttl_days,
    ));
    let service = Arc::new(AuthService::new(
        users,
        tokens,
        PasswordHasher::new(),
        issuer.clone(),
    ));

    let app = create_router(AuthState { service, issuer });

    let listener = TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("API server listening on {}", args.bind);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attire_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
