//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; application-level errors go
//! through `kernel::error::AppError`.

use auth::{AuthConfig, PgAuthRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Auth configuration
    let auth_config = build_auth_config()?;

    // Startup cleanup: drop refresh session rows older than the refresh
    // TTL. Errors here should not prevent server startup.
    let repo_for_cleanup = PgAuthRepository::new(pool.clone(), auth_config.store_timeout);
    match repo_for_cleanup
        .cleanup_stale_sessions(auth_config.refresh_token_ttl)
        .await
    {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Refresh session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Refresh session cleanup failed, continuing anyway");
        }
    }

    let repo = PgAuthRepository::new(pool, auth_config.store_timeout);

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/users", auth_router(repo, auth_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the auth configuration from the environment
///
/// Debug builds run with random secrets and insecure cookies; release
/// builds require both token secrets in the environment.
fn build_auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig {
            access_token_secret: decode_secret("ACCESS_TOKEN_SECRET")?,
            refresh_token_secret: decode_secret("REFRESH_TOKEN_SECRET")?,
            ..AuthConfig::default()
        }
    };

    if let Ok(activation_base_url) = env::var("ACTIVATION_BASE_URL") {
        config.activation_base_url = activation_base_url;
    }
    if let Ok(client_url) = env::var("CLIENT_URL") {
        config.client_url = client_url;
    }

    Ok(config)
}

/// Decode a base64-encoded 32-byte secret from the environment
fn decode_secret(var: &str) -> anyhow::Result<[u8; 32]> {
    let secret_b64 =
        env::var(var).map_err(|_| anyhow::anyhow!("{var} must be set in production"))?;
    let secret_bytes = Engine::decode(&general_purpose::STANDARD, &secret_b64)?;

    anyhow::ensure!(
        secret_bytes.len() == 32,
        "{var} must decode to exactly 32 bytes"
    );

    let mut secret = [0u8; 32];
    secret.copy_from_slice(&secret_bytes);
    Ok(secret)
}
