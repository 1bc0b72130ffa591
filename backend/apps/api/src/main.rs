//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are rendered
//! by the `auth` crate.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use auth::application::config::DEFAULT_ACTIVATION_URL;
use auth::domain::services::CredentialHasher;
use auth::{
    AuthAppState, AuthConfig, HttpRelayNotifier, LogNotifier, NotificationDispatcher,
    PgIdentityStore, identity_router,
};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
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
                .unwrap_or_else(|_| "identity_api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(load_config()?);

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
        Ok(raw) => raw
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
        Err(_) => 5,
    };

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(config.store_timeout)
        .connect(&database_url)
        .await
        .context("failed to connect to database")?;

    tracing::info!(max_connections, "Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    tracing::info!("Migrations completed");

    // Identity store
    let hasher = CredentialHasher::new(config.pepper(), config.hash_timeout);
    let store = Arc::new(PgIdentityStore::new(pool, hasher));

    // Activation mail: relay when configured, log otherwise
    let (notifications, _worker) = match env::var("MAIL_RELAY_URL") {
        Ok(relay_url) => {
            let from = env::var("MAIL_FROM").context("MAIL_FROM must be set with MAIL_RELAY_URL")?;
            let notifier = HttpRelayNotifier::new(
                relay_url,
                from,
                config.activation_url.clone(),
                config.notify_timeout,
            )
            .context("failed to build mail relay client")?;
            tracing::info!("Activation mail goes through the relay");
            NotificationDispatcher::spawn(
                Arc::new(notifier),
                config.notify_timeout,
                config.notify_queue_capacity,
            )
        }
        Err(_) => {
            tracing::warn!("MAIL_RELAY_URL not set; activation mail is only logged");
            NotificationDispatcher::spawn(
                Arc::new(LogNotifier::new(config.activation_url.clone())),
                config.notify_timeout,
                config.notify_queue_capacity,
            )
        }
    };

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
        .merge(identity_router(AuthAppState::new(
            store,
            config,
            notifications,
        )))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    // Start server
    let port = match env::var("PORT") {
        Ok(raw) => raw.parse::<u16>().context("PORT must be a valid port number")?,
        Err(_) => 8080,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Identity configuration from the environment
fn load_config() -> anyhow::Result<AuthConfig> {
    let mut config = match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => AuthConfig::with_secret(secret.into_bytes()),
        _ if cfg!(debug_assertions) => {
            tracing::warn!("JWT_SECRET not set; using a random secret for this process");
            AuthConfig::development()
        }
        _ => anyhow::bail!("JWT_SECRET must be set in production"),
    };

    if let Ok(pepper_b64) = env::var("PASSWORD_PEPPER") {
        let pepper = general_purpose::STANDARD
            .decode(pepper_b64.trim())
            .context("PASSWORD_PEPPER must be base64")?;
        config.password_pepper = Some(pepper);
    }

    config.activation_url =
        env::var("ACTIVATION_URL").unwrap_or_else(|_| DEFAULT_ACTIVATION_URL.to_string());
    config.protect_account_routes = env::var("PROTECT_ACCOUNT_ROUTES")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);

    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler, keep serving
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
