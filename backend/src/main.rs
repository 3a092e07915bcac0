//! Admin Panel Backend
//!
//! Serves the admin dashboard bundle behind a session-cookie gate and the
//! JSON API behind a bearer-token gate.
//!
//! ## Architecture
//!
//! - Routes: HTTP request handling, gates and routing
//! - Services: sign-up, sign-in and OAuth hand-off flows
//! - Repositories: user store (PostgreSQL via SQLx)
//! - Auth: credential issuance/verification, password hashing

use admin_panel_backend::{
    config::{self, DEVELOPMENT_SECRET},
    db,
    repositories::PgUserStore,
    routes,
    state::AppState,
};
use anyhow::Result;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Admin Panel Backend"
    );

    validate_config(&config, config::AppConfig::is_production())?;

    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database.url, config.database.max_connections).await?;

    // Production runs migrations as a separate job
    if !config::AppConfig::is_production() {
        info!("Running database migrations...");
        db::run_migrations(&db_pool).await?;
    }

    let metrics = PrometheusBuilder::new().install_recorder()?;

    let state = AppState::new(Arc::new(PgUserStore::new(db_pool)), config.clone());
    let app = routes::create_router(state)
        .route("/metrics", get(move || std::future::ready(metrics.render())));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "admin_panel_backend=info,tower_http=info".into()
        } else {
            "admin_panel_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Refuse to start on configuration the server cannot run safely with
fn validate_config(config: &config::AppConfig, production: bool) -> Result<()> {
    let mut errors = Vec::new();

    if let Some(err) = config.auth.sign_in_path_error() {
        errors.push(err);
    }

    if config.auth.secret.is_empty() {
        errors.push("auth.secret is empty; credentials cannot be issued");
    }

    if production {
        if config.auth.secret == DEVELOPMENT_SECRET || config.auth.secret.len() < 32 {
            errors.push("auth.secret must be at least 32 characters and not the development default");
        }
        if !config.auth.secure_cookie {
            warn!("auth.secure_cookie is off in production - the session cookie will travel over plain HTTP");
        }
        if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
            warn!("Database URL contains localhost - ensure this is intentional for production");
        }
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
