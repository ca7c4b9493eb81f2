//! Enrollment Core - API Server Binary
//!
//! This binary starts the HTTP API server for the enrollment system.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin enrollment-api
//!
//! # Run against memory, without a database
//! API_STORE=memory API_PORT=3000 cargo run --bin enrollment-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_STORE` - `postgres` or `memory` (default: postgres)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `API_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `API_LOG_JSON` - Emit JSON log lines (default: false)
//! * `API_TIMEZONE` - IANA zone for "today" (default: UTC)
//! * `API_DELINQUENCY_SWEEP_SECS` - Sweep interval, 0 disables (default: 86400)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_enrollment::{EnrollmentService, EnrollmentStore, InMemoryEnrollmentStore};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresEnrollmentStore};
use interface_api::config::{ApiConfig, StoreKind};
use interface_api::{create_router, AppState};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, opens the store, starts the
/// delinquency sweep and serves HTTP until a shutdown signal arrives.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API_* configuration")?;

    init_tracing(&config.log_level, config.log_json);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = ?config.store,
        timezone = config.timezone.name(),
        "Starting Enrollment API Server"
    );

    let store = open_store(&config).await?;
    let clock = Arc::new(SystemClock::new(config.timezone));
    let service = EnrollmentService::new(store, clock);

    let sweep = spawn_delinquency_sweep(service.clone(), config.delinquency_sweep_secs);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;
    let app = create_router(AppState::new(service, config));

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweep {
        handle.abort();
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_target(true)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_target(true)))
        .init();
}

/// Opens the configured store, running migrations for PostgreSQL
async fn open_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn EnrollmentStore>> {
    match config.store {
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(InMemoryEnrollmentStore::new()))
        }
        StoreKind::Postgres => {
            let db_config = DatabaseConfig::new(&config.database_url)
                .max_connections(config.db_max_connections)
                .min_connections(2);
            let pool = create_pool(db_config)
                .await
                .context("failed to connect to the database")?;
            run_migrations(&pool)
                .await
                .context("failed to apply database migrations")?;
            Ok(Arc::new(PostgresEnrollmentStore::new(pool)))
        }
    }
}

/// Runs the delinquency sweep periodically; `0` disables it
fn spawn_delinquency_sweep(service: EnrollmentService, every_secs: u64) -> Option<JoinHandle<()>> {
    if every_secs == 0 {
        tracing::info!("Delinquency sweep disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(every_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(e) = service.sweep_delinquencies().await {
                tracing::error!(error = %e, "Delinquency sweep failed");
            }
        }
    }))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// In-flight requests complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
