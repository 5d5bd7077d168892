//! Reprise order service binary.

use reprise_server::{create_router, AppState, Config};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reprise order service");

    let config = Config::load().unwrap_or_else(|e| {
        // Fall back only when no config exists; parsing errors fail hard.
        let err_str = format!("{e}");
        if err_str.contains("not found") || err_str.contains("missing field") {
            warn!(error = %e, "No config file found, using defaults");
            Config::default()
        } else {
            error!(error = %e, "FATAL: config error, fix REPRISE_* vars or reprise.toml");
            std::process::exit(1);
        }
    });

    info!(
        bind = %config.bind_address,
        data_path = %config.data_path,
        snapshot_interval_secs = config.snapshot_interval_secs,
        "Configuration loaded"
    );

    let bind_address = config.bind_address.clone();
    let flush_every = config.snapshot_interval_secs;
    let state = Arc::new(AppState::new(config)?);

    let cancel = CancellationToken::new();

    if state.config.persistence_enabled() && flush_every > 0 {
        let state_bg = Arc::clone(&state);
        let cancel_bg = cancel.clone();
        tokio::spawn(async move {
            run_snapshot_flusher(state_bg, Duration::from_secs(flush_every), cancel_bg).await;
        });
    }

    let app = create_router(state.clone());

    info!(address = %bind_address, "Listening");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, flushing catalog...");
    cancel.cancel();

    match state.store.persist() {
        Ok(true) => info!("Catalog persisted to disk"),
        Ok(false) => info!("Nothing to persist"),
        Err(e) => error!(error = %e, "Failed to persist catalog on shutdown"),
    }

    info!("Reprise order service shut down gracefully");
    Ok(())
}

async fn run_snapshot_flusher(state: Arc<AppState>, every: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = state.store.persist() {
                    warn!(error = %e, "Periodic snapshot failed");
                }
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
