//! wshub server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints and shuts
//! it down gracefully on SIGINT/SIGTERM.

use tracing_subscriber::EnvFilter;

use wshub::api;
use wshub::app_state::AppState;
use wshub::config::HubConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; LOG_FORMAT=json switches to structured output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration; a bad signing secret is fatal here
    let config = HubConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, ttl_secs = config.jwt_ttl_secs, "starting wshub");

    let state = AppState::from_config(&config)?;
    let supervisor = state.supervisor.clone();
    let app = api::build_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Upgraded sockets outlive the HTTP server; let each one leave the hub.
    if !supervisor.shutdown(config.shutdown_grace()).await {
        tracing::warn!("forced exit with connections still open");
    }
    tracing::info!("server exited");

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
