//! Binary entrypoint for the shellhook server.
//!
//! Loads and validates the script configuration before binding, so a bad
//! config never serves a single request.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use shellhook_server::router::build_router;
use shellhook_server::state::AppState;
use shellhook_server::telemetry;

/// Run shell scripts from authenticated webhooks.
#[derive(Parser)]
#[command(name = "shellhook", version, about = "Run shell scripts from authenticated webhooks")]
struct Cli {
    /// Port to listen on.
    #[arg(short, long, env = "SHELLHOOK_PORT", default_value_t = 9081)]
    port: u16,

    /// Address to bind.
    #[arg(long, env = "SHELLHOOK_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Path to the YAML script configuration.
    #[arg(short, long, env = "SHELLHOOK_CONFIG", default_value = "./config.yaml")]
    config: PathBuf,

    /// Log level: trace, debug, info, warn, error.
    #[arg(long = "log-level", alias = "loglevel", env = "SHELLHOOK_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = telemetry::init_tracing(&cli.log_level) {
        eprintln!("Error: {err}");
        process::exit(1);
    }

    let state = match AppState::from_config_file(&cli.config) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(config = %cli.config.display(), error = %err, "Failed to load configuration");
            process::exit(1);
        }
    };
    tracing::info!(
        scripts = state.registry.len(),
        serialized = state.locks.len(),
        "Loaded configuration"
    );

    let app = build_router(state);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "Failed to bind");
            process::exit(1);
        }
    };
    tracing::info!("shellhook server starting on {}", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    if let Err(err) = served {
        tracing::error!(error = %err, "Server error");
        process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
