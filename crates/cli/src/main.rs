//! Figma → Linear relay entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — load `.env` if present, then read flags and
//!    environment variables once (see [`config::Cli`]).
//! 2. **Wire observability** — configure `tracing-subscriber` with a text or
//!    JSON layer and, optionally, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure** — build the [`linear::LinearClient`] and
//!    inject it into the webhook router.
//! 4. **Serve** — run the listener until Ctrl-C or SIGTERM.
//!
//! Missing Linear credentials do not stop the process from starting; every
//! `LIBRARY_PUBLISH` delivery fails with a 500 until they are supplied.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use linear::LinearClient;
use tracing::{info, warn};

use crate::config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    let telemetry = telemetry::init(cli.log_format, cli.otlp_endpoint.as_deref())?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Failed to load .env file"),
    }

    let result = run(cli).await;
    telemetry.shutdown();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let tracker_config = cli.tracker_config();
    if !tracker_config.is_complete() {
        warn!("LINEAR_API_KEY or LINEAR_TEAM_ID is not set; LIBRARY_PUBLISH events will be rejected");
    }
    info!(
        endpoint = %tracker_config.endpoint,
        timeout_secs = tracker_config.timeout.as_secs(),
        "Using Linear GraphQL endpoint"
    );

    let client = LinearClient::new(tracker_config).context("failed to build Linear HTTP client")?;
    let app = listener::router(Arc::new(client));

    listener::serve(&cli.listener_config(), app, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
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
    info!("Shutdown signal received");
}
