//! Entry point for the apiprobe execution backend.

use std::sync::Arc;

use anyhow::{Context, Result};
use apiprobe_core::ProxyService;
use apiprobe_core::server;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config = args.server_config();
    let service = Arc::new(ProxyService::try_new().context("failed to build HTTP client")?);

    let listener = TcpListener::bind(config.address())
        .await
        .with_context(|| format!("failed to bind {}", config.address()))?;
    let local = listener.local_addr()?;
    info!(address = %local, "apiprobe listening on http://{local}");

    server::serve(listener, service, shutdown_signal()).await?;

    info!("apiprobe stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
