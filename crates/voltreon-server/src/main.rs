//! Voltreon HTTP server binary.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use voltreon::app::App;
use voltreon_server::{AppState, create_router};

/// Serve a voltreon workspace over HTTP
#[derive(Parser, Debug)]
#[command(name = "voltreon-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workspace directory (searched upwards for `.voltreon/`)
    #[arg(short = 'C', long, default_value = ".")]
    dir: PathBuf,

    /// Address to listen on, overriding `server.bind` in the config
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("voltreon=info,voltreon_server=info,tower_http=info")
            }),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let app = App::from_directory(&args.dir).await?;
    let bind = args
        .bind
        .unwrap_or_else(|| app.config().server.bind.clone());
    tracing::info!(root = %app.root_dir().display(), "Opened workspace");

    let router = create_router(AppState::new(app));
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!(address = %bind, "Voltreon API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
