//! Voltreon CLI binary.

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use voltreon::cli::Cli;
use voltreon::output::{self, OutputConfig};

/// Main entry point for the voltreon CLI.
///
/// Uses tokio's current_thread runtime; every command is a short sequence of
/// store calls.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // RUST_LOG overrides the default, e.g. RUST_LOG=voltreon=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("voltreon=info,voltreon_server=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting voltreon CLI");

    let cli = Cli::parse_args();
    match cli.execute().await {
        Ok(()) => {
            tracing::debug!("Voltreon CLI completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {e:#}", output::error("Error:", &OutputConfig::from_env()));
            ExitCode::FAILURE
        }
    }
}
