//! Tether CLI binary.

use anyhow::Result;
use tether::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the tether CLI.
///
/// Uses tokio's `current_thread` runtime; every command is a short sequence
/// of file reads and writes.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=tether=debug,tether_jsonl=trace.
    // Logs go to stderr so --json output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tether=info,tether_jsonl=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting tether CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Tether CLI completed successfully");
    Ok(())
}
