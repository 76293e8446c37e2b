//! Trellis CLI binary.

use anyhow::Result;
use trellis::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the trellis CLI.
///
/// Uses tokio's current_thread runtime; every command is a short sequence
/// of I/O-bound steps over one snapshot.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=trellis=debug,trellis_engine=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trellis=info,trellis_engine=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();
    cli.execute().await
}
