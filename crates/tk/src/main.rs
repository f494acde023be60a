//! tk CLI binary.

use anyhow::Result;
use tk::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Diagnostics go to stderr so they never mix with command output.
    // Example: RUST_LOG=tk=debug tk ls
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tk=warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting tk CLI");

    let cli = Cli::parse_args();
    cli.execute()?;

    tracing::debug!("tk CLI completed successfully");
    Ok(())
}
