use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use projectdesk::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so piped table or JSON output stays clean.
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("projectdesk=warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
