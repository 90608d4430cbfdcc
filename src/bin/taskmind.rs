//! Taskmind CLI binary.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskmind::cli::args::TaskmindArgs;
use taskmind::cli::commands::execute_command;

#[tokio::main]
async fn main() {
    // Parse command line arguments using clap
    let args = TaskmindArgs::parse();

    // Set up logging based on verbosity; RUST_LOG overrides.
    let default_level = match args.verbosity() {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Execute the command
    if let Err(e) = execute_command(args).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
