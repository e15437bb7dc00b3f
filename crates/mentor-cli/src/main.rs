//! HackMentor CLI entry point.

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use mentor_cli::cli::Cli;
use mentor_cli::commands;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Env files live under the state dir, so apply the override first.
    if let Some(dir) = cli.state_dir() {
        std::env::set_var(mentor_core::config::STATE_DIR_ENV, dir);
    }
    let loaded = mentor_core::load_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));
    fmt().with_env_filter(filter).with_target(false).init();
    debug!(files = ?loaded, "Environment loaded");

    let server_url = cli.server_url();
    if let Err(e) = commands::execute(cli.command, &server_url).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
