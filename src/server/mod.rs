//! Server orchestration for the Healthhub portal.
//!
//! This module exposes the command-line interface, the HTTP router and the
//! daemon entry points. The binary stays a thin wrapper that only needs to
//! call [`run`].

pub mod admin;
pub mod cli;
mod daemon;
pub mod rest;

use anyhow::Result;
use clap::Parser;
pub use cli::{AppConfig, Cli, Commands, CreateUserArgs};
pub use daemon::{build_context, build_router, mailer_from_config, run_daemon, setup_database};

/// Parse CLI arguments and execute the requested command or daemon.
///
/// # Errors
///
/// Returns any error emitted while parsing configuration or starting the
/// server.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli).await
}

/// Execute the server logic using an already parsed [`Cli`].
///
/// # Errors
///
/// Propagates failures from the admin command or the daemon.
pub async fn run_with_cli(cli: Cli) -> Result<()> {
    let Cli { config, command } = cli;
    match command {
        Some(command) => admin::run_command(command, &config).await,
        None => run_daemon(config).await,
    }
}
