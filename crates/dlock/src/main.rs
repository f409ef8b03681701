//! dlock - Entry Point
//!
//! Loads the configuration, installs logging, bootstraps the lock context
//! and dispatches to the requested command.

// Force-link dlock-providers to ensure linkme registrations are included
extern crate dlock_providers;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dlock::cli::Cli;
use dlock_infrastructure::di::LockContext;
use dlock_infrastructure::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = cli
        .global
        .load_config()
        .context("Failed to load configuration")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;
    let context = LockContext::bootstrap(&config).context("Failed to bootstrap lock context")?;

    let code = cli
        .command
        .execute(&context, &mut std::io::stdout().lock())
        .await?;
    Ok(ExitCode::from(code))
}
