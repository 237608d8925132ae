#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod telemetry;

use std::process;

use anyhow::Context;

use crate::config::Cli;

pub const TRACING_TARGET_STARTUP: &str = "lookalike_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "lookalike_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "lookalike_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "lookalike_cli::command";

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(()) => {
            tracing::debug!(target: TRACING_TARGET_SHUTDOWN, "Done");
            0
        }
        Err(error) if tracing::enabled!(tracing::Level::ERROR) => {
            tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %format!("{error:#}"),
                "Command failed"
            );
            1
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };

    process::exit(code);
}

/// Parses arguments, sets up logging and dispatches the subcommand.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(cli.log_format)?;
    log_startup_info();
    cli.log();

    cli.validate().context("invalid configuration")?;
    command::execute(&cli).await
}

fn log_startup_info() {
    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        features = ?enabled_features(),
        "Starting lookalike"
    );
}

/// Cargo features compiled into this binary.
fn enabled_features() -> Vec<&'static str> {
    [cfg!(feature = "dotenv").then_some("dotenv")]
        .into_iter()
        .flatten()
        .collect()
}
