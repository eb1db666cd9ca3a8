mod cli;
mod commands;
mod error;

use crate::cli::{Cli, Command};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let result = match &cli.command {
        Command::Generate(args) => commands::generate(cli.config.as_deref(), args).map(|_| ()),
        Command::Inspect(args) => commands::inspect(args).map(|output| {
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        }),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, retryable = err.is_retryable(), "{err}");
            ExitCode::FAILURE
        },
    }
}
