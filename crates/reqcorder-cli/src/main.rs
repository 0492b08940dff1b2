use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

mod cli;
mod commands;
mod config;
mod exit;
mod logging;
mod render;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match commands::run_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let failure = exit::classify(&err);
            tracing::error!(error = %format!("{err:#}"), code = failure.category.code(), "command failed");
            eprintln!("{} {}", "error:".red().bold(), failure.message);
            ExitCode::from(failure.category.code())
        }
    }
}
