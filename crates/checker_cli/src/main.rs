mod app;
mod cli;
mod config;
mod effects;
mod logging;
mod persistence;
mod render;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::config::AppConfig;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::from_cli(&cli)?;
    logging::initialize(&config.logging);
    app::run(cli.command, config)
}
