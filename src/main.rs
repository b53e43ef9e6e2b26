use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use nexa_discovery::cli::{Cli, CliHandler};
use nexa_discovery::config::LoggingConfig;
use nexa_discovery::logging;

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings().context("Failed to load settings")?;

    let logging_config = LoggingConfig::from_settings(&settings)?;
    let _guard = logging::init(&logging_config).context("Failed to initialize logging")?;

    let handler = CliHandler::new(settings);
    let output = handler.run(&cli.command)?;
    println!("{}", output);
    Ok(())
}
