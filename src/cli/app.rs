use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::commands::Commands;
use super::config::cmd_config;
use super::env::CliArgs;
use super::info::cmd_info;
use super::run::cmd_run;
use super::runtime::{init_logging, load_config};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let loaded = load_config(cli.config.as_ref()).await?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| loaded.config.log_level.clone());
    init_logging(&level, cli.debug)?;
    loaded.log_source();

    info!("Starting interpose v{}", env!("CARGO_PKG_VERSION"));

    let outcome = match cli.command {
        Commands::Run(args) => cmd_run(args, &loaded.config, cli.output),
        Commands::Info => cmd_info(cli.output),
        Commands::Config(args) => cmd_config(args, &loaded, cli.output),
    };

    match outcome {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {}", err);
            Err(err)
        }
    }
}
