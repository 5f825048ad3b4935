use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::check::cmd_check;
use super::commands::Commands;
use super::compile::cmd_compile;
use super::env::CliArgs;
use super::run::cmd_run;
use super::runtime::{init_logging, load_local_env_overrides};
use crate::config::{load_config, Config};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();
    init_logging(&cli.log_level, cli.debug, cli.log_format)?;
    load_local_env_overrides();

    info!("Starting TabPilot v{}", env!("CARGO_PKG_VERSION"));

    let loaded = load_config(cli.config.as_deref()).await?;

    match dispatch(&cli, &loaded.config).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}

pub async fn dispatch(cli: &CliArgs, config: &Config) -> Result<()> {
    match cli.command.clone() {
        Commands::Compile(args) => cmd_compile(args, config).await,
        Commands::Run(args) => cmd_run(args, config).await,
        Commands::Check(args) => cmd_check(args),
    }
}
