use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::output::{emit_structured, OutputFormat};
use crate::cli::runtime::LoadedConfig;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration (file, defaults and environment overrides)
    Show,

    /// Print the configuration file path in use
    Path,

    /// Validate configuration
    Validate,
}

pub fn cmd_config(args: ConfigArgs, loaded: &LoadedConfig, output: OutputFormat) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            if !emit_structured(output, &loaded.config)? {
                println!("Current configuration ({}):", loaded.path.display());
                print!("{}", serde_yaml::to_string(&loaded.config)?);
            }
        }
        ConfigAction::Path => {
            let suffix = if loaded.found { "" } else { " (not found)" };
            println!("{}{}", loaded.path.display(), suffix);
        }
        ConfigAction::Validate => {
            loaded
                .config
                .validate()
                .context("Configuration is invalid")?;
            println!("Configuration is valid");
        }
    }
    Ok(())
}
