use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::InterposeConfig;

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: InterposeConfig,
    pub path: PathBuf,
    pub found: bool,
}

impl LoadedConfig {
    /// Report where the configuration came from; call once logging is up.
    pub fn log_source(&self) {
        if self.found {
            info!("Loaded configuration from: {}", self.path.display());
        } else {
            warn!(
                "Config file not found, using defaults: {}",
                self.path.display()
            );
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    // Priority: ./config/interpose.yaml > <config dir>/interpose/config.yaml
    let local_config = PathBuf::from("config/interpose.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("interpose");
    path.push("config.yaml");
    Ok(path)
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    let (mut config, found) = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;
        let config: InterposeConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;
        (config, true)
    } else {
        (InterposeConfig::default(), false)
    };

    config
        .apply_env_overrides()
        .context("Invalid environment override")?;

    Ok(LoadedConfig {
        config,
        path: config_path,
        found,
    })
}
