use std::collections::HashSet;
use std::env;

use clap::ValueEnum;
use interpose_interception::LogLevel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::demo::InterceptorName;

pub const ENV_LOG_LEVEL: &str = "INTERPOSE_LOG_LEVEL";
pub const ENV_DEMO_CHAIN: &str = "INTERPOSE_DEMO_CHAIN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown interceptor `{0}`")]
    UnknownInterceptor(String),
    #[error("invalid log level `{0}`")]
    InvalidLogLevel(String),
    #[error("interceptor `{0}` appears more than once in demo.chain")]
    DuplicateInterceptor(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterposeConfig {
    /// Filter directive for the process log when neither `--log-level` nor `RUST_LOG` is set.
    pub log_level: String,
    pub demo: DemoConfig,
}

impl Default for InterposeConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            demo: DemoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub name: String,
    /// Interceptors in call order, outermost first.
    pub chain: Vec<InterceptorName>,
    /// Calls whose argument equals this value bypass every interceptor except `log`.
    pub skip_argument: Option<String>,
    pub retry_attempts: u32,
    pub interceptor_log_level: LogLevel,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            name: "Ann".to_string(),
            chain: vec![
                InterceptorName::Log,
                InterceptorName::Timing,
                InterceptorName::Uppercase,
            ],
            skip_argument: None,
            retry_attempts: 1,
            interceptor_log_level: LogLevel::Info,
        }
    }
}

impl InterposeConfig {
    /// Apply `INTERPOSE_*` environment variables on top of file values.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(level) = env::var(ENV_LOG_LEVEL) {
            let level = level.trim();
            if !level.is_empty() {
                self.log_level = level.to_string();
            }
        }
        if let Ok(raw) = env::var(ENV_DEMO_CHAIN) {
            self.demo.chain = parse_chain(&raw)?;
        }
        Ok(())
    }

    /// Check the log level and reject repeated interceptors, which the chain builder would drop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log_level
            .parse::<tracing::Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;

        let mut seen = HashSet::new();
        for name in &self.demo.chain {
            if !seen.insert(*name) {
                return Err(ConfigError::DuplicateInterceptor(name.as_str().to_string()));
            }
        }
        Ok(())
    }
}

/// Parse a comma separated interceptor list such as `log,timing`.
pub fn parse_chain(raw: &str) -> Result<Vec<InterceptorName>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            InterceptorName::from_str(token, true)
                .map_err(|_| ConfigError::UnknownInterceptor(token.to_string()))
        })
        .collect()
}
