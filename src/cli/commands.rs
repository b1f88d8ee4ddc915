use clap::Subcommand;

use super::config::ConfigArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Resolve the demo greeter through its interceptor chain and call it
    Run(RunArgs),

    /// Show version, build details and available interceptors
    Info,

    /// Inspect the effective configuration
    Config(ConfigArgs),
}
