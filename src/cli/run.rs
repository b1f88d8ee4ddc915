use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use humantime::format_duration;
use tracing::info;

use crate::cli::output::{emit_structured, OutputFormat};
use crate::config::InterposeConfig;
use crate::demo::{Demo, DemoReport, InterceptorName};

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Name to greet (defaults to `demo.name`)
    #[arg(long)]
    pub name: Option<String>,

    /// Interceptor chain, outermost first (defaults to `demo.chain`)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub chain: Option<Vec<InterceptorName>>,

    /// Argument value that bypasses every interceptor except `log`
    #[arg(long)]
    pub skip_argument: Option<String>,

    /// Number of calls to make
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub repeat: u64,
}

pub fn cmd_run(args: RunArgs, config: &InterposeConfig, output: OutputFormat) -> Result<()> {
    let mut demo_config = config.demo.clone();
    if let Some(chain) = args.chain {
        demo_config.chain = chain;
    }
    if args.skip_argument.is_some() {
        demo_config.skip_argument = args.skip_argument;
    }
    let name = args.name.unwrap_or_else(|| demo_config.name.clone());

    let demo = Demo::build(&demo_config).context("Failed to resolve demo greeter")?;
    info!(name = %name, repeat = args.repeat, "calling greeter");
    let report = demo.run(&name, args.repeat).context("Greeter call failed")?;

    if !emit_structured(output, &report)? {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &DemoReport) {
    let chain = if report.chain.is_empty() {
        "(none)".to_string()
    } else {
        report
            .chain
            .iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    };
    println!("Chain: {}", chain);
    for greeting in &report.greetings {
        println!("{}", greeting);
    }
    println!("Implementation calls: {}", report.implementation_calls);
    if !report.timings.is_empty() {
        println!("Timings:");
        for stats in &report.timings {
            println!(
                "- {}: {} calls, {} failed, total {}",
                stats.method,
                stats.calls,
                stats.failures,
                format_duration(Duration::from_micros(stats.total_micros))
            );
        }
    }
}
