use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use crate::cli::output::{emit_structured, OutputFormat};
use crate::demo::InterceptorName;

#[derive(Debug, Serialize)]
struct BuildInfo {
    version: &'static str,
    build_date: &'static str,
    git_hash: &'static str,
    git_branch: &'static str,
    interceptors: Vec<InterceptorInfo>,
}

#[derive(Debug, Serialize)]
struct InterceptorInfo {
    name: InterceptorName,
    description: &'static str,
}

pub fn cmd_info(output: OutputFormat) -> Result<()> {
    let info = BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_date: env!("BUILD_DATE"),
        git_hash: env!("GIT_HASH"),
        git_branch: env!("GIT_BRANCH"),
        interceptors: InterceptorName::value_variants()
            .iter()
            .map(|name| InterceptorInfo {
                name: *name,
                description: name.description(),
            })
            .collect(),
    };

    if emit_structured(output, &info)? {
        return Ok(());
    }

    println!("Interpose System Information");
    println!("============================");
    println!("Version: {}", info.version);
    println!("Build Date: {}", info.build_date);
    println!("Git Commit: {} ({})", info.git_hash, info.git_branch);
    println!();
    println!("Interceptors:");
    for interceptor in &info.interceptors {
        println!(
            "- {}: {}",
            interceptor.name.as_str(),
            interceptor.description
        );
    }
    Ok(())
}
