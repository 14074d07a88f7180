mod artifact;
mod cli;
mod config;
mod error;
mod mcp;
mod publish;
mod remote;
mod repository;
mod schedule;
mod tools;

use std::process;

use clap::Parser;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use cli::Cli;
use config::Config;
use error::Error;

fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries command output and MCP traffic.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(
            std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        ))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(cli.command, &config) {
        eprintln!("Error: {e}");
        if let Error::ArtifactFormat(publish) | Error::RepositoryState(publish) = &e {
            eprintln!("Local state: {}", publish.leftover());
        }
        process::exit(1);
    }
}

/// `RUST_LOG` directives, falling back to `info` when unset or empty.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}
