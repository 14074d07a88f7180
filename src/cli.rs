//! Command-line interface.
//!
//! - `sunday-coffee publish <true|false>`: update the status page in a local
//!   checkout and push it on a new branch.
//! - `sunday-coffee trigger <on|off>`: ask the hosted workflow to do that.
//! - `sunday-coffee serve`: MCP server on stdio for LLM clients.
//! - `sunday-coffee next`: show which Sunday a publish would target today.

use std::{io, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::{
    config::Config,
    error::Error,
    mcp,
    publish::{PublishOutcome, PublishRecord, Publisher},
    remote::{Trigger, WorkflowDispatch},
    repository::GitCli,
    schedule,
};

/// Publish the weekly Sunday coffee status.
#[derive(Debug, Parser)]
#[command(name = "sunday-coffee", version)]
pub struct Cli {
    /// Config file (default: ~/.sunday-coffee/config.toml, if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Update the status page and push it on a branch named for next Sunday.
    ///
    /// STATUS is `true` (any case) for on; any other value means off.
    Publish {
        status: String,

        /// Working tree of the status page repository.
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// Trigger the hosted publish workflow. Requires GITHUB_TOKEN.
    Trigger {
        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Serve the coffee tools to an MCP client over stdio.
    Serve,

    /// Print the date and branch the next publish would use.
    Next {
        /// Print the full publish record as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    On,
    Off,
    True,
    False,
}

impl StatusArg {
    fn is_on(self) -> bool {
        matches!(self, Self::On | Self::True)
    }
}

/// `"true"` in any case is on; everything else, `"maybe"` included, is off.
pub fn parse_status(arg: &str) -> bool {
    arg.eq_ignore_ascii_case("true")
}

/// Run a parsed command.
pub fn run(command: Command, config: &Config) -> Result<(), Error> {
    match command {
        Command::Publish { status, repo } => cmd_publish(config, parse_status(&status), repo),
        Command::Trigger { status } => cmd_trigger(config, status.is_on()),
        Command::Serve => cmd_serve(config),
        Command::Next { json } => cmd_next(json),
    }
}

fn cmd_publish(config: &Config, status: bool, repo: PathBuf) -> Result<(), Error> {
    eprintln!(
        "Updating coffee status to: {}",
        if status { "ON" } else { "OFF" }
    );

    let git = GitCli::new(repo);
    tracing::debug!(workdir = %git.workdir().display(), "publishing from working tree");

    let mut publisher = Publisher::new(&config.publish, git);
    let outcome = publisher.run(status, schedule::today())?;
    let record = outcome.record();
    tracing::info!(stage = %outcome.stage(), branch = %record.branch, "publish finished");

    match &outcome {
        PublishOutcome::Published { sha, .. } => {
            println!("{}", record.branch);
            eprintln!("✓ Pushed {} ({})", record.branch, &sha[..sha.len().min(8)]);
            eprintln!("Target: {}", schedule::long_form(record.target_date));
            eprintln!("Next: open and merge a pull request from {}", record.branch);
        }
        PublishOutcome::Unchanged { .. } => {
            eprintln!(
                "Status page already up to date for {}; nothing pushed",
                schedule::long_form(record.target_date)
            );
        }
    }
    Ok(())
}

fn cmd_trigger(config: &Config, status: bool) -> Result<(), Error> {
    let report = WorkflowDispatch::new(&config.remote).trigger(status)?;
    eprintln!("{}", report.message);
    Ok(())
}

fn cmd_serve(config: &Config) -> Result<(), Error> {
    let token = if config.remote.token.is_some() {
        "set"
    } else {
        "not set (required)"
    };
    tracing::info!(
        owner = %config.remote.owner,
        repo = %config.remote.repo,
        token,
        "Sunday Coffee MCP server running on stdio"
    );
    let trigger = WorkflowDispatch::new(&config.remote);
    mcp::serve(io::stdin().lock(), io::stdout().lock(), &trigger)?;
    Ok(())
}

fn cmd_next(json: bool) -> Result<(), Error> {
    let record = PublishRecord::for_week(true, schedule::today());
    if json {
        let out = serde_json::to_string_pretty(&record).map_err(io::Error::from)?;
        println!("{out}");
    } else {
        println!("{}", schedule::long_form(record.target_date));
        println!("branch: {}", record.branch);
    }
    Ok(())
}
