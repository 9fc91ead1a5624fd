//! CLI command definitions and dispatch.

pub mod run;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use corral_common::config::CorralConfig;

/// corral: run one command inside a chroot container built from a tar image.
#[derive(Parser, Debug)]
#[command(name = "corral", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// JSON file with default image name and directories.
    #[arg(long, global = true, env = "CORRAL_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a container from an image and run a command inside it.
    Run(run::RunArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the config file is unreadable or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => CorralConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CorralConfig::default(),
    };
    match cli.command {
        Command::Run(args) => run::execute(args, &config),
    }
}
