//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "printguard")]
#[command(author, version, about = "Keep printer auto-discovery and auto-configuration switched off", long_about = None)]
pub struct Args {
    /// What to do (defaults to enforce)
    #[command(subcommand)]
    pub command: Option<SubCommand>,

    /// Probe the host and report what would change without changing it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: /etc/printguard/config.toml if present)
    #[arg(long, global = true, env = "PRINTGUARD_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Apply file actions under this directory instead of the configured root
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Exit with status 2 when any action failed
    #[arg(long, global = true)]
    pub strict: bool,
}

impl Args {
    pub fn command(&self) -> SubCommand {
        self.command.clone().unwrap_or(SubCommand::Enforce)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SubCommand {
    /// Apply the printer lockdown policy (requires root)
    Enforce,

    /// Report which actions are satisfied without changing anything
    Status,

    /// List the configured actions without probing the host
    Plan,

    /// Terminate printer processes, repeatedly until stopped
    Watchdog {
        /// Seconds between sweeps (default from configuration)
        #[arg(long, short)]
        interval: Option<u64>,

        /// Run a single sweep and exit
        #[arg(long)]
        once: bool,
    },
}
