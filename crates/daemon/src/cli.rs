// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use ferry_core::Domain;
use ferry_sync::SyncStrategy;

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "ferryd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first sync daemon for the ferry mail client")]
pub struct Cli {
    /// Config file (defaults to $FERRY_CONFIG or the user config dir)
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// State directory holding the cache, selection, and logs
    #[arg(long = "state-dir", global = true, value_name = "path")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the background sync loop until interrupted
    Run {
        /// Scheduling strategy (periodic, chained, backup, combined)
        #[arg(long)]
        strategy: Option<SyncStrategy>,

        /// Seconds between periodic refreshes (clamped to the minimum)
        #[arg(long = "interval-secs", value_name = "secs")]
        interval_secs: Option<u64>,
    },

    /// Refresh cached data from the server once, in the foreground
    Sync {
        /// Only refresh this domain (email or persona)
        #[arg(long)]
        domain: Option<Domain>,

        #[arg(short = 'o', long = "output", value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Inspect or trim the local cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },

    /// Delete every piece of local account data
    Logout,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Drop cached rows not synced within the retention window
    Prune {
        /// Override the configured retention window
        #[arg(long, value_name = "days")]
        days: Option<u32>,
    },

    /// List outgoing emails that have not reached the server
    Pending {
        #[arg(short = 'o', long = "output", value_enum, default_value_t)]
        output: OutputFormat,
    },
}

impl Command {
    /// Whether this command should log to the state-dir file instead of stderr.
    pub fn is_daemon(&self) -> bool {
        matches!(self, Command::Run { .. })
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
