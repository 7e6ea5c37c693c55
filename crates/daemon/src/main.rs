// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ferryd - offline-first sync daemon.
//!
//! Keeps the local email and persona cache under `~/.local/state/ferry/`
//! in step with the mail API, scheduling background refreshes and serving
//! one-off maintenance commands.
//!
//! Usage:
//!   ferryd [--config <path>] [--state-dir <path>] <run|sync|cache|logout>

use std::fs;
use std::path::Path;

use clap::Parser;

mod api;
mod app;
mod cli;
mod commands;
mod config;
mod env;
mod error;
mod http;
mod probe;
#[cfg(test)]
mod test_support;

use app::{App, LOG_NAME};
use cli::Cli;
use config::Config;
use error::Result;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::debug!(error = %e, "command failed");
        eprintln!("error: {}", e.user_message());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let state_dir = config.state_dir(cli.state_dir.as_deref());
    fs::create_dir_all(&state_dir)?;

    if cli.command.is_daemon() {
        setup_logging(Some(&state_dir.join(LOG_NAME)), "info");
    } else {
        setup_logging(None, "warn");
    }
    tracing::info!("ferryd starting, state_dir={}", state_dir.display());

    let app = App::open(config, state_dir)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(commands::dispatch(cli.command, app))
}

fn setup_logging(log_path: Option<&Path>, default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(env::names::RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // Try to open log file, fall back to stderr
    let file = log_path.and_then(|path| {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });
    if let Some(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
