// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers for the `ferryd` binary.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use ferry_core::{ConnectivityProbe, Domain, Email};
use ferry_sync::{Refresh, RefreshReport, SyncCoordinator, SyncStrategy};

use crate::app::{acquire_lock, App};
use crate::cli::{CacheCommand, Command, OutputFormat};
use crate::error::{Error, Result};

/// PID filename within the state directory.
const PID_NAME: &str = "ferryd.pid";

pub async fn dispatch(command: Command, app: App) -> Result<()> {
    match command {
        Command::Run {
            strategy,
            interval_secs,
        } => run(app, strategy, interval_secs).await,
        Command::Sync { domain, output } => sync(&app, domain, output).await,
        Command::Cache { command } => match command {
            CacheCommand::Prune { days } => prune(&app, days).await,
            CacheCommand::Pending { output } => pending(&app, output).await,
        },
        Command::Logout => logout(&app).await,
    }
}

async fn run(app: App, strategy: Option<SyncStrategy>, interval_secs: Option<u64>) -> Result<()> {
    let _lock = acquire_lock(&app.state_dir)?;
    let pid_path = app.state_dir.join(PID_NAME);
    fs::write(&pid_path, std::process::id().to_string())?;

    let strategy = strategy.unwrap_or(app.config.sync.strategy);
    let interval = interval_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| app.config.sync_interval());

    let stop = CancellationToken::new();
    let monitor = tokio::spawn(
        Arc::clone(&app.probe).monitor(app.config.probe_interval(), stop.clone()),
    );

    if let Err(e) = app.prune(app.config.prune_after()).await {
        tracing::warn!(error = %e, "startup prune failed");
    }

    let scheduler = Arc::new(app.scheduler());
    let coordinator = SyncCoordinator::new(Arc::clone(&scheduler));
    coordinator.enable(strategy, interval);
    coordinator.trigger_now();
    tracing::info!(
        %strategy,
        interval_secs = interval.as_secs(),
        pid = std::process::id(),
        "ferryd running"
    );

    let signal = tokio::signal::ctrl_c().await;

    tracing::info!("shutting down");
    coordinator.disable();
    scheduler.shutdown();
    stop.cancel();
    if let Err(e) = monitor.await {
        tracing::warn!(error = %e, "probe monitor ended abnormally");
    }
    let _ = fs::remove_file(&pid_path);
    tracing::info!("ferryd stopped");
    signal?;
    Ok(())
}

async fn sync(app: &App, domain: Option<Domain>, output: OutputFormat) -> Result<()> {
    app.probe.refresh().await;
    let domains = match domain {
        Some(domain) => vec![domain],
        None => Domain::ALL.to_vec(),
    };

    let mut failed = None;
    for domain in domains {
        let report = app.refresher.refresh_all(domain).await;
        println!("{}", render_report(&report, output));
        if report.is_failure() && failed.is_none() {
            failed = Some(failure_of(&report));
        }
    }
    match failed {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// The error a failed refresh surfaces: the server's answer when there was
/// one, otherwise unreachable.
fn failure_of(report: &RefreshReport) -> Error {
    let cause = match report.remote_error() {
        Some(err) => ferry_core::Error::Remote(err.clone()),
        None => ferry_core::Error::NetworkFailure(format!(
            "{}: no target could be refreshed",
            report.domain
        )),
    };
    Error::SyncFailed {
        domain: report.domain,
        cause,
    }
}

async fn prune(app: &App, days: Option<u32>) -> Result<()> {
    let max_age = match days {
        Some(days) => chrono::Duration::days(i64::from(days)),
        None => app.config.prune_after(),
    };
    let (emails, personas) = app.prune(max_age).await?;
    println!("Pruned {emails} emails and {personas} personas");
    Ok(())
}

async fn pending(app: &App, output: OutputFormat) -> Result<()> {
    let emails = app.emails.pending().await?;
    println!("{}", render_pending(&emails, output));
    Ok(())
}

async fn logout(app: &App) -> Result<()> {
    app.wipe().await?;
    println!("Local data cleared");
    Ok(())
}

pub(crate) fn render_report(report: &RefreshReport, output: OutputFormat) -> String {
    match output {
        OutputFormat::Json => {
            let targets: Vec<_> = report
                .outcomes
                .iter()
                .map(|o| match &o.result {
                    Ok(count) => json!({ "target": o.target.to_string(), "records": count }),
                    Err(reason) => json!({ "target": o.target.to_string(), "error": reason }),
                })
                .collect();
            json!({
                "domain": report.domain,
                "failed": report.is_failure(),
                "targets": targets,
            })
            .to_string()
        }
        OutputFormat::Text => {
            let mut lines = vec![format!(
                "{}: {} records",
                report.domain,
                report.record_count()
            )];
            for outcome in &report.outcomes {
                lines.push(match &outcome.result {
                    Ok(count) => format!("  {:<16} {count}", outcome.target.to_string()),
                    Err(reason) => format!("  {:<16} failed: {reason}", outcome.target.to_string()),
                });
            }
            lines.join("\n")
        }
    }
}

pub(crate) fn render_pending(emails: &[Email], output: OutputFormat) -> String {
    match output {
        OutputFormat::Json => {
            let rows: Vec<_> = emails
                .iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "subject": e.subject,
                        "to": e.to,
                        "sync_state": e.sync_state,
                    })
                })
                .collect();
            serde_json::Value::Array(rows).to_string()
        }
        OutputFormat::Text if emails.is_empty() => "No pending emails".to_string(),
        OutputFormat::Text => emails
            .iter()
            .map(|e| {
                format!(
                    "{}  {}  {}",
                    e.id,
                    e.sync_state,
                    e.subject.as_deref().unwrap_or("(no subject)")
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
