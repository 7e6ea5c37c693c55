// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Unattended sync execution.
//!
//! Every job lives under a unique [`WorkKey`]. Scheduling a job under a key
//! that is already in use replaces the old job, so at most one job per key
//! is ever active. Each job runs as a background task that waits for its
//! delay, waits for the network when required, runs a domain refresh and
//! retries failed runs with exponential backoff.
//!
//! ```text
//! Idle ──► Scheduled ──► Running ──► Idle (periodic: back to Scheduled)
//!                          │
//!                          ▼
//!                     FailedRetry ──► Running ... ──► FailedTerminal
//! ```
//!
//! Cancellation is observed while a job waits. A refresh that is already
//! running always completes.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use ferry_core::{ConnectivityProbe, Domain};

use crate::error::SyncError;
use crate::refresh::Refresh;

/// What drives a job's executions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobKind {
    /// Re-arms every interval; intervals are clamped to the configured minimum.
    Periodic,
    /// Runs once after a delay.
    OneShot,
    /// Runs once as soon as the network allows.
    Immediate,
    /// Redundant periodic timer that runs without the network constraint.
    Backup,
    /// One-shot that re-arms itself after every run. Not clamped.
    Chained,
}

impl JobKind {
    pub const ALL: [JobKind; 5] = [
        JobKind::Periodic,
        JobKind::OneShot,
        JobKind::Immediate,
        JobKind::Backup,
        JobKind::Chained,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Periodic => "periodic",
            JobKind::OneShot => "one_shot",
            JobKind::Immediate => "immediate",
            JobKind::Backup => "backup",
            JobKind::Chained => "chained",
        }
    }

    fn key_suffix(&self) -> Option<&'static str> {
        match self {
            JobKind::Periodic => None,
            JobKind::OneShot => Some("once"),
            JobKind::Immediate => Some("now"),
            JobKind::Backup => Some("backup"),
            JobKind::Chained => Some("chain"),
        }
    }

    fn requires_network(&self) -> bool {
        !matches!(self, JobKind::Backup)
    }

    /// Whether the job re-arms after each execution.
    pub fn repeats(&self) -> bool {
        !matches!(self, JobKind::OneShot | JobKind::Immediate)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deduplication identity of a scheduled job: `sync:{domain}[:{suffix}]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkKey {
    pub domain: Domain,
    pub kind: JobKind,
}

impl WorkKey {
    pub fn new(domain: Domain, kind: JobKind) -> Self {
        WorkKey { domain, kind }
    }

    pub fn periodic(domain: Domain) -> Self {
        Self::new(domain, JobKind::Periodic)
    }

    pub fn one_shot(domain: Domain) -> Self {
        Self::new(domain, JobKind::OneShot)
    }

    pub fn immediate(domain: Domain) -> Self {
        Self::new(domain, JobKind::Immediate)
    }

    pub fn backup(domain: Domain) -> Self {
        Self::new(domain, JobKind::Backup)
    }

    pub fn chained(domain: Domain) -> Self {
        Self::new(domain, JobKind::Chained)
    }
}

impl fmt::Display for WorkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.key_suffix() {
            Some(suffix) => write!(f, "sync:{}:{}", self.domain, suffix),
            None => write!(f, "sync:{}", self.domain),
        }
    }
}

impl FromStr for WorkKey {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SyncError::InvalidWorkKey(s.to_string());
        let mut parts = s.split(':');
        if parts.next() != Some("sync") {
            return Err(invalid());
        }
        let domain: Domain = parts
            .next()
            .ok_or_else(invalid)?
            .parse()
            .map_err(|_| invalid())?;
        let kind = match parts.next() {
            None => JobKind::Periodic,
            Some(suffix) => JobKind::ALL
                .into_iter()
                .find(|k| k.key_suffix() == Some(suffix))
                .ok_or_else(invalid)?,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(WorkKey::new(domain, kind))
    }
}

/// Job state values for the atomic state field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JobState {
    Idle = 0,
    Scheduled = 1,
    Running = 2,
    FailedRetry = 3,
    FailedTerminal = 4,
}

impl JobState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => JobState::Scheduled,
            2 => JobState::Running,
            3 => JobState::FailedRetry,
            4 => JobState::FailedTerminal,
            _ => JobState::Idle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Scheduled => "scheduled",
            JobState::Running => "running",
            JobState::FailedRetry => "failed_retry",
            JobState::FailedTerminal => "failed_terminal",
        }
    }

    /// Whether a job in this state will still execute.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobState::Scheduled | JobState::Running | JobState::FailedRetry
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job state shared between the job task and status readers.
///
/// Uses atomic fields for lock-free reads.
#[derive(Debug, Default)]
pub struct SharedJobState {
    state: AtomicU8,
    attempt: AtomicU32,
    runs: AtomicU64,
    failures: AtomicU64,
}

impl SharedJobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> JobState {
        JobState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set(&self, state: JobState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Current attempt of the running execution (0 when not running).
    pub fn attempt(&self) -> u32 {
        self.attempt.load(Ordering::Acquire)
    }

    fn set_attempt(&self, attempt: u32) {
        self.attempt.store(attempt, Ordering::Release);
    }

    /// Number of completed refresh runs, retries included.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Acquire)
    }

    /// Number of executions that ended in terminal failure.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Acquire)
    }
}

/// Configuration for the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Shortest allowed periodic interval.
    pub min_periodic_interval: Duration,
    /// Delay before the first retry of a failed run.
    pub initial_backoff: Duration,
    /// Upper bound for the retry delay.
    pub max_backoff: Duration,
    /// Runs per execution, first attempt included.
    pub max_attempts: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_periodic_interval: Duration::from_secs(15 * 60),
            initial_backoff: Duration::from_secs(30),
            max_backoff: Duration::from_secs(10 * 60),
            max_attempts: 3,
        }
    }
}

/// Snapshot of a scheduled job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    pub key: WorkKey,
    /// Interval for repeating jobs, delay for one-shots.
    pub period: Duration,
    pub state: JobState,
    pub attempt: u32,
    pub runs: u64,
    pub failures: u64,
}

struct JobEntry {
    period: Duration,
    state: Arc<SharedJobState>,
    cancel: CancellationToken,
}

/// Everything a job task needs, detached from the scheduler.
#[derive(Clone)]
struct JobContext {
    key: WorkKey,
    config: SchedulerConfig,
    refresher: Arc<dyn Refresh>,
    probe: Arc<dyn ConnectivityProbe>,
    state: Arc<SharedJobState>,
    cancel: CancellationToken,
}

/// Runs domain refreshes on a schedule.
///
/// Scheduling methods spawn Tokio tasks and must be called from within a
/// runtime.
pub struct SyncScheduler {
    config: SchedulerConfig,
    refresher: Arc<dyn Refresh>,
    probe: Arc<dyn ConnectivityProbe>,
    jobs: Mutex<HashMap<WorkKey, JobEntry>>,
    shutdown: CancellationToken,
}

impl SyncScheduler {
    pub fn new(
        config: SchedulerConfig,
        refresher: Arc<dyn Refresh>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            config,
            refresher,
            probe,
            jobs: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run `refresh_all(domain)` every `interval`, replacing any periodic
    /// job for the domain. The first run fires one interval from now.
    pub fn schedule_periodic(&self, domain: Domain, interval: Duration) {
        let min = self.config.min_periodic_interval;
        let interval = if interval < min {
            tracing::warn!(
                %domain,
                requested_secs = interval.as_secs(),
                min_secs = min.as_secs(),
                "periodic interval below minimum, clamping; use chained jobs for short intervals"
            );
            min
        } else {
            interval
        };
        self.enqueue(WorkKey::periodic(domain), interval);
    }

    /// Run `refresh_all(domain)` once after `delay`.
    pub fn schedule_one_shot(&self, domain: Domain, delay: Duration) {
        self.enqueue(WorkKey::one_shot(domain), delay);
    }

    /// Run `refresh_all(domain)` as soon as the network allows.
    ///
    /// Kept under its own key so a pending delayed one-shot still runs.
    pub fn trigger_immediate(&self, domain: Domain) {
        self.enqueue(WorkKey::immediate(domain), Duration::ZERO);
    }

    /// Redundant timer that runs every `interval` without waiting for the
    /// network.
    pub fn schedule_backup(&self, domain: Domain, interval: Duration) {
        self.enqueue(WorkKey::backup(domain), interval);
    }

    /// Chain of one-shot jobs, each armed when the previous run finished.
    ///
    /// Bypasses the periodic minimum. Meant for low-latency and test setups.
    pub fn schedule_chained(&self, domain: Domain, interval: Duration) {
        self.enqueue(WorkKey::chained(domain), interval);
    }

    /// Cancel every job of `domain`. Cancelling nothing is not an error.
    pub fn cancel_all(&self, domain: Domain) {
        self.cancel_where(|key| key.domain == domain);
    }

    /// Cancel the repeating jobs of `domain`, leaving one-time work queued.
    pub fn cancel_repeating(&self, domain: Domain) {
        self.cancel_where(|key| key.domain == domain && key.kind.repeats());
    }

    fn cancel_where(&self, matches: impl Fn(&WorkKey) -> bool) {
        let removed: Vec<(WorkKey, JobEntry)> = {
            let mut jobs = self.lock_jobs();
            let keys: Vec<WorkKey> = jobs.keys().filter(|k| matches(k)).copied().collect();
            keys.into_iter()
                .filter_map(|k| jobs.remove(&k).map(|entry| (k, entry)))
                .collect()
        };

        for (key, entry) in removed {
            entry.cancel.cancel();
            tracing::info!(%key, "cancelled sync job");
        }
    }

    /// Cancel every job of every domain.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.lock_jobs().clear();
    }

    /// State of the job under `key`; absent jobs are idle.
    pub fn state(&self, key: WorkKey) -> JobState {
        self.lock_jobs()
            .get(&key)
            .map_or(JobState::Idle, |entry| entry.state.get())
    }

    pub fn job(&self, key: WorkKey) -> Option<JobInfo> {
        self.lock_jobs().get(&key).map(|entry| snapshot(key, entry))
    }

    /// Snapshot of every known job, ordered by key.
    pub fn jobs(&self) -> Vec<JobInfo> {
        let mut jobs: Vec<JobInfo> = self
            .lock_jobs()
            .iter()
            .map(|(key, entry)| snapshot(*key, entry))
            .collect();
        jobs.sort_by_key(|job| job.key);
        jobs
    }

    fn lock_jobs(&self) -> MutexGuard<'_, HashMap<WorkKey, JobEntry>> {
        // Entries stay consistent under poisoning: every mutation is a
        // single insert or remove.
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace-on-conflict enqueue.
    fn enqueue(&self, key: WorkKey, period: Duration) {
        let state = Arc::new(SharedJobState::new());
        state.set(JobState::Scheduled);
        let cancel = self.shutdown.child_token();

        let previous = self.lock_jobs().insert(
            key,
            JobEntry {
                period,
                state: Arc::clone(&state),
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.cancel.cancel();
            tracing::debug!(%key, "replaced existing sync job");
        }
        tracing::info!(%key, period_secs = period.as_secs(), "scheduled sync job");

        let ctx = JobContext {
            key,
            config: self.config.clone(),
            refresher: Arc::clone(&self.refresher),
            probe: Arc::clone(&self.probe),
            state,
            cancel,
        };
        tokio::spawn(run_job(ctx, period));
    }
}

fn snapshot(key: WorkKey, entry: &JobEntry) -> JobInfo {
    JobInfo {
        key,
        period: entry.period,
        state: entry.state.get(),
        attempt: entry.state.attempt(),
        runs: entry.state.runs(),
        failures: entry.state.failures(),
    }
}

/// Background job task.
async fn run_job(ctx: JobContext, period: Duration) {
    loop {
        ctx.state.set(JobState::Scheduled);
        if !ctx.wait(period).await {
            return;
        }
        if !execute(&ctx).await {
            return;
        }
        if !ctx.key.kind.repeats() {
            if ctx.state.get() != JobState::FailedTerminal {
                ctx.state.set(JobState::Idle);
            }
            return;
        }
    }
}

/// One execution: constraint wait, refresh, bounded retries.
///
/// Returns false if the job was cancelled while waiting.
async fn execute(ctx: &JobContext) -> bool {
    let key = ctx.key;
    let mut attempt = 0u32;
    let mut backoff = ctx.config.initial_backoff;

    loop {
        if key.kind.requires_network() && !ctx.wait_for_network().await {
            return false;
        }

        attempt = attempt.saturating_add(1);
        ctx.state.set(JobState::Running);
        ctx.state.set_attempt(attempt);
        tracing::debug!(%key, attempt, "running sync job");

        // Not raced against cancellation: an in-flight refresh always completes.
        let report = ctx.refresher.refresh_all(key.domain).await;
        ctx.state.runs.fetch_add(1, Ordering::AcqRel);

        if !report.is_failure() {
            ctx.state.set_attempt(0);
            tracing::info!(%key, records = report.record_count(), "sync job completed");
            return true;
        }

        if attempt >= ctx.config.max_attempts {
            ctx.state.set(JobState::FailedTerminal);
            ctx.state.set_attempt(0);
            ctx.state.failures.fetch_add(1, Ordering::AcqRel);
            tracing::error!(%key, attempts = attempt, "sync job failed, giving up");
            return true;
        }

        ctx.state.set(JobState::FailedRetry);
        tracing::warn!(
            %key,
            attempt,
            backoff_ms = backoff.as_millis() as u64,
            "sync job failed, retrying"
        );
        if !ctx.wait(backoff).await {
            return false;
        }
        backoff = std::cmp::min(backoff.saturating_mul(2), ctx.config.max_backoff);
    }
}

impl JobContext {
    /// Sleep unless cancelled. Returns false on cancellation.
    async fn wait(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    /// Block until the probe reports the network as available.
    ///
    /// Returns false on cancellation, or if the connectivity watch closes; the
    /// latter leaves the job `FailedTerminal`.
    async fn wait_for_network(&self) -> bool {
        if self.probe.is_available() {
            return true;
        }
        tracing::debug!(key = %self.key, "waiting for network");
        let mut available = self.probe.watch();
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            online = async { available.wait_for(|up| *up).await.is_ok() } => {
                if !online {
                    self.state.set(JobState::FailedTerminal);
                    self.state.failures.fetch_add(1, Ordering::AcqRel);
                    tracing::error!(key = %self.key, "connectivity watch closed, abandoning sync job");
                }
                online
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
