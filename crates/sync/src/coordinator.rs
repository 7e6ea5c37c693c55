// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background sync routing.
//!
//! The coordinator keeps no state of its own; it maps a [`SyncStrategy`]
//! onto scheduler primitives for every domain.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ferry_core::Domain;

use crate::error::SyncError;
use crate::scheduler::SyncScheduler;

/// Which scheduling primitives background sync arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStrategy {
    /// Periodic job only.
    #[default]
    Periodic,
    /// Backup timer only; runs without waiting for the network.
    BackupTimer,
    /// Periodic job plus backup timer. Executions are not de-duplicated.
    Combined,
    /// Self re-arming one-shots, for short intervals.
    Chained,
}

impl SyncStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStrategy::Periodic => "periodic",
            SyncStrategy::BackupTimer => "backup_timer",
            SyncStrategy::Combined => "combined",
            SyncStrategy::Chained => "chained",
        }
    }
}

impl fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStrategy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "periodic" => Ok(SyncStrategy::Periodic),
            "backup_timer" | "backup" => Ok(SyncStrategy::BackupTimer),
            "combined" => Ok(SyncStrategy::Combined),
            "chained" => Ok(SyncStrategy::Chained),
            _ => Err(SyncError::InvalidStrategy(s.to_string())),
        }
    }
}

pub struct SyncCoordinator {
    scheduler: Arc<SyncScheduler>,
    domains: Vec<Domain>,
}

impl SyncCoordinator {
    /// Coordinator over every domain.
    pub fn new(scheduler: Arc<SyncScheduler>) -> Self {
        Self::with_domains(scheduler, Domain::ALL.to_vec())
    }

    pub fn with_domains(scheduler: Arc<SyncScheduler>, domains: Vec<Domain>) -> Self {
        SyncCoordinator { scheduler, domains }
    }

    pub fn scheduler(&self) -> &Arc<SyncScheduler> {
        &self.scheduler
    }

    /// Arm background sync. Repeating jobs from a previous strategy are
    /// cancelled; pending one-time triggers are kept.
    pub fn enable(&self, strategy: SyncStrategy, interval: Duration) {
        tracing::info!(%strategy, interval_secs = interval.as_secs(), "enabling background sync");
        for &domain in &self.domains {
            self.scheduler.cancel_repeating(domain);
            match strategy {
                SyncStrategy::Periodic => self.scheduler.schedule_periodic(domain, interval),
                SyncStrategy::BackupTimer => self.scheduler.schedule_backup(domain, interval),
                SyncStrategy::Combined => {
                    self.scheduler.schedule_periodic(domain, interval);
                    self.scheduler.schedule_backup(domain, interval);
                }
                SyncStrategy::Chained => self.scheduler.schedule_chained(domain, interval),
            }
        }
    }

    /// Cancel every background job.
    pub fn disable(&self) {
        tracing::info!("disabling background sync");
        for &domain in &self.domains {
            self.scheduler.cancel_all(domain);
        }
    }

    /// Sync every domain as soon as the network allows.
    pub fn trigger_now(&self) {
        for &domain in &self.domains {
            self.scheduler.trigger_immediate(domain);
        }
    }

    /// Sync every domain once after `delay`.
    pub fn trigger_after(&self, delay: Duration) {
        for &domain in &self.domains {
            self.scheduler.schedule_one_shot(domain, delay);
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
