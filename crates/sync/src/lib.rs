// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ferry-sync: offline-first sync engine and background scheduling
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐
//! │ Coordinator │────►│  Scheduler  │────►│ DomainRefresher  │
//! └─────────────┘     └─────────────┘     └──────────────────┘
//!                                                  │
//!                           ┌──────────────────────┴──────┐
//!                           ▼                             ▼
//!                    ┌─────────────┐               ┌─────────────┐
//!                    │  EmailSync  │               │ PersonaSync │
//!                    └─────────────┘               └─────────────┘
//!                           │                             │
//!                           └──────────────┬──────────────┘
//!                                          ▼
//!                                ┌──────────────────┐
//!                                │ DomainSyncEngine │ ◄── LocalStore, RemoteClient,
//!                                └──────────────────┘     ConnectivityProbe
//! ```

pub mod coordinator;
pub mod email;
pub mod engine;
pub mod error;
pub mod persona;
pub mod refresh;
pub mod scheduler;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use coordinator::{SyncCoordinator, SyncStrategy};
pub use email::{EmailEngine, EmailSync};
pub use engine::{DomainSyncEngine, Fetched, Mutation, Source};
pub use error::{Result, SyncError};
pub use persona::{PersonaEngine, PersonaSync};
pub use refresh::{DomainRefresher, Refresh, RefreshReport, RefreshTarget, TargetOutcome};
pub use scheduler::{JobInfo, JobKind, JobState, SchedulerConfig, SyncScheduler, WorkKey};
pub use session::wipe_local_data;
