// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Composition root: builds every collaborator from the config and wires
//! them together.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use ferry_core::{Email, EmailFilter, FileSelection, Persona, PersonaFilter, SqliteStore};
use ferry_sync::{
    wipe_local_data, DomainRefresher, DomainSyncEngine, EmailSync, PersonaSync, SyncScheduler,
};

use crate::api::{EmailApi, PersonaApi};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::probe::TcpProbe;

/// SQLite cache shared by both domain stores.
const DB_NAME: &str = "cache.db";
/// Current-persona selection file.
const SELECTION_NAME: &str = "selection.json";
/// Lock filename for single instance guarantee.
const LOCK_NAME: &str = "ferryd.lock";
/// Log filename within the state directory.
pub const LOG_NAME: &str = "ferryd.log";

pub struct App {
    pub config: Config,
    pub state_dir: PathBuf,
    pub emails: Arc<EmailSync>,
    pub personas: Arc<PersonaSync>,
    pub probe: Arc<TcpProbe>,
    pub refresher: Arc<DomainRefresher>,
    email_store: Arc<SqliteStore<Email, EmailFilter>>,
    persona_store: Arc<SqliteStore<Persona, PersonaFilter>>,
    selection: Arc<FileSelection>,
}

impl App {
    pub fn open(config: Config, state_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&state_dir)?;
        let db_path = state_dir.join(DB_NAME);
        let email_store: Arc<SqliteStore<Email, EmailFilter>> =
            Arc::new(SqliteStore::open(&db_path)?);
        let persona_store: Arc<SqliteStore<Persona, PersonaFilter>> =
            Arc::new(SqliteStore::open(&db_path)?);
        let selection = Arc::new(FileSelection::open(state_dir.join(SELECTION_NAME))?);

        let http = HttpClient::from_config(&config)?;
        let (host, port) = config.probe_target()?;
        let probe = Arc::new(TcpProbe::new(&host, port, config.probe_timeout()));

        let emails = Arc::new(EmailSync::new(DomainSyncEngine::new(
            email_store.clone(),
            Arc::new(EmailApi::new(http.clone())),
            probe.clone(),
        )));
        let personas = Arc::new(PersonaSync::new(
            DomainSyncEngine::new(
                persona_store.clone(),
                Arc::new(PersonaApi::new(http.clone())),
                probe.clone(),
            ),
            selection.clone(),
        ));
        let refresher = Arc::new(DomainRefresher::new(emails.clone(), personas.clone()));

        tracing::debug!(
            state_dir = %state_dir.display(),
            base_url = %http.base(),
            probe = probe.target(),
            "app initialized"
        );

        Ok(App {
            config,
            state_dir,
            emails,
            personas,
            probe,
            refresher,
            email_store,
            persona_store,
            selection,
        })
    }

    /// Scheduler over this app's refresher and probe.
    pub fn scheduler(&self) -> SyncScheduler {
        SyncScheduler::new(
            self.config.scheduler_config(),
            self.refresher.clone(),
            self.probe.clone(),
        )
    }

    /// Drop cached rows not synced within `max_age`.
    /// Returns `(emails, personas)` removed.
    pub async fn prune(&self, max_age: chrono::Duration) -> Result<(usize, usize)> {
        let emails = self.emails.prune(max_age).await?;
        let personas = self.personas.engine().prune(Utc::now() - max_age).await?;
        if emails + personas > 0 {
            tracing::info!(emails, personas, "pruned stale cache rows");
        }
        Ok((emails, personas))
    }

    /// Remove every piece of local account data.
    pub async fn wipe(&self) -> Result<()> {
        wipe_local_data(
            self.email_store.as_ref(),
            self.persona_store.as_ref(),
            self.selection.as_ref(),
        )
        .await?;
        Ok(())
    }
}

/// Hold the state-dir lock for the lifetime of the returned file.
pub fn acquire_lock(state_dir: &Path) -> Result<fs::File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(state_dir.join(LOCK_NAME))?;
    file.try_lock_exclusive()
        .map_err(|_| Error::AlreadyRunning)?;
    Ok(file)
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
