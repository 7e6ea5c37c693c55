// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first reconciliation for one domain.
//!
//! Reads always start from the local store and only replace it with the
//! remote result when the remote call succeeds. Mutations are applied to the
//! local store first and then propagated on a best-effort basis; a remote
//! failure never rolls back the local write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;

use ferry_core::{
    local_id, observe_query, ConnectivityProbe, Error, Filter, LocalStore, Record, RemoteClient,
    RemoteError, Result, SyncState,
};

/// Where a fetch result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Cache,
}

/// Result of a read, with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub records: Vec<T>,
    pub source: Source,
    /// Set when the remote was reachable but the call failed.
    pub remote_error: Option<RemoteError>,
}

impl<T> Fetched<T> {
    fn remote(records: Vec<T>) -> Self {
        Fetched {
            records,
            source: Source::Remote,
            remote_error: None,
        }
    }

    fn cache(records: Vec<T>, remote_error: Option<RemoteError>) -> Self {
        Fetched {
            records,
            source: Source::Cache,
            remote_error,
        }
    }
}

/// A local-first write.
#[derive(Debug, Clone)]
pub enum Mutation<T: Record> {
    /// Store a new record. Drafts never leave the device.
    Create { record: T, draft: bool },
    /// Replace the record stored under `id`.
    Update { id: String, record: T },
    /// Flip a flag on the record stored under `id`.
    ToggleFlag { id: String, flag: T::Flag },
    /// Remove the record stored under `id`.
    Delete { id: String },
}

impl<T: Record> Mutation<T> {
    fn name(&self) -> &'static str {
        match self {
            Mutation::Create { .. } => "create",
            Mutation::Update { .. } => "update",
            Mutation::ToggleFlag { .. } => "toggle_flag",
            Mutation::Delete { .. } => "delete",
        }
    }
}

/// Reconciles a [`LocalStore`] with its [`RemoteClient`].
pub struct DomainSyncEngine<T: Record, F: Filter<T>> {
    store: Arc<dyn LocalStore<T, F>>,
    remote: Arc<dyn RemoteClient<T, F>>,
    probe: Arc<dyn ConnectivityProbe>,
}

impl<T: Record, F: Filter<T>> Clone for DomainSyncEngine<T, F> {
    fn clone(&self) -> Self {
        DomainSyncEngine {
            store: Arc::clone(&self.store),
            remote: Arc::clone(&self.remote),
            probe: Arc::clone(&self.probe),
        }
    }
}

impl<T: Record, F: Filter<T>> DomainSyncEngine<T, F> {
    pub fn new(
        store: Arc<dyn LocalStore<T, F>>,
        remote: Arc<dyn RemoteClient<T, F>>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        DomainSyncEngine {
            store,
            remote,
            probe,
        }
    }

    pub fn store(&self) -> &Arc<dyn LocalStore<T, F>> {
        &self.store
    }

    pub fn is_online(&self) -> bool {
        self.probe.is_available()
    }

    /// Records matching `filter`.
    ///
    /// Returns the remote set when the remote call succeeds and the cached
    /// set otherwise. Fails with [`Error::NetworkFailure`] only when the
    /// cache cannot be read and the remote is unreachable or failing.
    pub async fn fetch(&self, filter: &F) -> Result<Vec<T>> {
        self.fetch_with_source(filter).await.map(|f| f.records)
    }

    /// Like [`fetch`](Self::fetch), reporting where the records came from.
    pub async fn fetch_with_source(&self, filter: &F) -> Result<Fetched<T>> {
        let domain = T::DOMAIN;
        let local = self.store.query(filter).await;
        if let Err(err) = &local {
            tracing::warn!(%domain, error = %err, "local query failed");
        }

        if !self.probe.is_available() {
            tracing::debug!(%domain, "offline, serving cache");
            return match local {
                Ok(records) => Ok(Fetched::cache(records, None)),
                Err(err) => Err(Error::NetworkFailure(format!(
                    "{domain}: offline and cache unreadable: {err}"
                ))),
            };
        }

        match self.remote.fetch(filter).await {
            Ok(records) => {
                let now = Utc::now();
                let records: Vec<T> = records
                    .into_iter()
                    .map(|mut r| {
                        r.mark_synced(now);
                        r
                    })
                    .collect();
                if let Err(err) = self.store.upsert_all(records.clone()).await {
                    tracing::warn!(%domain, error = %err, "failed to cache remote records");
                }
                tracing::debug!(%domain, count = records.len(), "fetched from remote");
                Ok(Fetched::remote(records))
            }
            Err(remote_err) => {
                tracing::warn!(
                    %domain,
                    kind = remote_err.kind(),
                    error = %remote_err,
                    "remote fetch failed, serving cache"
                );
                match local {
                    Ok(records) => Ok(Fetched::cache(records, Some(remote_err))),
                    Err(local_err) => Err(Error::NetworkFailure(format!(
                        "{domain}: {remote_err}; cache: {local_err}"
                    ))),
                }
            }
        }
    }

    /// A single record, refreshed from the remote when online.
    ///
    /// A record the server reports as gone is removed from the cache and
    /// reported as [`Error::NotFound`].
    pub async fn fetch_one(&self, id: &str) -> Result<T> {
        let domain = T::DOMAIN;
        let local = match self.store.get(id).await {
            Ok(local) => local,
            Err(err) => {
                tracing::warn!(%domain, id, error = %err, "local lookup failed");
                None
            }
        };

        let local_only = local
            .as_ref()
            .is_some_and(|r| r.sync_state() == SyncState::LocalOnly);
        if local_only || !self.probe.is_available() {
            return local.ok_or_else(|| Error::NotAvailableOffline(format!("{domain} {id}")));
        }

        match self.remote.fetch_one(id).await {
            Ok(record) => self.accept(id, record).await,
            Err(RemoteError::NotFound(message)) => {
                tracing::info!(%domain, id, "record no longer exists on server");
                if local.is_some() {
                    self.store.delete(id).await?;
                }
                Err(Error::NotFound(format!("{domain} {id}: {message}")))
            }
            Err(err) => {
                tracing::warn!(
                    %domain,
                    id,
                    kind = err.kind(),
                    error = %err,
                    "remote lookup failed"
                );
                local.ok_or_else(|| Error::NotAvailableOffline(format!("{domain} {id}")))
            }
        }
    }

    /// The cached copy of a record, without touching the remote.
    pub async fn cached(&self, id: &str) -> Result<Option<T>> {
        self.store.get(id).await
    }

    /// Apply a mutation locally, then propagate it when possible.
    ///
    /// Only [`Error::NotFound`] (and local store failures) reach the caller.
    /// A failed remote call leaves the optimistic local result in place.
    pub async fn mutate(&self, op: Mutation<T>) -> Result<T> {
        tracing::debug!(domain = %T::DOMAIN, op = op.name(), "mutate");
        match op {
            Mutation::Create { record, draft } => self.create(record, draft).await,
            Mutation::Update { id, record } => self.update(&id, record).await,
            Mutation::ToggleFlag { id, flag } => self.toggle_flag(&id, flag).await,
            Mutation::Delete { id } => self.delete(&id).await,
        }
    }

    async fn create(&self, mut record: T, draft: bool) -> Result<T> {
        if record.id().is_empty() {
            record.set_id(local_id());
        }
        record.set_sync_state(SyncState::LocalOnly);
        record.set_last_synced_at(None);
        self.store.upsert(record.clone()).await?;

        if draft {
            tracing::debug!(domain = %T::DOMAIN, id = record.id(), "draft kept local");
            return Ok(record);
        }
        if !self.probe.is_available() {
            tracing::debug!(domain = %T::DOMAIN, id = record.id(), "offline, create kept local");
            return Ok(record);
        }

        match self.remote.create(record.clone()).await {
            Ok(created) => self.accept(record.id(), created).await,
            Err(err) => {
                self.log_remote_failure("create", record.id(), &err);
                Ok(record)
            }
        }
    }

    async fn update(&self, id: &str, mut record: T) -> Result<T> {
        let existing = self.require(id).await?;
        record.set_id(id.to_string());
        record.set_sync_state(existing.sync_state());
        record.set_last_synced_at(existing.last_synced_at());
        record.mark_stale();
        self.store.upsert(record.clone()).await?;

        if !self.should_propagate(&record) {
            return Ok(record);
        }

        match self.remote.update(id, record.clone()).await {
            Ok(updated) => self.accept(id, updated).await,
            Err(err) => {
                self.log_remote_failure("update", id, &err);
                Ok(record)
            }
        }
    }

    async fn toggle_flag(&self, id: &str, flag: T::Flag) -> Result<T> {
        let mut record = self
            .store
            .toggle_flag(id, flag)
            .await?
            .ok_or_else(|| not_found::<T>(id))?;

        if !self.should_propagate(&record) {
            return Ok(record);
        }

        let enabled = record.flag(flag);
        match self.remote.toggle_flag(id, flag, enabled).await {
            Ok(Some(updated)) => self.accept(id, updated).await,
            Ok(None) => {
                record.mark_synced(Utc::now());
                self.store.upsert(record.clone()).await?;
                Ok(record)
            }
            Err(err) => {
                self.log_remote_failure("toggle_flag", id, &err);
                Ok(record)
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<T> {
        let removed = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| not_found::<T>(id))?;

        if !self.should_propagate(&removed) {
            return Ok(removed);
        }

        match self.remote.delete(id).await {
            Ok(Some(deleted)) => Ok(deleted),
            Ok(None) => Ok(removed),
            Err(err) => {
                self.log_remote_failure("delete", id, &err);
                Ok(removed)
            }
        }
    }

    /// Remove cached records last synced before `cutoff`.
    pub async fn prune(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let removed = self.store.prune_older_than(cutoff).await?;
        tracing::info!(domain = %T::DOMAIN, removed, "pruned cache");
        Ok(removed)
    }

    /// Drop every cached record of this domain.
    pub async fn clear(&self) -> Result<()> {
        self.store.clear_all().await
    }

    /// Live view of the cached records matching `filter`.
    pub fn observe(&self, filter: F) -> BoxStream<'static, Result<Vec<T>>> {
        observe_query(Arc::clone(&self.store), filter)
    }

    async fn require(&self, id: &str) -> Result<T> {
        self.store.get(id).await?.ok_or_else(|| not_found::<T>(id))
    }

    /// Records the server has never seen have nothing to propagate to.
    fn should_propagate(&self, record: &T) -> bool {
        if record.sync_state() == SyncState::LocalOnly {
            tracing::debug!(
                domain = %T::DOMAIN,
                id = record.id(),
                "local-only record, not propagated"
            );
            return false;
        }
        if !self.probe.is_available() {
            tracing::debug!(domain = %T::DOMAIN, id = record.id(), "offline, change kept local");
            return false;
        }
        true
    }

    /// Store a server response as the synced value of `local_id`.
    async fn accept(&self, local_id: &str, mut record: T) -> Result<T> {
        if record.id().is_empty() {
            record.set_id(local_id.to_string());
        }
        record.mark_synced(Utc::now());
        self.store.upsert(record.clone()).await?;
        if record.id() != local_id {
            tracing::debug!(
                domain = %T::DOMAIN,
                local_id,
                server_id = record.id(),
                "replaced local id"
            );
            self.store.delete(local_id).await?;
        }
        Ok(record)
    }

    fn log_remote_failure(&self, op: &str, id: &str, err: &RemoteError) {
        tracing::warn!(
            domain = %T::DOMAIN,
            op,
            id,
            kind = err.kind(),
            error = %err,
            "remote propagation failed, keeping local result"
        );
    }
}

fn not_found<T: Record>(id: &str) -> Error {
    Error::NotFound(format!("{} {id}", T::DOMAIN))
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
