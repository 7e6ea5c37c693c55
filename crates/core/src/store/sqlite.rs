// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed store.
//!
//! Each domain gets its own table holding the record as a JSON payload next
//! to the columns the store itself needs (id, sync state, last sync time).
//! Filtering and ordering run on decoded records so local queries share one
//! implementation with [`Filter::apply`].

use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use futures_util::future::{self, BoxFuture, FutureExt};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::watch;

use super::LocalStore;
use crate::error::{Error, Result};
use crate::record::{Domain, Filter, Record};

fn table_name(domain: Domain) -> &'static str {
    match domain {
        Domain::Email => "emails",
        Domain::Persona => "personas",
    }
}

fn schema(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            sync_state TEXT NOT NULL,
            last_synced_at INTEGER,
            stored_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_last_synced ON {table}(last_synced_at);"
    )
}

pub struct SqliteStore<T, F> {
    conn: Mutex<Connection>,
    table: &'static str,
    revision: watch::Sender<u64>,
    _record: PhantomData<fn() -> (T, F)>,
}

impl<T: Record, F: Filter<T>> SqliteStore<T, F> {
    /// Open the store at `path`, creating the file and table if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let table = table_name(T::DOMAIN);
        conn.execute_batch(&schema(table))?;
        let (revision, _) = watch::channel(0);
        Ok(SqliteStore {
            conn: Mutex::new(conn),
            table,
            revision,
            _record: PhantomData,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::Poisoned("sqlite store"))
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn load(&self, conn: &Connection, id: &str) -> Result<Option<T>> {
        let payload: Option<String> = conn
            .query_row(
                &format!("SELECT payload FROM {} WHERE id = ?1", self.table),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        payload.map(|p| decode(&p)).transpose()
    }

    fn store(&self, conn: &Connection, record: &T) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (id, payload, sync_state, last_synced_at, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                self.table
            ),
            params![
                record.id(),
                serde_json::to_string(record)?,
                record.sync_state().as_str(),
                record.last_synced_at().map(|at| at.timestamp_millis()),
                Utc::now().timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    fn get_sync(&self, id: &str) -> Result<Option<T>> {
        let conn = self.conn()?;
        self.load(&conn, id)
    }

    fn query_sync(&self, filter: &F) -> Result<Vec<T>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT payload FROM {}", self.table))?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let records = payloads
            .iter()
            .map(|p| decode(p))
            .collect::<Result<Vec<T>>>()?;
        Ok(filter.apply(records))
    }

    fn upsert_all_sync(&self, records: &[T]) -> Result<()> {
        {
            let mut conn = self.conn()?;
            let tx = conn.transaction()?;
            for record in records {
                self.store(&tx, record)?;
            }
            tx.commit()?;
        }
        self.bump();
        Ok(())
    }

    fn delete_sync(&self, id: &str) -> Result<Option<T>> {
        let removed = {
            let conn = self.conn()?;
            let existing = self.load(&conn, id)?;
            if existing.is_some() {
                conn.execute(
                    &format!("DELETE FROM {} WHERE id = ?1", self.table),
                    params![id],
                )?;
            }
            existing
        };
        self.bump();
        Ok(removed)
    }

    fn toggle_flag_sync(&self, id: &str, flag: T::Flag) -> Result<Option<T>> {
        let updated = {
            let mut conn = self.conn()?;
            let tx = conn.transaction()?;
            let updated = match self.load(&tx, id)? {
                Some(mut record) => {
                    record.toggle_flag(flag);
                    record.mark_stale();
                    self.store(&tx, &record)?;
                    Some(record)
                }
                None => None,
            };
            tx.commit()?;
            updated
        };
        self.bump();
        Ok(updated)
    }

    fn clear_all_sync(&self) -> Result<()> {
        self.conn()?
            .execute(&format!("DELETE FROM {}", self.table), [])?;
        self.bump();
        Ok(())
    }

    fn prune_sync(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let removed = self.conn()?.execute(
            &format!(
                "DELETE FROM {} WHERE last_synced_at IS NOT NULL AND last_synced_at < ?1",
                self.table
            ),
            params![cutoff.timestamp_millis()],
        )?;
        self.bump();
        Ok(removed)
    }
}

fn decode<T: Record>(payload: &str) -> Result<T> {
    serde_json::from_str(payload)
        .map_err(|e| Error::CorruptedData(format!("invalid {} payload: {e}", T::DOMAIN)))
}

impl<T: Record, F: Filter<T>> LocalStore<T, F> for SqliteStore<T, F> {
    fn get(&self, id: &str) -> BoxFuture<'_, Result<Option<T>>> {
        future::ready(self.get_sync(id)).boxed()
    }

    fn query(&self, filter: &F) -> BoxFuture<'_, Result<Vec<T>>> {
        future::ready(self.query_sync(filter)).boxed()
    }

    fn upsert(&self, record: T) -> BoxFuture<'_, Result<()>> {
        future::ready(self.upsert_all_sync(std::slice::from_ref(&record))).boxed()
    }

    fn upsert_all(&self, records: Vec<T>) -> BoxFuture<'_, Result<()>> {
        future::ready(self.upsert_all_sync(&records)).boxed()
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, Result<Option<T>>> {
        future::ready(self.delete_sync(id)).boxed()
    }

    fn toggle_flag(&self, id: &str, flag: T::Flag) -> BoxFuture<'_, Result<Option<T>>> {
        future::ready(self.toggle_flag_sync(id, flag)).boxed()
    }

    fn clear_all(&self) -> BoxFuture<'_, Result<()>> {
        future::ready(self.clear_all_sync()).boxed()
    }

    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> BoxFuture<'_, Result<usize>> {
        future::ready(self.prune_sync(cutoff)).boxed()
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
