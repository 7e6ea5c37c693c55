// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store, used in tests and for ephemeral sessions.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use futures_util::future::{self, BoxFuture, FutureExt};
use tokio::sync::watch;

use super::LocalStore;
use crate::error::{Error, Result};
use crate::record::{Filter, Record};

pub struct MemoryStore<T, F> {
    records: RwLock<HashMap<String, T>>,
    revision: watch::Sender<u64>,
    _filter: PhantomData<fn() -> F>,
}

impl<T: Record, F: Filter<T>> Default for MemoryStore<T, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record, F: Filter<T>> MemoryStore<T, F> {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        MemoryStore {
            records: RwLock::new(HashMap::new()),
            revision,
            _filter: PhantomData,
        }
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<R>(&self, f: impl FnOnce(&HashMap<String, T>) -> R) -> Result<R> {
        let guard = self
            .records
            .read()
            .map_err(|_| Error::Poisoned("memory store"))?;
        Ok(f(&guard))
    }

    fn write<R>(&self, f: impl FnOnce(&mut HashMap<String, T>) -> R) -> Result<R> {
        let result = {
            let mut guard = self
                .records
                .write()
                .map_err(|_| Error::Poisoned("memory store"))?;
            f(&mut guard)
        };
        self.revision.send_modify(|rev| *rev += 1);
        Ok(result)
    }
}

impl<T: Record, F: Filter<T>> LocalStore<T, F> for MemoryStore<T, F> {
    fn get(&self, id: &str) -> BoxFuture<'_, Result<Option<T>>> {
        future::ready(self.read(|records| records.get(id).cloned())).boxed()
    }

    fn query(&self, filter: &F) -> BoxFuture<'_, Result<Vec<T>>> {
        let result = self.read(|records| filter.apply(records.values().cloned()));
        future::ready(result).boxed()
    }

    fn upsert(&self, record: T) -> BoxFuture<'_, Result<()>> {
        let result = self.write(|records| {
            records.insert(record.id().to_string(), record);
        });
        future::ready(result).boxed()
    }

    fn upsert_all(&self, batch: Vec<T>) -> BoxFuture<'_, Result<()>> {
        let result = self.write(|records| {
            for record in batch {
                records.insert(record.id().to_string(), record);
            }
        });
        future::ready(result).boxed()
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, Result<Option<T>>> {
        future::ready(self.write(|records| records.remove(id))).boxed()
    }

    fn toggle_flag(&self, id: &str, flag: T::Flag) -> BoxFuture<'_, Result<Option<T>>> {
        let result = self.write(|records| {
            records.get_mut(id).map(|record| {
                record.toggle_flag(flag);
                record.mark_stale();
                record.clone()
            })
        });
        future::ready(result).boxed()
    }

    fn clear_all(&self) -> BoxFuture<'_, Result<()>> {
        future::ready(self.write(|records| records.clear())).boxed()
    }

    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> BoxFuture<'_, Result<usize>> {
        let result = self.write(|records| {
            let before = records.len();
            records.retain(|_, r| !r.last_synced_at().is_some_and(|at| at < cutoff));
            before - records.len()
        });
        future::ready(result).boxed()
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
