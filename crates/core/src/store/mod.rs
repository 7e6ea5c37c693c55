// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local cache abstraction.
//!
//! One [`LocalStore`] instance exists per domain. Writes are last-write-wins
//! upserts keyed by record id; every write bumps a revision counter that
//! observers can subscribe to.
//!
//! ```text
//! ┌──────────────┐  write   ┌──────────────┐  revision  ┌──────────────┐
//! │  sync engine │─────────►│  LocalStore  │───────────►│ observe_query│
//! └──────────────┘          └──────────────┘            └──────────────┘
//! ```

mod memory;
mod selection;
mod sqlite;

pub use memory::MemoryStore;
pub use selection::{FileSelection, MemorySelection, SelectionStore};
pub use sqlite::SqliteStore;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::error::Result;
use crate::record::{Filter, Record};

/// Persistent per-domain cache.
pub trait LocalStore<T: Record, F: Filter<T>>: Send + Sync {
    /// Look up a single record.
    fn get(&self, id: &str) -> BoxFuture<'_, Result<Option<T>>>;

    /// Records matching `filter`, in the filter's display order.
    fn query(&self, filter: &F) -> BoxFuture<'_, Result<Vec<T>>>;

    /// Insert or replace a record keyed by its id.
    fn upsert(&self, record: T) -> BoxFuture<'_, Result<()>>;

    /// Insert or replace a batch of records in one write.
    fn upsert_all(&self, records: Vec<T>) -> BoxFuture<'_, Result<()>>;

    /// Remove a record, returning it if it existed.
    fn delete(&self, id: &str) -> BoxFuture<'_, Result<Option<T>>>;

    /// Flip `flag` on a stored record and mark it stale.
    ///
    /// Returns the updated record, or `None` if `id` is not cached.
    fn toggle_flag(&self, id: &str, flag: T::Flag) -> BoxFuture<'_, Result<Option<T>>>;

    /// Remove every record.
    fn clear_all(&self) -> BoxFuture<'_, Result<()>>;

    /// Remove records last synced before `cutoff`.
    ///
    /// Records that were never synced are kept. Returns the number removed.
    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> BoxFuture<'_, Result<usize>>;

    /// Revision counter, bumped after every write.
    fn subscribe(&self) -> watch::Receiver<u64>;
}

/// Stream of query results, re-evaluated after every store write.
///
/// The current result set is yielded first. Consecutive identical result
/// sets are suppressed. The stream keeps the store alive until dropped.
pub fn observe_query<T, F>(
    store: Arc<dyn LocalStore<T, F>>,
    filter: F,
) -> BoxStream<'static, Result<Vec<T>>>
where
    T: Record,
    F: Filter<T>,
{
    let revisions = WatchStream::new(store.subscribe());
    let seed = (revisions, store, filter, None::<Vec<T>>);

    stream::unfold(seed, |(mut revisions, store, filter, mut last)| async move {
        loop {
            revisions.next().await?;
            match store.query(&filter).await {
                Ok(records) => {
                    if last.as_ref() == Some(&records) {
                        continue;
                    }
                    last = Some(records.clone());
                    return Some((Ok(records), (revisions, store, filter, last)));
                }
                Err(err) => return Some((Err(err), (revisions, store, filter, last))),
            }
        }
    })
    .boxed()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
