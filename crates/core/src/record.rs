// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record abstraction shared by every synchronized domain.
//!
//! A record carries its reconciliation state explicitly as a [`SyncState`]
//! instead of deriving it from the shape of its identifier. Locally created
//! records still receive an id with the [`LOCAL_ID_PREFIX`] so that ids
//! never collide with server-issued ones.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Reserved prefix for ids generated on this device.
pub const LOCAL_ID_PREFIX: &str = "local_";

static LOCAL_ID_SEQ: AtomicU32 = AtomicU32::new(0);

/// Generate a fresh local identifier: `local_<epoch-ms>_<seq>`.
pub fn local_id() -> String {
    let seq = LOCAL_ID_SEQ.fetch_add(1, AtomicOrdering::Relaxed) % 10_000;
    format!(
        "{}{}_{:04}",
        LOCAL_ID_PREFIX,
        Utc::now().timestamp_millis(),
        seq
    )
}

/// Returns true if `id` was generated on this device.
pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

/// Reconciliation state of a cached record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Created locally and never acknowledged by the server.
    LocalOnly,
    /// Mirrors the last value received from the server.
    #[default]
    Synced,
    /// Mutated locally after the last server acknowledgement.
    Stale,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::LocalOnly => "local_only",
            SyncState::Synced => "synced",
            SyncState::Stale => "stale",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bounded data category with its own store and remote pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Email,
    Persona,
}

impl Domain {
    /// Every domain, in refresh order.
    pub const ALL: [Domain; 2] = [Domain::Email, Domain::Persona];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Email => "email",
            Domain::Persona => "persona",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" | "emails" => Ok(Domain::Email),
            "persona" | "personas" => Ok(Domain::Persona),
            _ => Err(format!("unknown domain '{s}': expected email or persona")),
        }
    }
}

/// A value cached locally and reconciled against a remote authority.
pub trait Record:
    Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Boolean attributes that can be flipped in place.
    type Flag: Copy + fmt::Debug + Send + Sync + 'static;

    /// The domain this record belongs to.
    const DOMAIN: Domain;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    fn sync_state(&self) -> SyncState;
    fn set_sync_state(&mut self, state: SyncState);

    fn last_synced_at(&self) -> Option<DateTime<Utc>>;
    fn set_last_synced_at(&mut self, at: Option<DateTime<Utc>>);

    /// Current value of `flag`.
    fn flag(&self, flag: Self::Flag) -> bool;

    /// Set `flag` to `value`.
    fn set_flag(&mut self, flag: Self::Flag, value: bool);

    /// Flip `flag` and return its new value.
    fn toggle_flag(&mut self, flag: Self::Flag) -> bool {
        let value = !self.flag(flag);
        self.set_flag(flag, value);
        value
    }

    /// Mark the record as mirroring the server as of `at`.
    fn mark_synced(&mut self, at: DateTime<Utc>) {
        self.set_sync_state(SyncState::Synced);
        self.set_last_synced_at(Some(at));
    }

    /// Record a local mutation. Records the server has never seen stay
    /// `LocalOnly`.
    fn mark_stale(&mut self) {
        if self.sync_state() == SyncState::Synced {
            self.set_sync_state(SyncState::Stale);
        }
    }
}

/// Selection and ordering of records for local queries.
///
/// The same filter value is handed to the remote client, which maps it to
/// its own query parameters.
pub trait Filter<T>: Clone + fmt::Debug + Send + Sync + 'static {
    /// Returns true if `record` belongs to the result set.
    fn matches(&self, record: &T) -> bool;

    /// Display order of the result set.
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Apply the filter to an arbitrary record set.
    fn apply(&self, records: impl IntoIterator<Item = T>) -> Vec<T>
    where
        Self: Sized,
    {
        let mut selected: Vec<T> = records.into_iter().filter(|r| self.matches(r)).collect();
        selected.sort_by(|a, b| self.compare(a, b));
        selected
    }
}

/// Case-insensitive substring match used by the search filters.
pub(crate) fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
