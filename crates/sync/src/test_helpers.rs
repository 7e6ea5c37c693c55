// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for sync tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use futures_util::future::{self, BoxFuture, FutureExt};
use tokio::sync::{watch, Notify};

use ferry_core::{
    Domain, Email, EmailFilter, EmailStatus, EmailType, Error, Filter, LocalStore, MemoryStore,
    NewPersona, OutgoingEmail, Persona, PersonaFilter, Record, RemoteClient, RemoteError,
    RemoteResult, Result, SwitchProbe, SyncState,
};

use crate::engine::DomainSyncEngine;
use crate::refresh::{Refresh, RefreshReport, RefreshTarget, TargetOutcome};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// A synced incoming email.
pub fn inbox_email(id: &str, subject: &str, secs: i64) -> Email {
    let mut email = Email::outgoing(
        OutgoingEmail {
            subject: subject.to_string(),
            ..OutgoingEmail::default()
        },
        false,
        at(secs),
    );
    email.id = id.to_string();
    email.email_type = EmailType::Incoming;
    email.status = EmailStatus::Delivered;
    email.read = false;
    email.sync_state = SyncState::Synced;
    email.last_synced_at = Some(at(secs));
    email
}

pub fn persona(id: &str, name: &str) -> Persona {
    let mut p = Persona::new(
        NewPersona {
            name: name.to_string(),
            email: format!("{id}@example.com"),
            ..NewPersona::default()
        },
        at(0),
    );
    p.id = id.to_string();
    p.sync_state = SyncState::Synced;
    p.last_synced_at = Some(at(0));
    p
}

/// Scriptable remote that records every call.
pub struct MockRemote<T> {
    records: Mutex<Vec<T>>,
    failure: Mutex<Option<RemoteError>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

impl<T: Record> MockRemote<T> {
    pub fn new() -> Self {
        MockRemote {
            records: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn with_records(records: Vec<T>) -> Self {
        let remote = Self::new();
        *remote.records.lock().unwrap() = records;
        remote
    }

    /// Make every subsequent call fail with `err`.
    pub fn fail_with(&self, err: RemoteError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: impl Into<String>) -> RemoteResult<()> {
        self.calls.lock().unwrap().push(call.into());
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<T: Record, F: Filter<T>> RemoteClient<T, F> for MockRemote<T> {
    fn fetch(&self, filter: &F) -> BoxFuture<'_, RemoteResult<Vec<T>>> {
        let result = self
            .record("fetch")
            .map(|_| filter.apply(self.records.lock().unwrap().clone()));
        future::ready(result).boxed()
    }

    fn fetch_one(&self, id: &str) -> BoxFuture<'_, RemoteResult<T>> {
        let result = self.record(format!("fetch_one:{id}")).and_then(|_| {
            self.records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id() == id)
                .cloned()
                .ok_or_else(|| RemoteError::NotFound(format!("{id} not found")))
        });
        future::ready(result).boxed()
    }

    fn create(&self, mut record: T) -> BoxFuture<'_, RemoteResult<T>> {
        let result = self.record("create").map(|_| {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            record.set_id(format!("srv-{n}"));
            self.records.lock().unwrap().push(record.clone());
            record
        });
        future::ready(result).boxed()
    }

    fn update(&self, id: &str, record: T) -> BoxFuture<'_, RemoteResult<T>> {
        let result = self.record(format!("update:{id}")).map(|_| record);
        future::ready(result).boxed()
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, RemoteResult<Option<T>>> {
        let result = self.record(format!("delete:{id}")).map(|_| {
            self.records.lock().unwrap().retain(|r| r.id() != id);
            None
        });
        future::ready(result).boxed()
    }

    fn toggle_flag(
        &self,
        id: &str,
        flag: T::Flag,
        enabled: bool,
    ) -> BoxFuture<'_, RemoteResult<Option<T>>> {
        let result = self
            .record(format!("toggle_flag:{id}:{flag:?}:{enabled}"))
            .map(|_| None);
        future::ready(result).boxed()
    }
}

/// Memory store whose reads can be made to fail.
pub struct FlakyStore<T: Record, F: Filter<T>> {
    inner: MemoryStore<T, F>,
    fail_reads: AtomicBool,
}

impl<T: Record, F: Filter<T>> FlakyStore<T, F> {
    pub fn new() -> Self {
        FlakyStore {
            inner: MemoryStore::new(),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(Error::CorruptedData("read failure".into()))
        } else {
            Ok(())
        }
    }
}

impl<T: Record, F: Filter<T>> LocalStore<T, F> for FlakyStore<T, F> {
    fn get(&self, id: &str) -> BoxFuture<'_, Result<Option<T>>> {
        match self.check() {
            Ok(()) => self.inner.get(id),
            Err(err) => future::ready(Err(err)).boxed(),
        }
    }

    fn query(&self, filter: &F) -> BoxFuture<'_, Result<Vec<T>>> {
        match self.check() {
            Ok(()) => self.inner.query(filter),
            Err(err) => future::ready(Err(err)).boxed(),
        }
    }

    fn upsert(&self, record: T) -> BoxFuture<'_, Result<()>> {
        self.inner.upsert(record)
    }

    fn upsert_all(&self, records: Vec<T>) -> BoxFuture<'_, Result<()>> {
        self.inner.upsert_all(records)
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, Result<Option<T>>> {
        self.inner.delete(id)
    }

    fn toggle_flag(&self, id: &str, flag: T::Flag) -> BoxFuture<'_, Result<Option<T>>> {
        self.inner.toggle_flag(id, flag)
    }

    fn clear_all(&self) -> BoxFuture<'_, Result<()>> {
        self.inner.clear_all()
    }

    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> BoxFuture<'_, Result<usize>> {
        self.inner.prune_older_than(cutoff)
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.subscribe()
    }
}

/// Engine wired to in-memory collaborators.
pub struct Harness<T: Record, F: Filter<T>> {
    pub store: Arc<FlakyStore<T, F>>,
    pub remote: Arc<MockRemote<T>>,
    pub probe: Arc<SwitchProbe>,
    pub engine: DomainSyncEngine<T, F>,
}

impl<T: Record, F: Filter<T>> Harness<T, F> {
    pub fn new(online: bool) -> Self {
        Self::with_remote(online, MockRemote::new())
    }

    pub fn with_remote(online: bool, remote: MockRemote<T>) -> Self {
        let store = Arc::new(FlakyStore::new());
        let remote = Arc::new(remote);
        let probe = Arc::new(SwitchProbe::new(online));
        let engine = DomainSyncEngine::new(store.clone(), remote.clone(), probe.clone());
        Harness {
            store,
            remote,
            probe,
            engine,
        }
    }
}

pub type EmailHarness = Harness<Email, EmailFilter>;
pub type PersonaHarness = Harness<Persona, PersonaFilter>;

/// Refresher that counts runs and fails on demand.
#[derive(Default)]
pub struct CountingRefresher {
    started: Mutex<Vec<Domain>>,
    completed: AtomicUsize,
    failures: Mutex<VecDeque<bool>>,
    always_fail: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl CountingRefresher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the next runs according to `script` (true = fail).
    pub fn script(&self, script: &[bool]) {
        self.failures.lock().unwrap().extend(script.iter().copied());
    }

    pub fn always_fail(&self, fail: bool) {
        self.always_fail.store(fail, Ordering::SeqCst);
    }

    /// Block every run until `gate` is notified.
    pub fn gate(&self, gate: Arc<Notify>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub fn runs(&self, domain: Domain) -> usize {
        self.started
            .lock()
            .unwrap()
            .iter()
            .filter(|d| **d == domain)
            .count()
    }

    pub fn total_runs(&self) -> usize {
        self.started.lock().unwrap().len()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl Refresh for CountingRefresher {
    fn refresh_all(&self, domain: Domain) -> BoxFuture<'_, RefreshReport> {
        Box::pin(async move {
            self.started.lock().unwrap().push(domain);
            let gate = self.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            let fail = self.always_fail.load(Ordering::SeqCst)
                || self.failures.lock().unwrap().pop_front().unwrap_or(false);
            let mut report = RefreshReport::new(domain);
            let target = RefreshTarget::Personas;
            report.push(if fail {
                TargetOutcome::failed(target, "scripted failure")
            } else {
                TargetOutcome::ok(target, 1)
            });
            self.completed.fetch_add(1, Ordering::SeqCst);
            report
        })
    }
}
