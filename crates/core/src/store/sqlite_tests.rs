// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::email::{Email, EmailFilter, EmailFlag};
use crate::persona::{Persona, PersonaFilter, PersonaFlag};
use crate::record::SyncState;
use crate::test_helpers::{at, inbox_email, persona};
use tempfile::TempDir;

fn email_store() -> SqliteStore<Email, EmailFilter> {
    SqliteStore::open_in_memory().unwrap()
}

#[tokio::test]
async fn upsert_and_get() {
    let store = email_store();
    let email = inbox_email("e1", "hello", 0);
    store.upsert(email.clone()).await.unwrap();

    assert_eq!(store.get("e1").await.unwrap(), Some(email));
    assert!(store.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_all_then_query_in_order() {
    let store = email_store();
    store
        .upsert_all(vec![
            inbox_email("a", "a", 0),
            inbox_email("c", "c", 20),
            inbox_email("b", "b", 10),
        ])
        .await
        .unwrap();

    let ids: Vec<String> = store
        .query(&EmailFilter::inbox())
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
}

#[tokio::test]
async fn toggle_flag_persists() {
    let store = email_store();
    store.upsert(inbox_email("e1", "x", 0)).await.unwrap();
    store.toggle_flag("e1", EmailFlag::Starred).await.unwrap();

    let email = store.get("e1").await.unwrap().unwrap();
    assert!(email.starred);
    assert_eq!(email.sync_state, SyncState::Stale);

    let starred = store.query(&EmailFilter::starred()).await.unwrap();
    assert_eq!(starred.len(), 1);
}

#[tokio::test]
async fn prune_removes_only_stale_synced_rows() {
    let store = email_store();
    let mut local = inbox_email("local_1_0001", "x", 0);
    local.last_synced_at = None;
    store
        .upsert_all(vec![inbox_email("old", "x", 0), inbox_email("new", "x", 100), local])
        .await
        .unwrap();

    assert_eq!(store.prune_older_than(at(50)).await.unwrap(), 1);
    let remaining = store.query(&EmailFilter::inbox()).await.unwrap();
    assert_eq!(remaining.len(), 2);
}

#[tokio::test]
async fn delete_and_clear() {
    let store = email_store();
    store
        .upsert_all(vec![inbox_email("a", "a", 0), inbox_email("b", "b", 0)])
        .await
        .unwrap();

    assert!(store.delete("a").await.unwrap().is_some());
    assert!(store.delete("a").await.unwrap().is_none());
    store.clear_all().await.unwrap();
    assert!(store.query(&EmailFilter::inbox()).await.unwrap().is_empty());
}

#[tokio::test]
async fn personas_use_their_own_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache").join("ferry.db");

    let emails: SqliteStore<Email, EmailFilter> = SqliteStore::open(&path).unwrap();
    let personas: SqliteStore<Persona, PersonaFilter> = SqliteStore::open(&path).unwrap();

    emails.upsert(inbox_email("x", "x", 0)).await.unwrap();
    personas.upsert(persona("x", "Work")).await.unwrap();
    personas.toggle_flag("x", PersonaFlag::Trashed).await.unwrap();

    assert_eq!(emails.query(&EmailFilter::inbox()).await.unwrap().len(), 1);
    assert!(personas.query(&PersonaFilter::default()).await.unwrap().is_empty());
    assert_eq!(personas.query(&PersonaFilter::trashed()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ferry.db");
    {
        let store: SqliteStore<Email, EmailFilter> = SqliteStore::open(&path).unwrap();
        store.upsert(inbox_email("e1", "kept", 0)).await.unwrap();
    }

    let store: SqliteStore<Email, EmailFilter> = SqliteStore::open(&path).unwrap();
    let email = store.get("e1").await.unwrap().unwrap();
    assert_eq!(email.subject.as_deref(), Some("kept"));
}

#[tokio::test]
async fn corrupted_payload_is_reported() {
    let store = email_store();
    store
        .conn()
        .unwrap()
        .execute(
            "INSERT INTO emails (id, payload, sync_state, stored_at) VALUES ('bad', '{', 'synced', 0)",
            [],
        )
        .unwrap();

    let err = store.get("bad").await.unwrap_err();
    assert!(matches!(err, Error::CorruptedData(_)));
}
