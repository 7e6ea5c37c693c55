// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by the store tests.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, TimeZone, Utc};

use crate::email::{Email, EmailStatus, EmailType, OutgoingEmail};
use crate::persona::{NewPersona, Persona};
use crate::record::SyncState;

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// A synced incoming email created `secs` after the fixture epoch.
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
