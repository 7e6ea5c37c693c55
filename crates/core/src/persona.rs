// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persona records.
//!
//! Personas are soft-deleted: a trashed persona keeps its row with
//! `deleted_at` set until it is restored or force-deleted.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{contains_ci, Domain, Filter, Record, SyncState};

/// Flags that can be toggled on a persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaFlag {
    /// Soft-deleted; maps onto `deleted_at`.
    Trashed,
}

/// A sending identity owned by the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sync_state: SyncState,
    #[serde(default)]
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Fields for a persona created on this device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPersona {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonaPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl PersonaPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.image_url.is_none()
            && self.bio.is_none()
    }
}

impl Persona {
    pub fn new(fields: NewPersona, now: DateTime<Utc>) -> Self {
        Persona {
            id: String::new(),
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            image_url: fields.image_url,
            bio: fields.bio,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            sync_state: SyncState::LocalOnly,
            last_synced_at: None,
        }
    }

    /// Apply `patch` and bump `updated_at`.
    pub fn apply(&mut self, patch: PersonaPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if patch.phone.is_some() {
            self.phone = patch.phone;
        }
        if patch.image_url.is_some() {
            self.image_url = patch.image_url;
        }
        if patch.bio.is_some() {
            self.bio = patch.bio;
        }
        self.updated_at = now;
    }

    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Record for Persona {
    type Flag = PersonaFlag;

    const DOMAIN: Domain = Domain::Persona;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn sync_state(&self) -> SyncState {
        self.sync_state
    }

    fn set_sync_state(&mut self, state: SyncState) {
        self.sync_state = state;
    }

    fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    fn set_last_synced_at(&mut self, at: Option<DateTime<Utc>>) {
        self.last_synced_at = at;
    }

    fn flag(&self, flag: PersonaFlag) -> bool {
        match flag {
            PersonaFlag::Trashed => self.is_trashed(),
        }
    }

    fn set_flag(&mut self, flag: PersonaFlag, value: bool) {
        match flag {
            PersonaFlag::Trashed => {
                if value {
                    if self.deleted_at.is_none() {
                        self.deleted_at = Some(Utc::now());
                    }
                } else {
                    self.deleted_at = None;
                }
            }
        }
    }
}

/// Query over cached or remote personas.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaFilter {
    pub search: Option<String>,
    pub with_trashed: bool,
    pub trashed_only: bool,
    pub page: u32,
    pub per_page: u32,
}

impl Default for PersonaFilter {
    fn default() -> Self {
        PersonaFilter {
            search: None,
            with_trashed: false,
            trashed_only: false,
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

impl PersonaFilter {
    pub const DEFAULT_PER_PAGE: u32 = 15;

    /// Only soft-deleted personas.
    pub fn trashed() -> Self {
        PersonaFilter {
            trashed_only: true,
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn including_trashed(mut self) -> Self {
        self.with_trashed = true;
        self
    }

    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.max(1);
        self
    }
}

impl Filter<Persona> for PersonaFilter {
    fn matches(&self, persona: &Persona) -> bool {
        if self.trashed_only {
            if !persona.is_trashed() {
                return false;
            }
        } else if !self.with_trashed && persona.is_trashed() {
            return false;
        }

        match &self.search {
            Some(search) => {
                contains_ci(Some(&persona.name), search)
                    || contains_ci(Some(&persona.email), search)
            }
            None => true,
        }
    }

    fn compare(&self, a: &Persona, b: &Persona) -> Ordering {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
#[path = "persona_tests.rs"]
mod tests;
