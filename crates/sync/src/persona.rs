// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Persona operations and the current-persona selection.

use std::sync::Arc;

use chrono::Utc;

use ferry_core::{
    Error, NewPersona, Persona, PersonaFilter, PersonaFlag, PersonaPatch, Result, SelectionStore,
};

use crate::engine::{DomainSyncEngine, Mutation};
use crate::refresh::{outcome_of, RefreshReport, RefreshTarget};

pub type PersonaEngine = DomainSyncEngine<Persona, PersonaFilter>;

#[derive(Clone)]
pub struct PersonaSync {
    engine: PersonaEngine,
    selection: Arc<dyn SelectionStore>,
}

impl PersonaSync {
    pub fn new(engine: PersonaEngine, selection: Arc<dyn SelectionStore>) -> Self {
        PersonaSync { engine, selection }
    }

    pub fn engine(&self) -> &PersonaEngine {
        &self.engine
    }

    pub async fn list(&self, filter: &PersonaFilter) -> Result<Vec<Persona>> {
        self.engine.fetch(filter).await
    }

    /// Soft-deleted personas.
    pub async fn trashed(&self, mut filter: PersonaFilter) -> Result<Vec<Persona>> {
        filter.trashed_only = true;
        self.engine.fetch(&filter).await
    }

    pub async fn persona(&self, id: &str) -> Result<Persona> {
        self.engine.fetch_one(id).await
    }

    pub async fn create(&self, fields: NewPersona) -> Result<Persona> {
        self.engine
            .mutate(Mutation::Create {
                record: Persona::new(fields, Utc::now()),
                draft: false,
            })
            .await
    }

    pub async fn update(&self, id: &str, patch: PersonaPatch) -> Result<Persona> {
        let mut persona = self.require(id).await?;
        if patch.is_empty() {
            return Ok(persona);
        }
        persona.apply(patch, Utc::now());
        self.engine
            .mutate(Mutation::Update {
                id: id.to_string(),
                record: persona,
            })
            .await
    }

    /// Move a persona to the trash.
    pub async fn delete(&self, id: &str) -> Result<Persona> {
        self.set_trashed(id, true).await
    }

    /// Bring a trashed persona back. Restoring a live persona is a no-op.
    pub async fn restore(&self, id: &str) -> Result<Persona> {
        self.set_trashed(id, false).await
    }

    /// Remove a persona for good.
    pub async fn force_delete(&self, id: &str) -> Result<Persona> {
        let removed = self
            .engine
            .mutate(Mutation::Delete { id: id.to_string() })
            .await?;
        if self.selection.get().await?.as_deref() == Some(id) {
            self.selection.clear().await?;
        }
        Ok(removed)
    }

    async fn set_trashed(&self, id: &str, trashed: bool) -> Result<Persona> {
        let persona = self.require(id).await?;
        if persona.is_trashed() == trashed {
            return Ok(persona);
        }
        self.engine
            .mutate(Mutation::ToggleFlag {
                id: id.to_string(),
                flag: PersonaFlag::Trashed,
            })
            .await
    }

    async fn require(&self, id: &str) -> Result<Persona> {
        self.engine
            .cached(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("persona {id}")))
    }

    /// The selected persona, if it still exists.
    ///
    /// A selection pointing at a persona the server no longer knows is
    /// cleared. When the persona simply cannot be loaded offline the
    /// selection is kept.
    pub async fn current(&self) -> Result<Option<Persona>> {
        let Some(id) = self.selection.get().await? else {
            return Ok(None);
        };

        match self.engine.fetch_one(&id).await {
            Ok(persona) => Ok(Some(persona)),
            Err(Error::NotFound(_)) => {
                tracing::info!(id = %id, "selected persona no longer exists, clearing selection");
                self.selection.clear().await?;
                Ok(None)
            }
            Err(Error::NotAvailableOffline(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn set_current(&self, id: &str) -> Result<()> {
        self.selection.set(id.to_string()).await
    }

    pub async fn clear_current(&self) -> Result<()> {
        self.selection.clear().await
    }

    /// Refresh the full persona list.
    pub async fn refresh_all(&self) -> RefreshReport {
        let mut report = RefreshReport::new(ferry_core::Domain::Persona);
        let fetched = self
            .engine
            .fetch_with_source(&PersonaFilter::default())
            .await;
        report.push(outcome_of(RefreshTarget::Personas, fetched));
        report
    }
}

#[cfg(test)]
#[path = "persona_tests.rs"]
mod tests;
