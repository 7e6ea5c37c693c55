// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local data wipe on logout.

use ferry_core::{Email, EmailFilter, LocalStore, Persona, PersonaFilter, Result, SelectionStore};

/// Clear every domain store and the current-persona selection.
///
/// Scheduled jobs are left alone; cancel them through the coordinator.
pub async fn wipe_local_data(
    emails: &dyn LocalStore<Email, EmailFilter>,
    personas: &dyn LocalStore<Persona, PersonaFilter>,
    selection: &dyn SelectionStore,
) -> Result<()> {
    emails.clear_all().await?;
    personas.clear_all().await?;
    selection.clear().await?;
    tracing::info!("local data wiped");
    Ok(())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
