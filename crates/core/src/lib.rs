// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ferry-core: records, stores and remote abstractions for ferry
//!
//! This crate provides the data model (emails, personas), the local cache
//! and remote client traits, and the connectivity probe used by the sync
//! engine in `ferry-sync` and the `ferryd` daemon.

pub mod connectivity;
pub mod email;
pub mod error;
pub mod persona;
pub mod record;
pub mod remote;
pub mod store;

#[cfg(test)]
mod test_helpers;

pub use connectivity::{ConnectivityProbe, ConnectivityStream, SwitchProbe};
pub use email::{
    Attachment, Email, EmailFilter, EmailFlag, EmailStatus, EmailType, Mailbox, OutgoingEmail,
};
pub use error::{Error, Result};
pub use persona::{NewPersona, Persona, PersonaFilter, PersonaFlag, PersonaPatch};
pub use record::{is_local_id, local_id, Domain, Filter, Record, SyncState, LOCAL_ID_PREFIX};
pub use remote::{RemoteClient, RemoteError, RemoteResult};
pub use store::{
    observe_query, FileSelection, LocalStore, MemorySelection, MemoryStore, SelectionStore,
    SqliteStore,
};
