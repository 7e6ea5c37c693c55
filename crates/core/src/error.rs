// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ferry-core operations.

use thiserror::Error;

use crate::remote::RemoteError;

/// All possible errors that can occur in ferry-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("network failure: {0}\n  hint: the local cache could not be read and the server is unreachable")]
    NetworkFailure(String),

    #[error("not available offline: {0}\n  hint: connect to the network to load this record")]
    NotAvailableOffline(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("store lock poisoned: {0}")]
    Poisoned(&'static str),
}

impl Error {
    /// Human-readable message for foreground callers.
    pub fn user_message(&self) -> String {
        match self {
            Error::NotFound(_) => "The requested content could not be found.".to_string(),
            Error::NetworkFailure(_) => {
                "Unable to load data. Please check your internet connection.".to_string()
            }
            Error::NotAvailableOffline(_) => {
                "This item is not available offline. Please connect and try again.".to_string()
            }
            Error::Remote(err) => err.user_message(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// A specialized Result type for ferry-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
