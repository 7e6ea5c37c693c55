// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("another ferryd instance is already running\n  hint: stop it or use a different --state-dir")]
    AlreadyRunning,

    #[error("{domain} sync failed: {cause}")]
    SyncFailed {
        domain: ferry_core::Domain,
        cause: ferry_core::Error,
    },

    #[error(transparent)]
    Core(#[from] ferry_core::Error),

    #[error(transparent)]
    Sync(#[from] ferry_sync::SyncError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Text shown to the person at the terminal. Errors coming from the
    /// cache or the server are rephrased; local setup errors keep their
    /// hints.
    pub fn user_message(&self) -> String {
        match self {
            Error::SyncFailed { domain, cause } => {
                format!("{domain} sync failed: {}", cause.user_message())
            }
            Error::Core(err) | Error::Sync(ferry_sync::SyncError::Core(err)) => err.user_message(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
