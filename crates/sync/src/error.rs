// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ferry-sync.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid work key: '{0}'\n  hint: keys look like sync:email, sync:persona:once or sync:email:now")]
    InvalidWorkKey(String),

    #[error(
        "invalid sync strategy: '{0}'\n  hint: valid strategies are: periodic, backup_timer, combined, chained"
    )]
    InvalidStrategy(String),

    #[error(transparent)]
    Core(#[from] ferry_core::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
