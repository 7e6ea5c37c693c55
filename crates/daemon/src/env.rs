// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable access for the daemon.
//!
//! Variable names are generated by `build.rs` into [`names`].

use std::path::PathBuf;

pub mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

/// Returns the value of `FERRY_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var(names::FERRY_STATE_DIR).ok().map(PathBuf::from)
}

/// Returns the value of `FERRY_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    std::env::var(names::FERRY_CONFIG).ok().map(PathBuf::from)
}

/// Returns `FERRY_API_TOKEN` if set and non-blank.
pub fn api_token() -> Option<String> {
    std::env::var(names::FERRY_API_TOKEN)
        .ok()
        .filter(|token| !token.trim().is_empty())
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    std::env::var(names::XDG_STATE_HOME).ok().map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
