// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test files,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::fs;
use std::net::TcpListener;
use std::path::PathBuf;

use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// A scratch state dir plus a config file pointing at an API nobody serves.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let port = closed_port();
        fs::write(
            dir.path().join("config.toml"),
            format!(
                "[remote]\nbase_url = \"http://127.0.0.1:{port}/api/\"\n\n[probe]\ntimeout_ms = 200\n"
            ),
        )
        .unwrap();
        Sandbox { dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    /// `ferryd` bound to this sandbox's config and state dir.
    pub fn ferryd(&self) -> Command {
        let mut cmd = ferryd();
        cmd.arg("--config")
            .arg(self.config_path())
            .arg("--state-dir")
            .arg(self.state_dir());
        cmd
    }
}

pub fn ferryd() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("ferryd").unwrap();
    cmd.env_remove("FERRY_CONFIG")
        .env_remove("FERRY_STATE_DIR")
        .env_remove("FERRY_API_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// A local port with no listener behind it.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
