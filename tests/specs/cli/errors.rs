// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::fs;

use super::common::*;

#[test]
fn invalid_config_is_reported() {
    let sandbox = Sandbox::new();
    fs::write(
        sandbox.config_path(),
        "[remote]\nbase_url = \"ftp://example.com/\"\n",
    )
    .unwrap();

    sandbox
        .ferryd()
        .args(["cache", "pending"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: "))
        .stderr(predicate::str::contains("config error"));
}

#[test]
fn malformed_config_names_the_file() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.config_path(), "[remote\n").unwrap();

    sandbox
        .ferryd()
        .arg("logout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.toml"));
}

#[test]
fn unknown_strategy_is_rejected() {
    let sandbox = Sandbox::new();

    sandbox
        .ferryd()
        .args(["run", "--strategy", "hourly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hourly"));
}
