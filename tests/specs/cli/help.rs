// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::common::*;
use yare::parameterized;

#[parameterized(
    run = { "run" },
    sync = { "sync" },
    cache = { "cache" },
    logout = { "logout" },
)]
fn help_lists_subcommand(name: &str) {
    ferryd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(name));
}

#[test]
fn version_flag_outputs_version() {
    ferryd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ferryd"))
        .stdout(predicate::str::is_match(r"[0-9]+\.[0-9]+\.[0-9]+").unwrap());
}

#[test]
fn missing_subcommand_fails() {
    ferryd().assert().failure();
}
