// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::common::*;

#[test]
fn pending_on_fresh_state_dir() {
    let sandbox = Sandbox::new();

    sandbox
        .ferryd()
        .args(["cache", "pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending emails"));

    assert!(sandbox.state_dir().join("cache.db").exists());
}

#[test]
fn pending_as_json() {
    let sandbox = Sandbox::new();

    sandbox
        .ferryd()
        .args(["cache", "pending", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn prune_reports_counts() {
    let sandbox = Sandbox::new();

    sandbox
        .ferryd()
        .args(["cache", "prune", "--days", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pruned 0 emails and 0 personas"));
}

#[test]
fn logout_clears_local_data() {
    let sandbox = Sandbox::new();

    sandbox
        .ferryd()
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local data cleared"));

    sandbox
        .ferryd()
        .args(["cache", "pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending emails"));
}
