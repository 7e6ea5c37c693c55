// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::common::*;

#[test]
fn sync_without_server_reports_every_target() {
    let sandbox = Sandbox::new();

    sandbox
        .ferryd()
        .args(["sync", "--domain", "email"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("email: 0 records"))
        .stdout(predicate::str::contains("emails/inbox"))
        .stdout(predicate::str::contains("emails/starred"))
        .stderr(predicate::str::contains("error: email sync failed"))
        .stderr(predicate::str::contains("check your internet connection"));
}

#[test]
fn sync_both_domains_by_default() {
    let sandbox = Sandbox::new();

    sandbox
        .ferryd()
        .arg("sync")
        .assert()
        .failure()
        .stdout(predicate::str::contains("email:"))
        .stdout(predicate::str::contains("persona:"));
}

#[test]
fn sync_json_output() {
    let sandbox = Sandbox::new();

    let output = sandbox
        .ferryd()
        .args(["sync", "--domain", "persona", "-o", "json"])
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(report["domain"], "persona");
    assert_eq!(report["failed"], true);
    assert_eq!(report["targets"][0]["target"], "personas");
}
