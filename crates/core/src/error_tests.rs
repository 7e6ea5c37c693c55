// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    not_found = { Error::NotFound("e1".into()), "e1" },
    network_failure = { Error::NetworkFailure("inbox".into()), "network failure" },
    offline = { Error::NotAvailableOffline("e9".into()), "not available offline" },
    poisoned = { Error::Poisoned("emails"), "poisoned" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_from_remote() {
    let err: Error = RemoteError::ServerError("boom".into()).into();
    assert!(matches!(err, Error::Remote(RemoteError::ServerError(_))));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn user_message_delegates_to_remote_kind() {
    let err = Error::Remote(RemoteError::Unauthorized("expired".into()));
    assert_eq!(
        err.user_message(),
        "Your session has expired. Please log in again."
    );
}

#[test]
fn user_message_for_offline_miss() {
    let err = Error::NotAvailableOffline("e1".into());
    assert!(err.user_message().contains("not available offline"));
}
