// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote authority abstraction and the error taxonomy it reports.
//!
//! Every transport failure is classified exactly once, at this boundary,
//! into a [`RemoteError`]. Callers above the boundary never see raw
//! transport or HTTP errors.

use futures_util::future::BoxFuture;
use serde::Deserialize;
use thiserror::Error;

use crate::record::Record;

/// Classified failure reported by a [`RemoteClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    #[error("server error: {0}")]
    ServerError(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("{0}")]
    Unknown(String),
}

/// Result type for remote operations.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Error body returned by the server, when it sends one.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

impl RemoteError {
    /// Classify an HTTP status code and optional response body.
    pub fn from_status(status: u16, body: Option<&str>) -> Self {
        let parsed = body.and_then(|b| serde_json::from_str::<ErrorBody>(b).ok());
        let (message, details) = match parsed {
            Some(ErrorBody { message, errors }) => (message, errors),
            None => (None, Vec::new()),
        };
        let message = message.unwrap_or_else(|| default_message(status).to_string());

        match status {
            401 => RemoteError::Unauthorized(message),
            403 => RemoteError::Forbidden(message),
            404 => RemoteError::NotFound(message),
            422 => RemoteError::Validation { message, details },
            500 => RemoteError::ServerError(message),
            503 => RemoteError::ServiceUnavailable(message),
            _ => RemoteError::Unknown(format!("HTTP {status}: {message}")),
        }
    }

    /// Short machine-readable name of the error kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteError::Unauthorized(_) => "unauthorized",
            RemoteError::Forbidden(_) => "forbidden",
            RemoteError::NotFound(_) => "not_found",
            RemoteError::Validation { .. } => "validation",
            RemoteError::ServerError(_) => "server_error",
            RemoteError::ServiceUnavailable(_) => "service_unavailable",
            RemoteError::NetworkUnreachable(_) => "network_unreachable",
            RemoteError::Unknown(_) => "unknown",
        }
    }

    /// Human-readable message suitable for a foreground caller.
    pub fn user_message(&self) -> String {
        match self {
            RemoteError::Unauthorized(_) => {
                "Your session has expired. Please log in again.".to_string()
            }
            RemoteError::Forbidden(_) => {
                "You don't have permission to access this content.".to_string()
            }
            RemoteError::NotFound(_) => "The requested content could not be found.".to_string(),
            RemoteError::Validation { message, details } => {
                if details.is_empty() {
                    message.clone()
                } else {
                    let lines: Vec<String> = details.iter().map(|d| format!("• {d}")).collect();
                    format!("Validation errors:\n{}", lines.join("\n"))
                }
            }
            RemoteError::ServerError(_) => {
                "Server error. Our team has been notified. Please try again later.".to_string()
            }
            RemoteError::ServiceUnavailable(_) => {
                "Service is temporarily unavailable. Please try again in a few minutes."
                    .to_string()
            }
            RemoteError::NetworkUnreachable(message) => message.clone(),
            RemoteError::Unknown(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}

fn default_message(status: u16) -> &'static str {
    match status {
        401 => "Authentication required. Please log in again.",
        403 => "Access forbidden. You don't have permission to perform this action.",
        404 => "The requested resource was not found.",
        422 => "Invalid data provided. Please check your input and try again.",
        500 => "Server error occurred. Please try again later.",
        503 => "Service temporarily unavailable. Please try again later.",
        _ => "An error occurred. Please try again.",
    }
}

/// Network API for one domain.
///
/// Implementations are stateless and shared across tasks. `delete` and
/// `toggle_flag` may return `None` when the server acknowledges the change
/// without sending the record back.
pub trait RemoteClient<T: Record, F>: Send + Sync {
    /// Fetch the records selected by `filter`.
    fn fetch(&self, filter: &F) -> BoxFuture<'_, RemoteResult<Vec<T>>>;

    /// Fetch a single record by id.
    fn fetch_one(&self, id: &str) -> BoxFuture<'_, RemoteResult<T>>;

    /// Create a record. The server response carries the server-issued id.
    fn create(&self, record: T) -> BoxFuture<'_, RemoteResult<T>>;

    /// Replace the record stored under `id`.
    fn update(&self, id: &str, record: T) -> BoxFuture<'_, RemoteResult<T>>;

    /// Delete the record stored under `id`.
    fn delete(&self, id: &str) -> BoxFuture<'_, RemoteResult<Option<T>>>;

    /// Propagate a flag change. `enabled` is the value after the local toggle.
    fn toggle_flag(
        &self,
        id: &str,
        flag: T::Flag,
        enabled: bool,
    ) -> BoxFuture<'_, RemoteResult<Option<T>>>;
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
