// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Full-domain refresh used by background jobs.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use ferry_core::{Domain, Mailbox, RemoteError};

use crate::email::EmailSync;
use crate::engine::{Fetched, Source};
use crate::persona::PersonaSync;

/// One sub-fetch of a domain refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTarget {
    Mailbox(Mailbox),
    Personas,
}

impl fmt::Display for RefreshTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshTarget::Mailbox(mailbox) => write!(f, "emails/{mailbox}"),
            RefreshTarget::Personas => write!(f, "personas"),
        }
    }
}

/// Outcome of one sub-fetch: record count on success, reason on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetOutcome {
    pub target: RefreshTarget,
    pub result: Result<usize, String>,
    /// The server's answer when it was reachable but the call failed.
    pub remote_error: Option<RemoteError>,
}

impl TargetOutcome {
    pub fn ok(target: RefreshTarget, count: usize) -> Self {
        TargetOutcome {
            target,
            result: Ok(count),
            remote_error: None,
        }
    }

    pub fn failed(target: RefreshTarget, reason: impl Into<String>) -> Self {
        TargetOutcome {
            target,
            result: Err(reason.into()),
            remote_error: None,
        }
    }

    pub fn rejected(target: RefreshTarget, err: RemoteError) -> Self {
        TargetOutcome {
            target,
            result: Err(err.to_string()),
            remote_error: Some(err),
        }
    }
}

/// Classify a fetch for a refresh: only data from the remote counts.
pub(crate) fn outcome_of<T>(
    target: RefreshTarget,
    fetched: ferry_core::Result<Fetched<T>>,
) -> TargetOutcome {
    match fetched {
        Ok(Fetched {
            records,
            source: Source::Remote,
            ..
        }) => TargetOutcome::ok(target, records.len()),
        Ok(Fetched {
            remote_error: Some(err),
            ..
        }) => TargetOutcome::rejected(target, err),
        Ok(_) => TargetOutcome::failed(target, "offline"),
        Err(err) => TargetOutcome::failed(target, err.to_string()),
    }
}

/// Per-target outcomes of a domain refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub domain: Domain,
    pub outcomes: Vec<TargetOutcome>,
}

impl RefreshReport {
    pub fn new(domain: Domain) -> Self {
        RefreshReport {
            domain,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: TargetOutcome) {
        if let Err(reason) = &outcome.result {
            tracing::warn!(
                domain = %self.domain,
                target = %outcome.target,
                reason = reason.as_str(),
                "refresh target failed"
            );
        }
        self.outcomes.push(outcome);
    }

    /// A refresh fails only when every sub-fetch failed.
    pub fn is_failure(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.result.is_err())
    }

    pub fn failed_targets(&self) -> Vec<RefreshTarget> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.target)
            .collect()
    }

    /// First server-side error among the failed targets.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        self.outcomes.iter().find_map(|o| o.remote_error.as_ref())
    }

    pub fn record_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }
}

/// Body executed by scheduled sync jobs.
pub trait Refresh: Send + Sync {
    fn refresh_all(&self, domain: Domain) -> BoxFuture<'_, RefreshReport>;
}

/// Routes a domain refresh to its façade.
pub struct DomainRefresher {
    email: Arc<EmailSync>,
    persona: Arc<PersonaSync>,
}

impl DomainRefresher {
    pub fn new(email: Arc<EmailSync>, persona: Arc<PersonaSync>) -> Self {
        DomainRefresher { email, persona }
    }
}

impl Refresh for DomainRefresher {
    fn refresh_all(&self, domain: Domain) -> BoxFuture<'_, RefreshReport> {
        Box::pin(async move {
            match domain {
                Domain::Email => self.email.refresh_all().await,
                Domain::Persona => self.persona.refresh_all().await,
            }
        })
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
