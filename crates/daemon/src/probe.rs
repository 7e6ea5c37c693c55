// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! TCP reachability probe.
//!
//! Connectivity counts as available when a TCP connection to the API host
//! can be opened within the timeout. The result lives in a watch slot that
//! only notifies on change.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use ferry_core::ConnectivityProbe;

pub struct TcpProbe {
    target: String,
    timeout: Duration,
    state: watch::Sender<bool>,
}

impl TcpProbe {
    /// Probe for `host:port`. Starts out unavailable until the first check.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Self {
        let (state, _) = watch::channel(false);
        TcpProbe {
            target: format!("{host}:{port}"),
            timeout,
            state,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    async fn reachable(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(&self.target)).await,
            Ok(Ok(_))
        )
    }

    fn publish(&self, available: bool) {
        let changed = self.state.send_if_modified(|current| {
            if *current == available {
                false
            } else {
                *current = available;
                true
            }
        });
        if changed {
            tracing::info!(target_addr = %self.target, available, "connectivity changed");
        }
    }

    /// Re-check every `interval` until `cancel` fires.
    pub async fn monitor(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        loop {
            self.refresh().await;
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

impl ConnectivityProbe for TcpProbe {
    fn is_available(&self) -> bool {
        *self.state.borrow()
    }

    fn watch(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    fn refresh(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let available = self.reachable().await;
            self.publish(available);
            available
        })
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
