// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network availability.
//!
//! A probe owns a single observable slot. The slot only changes through an
//! explicit [`ConnectivityProbe::refresh`] (or [`SwitchProbe::set`]), and
//! only notifies observers when the value actually flips.

use futures_util::future::{self, BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Latest-value-wins stream of availability changes.
pub type ConnectivityStream = WatchStream<bool>;

pub trait ConnectivityProbe: Send + Sync {
    /// Last known availability.
    fn is_available(&self) -> bool;

    /// Receiver for the availability slot.
    fn watch(&self) -> watch::Receiver<bool>;

    /// Re-check the network and update the slot. Returns the new value.
    fn refresh(&self) -> BoxFuture<'_, bool>;

    /// Current availability followed by every change.
    fn observe(&self) -> ConnectivityStream {
        WatchStream::new(self.watch())
    }
}

/// Probe whose state is set by the caller.
///
/// Used in tests and when the host reports connectivity itself.
pub struct SwitchProbe {
    state: watch::Sender<bool>,
}

impl SwitchProbe {
    pub fn new(available: bool) -> Self {
        let (state, _) = watch::channel(available);
        SwitchProbe { state }
    }

    pub fn online() -> Self {
        Self::new(true)
    }

    pub fn offline() -> Self {
        Self::new(false)
    }

    /// Set availability. Returns true if the value changed.
    pub fn set(&self, available: bool) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if *current == available {
                false
            } else {
                *current = available;
                true
            }
        });
        if changed {
            tracing::debug!(available, "connectivity changed");
        }
        changed
    }
}

impl ConnectivityProbe for SwitchProbe {
    fn is_available(&self) -> bool {
        *self.state.borrow()
    }

    fn watch(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    fn refresh(&self) -> BoxFuture<'_, bool> {
        future::ready(self.is_available()).boxed()
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
