// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trailing-edge debouncing of view changes.

use std::time::{Duration, Instant};

use crate::types::ViewChange;

/// Coalesces bursts of view changes into one deferred pass.
///
/// Each [`Debouncer::schedule`] replaces any pending deadline with `now + delay`, so a pass
/// runs once the host has been quiet for `delay`. Time is supplied by the caller, which keeps
/// the schedule deterministic under test.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
}

#[derive(Copy, Clone, Debug)]
struct Pending {
    deadline: Instant,
    last: ViewChange,
    coalesced: u32,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a change at `now`, superseding any pending deadline.
    pub fn schedule(&mut self, change: ViewChange, now: Instant) {
        let deadline = now + self.delay;
        let coalesced = self.pending.map_or(0, |p| p.coalesced + 1);
        if coalesced > 0 {
            log::trace!("{change:?} supersedes pending pass ({coalesced} coalesced)");
        }
        self.pending = Some(Pending {
            deadline,
            last: change,
            coalesced,
        });
    }

    /// Deadline of the pending pass.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Whether a pass is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending change if its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<ViewChange> {
        match self.pending {
            Some(p) if now >= p.deadline => {
                self.pending = None;
                Some(p.last)
            }
            _ => None,
        }
    }

    /// Drop any pending pass.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
