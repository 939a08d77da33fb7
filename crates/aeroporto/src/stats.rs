// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run counters. Observers may read stale values but never torn ones.

use parking_lot::Mutex;

use crate::fleet::FlightClass;

/// Plain copy of the counter block. `active` is the only gauge; everything
/// else is monotonically non-decreasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total: u64,
    pub succeeded: u64,
    pub crashed: u64,
    pub active: u64,
    pub domestic: u64,
    pub international: u64,
    pub critical_alerts: u64,
    pub starvation_cases: u64,
    pub deadlocks_detected: u64,
    pub deadlocks_resolved: u64,
    pub deadlocks_avoided: u64,
    pub preemptions: u64,
}

#[derive(Default)]
pub struct Stats {
    inner: Mutex<StatsSnapshot>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new aircraft entered the simulation.
    pub fn record_spawn(&self, class: FlightClass) {
        let mut s = self.inner.lock();
        s.total += 1;
        s.active += 1;
        match class {
            FlightClass::Domestic => s.domestic += 1,
            FlightClass::International => s.international += 1,
        }
    }

    pub fn record_success(&self) {
        let mut s = self.inner.lock();
        s.succeeded += 1;
        s.active = s.active.saturating_sub(1);
    }

    pub fn record_crash(&self) {
        let mut s = self.inner.lock();
        s.crashed += 1;
        s.active = s.active.saturating_sub(1);
    }

    pub fn record_critical_alert(&self) {
        self.inner.lock().critical_alerts += 1;
    }

    pub fn record_starvation(&self) {
        self.inner.lock().starvation_cases += 1;
    }

    pub fn record_deadlock_detected(&self) {
        self.inner.lock().deadlocks_detected += 1;
    }

    pub fn record_deadlock_resolved(&self) {
        self.inner.lock().deadlocks_resolved += 1;
    }

    /// A voluntary backoff released first-acquired units to dodge a
    /// potential deadlock.
    pub fn record_deadlock_avoided(&self) {
        self.inner.lock().deadlocks_avoided += 1;
    }

    pub fn record_preemption(&self) {
        self.inner.lock().preemptions += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        *self.inner.lock()
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
