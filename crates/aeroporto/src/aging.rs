// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aging: starving domestics earn a preemption of an international.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;

use crate::coordinator::Coordinator;
use crate::fleet::FlightClass;

/// Scan period of the aging task.
pub const AGING_PERIOD: Duration = Duration::from_secs(5);

/// How long a critical-list entry must sit before it triggers preemption.
pub const RIPE_AFTER: Duration = Duration::from_secs(2);

/// Domestic aircraft that crossed the alert threshold while waiting.
/// Entries leave on acquisition success, crash, or preemption execution.
#[derive(Default)]
pub struct CriticalList {
    inner: Mutex<BTreeMap<u64, Instant>>,
}

impl CriticalList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` as critical. Keeps the original timestamp when the
    /// entry already exists.
    pub fn note(&self, id: u64) {
        self.inner.lock().entry(id).or_insert_with(Instant::now);
    }

    pub fn remove(&self, id: u64) {
        self.inner.lock().remove(&id);
    }

    pub fn contains(&self, id: u64) -> bool {
        self.inner.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Ids whose entries are older than `age`, in id order.
    pub fn ripe(&self, age: Duration) -> Vec<u64> {
        let now = Instant::now();
        self.inner
            .lock()
            .iter()
            .filter(|(_, &since)| now.saturating_duration_since(since) >= age)
            .map(|(&id, _)| id)
            .collect()
    }
}

/// Pick an international currently in a non-terminal phase and holding at
/// least one unit. Lowest id wins, which keeps the choice stable across
/// scans.
pub fn pick_international_victim(coord: &Coordinator) -> Option<u64> {
    coord
        .fleet
        .all()
        .into_iter()
        .find(|(id, record)| {
            record.class == FlightClass::International
                && !record.phase.is_terminal()
                && coord.registry.holds_any(*id)
        })
        .map(|(id, _)| id)
}

/// Spawn the aging scanner: every [`AGING_PERIOD`], ripe critical-list
/// entries force an international to give up its holdings so the starving
/// domestic can make progress.
pub fn spawn_aging(coord: Arc<Coordinator>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(AGING_PERIOD);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = coord.shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            for starving in coord.critical.ripe(RIPE_AFTER) {
                // No international to bump right now; retry next scan.
                let Some(victim) = pick_international_victim(&coord) else { break };
                info!(
                    starving,
                    victim, "aging: preempting an international for a critical domestic"
                );
                coord.preempt(victim);
                coord.critical.remove(starving);
            }
        }
    })
}

#[cfg(test)]
#[path = "aging_tests.rs"]
mod tests;
