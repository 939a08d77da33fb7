// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadlock detection over the wait-for graph.
//!
//! Vertices are blocked aircraft; an edge A -> B means A waits on a kind
//! that B holds while B is itself blocked. Only length-2 cycles are
//! searched: they dominate in practice, and a longer cycle collapses into
//! one after a single preemption, to be caught on a later tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::coordinator::Coordinator;
use crate::fleet::{FlightClass, FlightRecord};
use crate::registry::RegistrySnapshot;

/// Detection period.
pub const DETECTOR_PERIOD: Duration = Duration::from_secs(3);

/// Find one length-2 cycle in the wait-for graph, if any.
pub fn find_cycle(snapshot: &RegistrySnapshot) -> Option<(u64, u64)> {
    for (&a, a_rec) in &snapshot.waiters {
        for &b in snapshot.holders_of(a_rec.kind) {
            if b == a {
                continue;
            }
            let Some(b_rec) = snapshot.waiters.get(&b) else { continue };
            if snapshot.holders_of(b_rec.kind).contains(&a) {
                return Some((a, b));
            }
        }
    }
    None
}

/// Victim policy: the later-arrived aircraft loses; on a tie the domestic
/// loses, so internationals retain priority.
pub fn choose_victim(a: (u64, FlightRecord), b: (u64, FlightRecord)) -> u64 {
    if a.1.born_at > b.1.born_at {
        a.0
    } else if b.1.born_at > a.1.born_at {
        b.0
    } else if a.1.class == FlightClass::Domestic {
        a.0
    } else {
        b.0
    }
}

/// Spawn the periodic detector. Each tick snapshots the registry, looks
/// for a cycle, and resolves it outside the registry lock.
pub fn spawn_detector(coord: Arc<Coordinator>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(DETECTOR_PERIOD);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = coord.shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            let snapshot = coord.registry.snapshot();
            let Some((a, b)) = find_cycle(&snapshot) else { continue };

            coord.stats.record_deadlock_detected();
            warn!(a, b, "wait-for cycle detected");
            resolve(&coord, a, b);
        }
    })
}

fn resolve(coord: &Coordinator, a: u64, b: u64) {
    let (Some(rec_a), Some(rec_b)) = (coord.fleet.get(a), coord.fleet.get(b)) else {
        return;
    };
    let victim = choose_victim((a, rec_a), (b, rec_b));
    warn!(victim, "resolving deadlock by preemption");
    coord.preempt(victim);
    coord.stats.record_deadlock_resolved();
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;
