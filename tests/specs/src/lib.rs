// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for scenario tests.
//!
//! Scenarios run on a paused tokio clock, so the 60/90 s thresholds play
//! out in milliseconds of wall time while exercising the real code paths.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use aeroporto::agent;
use aeroporto::coordinator::Coordinator;
use aeroporto::fleet::FlightClass;

pub fn coordinator(runways: u32, gates: u32, tower_slots: u32) -> Arc<Coordinator> {
    Arc::new(Coordinator::new(runways, gates, tower_slots, CancellationToken::new()))
}

/// Register a flight and launch its driver, mirroring the supervisor's
/// spawn path.
pub fn spawn_flight(coord: &Arc<Coordinator>, id: u64, class: FlightClass) -> JoinHandle<()> {
    coord.fleet.register(id, class);
    coord.stats.record_spawn(class);
    tokio::spawn(agent::fly(Arc::clone(coord), id, class))
}

/// Quiescent-point invariants: capacity accounting per pool, terminal
/// flights hold and wait for nothing, and the counter identities.
pub fn assert_quiescent(coord: &Coordinator) {
    assert!(coord.capacity_invariant_holds(), "available + holders == capacity must hold");

    let stats = coord.stats.snapshot();
    assert_eq!(stats.total, stats.succeeded + stats.crashed + stats.active);
    assert_eq!(stats.total, stats.domestic + stats.international);

    for (id, record) in coord.fleet.all() {
        if record.phase.is_terminal() {
            assert!(!coord.registry.holds_any(id), "terminal flight {id} still holds resources");
            assert!(!coord.registry.is_waiting(id), "terminal flight {id} is still waiting");
        }
    }
}
