// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The coordinator: pools, registry, fleet, critical list, and counters as
//! one owned value, plus the single-resource acquisition endpoints.

use std::time::Duration;

use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::aging::CriticalList;
use crate::fleet::{Fleet, FlightClass};
use crate::registry::Registry;
use crate::resource::{ResourceKind, ResourcePool};
use crate::stats::Stats;

/// Hard bound on an aircraft's life. Blocked past this it crashes, counted
/// as starvation.
pub const LIFE_DEADLINE: Duration = Duration::from_secs(90);

/// Crossing this while blocked raises a critical alert; domestics also
/// enter the critical list for aging.
pub const ALERT_THRESHOLD: Duration = Duration::from_secs(60);

/// Upper bound between wakeups while blocked, so the life deadline and the
/// shutdown flag are observed with about one second of slack.
pub const POLL_TICK: Duration = Duration::from_secs(1);

/// Why an acquisition crashed an aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashCause {
    /// The 90 s life deadline elapsed while blocked.
    Deadline,
    /// The simulation is shutting down.
    Shutdown,
    /// The acquisition protocol ran out of attempts.
    Exhausted,
}

impl CrashCause {
    pub fn as_str(self) -> &'static str {
        match self {
            CrashCause::Deadline => "deadline",
            CrashCause::Shutdown => "shutdown",
            CrashCause::Exhausted => "attempts-exhausted",
        }
    }
}

/// Outcome of a single-unit acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    Acquired,
    /// The per-attempt short deadline elapsed; the caller may retry.
    TimedOut,
    Crashed(CrashCause),
}

/// Owned subsystem root shared among all tasks via `Arc`. Each field keeps
/// its own mutex; none are process-wide singletons.
pub struct Coordinator {
    pools: [ResourcePool; 3],
    pub registry: Registry,
    pub fleet: Fleet,
    pub critical: CriticalList,
    pub stats: Stats,
    pub shutdown: CancellationToken,
}

impl Coordinator {
    pub fn new(runways: u32, gates: u32, tower_slots: u32, shutdown: CancellationToken) -> Self {
        Self {
            pools: [
                ResourcePool::new(ResourceKind::Runway, runways),
                ResourcePool::new(ResourceKind::Gate, gates),
                ResourcePool::new(ResourceKind::TowerSlot, tower_slots),
            ],
            registry: Registry::new(),
            fleet: Fleet::new(),
            critical: CriticalList::new(),
            stats: Stats::new(),
            shutdown,
        }
    }

    pub fn pool(&self, kind: ResourceKind) -> &ResourcePool {
        &self.pools[kind.index()]
    }

    pub fn available(&self, kind: ResourceKind) -> u32 {
        self.pool(kind).lock().available
    }

    /// Wake every blocked waiter on every pool (shutdown path).
    pub fn broadcast_pools(&self) {
        for pool in &self.pools {
            pool.broadcast();
        }
    }

    /// Acquire one unit of `kind`, blocking up to `short_deadline`.
    ///
    /// Wakeups happen at least every [`POLL_TICK`], at which point the
    /// shutdown flag and the aircraft's life deadline are re-read (the
    /// deadline anchor may have been reset by a preemption in between).
    /// Lock order inside is always pool, then registry.
    pub async fn acquire_one(
        &self,
        kind: ResourceKind,
        short_deadline: Duration,
        class: FlightClass,
        id: u64,
    ) -> AcquireOutcome {
        if self.shutdown.is_cancelled() {
            return AcquireOutcome::Crashed(CrashCause::Shutdown);
        }

        let pool = self.pool(kind);

        {
            let mut st = pool.lock();
            if st.grantable(class) {
                st.available -= 1;
                self.registry.add_holder(id, kind);
                drop(st);
                self.critical.remove(id);
                return AcquireOutcome::Acquired;
            }
            st.note_waiting(class);
            self.registry.add_waiter(id, kind);
        }

        let give_up_at = Instant::now() + short_deadline;
        let mut alerted = false;
        let outcome = loop {
            if self.shutdown.is_cancelled() {
                break AcquireOutcome::Crashed(CrashCause::Shutdown);
            }

            let born = self.fleet.born_at(id).unwrap_or_else(Instant::now);
            let life = born.elapsed();
            if life >= LIFE_DEADLINE {
                self.stats.record_starvation();
                warn!(
                    aircraft = id,
                    class = class.as_str(),
                    waiting_on = kind.label(),
                    life_secs = life.as_secs(),
                    "starved past the life deadline"
                );
                break AcquireOutcome::Crashed(CrashCause::Deadline);
            }
            if life >= ALERT_THRESHOLD && !alerted {
                alerted = true;
                self.stats.record_critical_alert();
                if class == FlightClass::Domestic {
                    self.critical.note(id);
                }
                warn!(
                    aircraft = id,
                    class = class.as_str(),
                    waiting_on = kind.label(),
                    life_secs = life.as_secs(),
                    "critical wait alert"
                );
            }

            // Register interest before re-checking, so a release landing
            // between the check and the wait is not lost.
            let notified = pool.notify_for(class).notified();
            {
                let mut st = pool.lock();
                if st.grantable(class) {
                    st.available -= 1;
                    st.done_waiting(class);
                    self.registry.remove_waiter(id);
                    self.registry.add_holder(id, kind);
                    drop(st);
                    self.critical.remove(id);
                    return AcquireOutcome::Acquired;
                }
            }

            if Instant::now() >= give_up_at {
                break AcquireOutcome::TimedOut;
            }
            let _ = timeout(POLL_TICK, notified).await;
        };

        pool.lock().done_waiting(class);
        self.registry.remove_waiter(id);
        if matches!(outcome, AcquireOutcome::Crashed(_)) {
            self.critical.remove(id);
        }
        outcome
    }

    /// Return one unit of `kind` held by `id`.
    ///
    /// The holder record is the source of truth: when a preemption already
    /// force-released the unit, this is a no-op, so the capacity invariant
    /// survives the victim's own later release calls.
    pub fn release_one(&self, id: u64, kind: ResourceKind) {
        let pool = self.pool(kind);
        let mut st = pool.lock();
        if !self.registry.remove_holder(id, kind) {
            return;
        }
        st.available += 1;
        pool.signal_release(&st);
    }

    /// Release everything `id` holds across all pools, waking waiters per
    /// the release policy. Returns the number of units freed.
    pub fn force_release_all(&self, id: u64) -> u32 {
        let mut released = 0;
        for kind in ResourceKind::ALL {
            let pool = self.pool(kind);
            let mut st = pool.lock();
            let freed = self.registry.remove_all_of(id, kind);
            st.available += freed;
            for _ in 0..freed {
                pool.signal_release(&st);
            }
            released += freed;
        }
        released
    }

    /// Forcibly strip `victim` of all holdings and restart its lifecycle
    /// with a fresh deadline anchor. The victim's driver is not informed;
    /// it simply finds itself with a later deadline and fewer resources.
    pub fn preempt(&self, victim: u64) -> u32 {
        let released = self.force_release_all(victim);
        self.fleet.preempt_reset(victim);
        self.critical.remove(victim);
        self.stats.record_preemption();
        debug!(aircraft = victim, released, "preempted; lifecycle reset to landing");
        released
    }

    /// `available + holders == capacity` for every pool. Meaningful at
    /// quiescent points.
    pub fn capacity_invariant_holds(&self) -> bool {
        ResourceKind::ALL.iter().all(|&kind| {
            let available = self.pool(kind).lock().available;
            available + self.registry.holder_count(kind) as u32 == self.pool(kind).capacity()
        })
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
