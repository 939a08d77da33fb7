// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded resource pools with class-segregated wakeup.

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::fleet::FlightClass;

/// The three kinds of airport resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Runway,
    Gate,
    TowerSlot,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] =
        [ResourceKind::Runway, ResourceKind::Gate, ResourceKind::TowerSlot];

    pub fn index(self) -> usize {
        match self {
            ResourceKind::Runway => 0,
            ResourceKind::Gate => 1,
            ResourceKind::TowerSlot => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Runway => "runway",
            ResourceKind::Gate => "gate",
            ResourceKind::TowerSlot => "tower slot",
        }
    }
}

/// Mutable pool counters. `available` never exceeds the pool capacity; the
/// waiting counts are queue-length hints for the release policy.
#[derive(Debug)]
pub struct PoolState {
    pub available: u32,
    pub waiting_domestic: u32,
    pub waiting_international: u32,
}

impl PoolState {
    /// Whether a unit can be handed to an agent of `class` right now.
    ///
    /// A domestic agent never takes a unit while an international is
    /// waiting on this pool, so an international waiter that is runnable
    /// at release time always wins.
    pub fn grantable(&self, class: FlightClass) -> bool {
        self.available > 0
            && (class == FlightClass::International || self.waiting_international == 0)
    }

    pub fn note_waiting(&mut self, class: FlightClass) {
        match class {
            FlightClass::Domestic => self.waiting_domestic += 1,
            FlightClass::International => self.waiting_international += 1,
        }
    }

    pub fn done_waiting(&mut self, class: FlightClass) {
        match class {
            FlightClass::Domestic => {
                self.waiting_domestic = self.waiting_domestic.saturating_sub(1);
            }
            FlightClass::International => {
                self.waiting_international = self.waiting_international.saturating_sub(1);
            }
        }
    }
}

/// One bounded pool: counters under a mutex plus one wakeup channel per
/// priority class. Multi-resource atomicity, deadlines, and deadlock
/// handling live above this layer.
pub struct ResourcePool {
    kind: ResourceKind,
    capacity: u32,
    state: Mutex<PoolState>,
    international: Notify,
    domestic: Notify,
}

impl ResourcePool {
    pub fn new(kind: ResourceKind, capacity: u32) -> Self {
        Self {
            kind,
            capacity,
            state: Mutex::new(PoolState {
                available: capacity,
                waiting_domestic: 0,
                waiting_international: 0,
            }),
            international: Notify::new(),
            domestic: Notify::new(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock()
    }

    pub fn notify_for(&self, class: FlightClass) -> &Notify {
        match class {
            FlightClass::Domestic => &self.domestic,
            FlightClass::International => &self.international,
        }
    }

    /// Release-time signaling: one international if any is waiting, else
    /// one domestic, else broadcast both (harmless; resolves shutdown
    /// races).
    pub fn signal_release(&self, state: &PoolState) {
        if state.waiting_international > 0 {
            self.international.notify_one();
        } else if state.waiting_domestic > 0 {
            self.domestic.notify_one();
        } else {
            self.broadcast();
        }
    }

    /// Wake every waiter of both classes.
    pub fn broadcast(&self) {
        self.international.notify_waiters();
        self.domestic.notify_waiters();
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
