// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fleet table: per-flight class, phase, and deadline anchor.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Priority class of a flight. International outranks domestic at pool
/// release time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightClass {
    Domestic,
    International,
}

impl FlightClass {
    pub fn as_str(self) -> &'static str {
        match self {
            FlightClass::Domestic => "DOM",
            FlightClass::International => "INTL",
        }
    }
}

/// Lifecycle state machine. `Succeeded` and `Crashed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Landing,
    Deplaning,
    Departing,
    Succeeded,
    Crashed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Landing => "LANDING",
            Phase::Deplaning => "DEPLANING",
            Phase::Departing => "DEPARTING",
            Phase::Succeeded => "SUCCEEDED",
            Phase::Crashed => "CRASHED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Crashed)
    }
}

/// One flight's shared record. `phase` and `born_at` are mutated under the
/// fleet mutex only: by the flight's own driver, and by preemption.
#[derive(Debug, Clone, Copy)]
pub struct FlightRecord {
    pub class: FlightClass,
    pub phase: Phase,
    pub born_at: Instant,
}

/// All flights of the run, keyed by id. Entries are never removed; the
/// final report walks terminal records.
#[derive(Default)]
pub struct Fleet {
    inner: Mutex<BTreeMap<u64, FlightRecord>>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: u64, class: FlightClass) {
        let record = FlightRecord { class, phase: Phase::Landing, born_at: Instant::now() };
        self.inner.lock().insert(id, record);
    }

    pub fn get(&self, id: u64) -> Option<FlightRecord> {
        self.inner.lock().get(&id).copied()
    }

    pub fn born_at(&self, id: u64) -> Option<Instant> {
        self.inner.lock().get(&id).map(|r| r.born_at)
    }

    pub fn phase(&self, id: u64) -> Option<Phase> {
        self.inner.lock().get(&id).map(|r| r.phase)
    }

    pub fn set_phase(&self, id: u64, phase: Phase) {
        if let Some(record) = self.inner.lock().get_mut(&id) {
            record.phase = phase;
        }
    }

    /// Reset a preemption victim: back to `Landing` with a fresh deadline
    /// anchor. Returns false when the id is unknown.
    pub fn preempt_reset(&self, id: u64) -> bool {
        match self.inner.lock().get_mut(&id) {
            Some(record) => {
                record.phase = Phase::Landing;
                record.born_at = Instant::now();
                true
            }
            None => false,
        }
    }

    /// All flights in id order.
    pub fn all(&self) -> Vec<(u64, FlightRecord)> {
        self.inner.lock().iter().map(|(&id, &record)| (id, record)).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "fleet_tests.rs"]
mod tests;
