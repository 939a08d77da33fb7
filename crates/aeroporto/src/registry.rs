// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wait/hold registry: which aircraft hold units of each kind and which
//! are blocked waiting for one. Sole source of truth for the deadlock
//! detector.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::resource::ResourceKind;

/// A blocked acquisition. Each aircraft blocks on at most one kind at a
/// time, so one record per id.
#[derive(Debug, Clone, Copy)]
pub struct WaiterRecord {
    pub kind: ResourceKind,
    pub since: Instant,
}

#[derive(Default)]
struct Inner {
    /// Multiset of holder ids per kind, indexed by `ResourceKind::index`.
    holders: [Vec<u64>; 3],
    waiters: HashMap<u64, WaiterRecord>,
}

/// Registry mutations are linearized by this single mutex, disjoint from
/// every pool mutex.
#[derive(Default)]
pub struct Registry {
    inner: Mutex<Inner>,
}

/// Consistent copy of the registry taken under its lock.
pub struct RegistrySnapshot {
    pub holders: [Vec<u64>; 3],
    pub waiters: HashMap<u64, WaiterRecord>,
}

impl RegistrySnapshot {
    pub fn holders_of(&self, kind: ResourceKind) -> &[u64] {
        &self.holders[kind.index()]
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_holder(&self, id: u64, kind: ResourceKind) {
        self.inner.lock().holders[kind.index()].push(id);
    }

    /// Remove one holder record for `(id, kind)`. Returns false when no
    /// such record exists (the unit was already force-released).
    pub fn remove_holder(&self, id: u64, kind: ResourceKind) -> bool {
        let mut inner = self.inner.lock();
        let holders = &mut inner.holders[kind.index()];
        match holders.iter().position(|&h| h == id) {
            Some(at) => {
                holders.swap_remove(at);
                true
            }
            None => false,
        }
    }

    /// Remove every holder record of `id` for `kind`, returning how many
    /// units that frees.
    pub fn remove_all_of(&self, id: u64, kind: ResourceKind) -> u32 {
        let mut inner = self.inner.lock();
        let holders = &mut inner.holders[kind.index()];
        let before = holders.len();
        holders.retain(|&h| h != id);
        (before - holders.len()) as u32
    }

    pub fn holder_count(&self, kind: ResourceKind) -> usize {
        self.inner.lock().holders[kind.index()].len()
    }

    pub fn holds_any(&self, id: u64) -> bool {
        self.inner.lock().holders.iter().any(|kind| kind.contains(&id))
    }

    /// Units of each kind currently held by `id`, with multiplicity.
    pub fn holdings_of(&self, id: u64) -> Vec<ResourceKind> {
        let inner = self.inner.lock();
        let mut out = Vec::new();
        for kind in ResourceKind::ALL {
            for _ in inner.holders[kind.index()].iter().filter(|&&h| h == id) {
                out.push(kind);
            }
        }
        out
    }

    pub fn add_waiter(&self, id: u64, kind: ResourceKind) {
        self.inner.lock().waiters.insert(id, WaiterRecord { kind, since: Instant::now() });
    }

    pub fn remove_waiter(&self, id: u64) {
        self.inner.lock().waiters.remove(&id);
    }

    pub fn is_waiting(&self, id: u64) -> bool {
        self.inner.lock().waiters.contains_key(&id)
    }

    pub fn waiter_count(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let inner = self.inner.lock();
        RegistrySnapshot { holders: inner.holders.clone(), waiters: inner.waiters.clone() }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
