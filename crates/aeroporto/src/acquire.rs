// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-resource acquisition: ordered attempts with bounded backoff.
//!
//! Strict per-class ordering eliminates circular wait inside a class; the
//! two classes still acquire the same sets in opposite orders, so a
//! cross-class cycle remains possible. Backoff releases the first-acquired
//! units on an inner failure, and the deadlock detector handles the rest.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tracing::debug;

use crate::coordinator::{AcquireOutcome, Coordinator, CrashCause, LIFE_DEADLINE};
use crate::fleet::FlightClass;
use crate::resource::ResourceKind;

/// Attempts before the protocol gives up and crashes the aircraft.
pub const MAX_ATTEMPTS: u32 = 20;

/// Per-attempt bound on a single `acquire_one` call.
pub const SHORT_DEADLINE: Duration = Duration::from_secs(6);

/// Pause after failing to get the first resource of the set.
const RETRY_JITTER_MS: RangeInclusive<u64> = 500..=1000;

/// Pause after a backoff (inner resource failed, holdings released).
const BACKOFF_JITTER_MS: RangeInclusive<u64> = 200..=500;

/// Acquire every kind in `kinds`, in order, as one atomic set.
///
/// Returns `Ok(())` with all units held, or the crash cause with nothing
/// held. Starvation accounting happens at whichever deadline check fires.
pub async fn acquire_set(
    coord: &Coordinator,
    id: u64,
    class: FlightClass,
    kinds: &[ResourceKind],
) -> Result<(), CrashCause> {
    for attempt in 1..=MAX_ATTEMPTS {
        if coord.shutdown.is_cancelled() {
            return Err(CrashCause::Shutdown);
        }
        let born = coord.fleet.born_at(id).unwrap_or_else(Instant::now);
        if born.elapsed() >= LIFE_DEADLINE {
            coord.stats.record_starvation();
            return Err(CrashCause::Deadline);
        }

        match coord.acquire_one(kinds[0], SHORT_DEADLINE, class, id).await {
            AcquireOutcome::Acquired => {}
            AcquireOutcome::TimedOut => {
                jitter_sleep(RETRY_JITTER_MS).await;
                continue;
            }
            AcquireOutcome::Crashed(cause) => return Err(cause),
        }

        let mut held = 1;
        let mut crashed = None;
        for &kind in &kinds[1..] {
            match coord.acquire_one(kind, SHORT_DEADLINE, class, id).await {
                AcquireOutcome::Acquired => held += 1,
                AcquireOutcome::TimedOut => break,
                AcquireOutcome::Crashed(cause) => {
                    crashed = Some(cause);
                    break;
                }
            }
        }
        if held == kinds.len() {
            return Ok(());
        }

        // Inner acquisition failed: give back what we got, newest first.
        for &kind in kinds[..held].iter().rev() {
            coord.release_one(id, kind);
        }
        if let Some(cause) = crashed {
            return Err(cause);
        }

        coord.stats.record_deadlock_avoided();
        debug!(
            aircraft = id,
            class = class.as_str(),
            attempt,
            held,
            "backed off; released holdings to dodge a deadlock"
        );
        jitter_sleep(BACKOFF_JITTER_MS).await;
    }

    Err(CrashCause::Exhausted)
}

async fn jitter_sleep(range: RangeInclusive<u64>) {
    let ms = rand::rng().random_range(range);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[cfg(test)]
#[path = "acquire_tests.rs"]
mod tests;
