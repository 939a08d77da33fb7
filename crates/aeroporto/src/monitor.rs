// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic status block printed while the simulation runs.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::coordinator::Coordinator;
use crate::stats::StatsSnapshot;

pub const MONITOR_PERIOD: Duration = Duration::from_secs(15);

pub fn status_block(stats: &StatsSnapshot, remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!(
        "\n*** STATUS ***\n\
         Total: {} | Active: {} | Succeeded: {} | Crashed: {}\n\
         Domestic: {} | International: {}\n\
         Alerts: {} | Starvation: {} | Deadlocks: {} (resolved {}, avoided {}) | Preemptions: {}\n\
         Window remaining: {:02}:{:02}\n\
         ==================================",
        stats.total,
        stats.active,
        stats.succeeded,
        stats.crashed,
        stats.domestic,
        stats.international,
        stats.critical_alerts,
        stats.starvation_cases,
        stats.deadlocks_detected,
        stats.deadlocks_resolved,
        stats.deadlocks_avoided,
        stats.preemptions,
        secs / 60,
        secs % 60,
    )
}

/// Spawn the 15 s status printer.
pub fn spawn_monitor(
    coord: Arc<Coordinator>,
    started: Instant,
    window: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer =
            tokio::time::interval_at(Instant::now() + MONITOR_PERIOD, MONITOR_PERIOD);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = coord.shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            let stats = coord.stats.snapshot();
            let remaining = window.saturating_sub(started.elapsed());
            println!("{}", status_block(&stats, remaining));
        }
    })
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
