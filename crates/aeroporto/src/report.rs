// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Final report rendering.

use std::fmt::Write as _;

use crate::config::Config;
use crate::fleet::{FlightClass, FlightRecord, Phase};
use crate::stats::StatsSnapshot;

/// Aircraft always listed individually, beyond which only non-succeeded
/// flights are shown.
const LISTED_HEAD: usize = 10;

fn pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Render the end-of-run report. Purely presentational; the counters and
/// fleet records are the contract.
pub fn render(config: &Config, stats: &StatsSnapshot, flights: &[(u64, FlightRecord)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "==================================================================");
    let _ = writeln!(out, "                         FINAL REPORT");
    let _ = writeln!(out, "==================================================================");
    let _ = writeln!(
        out,
        "Configuration: runways={}, gates={}, tower slots={}, window={}s",
        config.runways, config.gates, config.tower_slots, config.window_secs
    );

    let _ = writeln!(out, "\nSummary:");
    let _ = writeln!(out, "Total aircraft: {}", stats.total);
    let _ = writeln!(
        out,
        "|- Domestic: {} ({:.1}%)",
        stats.domestic,
        pct(stats.domestic, stats.total)
    );
    let _ = writeln!(
        out,
        "`- International: {} ({:.1}%)",
        stats.international,
        pct(stats.international, stats.total)
    );

    let _ = writeln!(out, "\nOutcomes:");
    let _ = writeln!(
        out,
        "Succeeded: {} ({:.1}%)",
        stats.succeeded,
        pct(stats.succeeded, stats.total)
    );
    let _ =
        writeln!(out, "Crashed: {} ({:.1}%)", stats.crashed, pct(stats.crashed, stats.total));

    let _ = writeln!(out, "\nProblems detected:");
    let _ = writeln!(out, "Critical alerts: {}", stats.critical_alerts);
    let _ = writeln!(out, "Starvation cases: {}", stats.starvation_cases);
    let _ = writeln!(out, "Deadlocks detected: {}", stats.deadlocks_detected);
    let _ = writeln!(out, "Deadlocks resolved: {}", stats.deadlocks_resolved);
    let _ = writeln!(out, "Deadlocks avoided (backoff): {}", stats.deadlocks_avoided);
    let _ = writeln!(out, "Preemptions: {}", stats.preemptions);

    let _ = writeln!(out, "\nFinal aircraft states:");
    for (position, (id, record)) in flights.iter().enumerate() {
        if position < LISTED_HEAD || record.phase != Phase::Succeeded {
            let _ = writeln!(
                out,
                "Aircraft {} ({}): {}",
                id,
                record.class.as_str(),
                record.phase.as_str()
            );
        }
    }

    let (mut dom_ok, mut dom_crash, mut intl_ok, mut intl_crash) = (0u64, 0u64, 0u64, 0u64);
    for (_, record) in flights {
        match (record.class, record.phase) {
            (FlightClass::Domestic, Phase::Succeeded) => dom_ok += 1,
            (FlightClass::Domestic, Phase::Crashed) => dom_crash += 1,
            (FlightClass::International, Phase::Succeeded) => intl_ok += 1,
            (FlightClass::International, Phase::Crashed) => intl_crash += 1,
            _ => {}
        }
    }
    let _ = writeln!(out, "\nBy class:");
    let _ = writeln!(out, "Domestic - succeeded: {dom_ok}, crashed: {dom_crash}");
    let _ = writeln!(out, "International - succeeded: {intl_ok}, crashed: {intl_crash}");

    let _ = writeln!(out, "\nSuccess rate: {:.1}%", pct(stats.succeeded, stats.total));
    let _ = write!(out, "==================================================================");
    out
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
