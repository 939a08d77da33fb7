// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The aircraft driver: land, deplane, depart.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::acquire::acquire_set;
use crate::coordinator::{Coordinator, CrashCause};
use crate::fleet::{FlightClass, Phase};
use crate::resource::ResourceKind;

use ResourceKind::{Gate, Runway, TowerSlot};

/// How long the gate stays occupied after the tower frees during
/// deplaning.
const GATE_LINGER: Duration = Duration::from_secs(1);

/// The ordered resource set a phase needs, by class.
///
/// Each class uses one strict order (no intra-class circular wait); the
/// two classes run the same sets reversed, which preserves the priority
/// semantics at the cost of a residual cross-class cycle the detector
/// handles.
pub fn acquisition_order(phase: Phase, class: FlightClass) -> &'static [ResourceKind] {
    match (phase, class) {
        (Phase::Landing, FlightClass::International) => &[Runway, TowerSlot],
        (Phase::Landing, FlightClass::Domestic) => &[TowerSlot, Runway],
        (Phase::Deplaning, FlightClass::International) => &[Gate, TowerSlot],
        (Phase::Deplaning, FlightClass::Domestic) => &[TowerSlot, Gate],
        (Phase::Departing, FlightClass::International) => &[Gate, Runway, TowerSlot],
        (Phase::Departing, FlightClass::Domestic) => &[TowerSlot, Gate, Runway],
        _ => &[],
    }
}

fn service_time(phase: Phase) -> Duration {
    let ms = match phase {
        Phase::Landing => rand::rng().random_range(3000..=8000),
        Phase::Deplaning => rand::rng().random_range(3000..=7000),
        _ => rand::rng().random_range(2000..=5000),
    };
    Duration::from_millis(ms)
}

/// Drive one aircraft through its full lifecycle, recording the outcome.
pub async fn fly(coord: Arc<Coordinator>, id: u64, class: FlightClass) {
    info!(aircraft = id, class = class.as_str(), "entering the pattern");

    for phase in [Phase::Landing, Phase::Deplaning, Phase::Departing] {
        coord.fleet.set_phase(id, phase);
        if let Err(cause) = run_phase(&coord, id, class, phase).await {
            let lifetime = lifetime_secs(&coord, id);
            coord.fleet.set_phase(id, Phase::Crashed);
            coord.critical.remove(id);
            coord.stats.record_crash();
            warn!(
                aircraft = id,
                class = class.as_str(),
                phase = phase.as_str(),
                cause = cause.as_str(),
                lifetime_secs = lifetime,
                "crashed"
            );
            return;
        }
    }

    coord.fleet.set_phase(id, Phase::Succeeded);
    coord.stats.record_success();
    info!(
        aircraft = id,
        class = class.as_str(),
        lifetime_secs = lifetime_secs(&coord, id),
        "completed the full rotation"
    );
}

async fn run_phase(
    coord: &Coordinator,
    id: u64,
    class: FlightClass,
    phase: Phase,
) -> Result<(), CrashCause> {
    acquire_set(coord, id, class, acquisition_order(phase, class)).await?;
    info!(aircraft = id, class = class.as_str(), phase = phase.as_str(), "cleared");
    service_sleep(coord, service_time(phase)).await;

    match phase {
        Phase::Landing => {
            coord.release_one(id, Runway);
            coord.release_one(id, TowerSlot);
        }
        Phase::Deplaning => {
            // Tower frees first; the aircraft stays parked at the gate.
            coord.release_one(id, TowerSlot);
            service_sleep(coord, GATE_LINGER).await;
            coord.release_one(id, Gate);
        }
        Phase::Departing => {
            coord.release_one(id, Runway);
            coord.release_one(id, TowerSlot);
            coord.release_one(id, Gate);
        }
        _ => {}
    }
    Ok(())
}

/// Service time, trimmed short on shutdown so the supervisor's grace stays
/// bounded. Releases still run afterwards, keeping the books balanced; the
/// next acquisition observes the flag and crashes the flight out.
async fn service_sleep(coord: &Coordinator, duration: Duration) {
    tokio::select! {
        _ = coord.shutdown.cancelled() => {}
        _ = sleep(duration) => {}
    }
}

fn lifetime_secs(coord: &Coordinator, id: u64) -> u64 {
    coord.fleet.born_at(id).map(|born| born.elapsed().as_secs()).unwrap_or_default()
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
