// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level supervisor: arrival generation, drain, shutdown, and joins.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::agent;
use crate::aging::spawn_aging;
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::detector::spawn_detector;
use crate::fleet::FlightClass;
use crate::monitor::spawn_monitor;
use crate::report;

/// Hard cap on spawned aircraft, regardless of window length.
pub const MAX_AIRCRAFT: u64 = 1000;

/// How often the supervisor re-checks for active flights after the
/// arrival window closes.
pub const DRAIN_POLL: Duration = Duration::from_secs(2);

/// Run one simulation to completion and print the final report.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());
    let (_coord, report) = run_with_shutdown(config, shutdown).await;
    println!("{report}");
    Ok(())
}

/// Simulation body with an externally-owned shutdown token. Returns the
/// coordinator (for inspection) and the rendered report.
pub async fn run_with_shutdown(
    config: Config,
    shutdown: CancellationToken,
) -> (Arc<Coordinator>, String) {
    let coord = Arc::new(Coordinator::new(
        config.runways,
        config.gates,
        config.tower_slots,
        shutdown.clone(),
    ));

    let started = Instant::now();
    let window = config.window();
    let background = [
        spawn_monitor(Arc::clone(&coord), started, window),
        spawn_detector(Arc::clone(&coord)),
        spawn_aging(Arc::clone(&coord)),
    ];

    info!(
        runways = config.runways,
        gates = config.gates,
        tower_slots = config.tower_slots,
        window_secs = config.window_secs,
        "simulation started"
    );

    let (gap_min, gap_max) = config.arrival_interval_ms();
    let mut agents: Vec<JoinHandle<()>> = Vec::new();
    let mut next_id: u64 = 0;

    while !shutdown.is_cancelled() && started.elapsed() < window && next_id < MAX_AIRCRAFT {
        let id = next_id;
        next_id += 1;
        let class = if rand::rng().random_bool(0.5) {
            FlightClass::Domestic
        } else {
            FlightClass::International
        };
        coord.fleet.register(id, class);
        coord.stats.record_spawn(class);
        agents.push(tokio::spawn(agent::fly(Arc::clone(&coord), id, class)));

        let gap = Duration::from_millis(rand::rng().random_range(gap_min..=gap_max));
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = sleep(gap) => {}
        }
    }

    info!(spawned = next_id, "arrival window closed; waiting for active flights");
    while !shutdown.is_cancelled() {
        if coord.stats.snapshot().active == 0 {
            info!("all flights have terminated");
            break;
        }
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = sleep(DRAIN_POLL) => {}
        }
    }

    // Stop the background tasks and wake anything still blocked in a pool
    // so it can observe the flag.
    shutdown.cancel();
    coord.broadcast_pools();

    for handle in agents {
        let _ = handle.await;
    }
    for handle in background {
        let _ = handle.await;
    }

    let rendered = report::render(&config, &coord.stats.snapshot(), &coord.fleet.all());
    (coord, rendered)
}

/// First SIGINT/SIGTERM asks for a graceful shutdown; a second one forces
/// the process out.
fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM");
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT");
            }
        }
        shutdown.cancel();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM again, forcing exit");
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT again, forcing exit");
            }
        }
        std::process::exit(130);
    });
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
