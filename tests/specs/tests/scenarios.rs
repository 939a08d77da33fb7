// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios on a paused clock: happy path, starvation,
//! deadlock resolution, release priority, aging preemption, and shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use aeroporto::aging::spawn_aging;
use aeroporto::config::Config;
use aeroporto::coordinator::AcquireOutcome;
use aeroporto::detector::spawn_detector;
use aeroporto::fleet::{FlightClass, Phase};
use aeroporto::resource::ResourceKind;
use aeroporto::run::run_with_shutdown;

use aeroporto_specs::{assert_quiescent, coordinator, spawn_flight};

const SHORT: Duration = Duration::from_secs(6);
const LONG: Duration = Duration::from_secs(60);

#[tokio::test(start_paused = true)]
async fn solo_happy_path() {
    let coord = coordinator(3, 5, 2);
    let detector = spawn_detector(Arc::clone(&coord));

    let flight = spawn_flight(&coord, 0, FlightClass::International);

    // Sample the phase as the flight progresses.
    let mut observed = Vec::new();
    loop {
        let phase = coord.fleet.phase(0).unwrap();
        if observed.last() != Some(&phase) {
            observed.push(phase);
        }
        if phase.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    flight.await.unwrap();

    assert_eq!(
        observed,
        [Phase::Landing, Phase::Deplaning, Phase::Departing, Phase::Succeeded]
    );

    let stats = coord.stats.snapshot();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.crashed, 0);
    assert_eq!(stats.active, 0);
    assert_eq!(stats.international, 1);
    assert_eq!(stats.deadlocks_detected, 0);
    assert_eq!(coord.registry.waiter_count(), 0);
    for kind in ResourceKind::ALL {
        assert_eq!(coord.registry.holder_count(kind), 0);
    }
    assert_quiescent(&coord);

    coord.shutdown.cancel();
    detector.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn forced_starvation_is_accounted_not_hung() {
    let coord = coordinator(1, 1, 1);
    let detector = spawn_detector(Arc::clone(&coord));
    let aging = spawn_aging(Arc::clone(&coord));

    let mut flights = Vec::new();
    for id in 0..20u64 {
        let class =
            if id % 2 == 0 { FlightClass::Domestic } else { FlightClass::International };
        flights.push(spawn_flight(&coord, id, class));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let joined = tokio::time::timeout(Duration::from_secs(1800), async {
        for flight in flights {
            flight.await.unwrap();
        }
    })
    .await;
    assert!(joined.is_ok(), "every flight must terminate");

    let stats = coord.stats.snapshot();
    assert!(stats.starvation_cases >= 1, "contention this heavy must starve someone");
    assert_eq!(stats.active, 0);
    for (_, record) in coord.fleet.all() {
        assert!(record.phase.is_terminal());
    }
    assert_quiescent(&coord);

    coord.shutdown.cancel();
    detector.await.unwrap();
    aging.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn injected_cycle_is_detected_and_resolved() {
    let coord = coordinator(1, 1, 1);

    coord.fleet.register(1, FlightClass::International);
    tokio::time::sleep(Duration::from_millis(10)).await;
    coord.fleet.register(2, FlightClass::Domestic);

    // International: runway then tower. Domestic: tower then runway.
    let intl = {
        let coord = Arc::clone(&coord);
        tokio::spawn(async move {
            let first = coord
                .acquire_one(ResourceKind::Runway, LONG, FlightClass::International, 1)
                .await;
            assert_eq!(first, AcquireOutcome::Acquired);
            tokio::time::sleep(Duration::from_millis(200)).await;
            coord.acquire_one(ResourceKind::TowerSlot, LONG, FlightClass::International, 1).await
        })
    };
    let dom = {
        let coord = Arc::clone(&coord);
        tokio::spawn(async move {
            let first =
                coord.acquire_one(ResourceKind::TowerSlot, LONG, FlightClass::Domestic, 2).await;
            assert_eq!(first, AcquireOutcome::Acquired);
            tokio::time::sleep(Duration::from_millis(200)).await;
            coord.acquire_one(ResourceKind::Runway, LONG, FlightClass::Domestic, 2).await
        })
    };

    // Let the cycle form, then turn the detector loose.
    tokio::time::sleep(Duration::from_secs(1)).await;
    let detector = spawn_detector(Arc::clone(&coord));

    // The survivor's blocked acquisition completes once the victim is
    // stripped.
    let outcome = tokio::time::timeout(Duration::from_secs(10), intl).await;
    assert_eq!(outcome.unwrap().unwrap(), AcquireOutcome::Acquired);

    let stats = coord.stats.snapshot();
    assert!(stats.deadlocks_detected >= 1);
    assert!(stats.deadlocks_resolved >= 1);
    assert!(stats.preemptions >= 1);

    // The younger, domestic party was the victim: reset and stripped.
    assert_eq!(coord.fleet.phase(2), Some(Phase::Landing));
    assert!(!coord.registry.holds_any(2));

    // Freeing the survivor's units lets the victim's own wait finish.
    coord.release_one(1, ResourceKind::Runway);
    coord.release_one(1, ResourceKind::TowerSlot);
    let dom_outcome = tokio::time::timeout(Duration::from_secs(10), dom).await;
    assert_eq!(dom_outcome.unwrap().unwrap(), AcquireOutcome::Acquired);

    coord.release_one(2, ResourceKind::Runway);
    assert_quiescent(&coord);

    coord.shutdown.cancel();
    detector.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn release_hands_the_unit_to_the_international_first() {
    let coord = coordinator(1, 1, 1);
    for (id, class) in [
        (1, FlightClass::International),
        (2, FlightClass::Domestic),
        (3, FlightClass::Domestic),
        (4, FlightClass::International),
    ] {
        coord.fleet.register(id, class);
    }

    let held =
        coord.acquire_one(ResourceKind::TowerSlot, SHORT, FlightClass::International, 1).await;
    assert_eq!(held, AcquireOutcome::Acquired);

    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let waiter = |id: u64, class: FlightClass| {
        let coord = Arc::clone(&coord);
        let order = Arc::clone(&order);
        tokio::spawn(async move {
            let outcome = coord.acquire_one(ResourceKind::TowerSlot, LONG, class, id).await;
            assert_eq!(outcome, AcquireOutcome::Acquired);
            order.lock().push(id);
            tokio::time::sleep(Duration::from_millis(500)).await;
            coord.release_one(id, ResourceKind::TowerSlot);
        })
    };

    // Two domestics queue up first; the late international still wins.
    let w2 = waiter(2, FlightClass::Domestic);
    tokio::time::sleep(Duration::from_millis(300)).await;
    let w3 = waiter(3, FlightClass::Domestic);
    tokio::time::sleep(Duration::from_millis(300)).await;
    let w4 = waiter(4, FlightClass::International);
    tokio::time::sleep(Duration::from_millis(300)).await;

    coord.release_one(1, ResourceKind::TowerSlot);

    for handle in [w2, w3, w4] {
        tokio::time::timeout(Duration::from_secs(30), handle).await.unwrap().unwrap();
    }

    let order = order.lock();
    assert_eq!(order[0], 4, "the international must be served first");
    let mut rest = [order[1], order[2]];
    rest.sort_unstable();
    assert_eq!(rest, [2, 3]);
    assert_quiescent(&coord);
}

#[tokio::test(start_paused = true)]
async fn aging_preempts_a_tower_hog_for_a_critical_domestic() {
    let coord = coordinator(3, 5, 1);

    // An international parks on the single tower slot and never leaves.
    coord.fleet.register(100, FlightClass::International);
    let held =
        coord.acquire_one(ResourceKind::TowerSlot, SHORT, FlightClass::International, 100).await;
    assert_eq!(held, AcquireOutcome::Acquired);
    let born_before = coord.fleet.born_at(100).unwrap();

    let aging = spawn_aging(Arc::clone(&coord));
    let dom = spawn_flight(&coord, 1, FlightClass::Domestic);

    let outcome = tokio::time::timeout(Duration::from_secs(300), dom).await;
    assert!(outcome.is_ok(), "the domestic must get unstuck");

    let stats = coord.stats.snapshot();
    assert!(stats.preemptions >= 1);
    assert!(stats.critical_alerts >= 1);
    assert_eq!(coord.fleet.phase(1), Some(Phase::Succeeded));

    // The hog was reset with a fresh deadline and no holdings.
    assert_eq!(coord.fleet.phase(100), Some(Phase::Landing));
    assert!(coord.fleet.born_at(100).unwrap() > born_before);
    assert!(!coord.registry.holds_any(100));
    assert_quiescent(&coord);

    coord.shutdown.cancel();
    aging.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_terminates_everything_within_grace() {
    let shutdown = CancellationToken::new();
    let config = Config {
        runways: 1,
        gates: 1,
        tower_slots: 1,
        window_secs: 120,
        interval: Some(vec![100, 200]),
        ..Config::default()
    };

    let driver = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { run_with_shutdown(config, shutdown).await })
    };

    tokio::time::sleep(Duration::from_secs(30)).await;
    shutdown.cancel();

    // Agents, background tasks, and the supervisor all wind down inside
    // the grace period.
    let finished = tokio::time::timeout(Duration::from_secs(5), driver).await;
    let (coord, report) = finished.unwrap().unwrap();

    let stats = coord.stats.snapshot();
    assert_eq!(stats.active, 0);
    assert_eq!(stats.total, stats.succeeded + stats.crashed);
    for (_, record) in coord.fleet.all() {
        assert!(record.phase.is_terminal());
    }
    assert_quiescent(&coord);
    assert!(report.contains("FINAL REPORT"));
}
