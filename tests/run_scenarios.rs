//! End-to-end checks of the gameplay core through its public API.
//!
//! No Bevy app is built here: the core is driven directly with pointer input,
//! overlap reports and fixed ticks, against an in-memory progression store.
//!
//! Covered:
//! 1. Launch math for a diagonal drag, and power clamping.
//! 2. Enemy bounce and single-use rewards.
//! 3. Upgrade purchases: exact price, max level, insufficient funds.
//! 4. Corrupt or partial persisted data.
//! 5. A full run from drag to landing, merged into progression.

use std::time::Duration;

use bevy::math::Vec2;
use luchador_launch::collision::{resolve_overlap, ResolveContext, Resolution};
use luchador_launch::config::TuningConfig;
use luchador_launch::error::GameError;
use luchador_launch::flight::{FlightParams, FlightState, FlightStep};
use luchador_launch::launch::compute_launch_velocity;
use luchador_launch::level::{BodyRef, Enemy, EnemyKind, Level};
use luchador_launch::progression::{MemoryStorage, ProgressionRecord, ProgressionStore};
use luchador_launch::run::{RunController, RunEnd, RunPhase};
use luchador_launch::constants::MAX_UPGRADE_LEVEL as MAX_LEVEL;
use luchador_launch::upgrades::{self, UpgradeCategory};
use rand::rngs::StdRng;
use rand::SeedableRng;

const TICK: Duration = Duration::from_millis(16);

fn store_from_json(json: &str) -> (ProgressionStore, MemoryStorage) {
    let storage = MemoryStorage::with_blob(json.as_bytes().to_vec());
    (ProgressionStore::open(storage.clone()), storage)
}

// ── Launch ────────────────────────────────────────────────────────────────────

#[test]
fn diagonal_drag_gives_equal_speed_on_both_axes() {
    let config = TuningConfig::default();
    let solution =
        compute_launch_velocity(Vec2::new(150.0, 400.0), Vec2::new(50.0, 500.0), 1, &config);

    assert!((solution.base_power - 2121.3).abs() < 0.1);
    assert!((solution.velocity.x - 1500.0).abs() < 0.5);
    assert!((solution.velocity.x + solution.velocity.y).abs() < 1e-2);
}

#[test]
fn base_power_stays_within_bounds_for_any_drag() {
    let config = TuningConfig::default();
    for step in 0..200 {
        let length = step as f32 * 7.3;
        let solution =
            compute_launch_velocity(Vec2::new(length, length * 0.5), Vec2::ZERO, 3, &config);
        assert!(solution.base_power >= 1000.0 && solution.base_power <= 4000.0);
    }
}

// ── Collision ─────────────────────────────────────────────────────────────────

#[test]
fn falling_onto_regular_enemy_bounces_by_both_multipliers() {
    let config = TuningConfig::default();
    let mut level = Level {
        enemies: vec![Enemy::new(EnemyKind::Regular, Vec2::new(800.0, 300.0), &config)],
        ..Level::default()
    };
    let mut character = FlightState::new(Vec2::new(800.0, 300.0), Vec2::new(-250.0, 400.0));
    let ctx = ResolveContext {
        bounce_multiplier: upgrades::multiplier(UpgradeCategory::Bounce, 1),
        unlocked_level: 1,
    };
    let mut rng = StdRng::seed_from_u64(0);

    let first = resolve_overlap(BodyRef::Enemy(0), &mut level, &mut character, ctx, &mut rng, &config);
    let second = resolve_overlap(BodyRef::Enemy(0), &mut level, &mut character, ctx, &mut rng, &config);

    assert_eq!(first.reward(), 5);
    assert!((character.velocity.y + 256.0).abs() < 1e-3);
    assert_eq!(character.velocity.x, 250.0);
    assert_eq!(second, Resolution::Ignored);
}

// ── Purchases ─────────────────────────────────────────────────────────────────

#[test]
fn power_purchase_at_level_three_costs_one_hundred() {
    let (mut store, storage) = store_from_json(
        r#"{"currency":100,"maxDistance":0,"level":1,
            "upgrades":{"power":3,"bounce":1,"stompPower":1,"stompCooldown":1}}"#,
    );

    let spent = store
        .apply_upgrade_purchase(UpgradeCategory::Power)
        .expect("exact funds must be enough");

    assert_eq!(spent, 100);
    assert_eq!(store.record().currency, 0);
    assert_eq!(store.upgrades().power, 4);
    assert_eq!(storage.write_count(), 1);
}

#[test]
fn max_level_purchase_is_rejected_untouched() {
    let (mut store, storage) = store_from_json(
        r#"{"currency":999999,"maxDistance":10,"level":2,
            "upgrades":{"power":10,"bounce":1,"stompPower":1,"stompCooldown":1}}"#,
    );
    let before = *store.record();

    let err = store
        .apply_upgrade_purchase(UpgradeCategory::Power)
        .expect_err("max level must be rejected");

    assert!(matches!(err, GameError::MaxLevel { .. }));
    assert_eq!(*store.record(), before);
    assert_eq!(storage.write_count(), 0);
    assert_eq!(upgrades::cost_for_next_level(MAX_LEVEL), None);
}

#[test]
fn purchase_either_fully_applies_or_not_at_all() {
    let (mut store, _) = store_from_json(r#"{"currency":45}"#);

    for category in UpgradeCategory::ALL {
        let before = *store.record();
        let level = store.upgrades().get(category);
        match store.apply_upgrade_purchase(category) {
            Ok(spent) => {
                assert_eq!(spent, upgrades::cost(level));
                assert_eq!(store.record().currency, before.currency - spent);
                assert_eq!(store.upgrades().get(category), level + 1);
            }
            Err(err) => {
                assert_eq!(err.player_message(), "Not enough hearts!");
                assert_eq!(*store.record(), before);
            }
        }
    }
    // 45 hearts buy two level-1 upgrades at 20 each.
    assert_eq!(store.record().currency, 5);
}

#[test]
fn upgrade_prices_strictly_increase() {
    for level in 1..MAX_LEVEL {
        assert!(upgrades::cost(level) < upgrades::cost(level + 1));
    }
}

// ── Persistence ───────────────────────────────────────────────────────────────

#[test]
fn corrupted_blob_falls_back_to_defaults() {
    for blob in ["{not json", "[1,2,3]", r#"{"currency":"lots"}"#, ""] {
        let (store, _) = store_from_json(blob);
        assert_eq!(*store.record(), ProgressionRecord::default(), "blob {blob:?}");
    }
}

#[test]
fn partial_blob_keeps_what_it_has() {
    let (store, _) = store_from_json(r#"{"currency":12,"upgrades":{"bounce":4}}"#);
    assert_eq!(store.record().currency, 12);
    assert_eq!(store.record().unlocked_level, 1);
    assert_eq!(store.upgrades().bounce, 4);
    assert_eq!(store.upgrades().power, 1);
}

// ── Full run ──────────────────────────────────────────────────────────────────

#[test]
fn resting_flight_stops_in_one_tick() {
    let config = TuningConfig::default();
    let mut state = FlightState {
        position: Vec2::new(300.0, config.ground_y),
        velocity: Vec2::ZERO,
        on_ground: true,
    };
    let params = FlightParams {
        gravity: config.launch_gravity,
        ground_bounce: 0.8,
    };
    assert_eq!(state.step(TICK.as_secs_f32(), &params, &config), FlightStep::Stopped);
}

#[test]
fn full_run_lands_and_merges_into_progression() {
    // Heavier gravity than the default glide so the run lands quickly.
    let config = TuningConfig {
        launch_gravity: 1200.0,
        ..TuningConfig::default()
    };
    let (mut store, storage) = store_from_json("");
    let mut run = RunController::with_level(config, Level::default(), StdRng::seed_from_u64(9));

    let anchor = run.state().anchor;
    let release = anchor + Vec2::new(-100.0, 100.0);
    run.on_pointer_down(anchor);
    run.on_pointer_move(release);
    run.on_pointer_up(release);

    let mut ticks = 0;
    while run.phase() != RunPhase::Ended {
        run.on_tick(TICK, &mut store);
        ticks += 1;
        assert!(ticks < 20_000, "run never ended");
    }

    assert_eq!(run.state().end, Some(RunEnd::Stopped));
    assert!(run.state().best_distance > 0);
    assert_eq!(store.record().best_distance, run.state().best_distance);
    assert!(storage.write_count() >= 1);

    // Ended is terminal: more ticks change nothing.
    let frozen = run.state().clone();
    run.on_stomp_input();
    run.on_tick(TICK, &mut store);
    assert_eq!(*run.state(), frozen);
}

/// Launch with the shipped tuning and count ticks until the run ends.
fn ticks_to_land_with_default_tuning(upgrades_json: &str) -> usize {
    let (mut store, _) = store_from_json(upgrades_json);
    let mut run = RunController::with_level(
        TuningConfig::default(),
        Level::default(),
        StdRng::seed_from_u64(4),
    );

    let anchor = run.state().anchor;
    let release = anchor + Vec2::new(-100.0, 100.0);
    run.on_pointer_down(anchor);
    run.on_pointer_move(release);
    run.on_pointer_up(release);

    let mut ticks = 0;
    while run.phase() != RunPhase::Ended {
        run.on_tick(TICK, &mut store);
        ticks += 1;
        // About 93k ticks (25 minutes of glide) at default tuning.
        assert!(ticks < 150_000, "run never ended after {ticks} ticks");
    }
    assert_eq!(run.state().end, Some(RunEnd::Stopped));
    assert_eq!(store.record().best_distance, run.state().best_distance);
    ticks
}

#[test]
fn default_tuning_flight_ends_at_base_bounce() {
    let ticks = ticks_to_land_with_default_tuning("");
    assert!(ticks > 1_000);
}

#[test]
fn default_tuning_flight_ends_at_max_bounce() {
    ticks_to_land_with_default_tuning(r#"{"upgrades":{"bounce":10}}"#);
}

#[test]
fn write_failures_do_not_stop_the_game() {
    let config = TuningConfig {
        launch_gravity: 1200.0,
        ..TuningConfig::default()
    };
    let storage = MemoryStorage::default();
    storage.set_fail_writes(true);
    let mut store = ProgressionStore::open(storage.clone());
    let mut run = RunController::with_level(config, Level::default(), StdRng::seed_from_u64(2));

    let anchor = run.state().anchor;
    run.on_pointer_down(anchor);
    run.on_pointer_up(anchor + Vec2::new(-80.0, 60.0));
    for _ in 0..20_000 {
        if run.phase() == RunPhase::Ended {
            break;
        }
        run.on_tick(TICK, &mut store);
    }

    assert_eq!(run.phase(), RunPhase::Ended);
    assert!(store.record().best_distance > 0);
    assert_eq!(storage.blob(), None);

    storage.set_fail_writes(false);
    store.save().expect("writes are back");
    assert!(storage.blob().is_some());
}
