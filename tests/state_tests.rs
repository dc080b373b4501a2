//! Headless tests for how a finished run hands over to the upgrade shop.
//!
//! Only [`MinimalPlugins`] and the states plugin are used: no window, no
//! rendering, no physics. The run is driven through the core's public API,
//! then `run_end_system` decides when [`GameState`] moves to `Shop`.
//!
//! Covered:
//! 1. Breaking a gate opens the shop on the next frame.
//! 2. A run that stopped on its own waits out the result delay first.
//! 3. A run still in flight keeps the game in `Playing`.

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use luchador_launch::config::TuningConfig;
use luchador_launch::host::shop::{run_end_system, RunEndDelay};
use luchador_launch::host::{ActiveRun, GameState};
use luchador_launch::level::{BodyRef, Level};
use luchador_launch::progression::{MemoryStorage, ProgressionStore};
use luchador_launch::run::{RunController, RunEnd, RunPhase};
use rand::rngs::StdRng;
use rand::SeedableRng;

const TICK: Duration = Duration::from_millis(16);

// ── Helpers ───────────────────────────────────────────────────────────────────

fn launch(run: &mut RunController, store: &mut ProgressionStore) {
    let anchor = run.state().anchor;
    let release = anchor + Vec2::new(-100.0, 100.0);
    run.on_pointer_down(anchor);
    run.on_pointer_move(release);
    run.on_pointer_up(release);
    run.on_tick(TICK, store);
    assert_eq!(run.phase(), RunPhase::Launched);
}

fn gate_unlocked_run() -> RunController {
    let config = TuningConfig::default();
    let level = Level {
        gates: Level::gates_from(&config),
        ..Level::default()
    };
    let mut store = ProgressionStore::open(MemoryStorage::default());
    let mut run = RunController::with_level(config, level, StdRng::seed_from_u64(11));
    launch(&mut run, &mut store);

    run.on_overlap(BodyRef::Gate(0));
    run.on_tick(TICK, &mut store);
    assert_eq!(run.state().end, Some(RunEnd::GateUnlocked));
    run
}

fn landed_run() -> RunController {
    let config = TuningConfig {
        launch_gravity: 1200.0,
        ..TuningConfig::default()
    };
    let mut store = ProgressionStore::open(MemoryStorage::default());
    let mut run = RunController::with_level(config, Level::default(), StdRng::seed_from_u64(12));
    launch(&mut run, &mut store);

    for _ in 0..20_000 {
        if run.phase() == RunPhase::Ended {
            break;
        }
        run.on_tick(TICK, &mut store);
    }
    assert_eq!(run.state().end, Some(RunEnd::Stopped));
    run
}

fn app_with_run(run: RunController) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.init_state::<GameState>();
    app.insert_resource(TuningConfig::default());
    app.insert_resource(ActiveRun(run));
    app.init_resource::<RunEndDelay>();
    app.add_systems(Update, run_end_system);
    app
}

fn current(app: &App) -> GameState {
    app.world().resource::<State<GameState>>().get().clone()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn gate_unlock_opens_the_shop_at_once() {
    let mut app = app_with_run(gate_unlocked_run());

    app.update(); // run_end_system requests Shop
    app.update(); // StateTransition applies it

    assert_eq!(current(&app), GameState::Shop);
    assert!(app.world().resource::<RunEndDelay>().0.is_none());
}

#[test]
fn landed_run_waits_before_the_shop() {
    let mut app = app_with_run(landed_run());

    app.update();
    app.update();

    // Frame deltas in a headless app are far below the three-second delay.
    assert_eq!(current(&app), GameState::Playing);
    assert!(app.world().resource::<RunEndDelay>().0.is_some());
}

#[test]
fn run_in_flight_keeps_playing() {
    let mut store = ProgressionStore::open(MemoryStorage::default());
    let mut run = RunController::with_level(
        TuningConfig::default(),
        Level::default(),
        StdRng::seed_from_u64(13),
    );
    launch(&mut run, &mut store);
    let mut app = app_with_run(run);

    app.update();
    app.update();

    assert_eq!(current(&app), GameState::Playing);
    assert!(app.world().resource::<RunEndDelay>().0.is_none());
}
