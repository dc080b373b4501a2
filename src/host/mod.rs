//! Bevy scene host for the gameplay core.
//!
//! The core ([`crate::run::RunController`] and friends) knows nothing about
//! Bevy. This module wires it into an app:
//!
//! | Module | Concern |
//! |--------|---------|
//! | [`input`] | mouse / keyboard → `on_pointer_*`, `on_stomp_input`, restart |
//! | [`physics`] | Rapier sensors as the broad phase → `on_overlap` |
//! | [`rendering`] | camera, gizmos, HUD text |
//! | [`shop`] | run end → shop → next run |
//!
//! ## Frame order (`Update`, while `Playing`)
//!
//! input → [`tick_run_system`] → level/character sync → run-end check.
//! Overlaps are collected in `PostUpdate` after Rapier has stepped, so they
//! are applied at the start of the following tick.
//!
//! Core coordinates are screen-like (+y down); Bevy is +y up, so every
//! crossing negates y via [`to_world`] / [`to_core`].

pub mod input;
pub mod physics;
pub mod rendering;
pub mod shop;

use bevy::prelude::*;
use bevy_rapier2d::prelude::PhysicsSet;

use crate::config::TuningConfig;
use crate::effects::Effect;
use crate::progression::{FileStorage, ProgressionStore};
use crate::run::RunController;

/// Top-level application state machine.
#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// A run is in progress (aiming, flying, or just ended).
    #[default]
    Playing,
    /// Between runs: upgrades can be bought.
    Shop,
}

/// The current run, owned by the ECS world.
#[derive(Resource)]
pub struct ActiveRun(pub RunController);

/// A presentation cue emitted by the core this frame.
#[derive(Message, Debug, Clone)]
pub struct GameEffect(pub Effect);

/// Core position → Bevy world position.
#[inline]
pub fn to_world(core: Vec2) -> Vec2 {
    Vec2::new(core.x, -core.y)
}

/// Bevy world position → core position.
#[inline]
pub fn to_core(world: Vec2) -> Vec2 {
    Vec2::new(world.x, -world.y)
}

pub struct LaunchGamePlugin;

impl Plugin for LaunchGamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_message::<GameEffect>()
            .init_resource::<shop::RunEndDelay>()
            .init_resource::<shop::ShopMessage>()
            .init_resource::<physics::SpawnedLevel>()
            .init_resource::<rendering::EffectToast>()
            .add_systems(
                Startup,
                (
                    setup_session,
                    rendering::setup_camera,
                    rendering::setup_hud,
                    physics::spawn_character,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    input::pointer_input_system,
                    input::keyboard_input_system,
                    tick_run_system,
                    physics::respawn_level_system,
                    physics::sync_level_bodies_system,
                    physics::sync_character_system,
                    shop::run_end_system,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (
                    rendering::effect_feedback_system,
                    rendering::hud_system,
                    rendering::gizmo_system,
                    rendering::camera_follow_system,
                )
                    .chain()
                    .after(tick_run_system),
            )
            .add_systems(
                PostUpdate,
                physics::overlap_event_system
                    .after(PhysicsSet::Writeback)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnEnter(GameState::Shop), shop::setup_shop)
            .add_systems(OnExit(GameState::Shop), shop::cleanup_shop)
            .add_systems(
                Update,
                (shop::shop_input_system, shop::shop_text_system)
                    .chain()
                    .run_if(in_state(GameState::Shop)),
            )
            .add_systems(Last, save_on_exit_system);
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Create the run and, unless one was provided, the file-backed progression store.
///
/// Runs after the tuning config has been loaded so both see the final values.
pub fn setup_session(
    mut commands: Commands,
    config: Res<TuningConfig>,
    store: Option<Res<ProgressionStore>>,
) {
    if store.is_none() {
        info!("Progression file: {}", config.progression_path);
        commands.insert_resource(ProgressionStore::open(FileStorage::new(
            config.progression_path.clone(),
        )));
    }
    commands.insert_resource(ActiveRun(RunController::new(config.clone())));
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Drive one core tick per frame and forward its cues as [`GameEffect`]s.
pub fn tick_run_system(
    time: Res<Time>,
    mut run: ResMut<ActiveRun>,
    mut store: ResMut<ProgressionStore>,
    mut effects: MessageWriter<GameEffect>,
) {
    run.0.on_tick(time.delta(), &mut store);
    forward_effects(&mut run.0, &mut effects);
}

pub fn forward_effects(run: &mut RunController, effects: &mut MessageWriter<GameEffect>) {
    for effect in run.drain_effects() {
        effects.write(GameEffect(effect));
    }
}

// ── Last ──────────────────────────────────────────────────────────────────────

/// Final save when the app is shutting down.
fn save_on_exit_system(mut exit: MessageReader<AppExit>, store: Option<ResMut<ProgressionStore>>) {
    if exit.read().next().is_none() {
        return;
    }
    let Some(mut store) = store else {
        return;
    };
    match store.save() {
        Ok(()) => info!("Progression saved on exit"),
        Err(err) => error!("Final progression save failed: {err}"),
    }
}
