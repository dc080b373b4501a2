use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;

use luchador_launch::config::{TuningConfig, TUNING_CONFIG_PATH};
use luchador_launch::host::LaunchGamePlugin;

/// Rapier only reports sensor overlaps here; it must not pull anything down.
fn setup_physics_config(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::ZERO;
    }
}

fn main() {
    // Loaded before the app is built: the window size comes from it.
    let config = TuningConfig::load_or_default(TUNING_CONFIG_PATH);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Luchador Launch".into(),
                resolution: WindowResolution::new(config.window_width, config.window_height),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.35, 0.6, 0.9)))
        .insert_resource(config)
        // pixels_per_meter(1.0) keeps collider sizes in the same units as the
        // gameplay core.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins(LaunchGamePlugin)
        .add_systems(Startup, setup_physics_config)
        .run();
}
