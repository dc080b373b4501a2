//! Runtime tuning configuration loaded from `assets/tuning.toml`.
//!
//! [`TuningConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`]. Before the app is built, `main` calls
//! [`TuningConfig::load_or_default`], which reads `assets/tuning.toml` and
//! overwrites the defaults with any values present in the file. Missing keys
//! keep their compile-time defaults, so a minimal TOML can override just the
//! constants you care about.
//!
//! The gameplay core never reads the constants directly: every component takes
//! a `&TuningConfig`, which keeps tests free to vary them.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `TuningConfig::default()`.

use crate::constants::*;
use bevy::prelude::*;
use serde::Deserialize;

pub const TUNING_CONFIG_PATH: &str = "assets/tuning.toml";

/// Runtime-tunable launch, flight and level configuration.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    // ── Progression ──────────────────────────────────────────────────────────
    pub progression_path: String,

    // ── Launch ───────────────────────────────────────────────────────────────
    pub power_scale: f32,
    pub min_power: f32,
    pub max_power: f32,
    pub downward_launch_damp: f32,
    pub min_drag_distance_sq: f32,
    pub aim_grab_radius: f32,
    pub aim_pull_ratio: f32,
    pub max_pull_distance: f32,

    // ── Flight ───────────────────────────────────────────────────────────────
    pub pre_launch_gravity: f32,
    pub launch_gravity: f32,
    pub momentum_boost: f32,
    pub momentum_boost_ceiling: f32,
    pub fall_damp_threshold: f32,
    pub fall_damp: f32,
    pub air_drag: f32,
    pub stop_speed: f32,
    pub ground_y: f32,
    pub ground_rest_speed: f32,
    pub max_ground_bounce: f32,
    pub ground_friction: f32,
    pub start_x: f32,
    pub start_y: f32,
    pub units_per_metre: f32,

    // ── Collision ────────────────────────────────────────────────────────────
    pub enemy_restitution: f32,
    pub gate_bounce_back: f32,
    pub reward_regular: u32,
    pub reward_bouncy: u32,
    pub reward_special: u32,
    pub reward_collectible: u32,

    // ── Power-ups ────────────────────────────────────────────────────────────
    pub speed_boost_factor: f32,
    pub super_bounce_velocity: f32,
    pub magnet_duration_ms: u64,
    pub magnet_interval_ms: u64,
    pub magnet_radius: f32,
    pub magnet_step: f32,

    // ── Stomp ────────────────────────────────────────────────────────────────
    pub stomp_base_impulse: f32,
    pub stomp_forward_boost: f32,
    pub stomp_base_cooldown_ms: u64,

    // ── Level layout ─────────────────────────────────────────────────────────
    /// Fixed seed for level generation and power-up rolls; `None` rolls a new
    /// seed every run.
    pub level_seed: Option<u64>,
    pub enemy_count: usize,
    pub collectible_count: usize,
    pub spawn_min_x: f32,
    pub spawn_max_x: f32,
    pub enemy_min_y: f32,
    pub enemy_max_y: f32,
    pub collectible_min_y: f32,
    pub collectible_max_y: f32,
    pub gate_positions: Vec<f32>,

    // ── Host ─────────────────────────────────────────────────────────────────
    pub window_width: u32,
    pub window_height: u32,
    pub run_end_shop_delay_secs: f32,
    pub camera_lead: f32,
    pub hud_font_size: f32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            progression_path: PROGRESSION_PATH.to_string(),
            // Launch
            power_scale: POWER_SCALE,
            min_power: MIN_POWER,
            max_power: MAX_POWER,
            downward_launch_damp: DOWNWARD_LAUNCH_DAMP,
            min_drag_distance_sq: MIN_DRAG_DISTANCE_SQ,
            aim_grab_radius: AIM_GRAB_RADIUS,
            aim_pull_ratio: AIM_PULL_RATIO,
            max_pull_distance: MAX_PULL_DISTANCE,
            // Flight
            pre_launch_gravity: PRE_LAUNCH_GRAVITY,
            launch_gravity: LAUNCH_GRAVITY,
            momentum_boost: MOMENTUM_BOOST,
            momentum_boost_ceiling: MOMENTUM_BOOST_CEILING,
            fall_damp_threshold: FALL_DAMP_THRESHOLD,
            fall_damp: FALL_DAMP,
            air_drag: AIR_DRAG,
            stop_speed: STOP_SPEED,
            ground_y: GROUND_Y,
            ground_rest_speed: GROUND_REST_SPEED,
            max_ground_bounce: MAX_GROUND_BOUNCE,
            ground_friction: GROUND_FRICTION,
            start_x: START_X,
            start_y: START_Y,
            units_per_metre: UNITS_PER_METRE,
            // Collision
            enemy_restitution: ENEMY_RESTITUTION,
            gate_bounce_back: GATE_BOUNCE_BACK,
            reward_regular: REWARD_REGULAR,
            reward_bouncy: REWARD_BOUNCY,
            reward_special: REWARD_SPECIAL,
            reward_collectible: REWARD_COLLECTIBLE,
            // Power-ups
            speed_boost_factor: SPEED_BOOST_FACTOR,
            super_bounce_velocity: SUPER_BOUNCE_VELOCITY,
            magnet_duration_ms: MAGNET_DURATION_MS,
            magnet_interval_ms: MAGNET_INTERVAL_MS,
            magnet_radius: MAGNET_RADIUS,
            magnet_step: MAGNET_STEP,
            // Stomp
            stomp_base_impulse: STOMP_BASE_IMPULSE,
            stomp_forward_boost: STOMP_FORWARD_BOOST,
            stomp_base_cooldown_ms: STOMP_BASE_COOLDOWN_MS,
            // Level layout
            level_seed: None,
            enemy_count: ENEMY_COUNT,
            collectible_count: COLLECTIBLE_COUNT,
            spawn_min_x: SPAWN_MIN_X,
            spawn_max_x: SPAWN_MAX_X,
            enemy_min_y: ENEMY_MIN_Y,
            enemy_max_y: ENEMY_MAX_Y,
            collectible_min_y: COLLECTIBLE_MIN_Y,
            collectible_max_y: COLLECTIBLE_MAX_Y,
            gate_positions: GATE_POSITIONS.to_vec(),
            // Host
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            run_end_shop_delay_secs: RUN_END_SHOP_DELAY_SECS,
            camera_lead: CAMERA_LEAD,
            hud_font_size: HUD_FONT_SIZE,
        }
    }
}

impl TuningConfig {
    /// Parse a (possibly partial) TOML document over the compiled defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Read `path`, falling back to defaults when the file is missing or bad.
    ///
    /// Parse errors are logged but never abort startup.
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(loaded) => {
                    info!("Loaded tuning config from {path}");
                    loaded
                }
                Err(e) => {
                    warn!("Failed to parse {path}: {e}; using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                // File not present: not an error.
                info!("No {path} found; using compiled defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_overrides_only_listed_keys() {
        let config = TuningConfig::from_toml_str("launch_gravity = 35.0\nlevel_seed = 7\n")
            .expect("partial config must parse");

        assert_eq!(config.launch_gravity, 35.0);
        assert_eq!(config.level_seed, Some(7));
        assert_eq!(config.power_scale, POWER_SCALE);
        assert_eq!(config.gate_positions, GATE_POSITIONS.to_vec());
    }

    #[test]
    fn empty_toml_is_the_default_config() {
        let config = TuningConfig::from_toml_str("").expect("empty config must parse");
        assert_eq!(config, TuningConfig::default());
    }

    #[test]
    fn wrongly_typed_value_is_a_parse_error() {
        assert!(TuningConfig::from_toml_str("max_power = \"lots\"").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = TuningConfig::load_or_default("assets/definitely-not-here.toml");
        assert_eq!(config, TuningConfig::default());
    }
}
