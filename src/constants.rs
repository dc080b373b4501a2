//! Centralised launch, flight and progression constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//!
//! ## Tuning guidance
//!
//! The flight constants were tuned by feel, not derived. Changing any of the
//! momentum rules (boost, fall damping, air drag) or their order changes how
//! long a flight lasts, so treat them as a set.
//!
//! Coordinates are screen-space: +x is forward, +y is **down**. A positive
//! vertical velocity means the character is falling.

// ── Progression ───────────────────────────────────────────────────────────────

/// Highest level any upgrade category can reach.
pub const MAX_UPGRADE_LEVEL: u32 = 10;

/// Default persisted progression file, relative to the working directory.
pub const PROGRESSION_PATH: &str = "saves/progression.json";

// ── Launch ────────────────────────────────────────────────────────────────────

/// Launch power per unit of drag distance.
pub const POWER_SCALE: f32 = 15.0;

/// Launch power floor before the Power upgrade multiplier is applied.
pub const MIN_POWER: f32 = 1000.0;

/// Launch power ceiling before the Power upgrade multiplier is applied.
pub const MAX_POWER: f32 = 4000.0;

/// A downward launch keeps only this share of its vertical speed.
pub const DOWNWARD_LAUNCH_DAMP: f32 = 0.7;

/// Squared drag distance below which a release is not a launch.
pub const MIN_DRAG_DISTANCE_SQ: f32 = 100.0;

/// Pointer-down must land within this radius of the character to start aiming.
pub const AIM_GRAB_RADIUS: f32 = 100.0;

/// The character follows the pointer backwards at this ratio while aiming.
pub const AIM_PULL_RATIO: f32 = 0.1;

/// Furthest the character can be pulled away from its anchor while aiming.
pub const MAX_PULL_DISTANCE: f32 = 50.0;

// ── Trajectory preview ────────────────────────────────────────────────────────

pub const PREVIEW_DOTS: usize = 10;
pub const PREVIEW_VELOCITY_SCALE: f32 = 0.2;
pub const PREVIEW_STEP: f32 = 0.5;
pub const PREVIEW_GRAVITY_SCALE: f32 = 0.01;
/// Drag distance that maps to a full-power preview.
pub const PREVIEW_FULL_POWER_DISTANCE: f32 = 100.0;

// ── Flight ────────────────────────────────────────────────────────────────────

/// World gravity before the first launch.
pub const PRE_LAUNCH_GRAVITY: f32 = 1500.0;

/// World gravity once a launch has happened; very low for long hangtime.
pub const LAUNCH_GRAVITY: f32 = 20.0;

/// Horizontal speeds inside `(0, MOMENTUM_BOOST_CEILING)` are multiplied by
/// [`MOMENTUM_BOOST`] every tick.
pub const MOMENTUM_BOOST: f32 = 1.005;
pub const MOMENTUM_BOOST_CEILING: f32 = 500.0;

/// Falling faster than this triggers descent damping.
pub const FALL_DAMP_THRESHOLD: f32 = 50.0;
pub const FALL_DAMP: f32 = 0.95;

/// Per-tick horizontal retention while airborne.
pub const AIR_DRAG: f32 = 0.9998;

/// A grounded character slower than this ends the run.
pub const STOP_SPEED: f32 = 5.0;

/// Ground surface height (screen-space y).
pub const GROUND_Y: f32 = 550.0;

/// A ground bounce weaker than this settles the character onto the ground.
pub const GROUND_REST_SPEED: f32 = 30.0;

/// Ground restitution never exceeds this, whatever the Bounce level. At 1.0
/// or above the capped fall speed rebounds forever and the run cannot end.
pub const MAX_GROUND_BOUNCE: f32 = 0.9;

/// Per-tick horizontal retention while resting on the ground.
pub const GROUND_FRICTION: f32 = 0.92;

/// Where the character waits before launch.
pub const START_X: f32 = 150.0;
pub const START_Y: f32 = 400.0;

/// World units per metre of reported distance.
pub const UNITS_PER_METRE: f32 = 10.0;

// ── Collision ─────────────────────────────────────────────────────────────────

/// Fixed restitution applied on top of the Bounce upgrade when landing on an enemy.
pub const ENEMY_RESTITUTION: f32 = 0.8;

/// Gate bounce-back: horizontal speed is reversed and scaled by this factor.
pub const GATE_BOUNCE_BACK: f32 = 0.5;

pub const REWARD_REGULAR: u32 = 5;
pub const REWARD_BOUNCY: u32 = 10;
pub const REWARD_SPECIAL: u32 = 25;
pub const REWARD_COLLECTIBLE: u32 = 1;

// ── Power-ups ─────────────────────────────────────────────────────────────────

pub const SPEED_BOOST_FACTOR: f32 = 1.5;

/// Vertical velocity set by Super Bounce; the Bounce upgrade does not apply.
pub const SUPER_BOUNCE_VELOCITY: f32 = -800.0;

pub const MAGNET_DURATION_MS: u64 = 3000;
pub const MAGNET_INTERVAL_MS: u64 = 100;
pub const MAGNET_RADIUS: f32 = 200.0;
/// Distance each collectible in range moves toward the character per pulse.
pub const MAGNET_STEP: f32 = 10.0;

// ── Stomp ─────────────────────────────────────────────────────────────────────

/// Downward stomp speed at StompPower level 1.
pub const STOMP_BASE_IMPULSE: f32 = 1200.0;
pub const STOMP_FORWARD_BOOST: f32 = 1.2;
/// Stomp cooldown at StompCooldown level 1.
pub const STOMP_BASE_COOLDOWN_MS: u64 = 3000;

// ── Level layout ──────────────────────────────────────────────────────────────

pub const ENEMY_COUNT: usize = 100;
pub const COLLECTIBLE_COUNT: usize = 200;
pub const SPAWN_MIN_X: f32 = 500.0;
pub const SPAWN_MAX_X: f32 = 9500.0;
pub const ENEMY_MIN_Y: f32 = 100.0;
pub const ENEMY_MAX_Y: f32 = 500.0;
pub const COLLECTIBLE_MIN_Y: f32 = 100.0;
pub const COLLECTIBLE_MAX_Y: f32 = 550.0;

/// Gate x positions; gate `i` requires unlock level `i + 1`.
pub const GATE_POSITIONS: [f32; 3] = [2000.0, 4000.0, 6000.0];

pub const ENEMY_BOUNCE_REGULAR: f32 = 0.8;
pub const ENEMY_BOUNCE_BOUNCY: f32 = 1.2;
pub const ENEMY_BOUNCE_SPECIAL: f32 = 1.0;

// ── Host ──────────────────────────────────────────────────────────────────────

pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;

/// Delay between a finished run and the shop.
pub const RUN_END_SHOP_DELAY_SECS: f32 = 3.0;

/// Horizontal screen offset of the character while the camera follows it.
pub const CAMERA_LEAD: f32 = 200.0;

pub const CHARACTER_RADIUS: f32 = 20.0;
pub const ENEMY_RADIUS: f32 = 22.0;
pub const COLLECTIBLE_RADIUS: f32 = 10.0;
pub const GATE_HALF_WIDTH: f32 = 20.0;
pub const GATE_HALF_HEIGHT: f32 = 300.0;

pub const HUD_FONT_SIZE: f32 = 16.0;
