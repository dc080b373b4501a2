//! Outbound hooks from the gameplay core to whatever presents it.
//!
//! [`Effect`] is the fire-and-forget cue (sound, particles, floating text) and
//! [`RunSnapshot`] is the HUD state. The core only produces these; it never
//! waits on the host to consume them.

use std::time::Duration;

use bevy::math::Vec2;

use crate::collision::PowerUp;
use crate::upgrades::UpgradeCategory;

/// Kind of presentation cue.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectCue {
    /// `power_ratio` is the clamped base power relative to the maximum.
    Launch { power_ratio: f32 },
    Squish { intensity: f32 },
    Collect,
    PowerUp(PowerUp),
    Stomp,
    GateBreak,
    GateLocked,
    LevelUnlocked { level: u32 },
    RunComplete { distance: u32, session_currency: u32 },
    Purchase(UpgradeCategory),
    PurchaseRejected(&'static str),
}

/// A cue at a position in level coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub cue: EffectCue,
    pub position: Vec2,
}

impl Effect {
    pub fn new(cue: EffectCue, position: Vec2) -> Self {
        Self { cue, position }
    }
}

/// Read-only view of a run for the HUD.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub phase: crate::run::RunPhase,
    pub position: Vec2,
    pub velocity: Vec2,
    pub distance: u32,
    pub best_distance_this_run: u32,
    pub session_currency: u32,
    /// Persisted total, not including `session_currency`.
    pub total_currency: u32,
    pub best_distance: u32,
    pub unlocked_level: u32,
    pub can_launch: bool,
    pub stomp_available: bool,
    pub stomp_cooldown: Option<Duration>,
    pub magnet_active: bool,
}
