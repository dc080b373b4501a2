//! Collision Resolver: what happens when the character overlaps a level body.
//!
//! The resolver never performs spatial queries. The scene host reports
//! overlaps (a [`BodyRef`]) and the resolver applies their effect to the
//! [`Level`] and the character's [`FlightState`]:
//!
//! | Body | Effect |
//! |------|--------|
//! | Collectible | deactivate, +1 reward |
//! | Enemy | deactivate, reward by kind, bounce, power-up if Special |
//! | Gate | compare with the unlocked level: unlock, pass through, or bounce back |
//!
//! Inactive bodies are ignored, so a second overlap with the same enemy or
//! collectible never pays twice. Gate unlocks touch persistent progression
//! and end the run; that part is left to the run controller, which gets a
//! [`GateOutcome::Unlocked`] back.

use bevy::log::debug;
use bevy::math::Vec2;
use rand::Rng;

use crate::config::TuningConfig;
use crate::flight::FlightState;
use crate::level::{BodyRef, EnemyKind, Level};

/// Temporary effect granted by squishing a Special enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUp {
    SpeedBoost,
    SuperBounce,
    GummyMagnet,
}

impl PowerUp {
    pub const ALL: [PowerUp; 3] = [PowerUp::SpeedBoost, PowerUp::SuperBounce, PowerUp::GummyMagnet];

    /// Uniform pick over [`PowerUp::ALL`].
    pub fn roll(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUp::SpeedBoost => "Speed Boost!",
            PowerUp::SuperBounce => "Super Bounce!",
            PowerUp::GummyMagnet => "Gummy Magnet!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Gate level matched the unlocked level: unlock the next one and end the run.
    Unlocked,
    /// Gate was already unlocked; it is removed for the rest of the run.
    PassedThrough,
    /// Gate not reachable yet; the character was knocked back.
    Blocked,
}

/// What a single overlap did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Body inactive or unknown; nothing changed.
    Ignored,
    Collected {
        reward: u32,
    },
    Squished {
        kind: EnemyKind,
        reward: u32,
        /// The enemy's bounce multiplier, used as effect strength.
        intensity: f32,
        /// Rolled for Special enemies. Velocity power-ups are already applied;
        /// a magnet still needs its pulses scheduled.
        power_up: Option<PowerUp>,
    },
    Gate {
        index: usize,
        outcome: GateOutcome,
    },
}

impl Resolution {
    /// Currency this overlap adds to the session total.
    pub fn reward(&self) -> u32 {
        match *self {
            Resolution::Collected { reward } | Resolution::Squished { reward, .. } => reward,
            _ => 0,
        }
    }
}

/// Inputs from outside the level needed to resolve an overlap.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext {
    /// Bounce upgrade multiplier.
    pub bounce_multiplier: f32,
    /// Persisted unlocked level, compared against gate requirements.
    pub unlocked_level: u32,
}

/// Resolve one overlap between the character and `body`.
pub fn resolve_overlap(
    body: BodyRef,
    level: &mut Level,
    character: &mut FlightState,
    ctx: ResolveContext,
    rng: &mut impl Rng,
    config: &TuningConfig,
) -> Resolution {
    if !level.is_active(body) {
        return Resolution::Ignored;
    }

    let resolution = match body {
        BodyRef::Collectible(i) => {
            level.collectibles[i].active = false;
            Resolution::Collected {
                reward: config.reward_collectible,
            }
        }
        BodyRef::Enemy(i) => {
            let enemy = &mut level.enemies[i];
            enemy.active = false;
            let (kind, reward, intensity) = (enemy.kind, enemy.reward_value, enemy.bounce_multiplier);

            bounce_off_enemy(&mut character.velocity, ctx.bounce_multiplier, config);

            let power_up = (kind == EnemyKind::Special).then(|| {
                let power_up = PowerUp::roll(rng);
                apply_power_up(power_up, &mut character.velocity, config);
                power_up
            });

            Resolution::Squished {
                kind,
                reward,
                intensity,
                power_up,
            }
        }
        BodyRef::Gate(i) => {
            let outcome = gate_outcome(level.gates[i].required_unlock_level, ctx.unlocked_level);
            match outcome {
                GateOutcome::PassedThrough => level.gates[i].active = false,
                GateOutcome::Blocked => {
                    character.velocity.x = -character.velocity.x * config.gate_bounce_back;
                }
                GateOutcome::Unlocked => {}
            }
            Resolution::Gate { index: i, outcome }
        }
    };

    debug!("Overlap {:?} resolved as {:?}", body, resolution);
    resolution
}

/// Redirect a fall into a bounce; horizontal speed is only forced forward.
pub fn bounce_off_enemy(velocity: &mut Vec2, bounce_multiplier: f32, config: &TuningConfig) {
    if velocity.y > 0.0 {
        velocity.y = -velocity.y * config.enemy_restitution * bounce_multiplier;
    }
    velocity.x = velocity.x.abs();
}

#[inline]
pub fn gate_outcome(required_level: u32, unlocked_level: u32) -> GateOutcome {
    use std::cmp::Ordering;
    match unlocked_level.cmp(&required_level) {
        Ordering::Equal => GateOutcome::Unlocked,
        Ordering::Greater => GateOutcome::PassedThrough,
        Ordering::Less => GateOutcome::Blocked,
    }
}

/// Apply the instant part of a power-up. The magnet has none.
pub fn apply_power_up(power_up: PowerUp, velocity: &mut Vec2, config: &TuningConfig) {
    match power_up {
        PowerUp::SpeedBoost => velocity.x *= config.speed_boost_factor,
        PowerUp::SuperBounce => velocity.y = config.super_bounce_velocity,
        PowerUp::GummyMagnet => {}
    }
}

/// One Gummy Magnet pull: move every active collectible within the magnet
/// radius of `center` a fixed step toward it. Returns how many moved.
///
/// This only moves collectibles; collection still happens through overlaps.
pub fn magnet_pulse(level: &mut Level, center: Vec2, config: &TuningConfig) -> usize {
    let radius_sq = config.magnet_radius * config.magnet_radius;
    let mut moved = 0;
    for collectible in level.collectibles.iter_mut().filter(|c| c.active) {
        let delta = center - collectible.position;
        if delta.length_squared() > radius_sq {
            continue;
        }
        collectible.position += delta.normalize_or_zero() * config.magnet_step;
        moved += 1;
    }
    moved
}
