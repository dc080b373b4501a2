//! Flight simulator: the per-tick kinematic update while the character is
//! airborne after launch.
//!
//! Ordinary gravity plus drag made flights end far too quickly, so the update
//! trades realism for a long, floaty glide. The rules are applied in this
//! exact order every tick:
//!
//! 1. `0 < vx < 500` → `vx *= 1.005` (horizontal momentum boost)
//! 2. `vy > 50` (falling) → `vy *= 0.95` (descent damping)
//! 3. airborne → `vx *= 0.9998` (near-zero air drag)
//! 4. integrate under the reduced launch gravity, then resolve ground contact
//! 5. `|vx| < 5` while resting on the ground → flight is over
//!
//! Ground contact reflects the fall by the Bounce upgrade multiplier (the
//! character's world-bounce coefficient), capped at `max_ground_bounce` so
//! every rebound is weaker than its impact. A bounce too weak to leave the
//! ground settles the character, and a settled character slides to a stop
//! under ground friction.

use bevy::math::Vec2;

use crate::config::TuningConfig;

/// Outcome of a single [`FlightState::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStep {
    Flying,
    /// Termination condition met; the run should end.
    Stopped,
}

/// Character kinematic state owned by the simulator while launched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightState {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Resting on the ground (not merely touching it mid-bounce).
    pub on_ground: bool,
}

/// Per-run parameters that do not change tick to tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightParams {
    pub gravity: f32,
    /// Ground restitution; the Bounce upgrade multiplier. Capped by
    /// `TuningConfig::max_ground_bounce` on contact.
    pub ground_bounce: f32,
}

impl FlightState {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            on_ground: false,
        }
    }

    /// Advance one tick of `dt` seconds.
    pub fn step(&mut self, dt: f32, params: &FlightParams, config: &TuningConfig) -> FlightStep {
        let v = &mut self.velocity;

        if v.x > 0.0 && v.x < config.momentum_boost_ceiling {
            v.x *= config.momentum_boost;
        }

        if v.y > config.fall_damp_threshold {
            v.y *= config.fall_damp;
        }

        if !self.on_ground {
            v.x *= config.air_drag;
        }

        self.integrate(dt, params, config);

        if self.velocity.x.abs() < config.stop_speed && self.on_ground {
            FlightStep::Stopped
        } else {
            FlightStep::Flying
        }
    }

    fn integrate(&mut self, dt: f32, params: &FlightParams, config: &TuningConfig) {
        self.velocity.y += params.gravity * dt;
        self.position += self.velocity * dt;

        if self.position.y < config.ground_y {
            self.on_ground = false;
            return;
        }

        self.position.y = config.ground_y;
        if self.velocity.y > 0.0 {
            let restitution = params.ground_bounce.min(config.max_ground_bounce);
            let rebound = -self.velocity.y * restitution;
            if rebound.abs() < config.ground_rest_speed {
                self.velocity.y = 0.0;
                self.on_ground = true;
            } else {
                self.velocity.y = rebound;
                self.on_ground = false;
            }
        }

        if self.on_ground {
            self.velocity.x *= config.ground_friction;
        }
    }

    /// Distance in whole metres; never negative.
    #[inline]
    pub fn distance_metres(&self, config: &TuningConfig) -> u32 {
        (self.position.x / config.units_per_metre).floor().max(0.0) as u32
    }
}
