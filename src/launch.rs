//! Launch model: turns a drag gesture into a launch velocity.
//!
//! The launch direction points from the release point back toward the anchor
//! (pulling down-left throws up-right). Power grows with drag length, is
//! clamped, then scaled by the Power upgrade:
//!
//! ```text
//! delta      = drag_start − drag_end
//! base_power = clamp(|delta| · 15, 1000, 4000)
//! velocity   = (cos θ, sin θ) · base_power · multiplier(Power, level)
//! vy        *= 0.7   if vy > 0   (downward launches are damped)
//! ```
//!
//! Also hosts the aiming helpers the scene host draws with: the clamped pull
//! offset of the character and the trajectory preview dots.

use bevy::math::Vec2;

use crate::config::TuningConfig;
use crate::error::{GameError, GameResult};
use crate::upgrades::{self, UpgradeCategory};

/// Result of [`compute_launch_velocity`], kept for logging and effect cues.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchSolution {
    pub velocity: Vec2,
    /// Clamped power before the upgrade multiplier, in `[min_power, max_power]`.
    pub base_power: f32,
    /// `base_power` after the Power upgrade multiplier.
    pub final_power: f32,
}

impl LaunchSolution {
    /// `base_power` relative to the configured ceiling, in `(0, 1]`.
    pub fn power_ratio(&self, config: &TuningConfig) -> f32 {
        (self.base_power / config.max_power).min(1.0)
    }
}

/// Launch velocity for a drag from `drag_start` to `drag_end`.
///
/// Pure: identical inputs give bit-identical output. A zero-length drag is
/// tolerated and yields a minimum-power launch along +x.
pub fn compute_launch_velocity(
    drag_start: Vec2,
    drag_end: Vec2,
    power_level: u32,
    config: &TuningConfig,
) -> LaunchSolution {
    let delta = drag_start - drag_end;
    let distance = delta.length();
    // atan2(0, 0) is 0, so a zero drag points straight along +x.
    let angle = delta.y.atan2(delta.x);

    let base_power = (distance * config.power_scale).clamp(config.min_power, config.max_power);
    let final_power = base_power * upgrades::multiplier(UpgradeCategory::Power, power_level);

    let mut velocity = Vec2::new(angle.cos() * final_power, angle.sin() * final_power);
    if velocity.y > 0.0 {
        velocity.y *= config.downward_launch_damp;
    }

    LaunchSolution {
        velocity,
        base_power,
        final_power,
    }
}

/// Reject drags too short to count as a launch.
pub fn validate_drag(drag_start: Vec2, drag_end: Vec2, config: &TuningConfig) -> GameResult<()> {
    let distance_sq = drag_start.distance_squared(drag_end);
    if distance_sq < config.min_drag_distance_sq {
        Err(GameError::InvalidLaunchInput { distance_sq })
    } else {
        Ok(())
    }
}

/// Where the character sits while being pulled back from `anchor` by a
/// pointer at `pointer`.
///
/// The character moves opposite the pointer at `aim_pull_ratio` and never
/// further than `max_pull_distance` from the anchor.
pub fn pulled_position(anchor: Vec2, pointer: Vec2, config: &TuningConfig) -> Vec2 {
    let pull = anchor - (pointer - anchor) * config.aim_pull_ratio;
    let offset = pull - anchor;
    if offset.length() > config.max_pull_distance {
        anchor + offset.normalize_or_zero() * config.max_pull_distance
    } else {
        pull
    }
}

/// Aim strength shown by the guide, in `[0, 1]`.
pub fn aim_power_ratio(anchor: Vec2, pointer: Vec2) -> f32 {
    (anchor.distance(pointer) / crate::constants::PREVIEW_FULL_POWER_DISTANCE).min(1.0)
}

/// Approximate flight path dots for the aiming guide.
///
/// This is deliberately rough (coarse steps, scaled-down gravity): it hints
/// at the arc rather than predicting the flight.
pub fn trajectory_preview(anchor: Vec2, pointer: Vec2, gravity: f32) -> Vec<Vec2> {
    use crate::constants::{
        PREVIEW_DOTS, PREVIEW_GRAVITY_SCALE, PREVIEW_STEP, PREVIEW_VELOCITY_SCALE,
    };

    let delta = anchor - pointer;
    let power = aim_power_ratio(anchor, pointer);
    let mut velocity = delta * PREVIEW_VELOCITY_SCALE * power;
    let mut position = anchor;

    let mut dots = Vec::with_capacity(PREVIEW_DOTS);
    for _ in 0..PREVIEW_DOTS {
        position += velocity * PREVIEW_STEP;
        velocity.y += gravity * PREVIEW_GRAVITY_SCALE;
        dots.push(position);
    }
    dots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TuningConfig {
        TuningConfig::default()
    }

    #[test]
    fn diagonal_drag_launches_up_and_forward() {
        let solution =
            compute_launch_velocity(Vec2::new(150.0, 400.0), Vec2::new(50.0, 500.0), 1, &config());

        assert!((solution.base_power - 2121.32).abs() < 0.01);
        assert_eq!(solution.final_power, solution.base_power);
        assert!((solution.velocity.x - 1500.0).abs() < 0.5, "vx {}", solution.velocity.x);
        // Upward (negative y) launches are not damped.
        assert!((solution.velocity.y + 1500.0).abs() < 0.5, "vy {}", solution.velocity.y);
    }

    #[test]
    fn downward_launch_is_damped() {
        let solution =
            compute_launch_velocity(Vec2::new(50.0, 500.0), Vec2::new(150.0, 400.0), 1, &config());

        assert!((solution.velocity.x + 1500.0).abs() < 0.5);
        assert!((solution.velocity.y - 1050.0).abs() < 0.5, "vy {}", solution.velocity.y);
    }

    #[test]
    fn base_power_is_clamped_to_bounds() {
        let cfg = config();
        for length in [0.0, 1.0, 50.0, 66.7, 200.0, 266.7, 10_000.0] {
            let solution = compute_launch_velocity(Vec2::new(length, 0.0), Vec2::ZERO, 1, &cfg);
            assert!(
                (cfg.min_power..=cfg.max_power).contains(&solution.base_power),
                "drag {length} gave base power {}",
                solution.base_power
            );
        }
    }

    #[test]
    fn power_upgrade_scales_final_power() {
        let cfg = config();
        let base = compute_launch_velocity(Vec2::new(300.0, 0.0), Vec2::ZERO, 1, &cfg);
        let upgraded = compute_launch_velocity(Vec2::new(300.0, 0.0), Vec2::ZERO, 6, &cfg);

        assert_eq!(base.base_power, upgraded.base_power);
        assert!((upgraded.final_power - 2.0 * base.final_power).abs() < 1e-3);
        assert!((upgraded.velocity.x - 8000.0).abs() < 1e-2);
    }

    #[test]
    fn zero_drag_gives_minimum_power_along_x() {
        let solution = compute_launch_velocity(Vec2::splat(42.0), Vec2::splat(42.0), 1, &config());
        assert_eq!(solution.velocity, Vec2::new(1000.0, 0.0));
        assert!(solution.velocity.is_finite());
    }

    #[test]
    fn launch_is_bit_for_bit_deterministic() {
        let cfg = config();
        let a = compute_launch_velocity(Vec2::new(151.3, 397.9), Vec2::new(77.7, 431.2), 4, &cfg);
        let b = compute_launch_velocity(Vec2::new(151.3, 397.9), Vec2::new(77.7, 431.2), 4, &cfg);
        assert_eq!(a.velocity.x.to_bits(), b.velocity.x.to_bits());
        assert_eq!(a.velocity.y.to_bits(), b.velocity.y.to_bits());
    }

    #[test]
    fn short_drag_is_rejected() {
        let cfg = config();
        assert!(validate_drag(Vec2::ZERO, Vec2::new(3.0, 4.0), &cfg).is_err());
        assert!(validate_drag(Vec2::ZERO, Vec2::new(6.0, 8.0), &cfg).is_ok());
    }

    #[test]
    fn pull_is_clamped_to_max_distance() {
        let cfg = config();
        let anchor = Vec2::new(150.0, 400.0);

        let near = pulled_position(anchor, Vec2::new(250.0, 400.0), &cfg);
        assert!((near - Vec2::new(140.0, 400.0)).length() < 1e-4);

        let far = pulled_position(anchor, Vec2::new(2150.0, 400.0), &cfg);
        assert!((far.distance(anchor) - cfg.max_pull_distance).abs() < 1e-3);
        assert!(far.x < anchor.x);
    }

    #[test]
    fn preview_has_fixed_dot_count_and_bends_down() {
        let dots = trajectory_preview(Vec2::new(150.0, 400.0), Vec2::new(50.0, 500.0), 1500.0);
        assert_eq!(dots.len(), crate::constants::PREVIEW_DOTS);
        assert!(dots[0].x > 150.0);
        // Gravity eventually turns the arc downward.
        assert!(dots[9].y > dots[5].y);
    }
}
