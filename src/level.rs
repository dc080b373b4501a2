//! Level contents: enemies to bounce off, collectibles, and gates.
//!
//! Entities are plain data. The Collision Resolver flips their `active`
//! flags and the Gummy Magnet moves collectibles; nothing else mutates them.
//! Everything in a level is addressed by [`BodyRef`], which is also what the
//! scene host tags its broad-phase colliders with.
//!
//! ## Generation
//!
//! | Entity | Count | x | y |
//! |---|---|---|---|
//! | Enemy | 100 | 500–9500 | 100–500 |
//! | Collectible | 200 | 500–9500 | 100–550 |
//! | Gate | 3 | 2000 / 4000 / 6000 | full height |
//!
//! Enemy kind is a d10 roll: 1–7 Regular, 8–9 Bouncy, 10 Special.

use bevy::math::Vec2;
use rand::Rng;

use crate::config::TuningConfig;
use crate::constants::{ENEMY_BOUNCE_BOUNCY, ENEMY_BOUNCE_REGULAR, ENEMY_BOUNCE_SPECIAL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Regular,
    Bouncy,
    /// Triggers a random power-up when squished.
    Special,
}

impl EnemyKind {
    /// Map a d10 roll onto the 70/20/10 kind split.
    #[inline]
    pub fn from_d10(roll: u32) -> Self {
        match roll {
            0..=7 => EnemyKind::Regular,
            8..=9 => EnemyKind::Bouncy,
            _ => EnemyKind::Special,
        }
    }

    #[inline]
    pub fn reward(self, config: &TuningConfig) -> u32 {
        match self {
            EnemyKind::Regular => config.reward_regular,
            EnemyKind::Bouncy => config.reward_bouncy,
            EnemyKind::Special => config.reward_special,
        }
    }

    #[inline]
    pub fn bounce_multiplier(self) -> f32 {
        match self {
            EnemyKind::Regular => ENEMY_BOUNCE_REGULAR,
            EnemyKind::Bouncy => ENEMY_BOUNCE_BOUNCY,
            EnemyKind::Special => ENEMY_BOUNCE_SPECIAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub reward_value: u32,
    /// Squish strength; carried to the effect cue.
    pub bounce_multiplier: f32,
    pub position: Vec2,
    /// Cleared on the first collision and never set again.
    pub active: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, position: Vec2, config: &TuningConfig) -> Self {
        Self {
            kind,
            reward_value: kind.reward(config),
            bounce_multiplier: kind.bounce_multiplier(),
            position,
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collectible {
    pub position: Vec2,
    pub active: bool,
}

impl Collectible {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            active: true,
        }
    }
}

/// A barrier across the level at `boundary_position`.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGate {
    pub boundary_position: f32,
    pub required_unlock_level: u32,
    /// Cleared when an already-unlocked gate is broken through.
    pub active: bool,
}

/// Handle to one body in a [`Level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRef {
    Enemy(usize),
    Collectible(usize),
    Gate(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Level {
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Collectible>,
    pub gates: Vec<LevelGate>,
}

impl Level {
    /// Lay out a fresh level from `rng`.
    pub fn generate(rng: &mut impl Rng, config: &TuningConfig) -> Self {
        let enemies = (0..config.enemy_count)
            .map(|_| {
                let position = Vec2::new(
                    rng.gen_range(config.spawn_min_x..=config.spawn_max_x),
                    rng.gen_range(config.enemy_min_y..=config.enemy_max_y),
                );
                let kind = EnemyKind::from_d10(rng.gen_range(1..=10));
                Enemy::new(kind, position, config)
            })
            .collect();

        let collectibles = (0..config.collectible_count)
            .map(|_| {
                Collectible::new(Vec2::new(
                    rng.gen_range(config.spawn_min_x..=config.spawn_max_x),
                    rng.gen_range(config.collectible_min_y..=config.collectible_max_y),
                ))
            })
            .collect();

        Self {
            enemies,
            collectibles,
            gates: Self::gates_from(config),
        }
    }

    /// Gate `i` sits at `gate_positions[i]` and requires unlock level `i + 1`.
    pub fn gates_from(config: &TuningConfig) -> Vec<LevelGate> {
        config
            .gate_positions
            .iter()
            .enumerate()
            .map(|(i, &x)| LevelGate {
                boundary_position: x,
                required_unlock_level: i as u32 + 1,
                active: true,
            })
            .collect()
    }

    /// Position of `body`, if it exists. Gates report their x at ground level 0.
    pub fn position_of(&self, body: BodyRef) -> Option<Vec2> {
        match body {
            BodyRef::Enemy(i) => self.enemies.get(i).map(|e| e.position),
            BodyRef::Collectible(i) => self.collectibles.get(i).map(|c| c.position),
            BodyRef::Gate(i) => self
                .gates
                .get(i)
                .map(|g| Vec2::new(g.boundary_position, 0.0)),
        }
    }

    pub fn is_active(&self, body: BodyRef) -> bool {
        match body {
            BodyRef::Enemy(i) => self.enemies.get(i).is_some_and(|e| e.active),
            BodyRef::Collectible(i) => self.collectibles.get(i).is_some_and(|c| c.active),
            BodyRef::Gate(i) => self.gates.get(i).is_some_and(|g| g.active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn d10_split_matches_kind_weights() {
        let kinds: Vec<_> = (1..=10).map(EnemyKind::from_d10).collect();
        assert_eq!(kinds.iter().filter(|k| **k == EnemyKind::Regular).count(), 7);
        assert_eq!(kinds.iter().filter(|k| **k == EnemyKind::Bouncy).count(), 2);
        assert_eq!(kinds.iter().filter(|k| **k == EnemyKind::Special).count(), 1);
    }

    #[test]
    fn enemy_rewards_follow_kind() {
        let config = TuningConfig::default();
        assert_eq!(Enemy::new(EnemyKind::Regular, Vec2::ZERO, &config).reward_value, 5);
        assert_eq!(Enemy::new(EnemyKind::Bouncy, Vec2::ZERO, &config).reward_value, 10);
        assert_eq!(Enemy::new(EnemyKind::Special, Vec2::ZERO, &config).reward_value, 25);
    }

    #[test]
    fn generated_level_respects_counts_and_bounds() {
        let config = TuningConfig::default();
        let level = Level::generate(&mut StdRng::seed_from_u64(11), &config);

        assert_eq!(level.enemies.len(), config.enemy_count);
        assert_eq!(level.collectibles.len(), config.collectible_count);
        assert!(level.enemies.iter().all(|e| e.active
            && (config.spawn_min_x..=config.spawn_max_x).contains(&e.position.x)
            && (config.enemy_min_y..=config.enemy_max_y).contains(&e.position.y)));
        assert!(level
            .collectibles
            .iter()
            .all(|c| (config.collectible_min_y..=config.collectible_max_y).contains(&c.position.y)));
    }

    #[test]
    fn same_seed_same_level() {
        let config = TuningConfig::default();
        let a = Level::generate(&mut StdRng::seed_from_u64(99), &config);
        let b = Level::generate(&mut StdRng::seed_from_u64(99), &config);
        assert_eq!(a, b);
    }

    #[test]
    fn gates_require_increasing_levels() {
        let gates = Level::gates_from(&TuningConfig::default());
        let required: Vec<_> = gates.iter().map(|g| g.required_unlock_level).collect();
        let xs: Vec<_> = gates.iter().map(|g| g.boundary_position).collect();
        assert_eq!(required, vec![1, 2, 3]);
        assert_eq!(xs, vec![2000.0, 4000.0, 6000.0]);
    }
}
