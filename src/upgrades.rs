//! Upgrade model: level → gameplay multiplier and level → purchase cost.
//!
//! Pure functions, no state. Levels are 1-indexed (`1..=MAX_UPGRADE_LEVEL`),
//! matching what the shop shows and what the progression record stores.
//!
//! | Category | Multiplier at level L | Used by |
//! |---|---|---|
//! | Power | `1 + 0.2·(L−1)` | launch speed |
//! | Bounce | `0.8 + 0.05·(L−1)` | enemy bounce and ground bounce |
//! | StompPower | `L` | stomp impulse (`1200 × L`) |
//! | StompCooldown | `L` | cooldown divisor (`3000 / L` ms) |

use crate::constants::MAX_UPGRADE_LEVEL;

/// Persistent run-to-run upgrade tracks sold in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeCategory {
    Power,
    Bounce,
    StompPower,
    StompCooldown,
}

impl UpgradeCategory {
    /// Shop order.
    pub const ALL: [UpgradeCategory; 4] = [
        UpgradeCategory::Power,
        UpgradeCategory::Bounce,
        UpgradeCategory::StompPower,
        UpgradeCategory::StompCooldown,
    ];

    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            UpgradeCategory::Power => "Launch Power",
            UpgradeCategory::Bounce => "Bounce Power",
            UpgradeCategory::StompPower => "Stomp Power",
            UpgradeCategory::StompCooldown => "Stomp Cooldown",
        }
    }

    #[inline]
    pub fn description(self) -> &'static str {
        match self {
            UpgradeCategory::Power => "Increases your initial launch power",
            UpgradeCategory::Bounce => "Increases your bounce power off enemies",
            UpgradeCategory::StompPower => "Increases the strength of your stomp attack",
            UpgradeCategory::StompCooldown => "Reduces the cooldown time of your stomp attack",
        }
    }
}

/// Whether `level` can still be bought up from.
#[inline]
pub fn is_maxed(level: u32) -> bool {
    level >= MAX_UPGRADE_LEVEL
}

/// Currency needed to go from `level` to `level + 1`.
///
/// `floor(level² · 10 + 10)`: 20, 50, 100, 170, … , 1010 at level 10.
#[inline]
pub fn cost(level: u32) -> u32 {
    level * level * 10 + 10
}

/// Cost of the next level, or `None` when already maxed.
#[inline]
pub fn cost_for_next_level(level: u32) -> Option<u32> {
    if is_maxed(level) {
        None
    } else {
        Some(cost(level))
    }
}

/// Gameplay multiplier for `category` at `level`.
///
/// Levels below 1 are treated as level 1 so a bad record can never produce a
/// zero or negative multiplier.
pub fn multiplier(category: UpgradeCategory, level: u32) -> f32 {
    let steps = level.max(1) as f32 - 1.0;
    match category {
        UpgradeCategory::Power => 1.0 + 0.2 * steps,
        UpgradeCategory::Bounce => 0.8 + 0.05 * steps,
        UpgradeCategory::StompPower | UpgradeCategory::StompCooldown => 1.0 + steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_strictly_increases_across_levels() {
        for level in 1..MAX_UPGRADE_LEVEL {
            assert!(
                cost(level) < cost(level + 1),
                "cost({level}) = {} must be below cost({}) = {}",
                cost(level),
                level + 1,
                cost(level + 1)
            );
        }
    }

    #[test]
    fn cost_matches_shop_prices() {
        assert_eq!(cost(1), 20);
        assert_eq!(cost(3), 100);
        assert_eq!(cost(10), 1010);
        assert_eq!(cost_for_next_level(9), Some(820));
        assert_eq!(cost_for_next_level(10), None);
    }

    #[test]
    fn multipliers_match_level_one_baseline() {
        assert_eq!(multiplier(UpgradeCategory::Power, 1), 1.0);
        assert_eq!(multiplier(UpgradeCategory::Bounce, 1), 0.8);
        assert_eq!(multiplier(UpgradeCategory::StompPower, 1), 1.0);
        assert_eq!(multiplier(UpgradeCategory::StompCooldown, 1), 1.0);
    }

    #[test]
    fn multipliers_scale_per_level() {
        assert!((multiplier(UpgradeCategory::Power, 6) - 2.0).abs() < 1e-6);
        assert!((multiplier(UpgradeCategory::Bounce, 5) - 1.0).abs() < 1e-6);
        assert_eq!(multiplier(UpgradeCategory::StompPower, 4), 4.0);
        assert_eq!(multiplier(UpgradeCategory::StompCooldown, 10), 10.0);
    }

    #[test]
    fn multipliers_never_decrease_with_level() {
        for category in UpgradeCategory::ALL {
            for level in 1..MAX_UPGRADE_LEVEL {
                assert!(multiplier(category, level) <= multiplier(category, level + 1));
            }
        }
    }

    #[test]
    fn level_zero_is_clamped_to_level_one() {
        for category in UpgradeCategory::ALL {
            assert_eq!(multiplier(category, 0), multiplier(category, 1));
        }
    }
}
