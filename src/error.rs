//! Gameplay error types.
//!
//! None of these are fatal. Purchase rejections are shown to the player as a
//! short message; corrupt progression data and failed writes are logged and
//! recovered locally so the game keeps running in memory.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use luchador_launch::error::GameError;
//!
//! match store.apply_upgrade_purchase(UpgradeCategory::Power) {
//!     Ok(spent) => info!("spent {spent}"),
//!     Err(err) => show_toast(err.player_message()),
//! }
//! ```

use std::fmt;
use std::io;

use crate::upgrades::UpgradeCategory;

/// Top-level error enum for the launch game core.
#[derive(Debug)]
pub enum GameError {
    /// The player cannot pay for the next level of an upgrade.
    InsufficientFunds {
        category: UpgradeCategory,
        /// Price of the next level.
        cost: u32,
        /// Currency held at the time of the attempt.
        currency: u32,
    },

    /// The upgrade is already at `MAX_UPGRADE_LEVEL`.
    MaxLevel { category: UpgradeCategory },

    /// Persisted progression could not be decoded; defaults are used instead.
    CorruptProgressionData {
        /// Human-readable decode failure.
        reason: String,
    },

    /// A drag too short to count as a launch.
    InvalidLaunchInput {
        /// Squared drag length that was rejected.
        distance_sq: f32,
    },

    /// Reading or writing the progression blob failed.
    Persistence {
        /// What was being attempted (for logging).
        context: String,
        source: io::Error,
    },
}

impl GameError {
    /// Short, non-blocking message suitable for the shop/HUD.
    pub fn player_message(&self) -> &'static str {
        match self {
            GameError::InsufficientFunds { .. } => "Not enough hearts!",
            GameError::MaxLevel { .. } => "Maximum level reached!",
            GameError::InvalidLaunchInput { .. } => "Pull back further to launch!",
            GameError::CorruptProgressionData { .. } | GameError::Persistence { .. } => {
                "Progress could not be saved."
            }
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InsufficientFunds {
                category,
                cost,
                currency,
            } => write!(
                f,
                "cannot afford {} upgrade: costs {}, have {}",
                category.label(),
                cost,
                currency
            ),
            GameError::MaxLevel { category } => {
                write!(f, "{} upgrade is already at max level", category.label())
            }
            GameError::CorruptProgressionData { reason } => {
                write!(f, "corrupt progression data: {}", reason)
            }
            GameError::InvalidLaunchInput { distance_sq } => write!(
                f,
                "drag too short to launch (squared length {:.1})",
                distance_sq
            ),
            GameError::Persistence { context, source } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;
