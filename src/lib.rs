//! Luchador Launch gameplay library.
//!
//! The core modules (`launch`, `flight`, `collision`, `run`, `progression`,
//! ...) are engine-agnostic and driven by plain method calls; [`host`] wires
//! them into a Bevy app with Rapier sensors as the broad phase.

pub mod collision;
pub mod config;
pub mod constants;
pub mod effects;
pub mod error;
pub mod flight;
pub mod host;
pub mod launch;
pub mod level;
pub mod progression;
pub mod run;
pub mod schedule;
pub mod upgrades;
