//! # Battle Core
//!
//! Battlefield simulation core for the Battler toy RTS.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No randomness
//!
//! Soldiers are spawned by an external driver; from then on the
//! battlefield owns their behavior until they die. The driver advances the
//! simulation with [`Battlefield::tick`](battlefield::Battlefield::tick)
//! and reads soldier state back for presentation.
//!
//! ## Crate Structure
//!
//! - [`soldier`] - Soldier entity and attack-cone predicate
//! - [`battlefield`] - Slot storage, spawn buffer and the tick loop
//! - [`stats`] - Data-driven soldier stats and battlefield config
//! - [`math`] - Vectors and angle normalization
//! - [`error`] - Error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battlefield;
pub mod error;
pub mod math;
pub mod soldier;
pub mod stats;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battlefield::{Battlefield, DamageEvent, TargetAcquired, TickEvents};
    pub use crate::error::{BattleError, Result};
    pub use crate::math::{angle_norm, Vec2};
    pub use crate::soldier::{Soldier, SoldierId, TeamId};
    pub use crate::stats::{BattlefieldConfig, SoldierStats, TargetingPolicy};
}
