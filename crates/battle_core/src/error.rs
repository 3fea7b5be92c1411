//! Error types for the battlefield simulation.

use thiserror::Error;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for the battlefield simulation.
#[derive(Debug, Error, PartialEq)]
pub enum BattleError {
    /// Slot storage was asked to grow to a size that does not exceed the
    /// number of occupied slots. Indicates a defect in the engine itself.
    #[error("Bad battlefield resize (occupied: {occupied}, requested: {requested})")]
    InvalidCapacity {
        /// Number of occupied slots at the time of the request.
        occupied: usize,
        /// Capacity that was requested.
        requested: usize,
    },

    /// A soldier handle refers to a slot that has since been reused.
    #[error("Stale soldier handle: slot {slot}, generation {generation}")]
    StaleHandle {
        /// Slot index of the handle.
        slot: u32,
        /// Generation recorded in the handle.
        generation: u32,
    },

    /// Soldier statistics failed validation.
    #[error("Invalid soldier stats: {0}")]
    InvalidStats(String),

    /// Failed to parse a configuration document.
    #[error("Failed to parse config: {0}")]
    ConfigParse(String),
}
