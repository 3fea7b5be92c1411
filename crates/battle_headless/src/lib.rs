//! Headless battlefield runner for scenario playback and CI verification.
//!
//! This crate drives the simulation without a window. It loads a scenario,
//! feeds spawns and fixed-step ticks to the battlefield, and reports the
//! outcome as JSON. This enables:
//!
//! - **Balance checks**: play a scenario and read the winner and survivors
//! - **CI verification**: assert that battles replay to the same hash
//!
//! # Output
//!
//! - **stdout**: the battle report (JSON)
//! - **stderr**: logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # Play the built-in duel
//! cargo run -p battle_headless -- run
//!
//! # Play a scenario file
//! cargo run -p battle_headless -- run --scenario scenarios/ambush.ron --pretty
//!
//! # Verify determinism
//! cargo run -p battle_headless -- verify --scenario scenarios/ambush.ron --runs 5
//! ```

pub mod runner;
pub mod scenario;

pub use runner::{BattleReport, HeadlessConfig, HeadlessRunner, SurvivorReport};
pub use scenario::{Scenario, ScenarioError, SpawnOrder};
