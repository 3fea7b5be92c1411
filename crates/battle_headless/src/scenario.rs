//! Scenario loading and configuration.
//!
//! Scenarios define a battle for headless playback: the battlefield
//! configuration, default soldier stats and a timetable of spawns.

use std::f32::consts::PI;
use std::path::Path;

use battle_core::soldier::{Soldier, TeamId};
use battle_core::stats::{BattlefieldConfig, SoldierStats};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed, but describes something the engine cannot run.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

/// A soldier to request at a given tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnOrder {
    /// Tick before which the spawn is requested (0 = before the first tick).
    #[serde(default)]
    pub at_tick: u64,
    /// World X.
    pub x: f32,
    /// World Y.
    pub y: f32,
    /// Initial facing in radians.
    #[serde(default)]
    pub facing: f32,
    /// Team.
    pub team: TeamId,
    /// Per-spawn stat overrides; falls back to the scenario's stats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<SoldierStats>,
}

impl SpawnOrder {
    /// Spawn order at tick 0 with scenario stats.
    #[must_use]
    pub fn new(x: f32, y: f32, facing: f32, team: TeamId) -> Self {
        Self {
            at_tick: 0,
            x,
            y,
            facing,
            team,
            stats: None,
        }
    }

    /// Delay this spawn until `tick`.
    #[must_use]
    pub fn at(mut self, tick: u64) -> Self {
        self.at_tick = tick;
        self
    }

    /// Build the soldier, using `defaults` unless overridden.
    #[must_use]
    pub fn build(&self, defaults: &SoldierStats) -> Soldier {
        let stats = self.stats.as_ref().unwrap_or(defaults);
        Soldier::with_stats(self.x, self.y, self.facing, self.team, stats)
    }
}

/// A complete scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Fixed step passed to every tick, in seconds.
    #[serde(default = "default_delta")]
    pub delta_seconds: f32,
    /// Hard stop.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// Battlefield configuration.
    #[serde(default)]
    pub config: BattlefieldConfig,
    /// Stats for spawns without their own.
    #[serde(default)]
    pub stats: SoldierStats,
    /// Spawn timetable.
    pub spawns: Vec<SpawnOrder>,
}

const fn default_delta() -> f32 {
    0.1
}

const fn default_max_ticks() -> u64 {
    6_000
}

impl Default for Scenario {
    /// Two baseline soldiers 300 units apart, stepped at one second.
    fn default() -> Self {
        Self {
            name: "Duel".to_string(),
            description: "Two soldiers 300 units apart, facing each other".to_string(),
            delta_seconds: 1.0,
            max_ticks: 600,
            config: BattlefieldConfig::default(),
            stats: SoldierStats::default(),
            spawns: vec![
                SpawnOrder::new(0.0, 0.0, 0.0, 0),
                SpawnOrder::new(300.0, 0.0, PI, 1),
            ],
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario = Self::from_ron_str(&contents)?;
        tracing::info!(name = %scenario.name, spawns = scenario.spawns.len(), "Scenario loaded");
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Two opposing lines of `per_side` soldiers, `gap` units apart.
    #[must_use]
    pub fn line_battle(per_side: usize, gap: f32) -> Self {
        let mut spawns = Vec::with_capacity(per_side * 2);
        for i in 0..per_side {
            let y = i as f32 * 40.0;
            spawns.push(SpawnOrder::new(0.0, y, 0.0, 0));
            spawns.push(SpawnOrder::new(gap, y, PI, 1));
        }
        Self {
            name: format!("Line battle {per_side}v{per_side}"),
            description: format!("Two lines of {per_side} soldiers, {gap} units apart"),
            delta_seconds: default_delta(),
            max_ticks: default_max_ticks(),
            config: BattlefieldConfig::default(),
            stats: SoldierStats::default(),
            spawns,
        }
    }

    /// Tick of the last scheduled spawn.
    #[must_use]
    pub fn last_spawn_tick(&self) -> u64 {
        self.spawns.iter().map(|s| s.at_tick).max().unwrap_or(0)
    }

    /// Check the scenario can be played.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !self.delta_seconds.is_finite() || self.delta_seconds < 0.0 {
            return Err(ScenarioError::Invalid(format!(
                "delta_seconds must be finite and non-negative, got {}",
                self.delta_seconds
            )));
        }
        self.stats
            .validate()
            .map_err(|e| ScenarioError::Invalid(e.to_string()))?;
        for (i, spawn) in self.spawns.iter().enumerate() {
            if let Some(stats) = &spawn.stats {
                stats
                    .validate()
                    .map_err(|e| ScenarioError::Invalid(format!("spawn {i}: {e}")))?;
            }
        }
        Ok(())
    }
}
