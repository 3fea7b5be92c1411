//! Data-driven soldier statistics and battlefield configuration.
//!
//! Pure data structures designed to be deserialized from RON. Every field
//! has a default, so a document only needs to name what it overrides.
//!
//! # Example RON
//!
//! ```ron
//! SoldierStats(
//!     max_health: 150,
//!     damage: 12,
//!     range: 120.0,
//! )
//! ```

use std::f32::consts::{FRAC_PI_4, PI};

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};

/// Constant per-soldier statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoldierStats {
    /// Maximum (and starting) health.
    pub max_health: i32,
    /// Damage applied per attack.
    pub damage: i32,
    /// Seconds between attacks.
    pub attack_cooldown: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Half-angle of the attack cone, in radians.
    pub vision_angle: f32,
    /// Attack radius.
    pub range: f32,
    /// Detection radius. Only consulted under [`TargetingPolicy::VisionLimited`].
    pub vision_range: f32,
}

impl Default for SoldierStats {
    fn default() -> Self {
        Self {
            max_health: 100,
            damage: 10,
            attack_cooldown: 1.5,
            speed: 80.0,
            vision_angle: FRAC_PI_4,
            range: 200.0,
            vision_range: 600.0,
        }
    }
}

impl SoldierStats {
    /// Parse stats from a RON document.
    pub fn from_ron(source: &str) -> Result<Self> {
        let stats: Self =
            ron::from_str(source).map_err(|e| BattleError::ConfigParse(e.to_string()))?;
        stats.validate()?;
        Ok(stats)
    }

    /// Check that the stats describe a soldier the engine can simulate.
    pub fn validate(&self) -> Result<()> {
        if self.max_health <= 0 {
            return Err(BattleError::InvalidStats(format!(
                "max_health must be positive, got {}",
                self.max_health
            )));
        }
        if self.damage < 0 {
            return Err(BattleError::InvalidStats(format!(
                "damage must not be negative, got {}",
                self.damage
            )));
        }
        for (name, value) in [
            ("attack_cooldown", self.attack_cooldown),
            ("speed", self.speed),
            ("range", self.range),
            ("vision_range", self.vision_range),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BattleError::InvalidStats(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        if !(0.0..=PI).contains(&self.vision_angle) {
            return Err(BattleError::InvalidStats(format!(
                "vision_angle must lie in [0, π], got {}",
                self.vision_angle
            )));
        }
        Ok(())
    }
}

/// How a targetless soldier picks its candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetingPolicy {
    /// Every live opponent is a candidate regardless of distance.
    #[default]
    Global,
    /// Only opponents within the soldier's `vision_range` are candidates.
    VisionLimited,
}

/// Battlefield-wide configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattlefieldConfig {
    /// Slot capacity reserved up front.
    pub initial_capacity: usize,
    /// Minimum number of slots added when storage overflows.
    pub growth_increment: usize,
    /// Baseline capacity the spawn buffer is reset to after admission.
    pub pending_capacity: usize,
    /// Candidate selection for target acquisition.
    pub targeting: TargetingPolicy,
}

impl Default for BattlefieldConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 50,
            growth_increment: 50,
            pending_capacity: 16,
            targeting: TargetingPolicy::Global,
        }
    }
}

impl BattlefieldConfig {
    /// Parse a configuration from a RON document.
    pub fn from_ron(source: &str) -> Result<Self> {
        let config: Self =
            ron::from_str(source).map_err(|e| BattleError::ConfigParse(e.to_string()))?;
        if config.growth_increment == 0 {
            return Err(BattleError::ConfigParse(
                "growth_increment must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}
