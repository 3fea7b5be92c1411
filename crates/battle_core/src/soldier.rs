//! Soldier entity and its geometric/timing predicates.
//!
//! A [`Soldier`] is plain data plus pure predicates. All mutation during a
//! tick is done by the [`Battlefield`](crate::battlefield::Battlefield),
//! which owns every soldier.

use serde::{Deserialize, Serialize};

use crate::math::{angle_norm, Vec2, TAU};
use crate::stats::SoldierStats;

/// Team identifier. Soldiers only target members of other teams.
pub type TeamId = i32;

/// Stable handle to a soldier.
///
/// Slots are reused once their occupant is dead, so the slot index alone
/// is not an identity. The generation is bumped every time a slot is
/// overwritten, which makes old handles resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SoldierId {
    /// Index into battlefield storage.
    pub slot: u32,
    /// Occupancy generation of that slot.
    pub generation: u32,
}

impl SoldierId {
    /// Create a handle from its parts.
    #[must_use]
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Slot index as a `usize`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.slot as usize
    }
}

/// A single combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Soldier {
    /// Current health. May drop below zero before the death sweep.
    pub health: i32,
    /// Health at spawn.
    pub max_health: i32,
    /// Set once by the death sweep, never cleared.
    pub is_dead: bool,
    /// Damage dealt per attack.
    pub damage: i32,
    /// Seconds between attacks.
    pub attack_cooldown: f32,
    /// Seconds accumulated toward the next attack.
    pub attack_clock: f32,
    /// World X.
    pub x: f32,
    /// World Y.
    pub y: f32,
    /// Units per second.
    pub speed: f32,
    /// Facing in `[0, 2π)`.
    pub facing_angle: f32,
    /// Half-angle of the attack cone.
    pub vision_angle: f32,
    /// Attack radius.
    pub range: f32,
    /// Detection radius.
    pub vision_range: f32,
    /// Current target, if any. Never owning.
    pub target: Option<SoldierId>,
    /// Side this soldier fights for.
    pub team: TeamId,
}

impl Soldier {
    /// Create a soldier with the baseline stats.
    ///
    /// # Example
    ///
    /// ```
    /// use battle_core::soldier::Soldier;
    ///
    /// let s = Soldier::new(10.0, 20.0, 0.0, 1);
    /// assert_eq!(s.health, 100);
    /// assert!(s.target.is_none());
    /// ```
    #[must_use]
    pub fn new(x: f32, y: f32, facing: f32, team: TeamId) -> Self {
        Self::with_stats(x, y, facing, team, &SoldierStats::default())
    }

    /// Create a soldier with explicit stats.
    #[must_use]
    pub fn with_stats(x: f32, y: f32, facing: f32, team: TeamId, stats: &SoldierStats) -> Self {
        Self {
            health: stats.max_health,
            max_health: stats.max_health,
            is_dead: false,
            damage: stats.damage,
            attack_cooldown: stats.attack_cooldown,
            attack_clock: 0.0,
            x,
            y,
            speed: stats.speed,
            facing_angle: angle_norm(facing),
            vision_angle: stats.vision_angle,
            range: stats.range,
            vision_range: stats.vision_range,
            target: None,
            team,
        }
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Whether the death sweep has not yet claimed this soldier.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.is_dead
    }

    /// Whether `(x, y)` lies inside the attack cone.
    ///
    /// The cone is the sector of radius `range` spanning
    /// `facing ± vision_angle`. Both bounds are normalized, so a cone
    /// that straddles angle zero wraps into `[lower, 2π) ∪ [0, upper]`.
    #[must_use]
    pub fn in_attack_cone(&self, x: f32, y: f32) -> bool {
        let here = self.position();
        let point = Vec2::new(x, y);
        if here.distance(point) > self.range {
            return false;
        }

        // A full-circle cone collapses to lower == upper after normalizing
        if self.vision_angle * 2.0 >= TAU {
            return true;
        }

        let bearing = here.bearing_to(point);
        let lower = angle_norm(self.facing_angle - self.vision_angle);
        let upper = angle_norm(self.facing_angle + self.vision_angle);

        if lower > upper {
            (lower <= bearing && bearing < TAU) || (0.0 <= bearing && bearing <= upper)
        } else {
            lower <= bearing && bearing <= upper
        }
    }

    /// Attack readiness in `[0, 1]`, for cooldown feedback.
    #[must_use]
    pub fn attack_progress(&self) -> f32 {
        if self.attack_cooldown <= 0.0 {
            return 1.0;
        }
        (self.attack_clock / self.attack_cooldown).clamp(0.0, 1.0)
    }

    /// Remaining health in `[0, 1]`, for health bars.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }
}
