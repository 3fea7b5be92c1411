//! Planar math utilities for the battlefield.
//!
//! The simulation works in `f32` world units with angles in radians.
//! Angles that are compared against each other must first be brought
//! into `[0, 2π)` with [`angle_norm`].

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A full turn in radians.
pub const TAU: f32 = std::f32::consts::TAU;

/// Reduce any angle to the half-open interval `[0, 2π)`.
///
/// # Example
///
/// ```
/// use battle_core::math::{angle_norm, TAU};
///
/// let a = angle_norm(-std::f32::consts::FRAC_PI_2);
/// assert!((a - 3.0 * std::f32::consts::FRAC_PI_2).abs() < 1e-5);
/// assert!(angle_norm(TAU) < TAU);
/// ```
#[must_use]
pub fn angle_norm(angle: f32) -> f32 {
    let reduced = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if reduced >= TAU {
        0.0
    } else {
        reduced
    }
}

/// 2D vector in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    #[must_use]
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    /// Normalized bearing from `self` towards `other`.
    #[must_use]
    pub fn bearing_to(self, other: Self) -> f32 {
        let d = other - self;
        angle_norm(d.y.atan2(d.x))
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}
