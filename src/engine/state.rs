//! Pendulum state primitives.
//!
//! Implements the small value types every other module shares:
//! - Planar vectors for bob offsets and pointer positions
//! - Joint selectors for the two hinges of a double pendulum
//! - The angular state (angles and angular velocities)

use serde::{Deserialize, Serialize};

/// 2D vector for positions, offsets and pointer coordinates.
///
/// Screen convention: x grows to the right, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vec2 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Magnitude squared.
    #[must_use]
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Magnitude (length).
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).magnitude()
    }

    /// Angle of the vector measured with `atan2(y, x)`.
    #[must_use]
    pub fn atan2(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Scale by scalar.
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
        }
    }

    /// Check if all components are finite.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // is_finite not const
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// One of the two hinges (and the rod/bob hanging from it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    /// Anchor hinge: first rod and first bob.
    First,
    /// Elbow hinge: second rod and second bob.
    Second,
}

impl Joint {
    /// Both joints, anchor first.
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    /// One-based index as used in UI labels (`1` or `2`).
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl std::fmt::Display for Joint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Angular state of a double pendulum.
///
/// Angles are in radians measured from the downward vertical.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AngularState {
    /// Angle of the first rod.
    pub angle1: f64,
    /// Angle of the second rod.
    pub angle2: f64,
    /// Angular velocity of the first rod (rad/s).
    pub velocity1: f64,
    /// Angular velocity of the second rod (rad/s).
    pub velocity2: f64,
}

impl AngularState {
    /// Create a new angular state.
    #[must_use]
    pub const fn new(angle1: f64, angle2: f64, velocity1: f64, velocity2: f64) -> Self {
        Self {
            angle1,
            angle2,
            velocity1,
            velocity2,
        }
    }

    /// Angle of the given joint.
    #[must_use]
    pub const fn angle(&self, joint: Joint) -> f64 {
        match joint {
            Joint::First => self.angle1,
            Joint::Second => self.angle2,
        }
    }

    /// Angular velocity of the given joint.
    #[must_use]
    pub const fn velocity(&self, joint: Joint) -> f64 {
        match joint {
            Joint::First => self.velocity1,
            Joint::Second => self.velocity2,
        }
    }

    /// Set the angle of the given joint.
    pub fn set_angle(&mut self, joint: Joint, value: f64) {
        match joint {
            Joint::First => self.angle1 = value,
            Joint::Second => self.angle2 = value,
        }
    }

    /// Set the angular velocity of the given joint.
    pub fn set_velocity(&mut self, joint: Joint, value: f64) {
        match joint {
            Joint::First => self.velocity1 = value,
            Joint::Second => self.velocity2 = value,
        }
    }

    /// Zero both angular velocities.
    pub fn halt(&mut self) {
        self.velocity1 = 0.0;
        self.velocity2 = 0.0;
    }

    /// Check if all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.angle1.is_finite()
            && self.angle2.is_finite()
            && self.velocity1.is_finite()
            && self.velocity2.is_finite()
    }
}
