//! Pendulum creation parameters.

use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domains::physics::Linkage;
use crate::engine::rng::SimRng;
use crate::engine::state::{AngularState, Vec2};
use crate::error::{require_non_negative, require_positive, PendulumResult};

/// 8-bit RGB color for trails.
///
/// Serialized as a `[r, g, b]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Initial configuration of one double pendulum.
///
/// Lengths and masses must be positive. Angles are radians from the downward
/// vertical and are not wrapped until the first integration step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct PendulumParameters {
    /// Offset of the anchor from the screen origin supplied by the renderer.
    pub offset: Vec2,
    /// Length of the first rod.
    #[validate(range(exclusive_min = 0.0))]
    pub length1: f64,
    /// Length of the second rod.
    #[validate(range(exclusive_min = 0.0))]
    pub length2: f64,
    /// Mass of the first bob.
    #[validate(range(exclusive_min = 0.0))]
    pub mass1: f64,
    /// Mass of the second bob.
    #[validate(range(exclusive_min = 0.0))]
    pub mass2: f64,
    /// Initial angle of the first rod (radians).
    pub angle1: f64,
    /// Initial angle of the second rod (radians).
    pub angle2: f64,
    /// Initial angular velocity of the first rod (rad/s).
    pub velocity1: f64,
    /// Initial angular velocity of the second rod (rad/s).
    pub velocity2: f64,
    /// Trail color.
    pub path_color: Rgb,
    /// How long a trail sample stays visible (seconds).
    #[validate(range(min = 0.0))]
    pub path_duration: f64,
    /// Whether rods are drawn.
    pub show_wire: bool,
}

impl Default for PendulumParameters {
    fn default() -> Self {
        Self {
            offset: Vec2::zero(),
            length1: 120.0,
            length2: 120.0,
            mass1: 10.0,
            mass2: 10.0,
            angle1: FRAC_PI_4,
            angle2: FRAC_PI_4,
            velocity1: 0.0,
            velocity2: 0.0,
            path_color: Rgb::new(0, 128, 255),
            path_duration: 2.0,
            show_wire: true,
        }
    }
}

impl PendulumParameters {
    /// Check the physical invariants (positive lengths and masses, finite
    /// non-negative trail duration).
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first offending field.
    pub fn check(&self) -> PendulumResult<()> {
        require_positive("length1", self.length1)?;
        require_positive("length2", self.length2)?;
        require_positive("mass1", self.mass1)?;
        require_positive("mass2", self.mass2)?;
        require_non_negative("path_duration", self.path_duration)?;
        Ok(())
    }

    /// Set the anchor offset.
    #[must_use]
    pub const fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    /// Set both rod lengths.
    #[must_use]
    pub const fn with_lengths(mut self, length1: f64, length2: f64) -> Self {
        self.length1 = length1;
        self.length2 = length2;
        self
    }

    /// Set both bob masses.
    #[must_use]
    pub const fn with_masses(mut self, mass1: f64, mass2: f64) -> Self {
        self.mass1 = mass1;
        self.mass2 = mass2;
        self
    }

    /// Set both initial angles.
    #[must_use]
    pub const fn with_angles(mut self, angle1: f64, angle2: f64) -> Self {
        self.angle1 = angle1;
        self.angle2 = angle2;
        self
    }

    /// Set both initial angular velocities.
    #[must_use]
    pub const fn with_velocities(mut self, velocity1: f64, velocity2: f64) -> Self {
        self.velocity1 = velocity1;
        self.velocity2 = velocity2;
        self
    }

    /// Set the trail color.
    #[must_use]
    pub const fn with_color(mut self, color: Rgb) -> Self {
        self.path_color = color;
        self
    }

    /// Set the trail duration in seconds.
    #[must_use]
    pub const fn with_path_duration(mut self, seconds: f64) -> Self {
        self.path_duration = seconds;
        self
    }

    /// Rod lengths and masses.
    #[must_use]
    pub const fn linkage(&self) -> Linkage {
        Linkage::new(self.length1, self.length2, self.mass1, self.mass2)
    }

    /// Initial angles and angular velocities.
    #[must_use]
    pub const fn angular_state(&self) -> AngularState {
        AngularState::new(self.angle1, self.angle2, self.velocity1, self.velocity2)
    }

    /// Copy with both angles nudged by independent uniform noise in
    /// `[-epsilon, epsilon)`.
    ///
    /// Two pendulums built from a configuration and its perturbed copy are the
    /// usual way to watch trajectories diverge.
    #[must_use]
    pub fn perturbed(&self, rng: &mut SimRng, epsilon: f64) -> Self {
        let epsilon = epsilon.abs();
        let mut twin = *self;
        twin.angle1 += rng.gen_range_f64(-epsilon, epsilon);
        twin.angle2 += rng.gen_range_f64(-epsilon, epsilon);
        twin
    }
}
