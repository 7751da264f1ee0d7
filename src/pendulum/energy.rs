//! Energy accounting for diagnostic display.
//!
//! Uses an up-positive vertical axis (`y = -l cos a`), the opposite of the
//! rendering convention. Potential energy is measured from the lowest point
//! each bob can reach, so a hanging pendulum at rest has zero total energy.

use serde::{Deserialize, Serialize};

use crate::domains::physics::Linkage;
use crate::engine::state::AngularState;

/// Kinetic, potential and total energy of one double pendulum.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Energy {
    /// Kinetic energy.
    pub kinetic: f64,
    /// Gravitational potential energy.
    pub potential: f64,
    /// `kinetic + potential`.
    pub total: f64,
}

impl Energy {
    /// Compute the energy of `state` under `gravity`.
    #[must_use]
    pub fn compute(state: &AngularState, linkage: &Linkage, gravity: f64) -> Self {
        let Linkage {
            length1: l1,
            length2: l2,
            mass1: m1,
            mass2: m2,
        } = *linkage;
        let AngularState {
            angle1: a1,
            angle2: a2,
            velocity1: v1,
            velocity2: v2,
        } = *state;

        let y1 = -l1 * a1.cos();
        let y2 = y1 - l2 * a2.cos();

        let vx1 = l1 * v1 * a1.cos();
        let vy1 = l1 * v1 * a1.sin();
        let vx2 = vx1 + l2 * v2 * a2.cos();
        let vy2 = vy1 + l2 * v2 * a2.sin();

        let kinetic = 0.5 * m1 * (vx1 * vx1 + vy1 * vy1) + 0.5 * m2 * (vx2 * vx2 + vy2 * vy2);
        let potential = m1 * gravity * (y1 + l1) + m2 * gravity * (y2 + l1 + l2);

        Self {
            kinetic,
            potential,
            total: kinetic + potential,
        }
    }

    /// Relative drift of `self.total` from `reference.total`.
    ///
    /// Falls back to the absolute difference when the reference total is
    /// effectively zero.
    #[must_use]
    pub fn relative_drift(&self, reference: &Self) -> f64 {
        let delta = (self.total - reference.total).abs();
        if reference.total.abs() > f64::EPSILON {
            delta / reference.total.abs()
        } else {
            delta
        }
    }

    /// Check if all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.kinetic.is_finite() && self.potential.is_finite() && self.total.is_finite()
    }
}
