//! Double-pendulum equations of motion and integrators.
//!
//! Implements numerical integration of the angular state:
//! - Half-step Verlet (default, reproduces the legacy trajectories)
//! - RK4 (4th order, opt-in)
//!
//! # Equations of Motion
//!
//! Lagrangian double pendulum with point masses on massless rods:
//!
//! ```text
//! α1 = [ -g(2m1+m2)sin(a1) - m2 g sin(a1-2a2)
//!        - 2 sin(a1-a2) m2 (v2² l2 + v1² l1 cos(a1-a2)) ]
//!      / [ l1 (2m1+m2 - m2 cos(2a1-2a2)) ]
//!
//! α2 = 2 sin(a1-a2) [ v1² l1 (m1+m2) + g(m1+m2) cos(a1) + v2² l2 m2 cos(a1-a2) ]
//!      / [ l2 (2m1+m2 - m2 cos(2a1-2a2)) ]
//! ```
//!
//! The shared denominator is not guarded. A degenerate configuration yields
//! huge or non-finite accelerations, which callers observe through
//! [`AngularState::is_finite`].

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::engine::state::{AngularState, Joint};

/// Rod lengths and bob masses of a double pendulum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Linkage {
    /// Length of the first rod.
    pub length1: f64,
    /// Length of the second rod.
    pub length2: f64,
    /// Mass of the first bob.
    pub mass1: f64,
    /// Mass of the second bob.
    pub mass2: f64,
}

impl Linkage {
    /// Create a new linkage.
    #[must_use]
    pub const fn new(length1: f64, length2: f64, mass1: f64, mass2: f64) -> Self {
        Self {
            length1,
            length2,
            mass1,
            mass2,
        }
    }

    /// Rod length of the given joint.
    #[must_use]
    pub const fn length(&self, joint: Joint) -> f64 {
        match joint {
            Joint::First => self.length1,
            Joint::Second => self.length2,
        }
    }

    /// Bob mass of the given joint.
    #[must_use]
    pub const fn mass(&self, joint: Joint) -> f64 {
        match joint {
            Joint::First => self.mass1,
            Joint::Second => self.mass2,
        }
    }

    pub(crate) fn set_length(&mut self, joint: Joint, value: f64) {
        match joint {
            Joint::First => self.length1 = value,
            Joint::Second => self.length2 = value,
        }
    }

    pub(crate) fn set_mass(&mut self, joint: Joint, value: f64) {
        match joint {
            Joint::First => self.mass1 = value,
            Joint::Second => self.mass2 = value,
        }
    }
}

/// Angular accelerations `(α1, α2)` at the given state.
///
/// Both accelerations depend on the angular velocities as well as the angles.
#[must_use]
pub fn angular_accelerations(state: &AngularState, linkage: &Linkage, gravity: f64) -> (f64, f64) {
    let g = gravity;
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

    let bracket = 2.0 * m1 + m2 - m2 * (2.0 * a1 - 2.0 * a2).cos();

    let num1 = -g * (2.0 * m1 + m2) * a1.sin();
    let num2 = -m2 * g * (a1 - 2.0 * a2).sin();
    let num3 = -2.0 * (a1 - a2).sin() * m2 * (v2 * v2 * l2 + v1 * v1 * l1 * (a1 - a2).cos());
    let alpha1 = (num1 + num2 + num3) / (l1 * bracket);

    let lead = 2.0 * (a1 - a2).sin();
    let inner = v1 * v1 * l1 * (m1 + m2) + g * (m1 + m2) * a1.cos();
    let tail = v2 * v2 * l2 * m2 * (a1 - a2).cos();
    let alpha2 = lead * (inner + tail) / (l2 * bracket);

    (alpha1, alpha2)
}

/// Wrap an angle into `(-π, π]`.
///
/// Non-finite input stays non-finite.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = PI - (PI - angle).rem_euclid(TAU);
    // rem_euclid may round up to exactly TAU for tiny negative remainders
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Numerical integrator trait.
pub trait Integrator {
    /// Step the angular state forward by one timestep.
    fn step(&self, state: &mut AngularState, linkage: &Linkage, gravity: f64, dt: f64);

    /// Get the error order of this integrator.
    fn error_order(&self) -> u32;

    /// Check if integrator is symplectic (preserves phase space volume).
    fn is_symplectic(&self) -> bool;
}

/// Half-step velocity-Verlet scheme.
///
/// Algorithm:
/// ```text
/// α_old   = α(a_n, v_n)
/// v_half  = v_n + (h/2) * α_old
/// a_{n+1} = wrap(a_n + h * v_half)
/// α_new   = α(a_{n+1}, v_half)
/// v_{n+1} = v_half + (h/2) * α_new
/// ```
///
/// Because α depends on velocity, this is not the textbook method and is not
/// symplectic. It is the default integrator and the one the energy
/// tolerances are tuned for.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfStepVerletIntegrator;

impl HalfStepVerletIntegrator {
    /// Create a new half-step Verlet integrator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Integrator for HalfStepVerletIntegrator {
    fn step(&self, state: &mut AngularState, linkage: &Linkage, gravity: f64, dt: f64) {
        let (accel1_old, accel2_old) = angular_accelerations(state, linkage, gravity);

        state.velocity1 += 0.5 * accel1_old * dt;
        state.velocity2 += 0.5 * accel2_old * dt;

        state.angle1 = normalize_angle(state.angle1 + state.velocity1 * dt);
        state.angle2 = normalize_angle(state.angle2 + state.velocity2 * dt);

        let (accel1_new, accel2_new) = angular_accelerations(state, linkage, gravity);

        state.velocity1 += 0.5 * accel1_new * dt;
        state.velocity2 += 0.5 * accel2_new * dt;
    }

    fn error_order(&self) -> u32 {
        2
    }

    fn is_symplectic(&self) -> bool {
        false
    }
}

/// Runge-Kutta 4th order integrator.
///
/// Classical RK4 over `y = (a1, a2, v1, v2)` with `y' = (v1, v2, α1, α2)`.
/// Angles are wrapped once, after the final combination.
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4Integrator;

impl RK4Integrator {
    /// Create a new RK4 integrator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn derivative(state: &AngularState, linkage: &Linkage, gravity: f64) -> AngularState {
        let (alpha1, alpha2) = angular_accelerations(state, linkage, gravity);
        AngularState::new(state.velocity1, state.velocity2, alpha1, alpha2)
    }

    fn offset(base: &AngularState, slope: &AngularState, h: f64) -> AngularState {
        AngularState::new(
            base.angle1 + slope.angle1 * h,
            base.angle2 + slope.angle2 * h,
            base.velocity1 + slope.velocity1 * h,
            base.velocity2 + slope.velocity2 * h,
        )
    }
}

impl Integrator for RK4Integrator {
    fn step(&self, state: &mut AngularState, linkage: &Linkage, gravity: f64, dt: f64) {
        let half_dt = dt / 2.0;
        let sixth_dt = dt / 6.0;
        let initial = *state;

        let k1 = Self::derivative(&initial, linkage, gravity);
        let k2 = Self::derivative(&Self::offset(&initial, &k1, half_dt), linkage, gravity);
        let k3 = Self::derivative(&Self::offset(&initial, &k2, half_dt), linkage, gravity);
        let k4 = Self::derivative(&Self::offset(&initial, &k3, dt), linkage, gravity);

        let combine = |y: f64, a: f64, b: f64, c: f64, d: f64| {
            y + (a + 2.0 * b + 2.0 * c + d) * sixth_dt
        };

        state.angle1 = normalize_angle(combine(
            initial.angle1,
            k1.angle1,
            k2.angle1,
            k3.angle1,
            k4.angle1,
        ));
        state.angle2 = normalize_angle(combine(
            initial.angle2,
            k1.angle2,
            k2.angle2,
            k3.angle2,
            k4.angle2,
        ));
        state.velocity1 = combine(
            initial.velocity1,
            k1.velocity1,
            k2.velocity1,
            k3.velocity1,
            k4.velocity1,
        );
        state.velocity2 = combine(
            initial.velocity2,
            k1.velocity2,
            k2.velocity2,
            k3.velocity2,
            k4.velocity2,
        );
    }

    fn error_order(&self) -> u32 {
        4
    }

    fn is_symplectic(&self) -> bool {
        false
    }
}

/// Integrator selection for a pendulum body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorKind {
    /// Half-step Verlet (default).
    #[default]
    HalfStepVerlet,
    /// Classical fourth-order Runge-Kutta (higher fidelity, alternate mode).
    Rk4,
}

impl IntegratorKind {
    /// The integrator implementing this kind.
    #[must_use]
    pub fn integrator(self) -> &'static dyn Integrator {
        match self {
            Self::HalfStepVerlet => &HalfStepVerletIntegrator,
            Self::Rk4 => &RK4Integrator,
        }
    }

    /// Step the state with the selected integrator.
    pub fn step(self, state: &mut AngularState, linkage: &Linkage, gravity: f64, dt: f64) {
        self.integrator().step(state, linkage, gravity, dt);
    }
}
