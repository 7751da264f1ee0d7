//! Double-pendulum scenarios.
//!
//! Ready-made initial conditions and the analytic small-oscillation limit:
//! - Small-angle pendulum (linear regime, two normal modes)
//! - Large-angle pendulum (nonlinear but mostly regular)
//! - Chaotic pendulum (near-inverted start)
//!
//! Also the "add pendulum" layout: each new pendulum is staggered on a 3-wide
//! grid and gets the next color of a six-color palette.

use serde::{Deserialize, Serialize};

use crate::engine::rng::SimRng;
use crate::engine::state::Vec2;
use crate::pendulum::{PendulumParameters, Rgb};

/// Trail colors handed out to successive pendulums.
pub const TRAIL_PALETTE: [Rgb; 6] = [
    Rgb::new(0, 128, 255),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(255, 0, 255),
    Rgb::new(0, 255, 255),
];

/// Grid spacing between staggered anchors (screen units).
pub const STAGGER_SPACING: f64 = 20.0;

/// Anchor offset for a pendulum added when `existing` are already present.
///
/// The first pendulum sits at the origin; later ones fill a 3-wide grid
/// starting at `(-20, -20)`.
#[must_use]
pub fn stagger_offset(existing: usize) -> Vec2 {
    if existing == 0 {
        return Vec2::zero();
    }
    let column = (existing % 3) as f64;
    let row = (existing / 3) as f64;
    Vec2::new(
        column * STAGGER_SPACING - STAGGER_SPACING,
        row * STAGGER_SPACING - STAGGER_SPACING,
    )
}

/// Palette color for the pendulum added after `existing` others.
#[must_use]
pub const fn palette_color(existing: usize) -> Rgb {
    TRAIL_PALETTE[existing % TRAIL_PALETTE.len()]
}

/// `defaults` moved to the staggered slot and recolored for the pendulum
/// added after `existing` others.
#[must_use]
pub fn staggered(defaults: &PendulumParameters, existing: usize) -> PendulumParameters {
    let offset = stagger_offset(existing);
    defaults
        .with_offset(offset.x, offset.y)
        .with_color(palette_color(existing))
}

/// Angular frequencies (rad/s) of the two normal modes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalModes {
    /// In-phase mode (rods swing together).
    pub slow: f64,
    /// Anti-phase mode.
    pub fast: f64,
}

impl NormalModes {
    /// Periods `(slow, fast)` in seconds.
    #[must_use]
    pub fn periods(&self) -> (f64, f64) {
        (
            std::f64::consts::TAU / self.slow,
            std::f64::consts::TAU / self.fast,
        )
    }
}

/// Small-oscillation normal modes of a double pendulum.
///
/// Solves the linearized equations `det(K - ω²M) = 0`. Returns `None`
/// when gravity is not positive (no restoring force).
#[must_use]
pub fn small_oscillation_frequencies(
    params: &PendulumParameters,
    gravity: f64,
) -> Option<NormalModes> {
    if !(gravity.is_finite() && gravity > 0.0) {
        return None;
    }
    let (l1, l2, m1, m2) = (params.length1, params.length2, params.mass1, params.mass2);
    let total = m1 + m2;

    let a = m1 * m2 * l1 * l1 * l2 * l2;
    let b = -total * m2 * gravity * l1 * l2 * (l1 + l2);
    let c = total * m2 * gravity * gravity * l1 * l2;

    let discriminant = b * b - 4.0 * a * c;
    if a <= 0.0 || discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let slow_sq = (-b - root) / (2.0 * a);
    let fast_sq = (-b + root) / (2.0 * a);

    Some(NormalModes {
        slow: slow_sq.sqrt(),
        fast: fast_sq.sqrt(),
    })
}

/// A named initial condition together with the gravity it is meant for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendulumScenario {
    params: PendulumParameters,
    gravity: f64,
}

impl PendulumScenario {
    /// Create a scenario.
    #[must_use]
    pub const fn new(params: PendulumParameters, gravity: f64) -> Self {
        Self { params, gravity }
    }

    /// Small swing along the in-phase normal mode of an equal-mass,
    /// equal-length pendulum (`a2 = √2 · a1`).
    #[must_use]
    pub fn small_angle() -> Self {
        let a1 = 0.01;
        Self::new(
            PendulumParameters::default().with_angles(a1, std::f64::consts::SQRT_2 * a1),
            9.81,
        )
    }

    /// The application's stock start (0.8 and 0.5 rad).
    #[must_use]
    pub fn large_angle() -> Self {
        Self::new(PendulumParameters::default().with_angles(0.8, 0.5), 9.81)
    }

    /// Near-inverted start that quickly becomes chaotic.
    #[must_use]
    pub fn chaotic() -> Self {
        Self::new(PendulumParameters::default().with_angles(2.5, 2.0), 9.81)
    }

    /// Initial parameters.
    #[must_use]
    pub const fn params(&self) -> &PendulumParameters {
        &self.params
    }

    /// Gravity the scenario is meant for.
    #[must_use]
    pub const fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Normal modes of this scenario's linkage.
    #[must_use]
    pub fn normal_modes(&self) -> Option<NormalModes> {
        small_oscillation_frequencies(&self.params, self.gravity)
    }

    /// `count` near-identical copies, each angle nudged by up to `epsilon`
    /// and colored from [`TRAIL_PALETTE`].
    ///
    /// Copy `i` draws from its own partitioned stream, so asking for more
    /// copies never changes the earlier ones.
    #[must_use]
    pub fn twins(&self, count: usize, epsilon: f64, rng: &mut SimRng) -> Vec<PendulumParameters> {
        rng.partition(count)
            .iter_mut()
            .enumerate()
            .map(|(i, stream)| {
                self.params
                    .perturbed(stream, epsilon)
                    .with_color(palette_color(i))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domains::physics::IntegratorKind;
    use crate::engine::state::AngularState;

    #[test]
    fn test_stagger_layout() {
        assert_eq!(stagger_offset(0), Vec2::zero());
        assert_eq!(stagger_offset(1), Vec2::new(0.0, -20.0));
        assert_eq!(stagger_offset(2), Vec2::new(20.0, -20.0));
        assert_eq!(stagger_offset(3), Vec2::new(-20.0, 0.0));
        assert_eq!(stagger_offset(7), Vec2::new(0.0, 20.0));
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(0), Rgb::new(0, 128, 255));
        assert_eq!(palette_color(1), Rgb::new(255, 0, 0));
        assert_eq!(palette_color(6), palette_color(0));
    }

    #[test]
    fn test_staggered_keeps_physics() {
        let defaults = PendulumParameters::default().with_angles(0.8, 0.5);
        let p = staggered(&defaults, 4);
        assert_eq!(p.offset, Vec2::new(0.0, 0.0));
        assert_eq!(p.path_color, Rgb::new(255, 0, 255));
        assert_eq!(p.linkage(), defaults.linkage());
        assert_eq!(p.angular_state(), defaults.angular_state());
    }

    #[test]
    fn test_equal_linkage_frequencies() {
        // Equal masses and lengths: ω² = (2 ∓ √2) g / l
        let params = PendulumParameters::default();
        let modes = small_oscillation_frequencies(&params, 9.81).unwrap();
        let base = 9.81 / 120.0;
        let sqrt2 = std::f64::consts::SQRT_2;
        assert!((modes.slow.powi(2) - (2.0 - sqrt2) * base).abs() < 1e-12);
        assert!((modes.fast.powi(2) - (2.0 + sqrt2) * base).abs() < 1e-12);
        assert!(modes.slow < modes.fast);
    }

    #[test]
    fn test_no_modes_without_gravity() {
        let params = PendulumParameters::default();
        assert!(small_oscillation_frequencies(&params, 0.0).is_none());
        assert!(small_oscillation_frequencies(&params, -9.81).is_none());
        assert!(small_oscillation_frequencies(&params, f64::NAN).is_none());
    }

    #[test]
    fn test_slow_mode_period_matches_integration() {
        let scenario = PendulumScenario::small_angle();
        let (period, _) = scenario.normal_modes().unwrap().periods();
        let linkage = scenario.params().linkage();
        let mut state = scenario.params().angular_state();
        let start = state;

        let dt = 0.001;
        let steps = (period / dt).round() as usize;
        for _ in 0..steps {
            IntegratorKind::Rk4.step(&mut state, &linkage, scenario.gravity(), dt);
        }

        assert!((state.angle1 - start.angle1).abs() < 1e-4, "{state:?}");
        assert!((state.angle2 - start.angle2).abs() < 1e-4, "{state:?}");
    }

    #[test]
    fn test_slow_mode_half_period_flips_sign() {
        let scenario = PendulumScenario::small_angle();
        let (period, _) = scenario.normal_modes().unwrap().periods();
        let linkage = scenario.params().linkage();
        let mut state: AngularState = scenario.params().angular_state();

        let dt = 0.001;
        let steps = (0.5 * period / dt).round() as usize;
        for _ in 0..steps {
            IntegratorKind::HalfStepVerlet.step(&mut state, &linkage, scenario.gravity(), dt);
        }

        assert!((state.angle1 + 0.01).abs() < 1e-4, "{state:?}");
    }

    #[test]
    fn test_presets_are_valid() {
        for scenario in [
            PendulumScenario::small_angle(),
            PendulumScenario::large_angle(),
            PendulumScenario::chaotic(),
        ] {
            assert!(scenario.params().check().is_ok());
            assert!((scenario.gravity() - 9.81).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_twins_are_stable_prefixes() {
        let scenario = PendulumScenario::chaotic();
        let three = scenario.twins(3, 1e-6, &mut SimRng::new(42));
        let five = scenario.twins(5, 1e-6, &mut SimRng::new(42));

        assert_eq!(three.len(), 3);
        assert_eq!(&five[..3], &three[..]);
        assert_ne!(three[0].angle1, three[1].angle1);
        for (i, twin) in five.iter().enumerate() {
            assert!((twin.angle1 - 2.5).abs() <= 1e-6);
            assert_eq!(twin.path_color, palette_color(i));
        }
    }
}
