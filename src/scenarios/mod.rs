//! Pre-built pendulum scenarios.
//!
//! Provides ready-to-use initial conditions, the layout rules for adding
//! pendulums to a running ensemble, and the analytic small-oscillation limit
//! used to check the integrators.

pub mod pendulum;

pub use pendulum::{
    palette_color, small_oscillation_frequencies, stagger_offset, staggered, NormalModes,
    PendulumScenario, STAGGER_SPACING, TRAIL_PALETTE,
};
