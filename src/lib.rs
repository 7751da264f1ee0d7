//! # double-pendulum
//!
//! Interactive double-pendulum dynamics engine.
//!
//! A deterministic, renderer-agnostic simulation core implementing:
//! - Equations of motion for a frictionless double pendulum with a half-step
//!   Verlet integrator (RK4 available as an alternate mode)
//! - Ensembles of independent pendulums with selection, hit-testing and
//!   pointer-drag reparameterization
//! - Fading trails, energy accounting and Jidoka (stop-on-error) guards
//!
//! ## Example
//!
//! ```rust
//! use double_pendulum::prelude::*;
//!
//! let config = SimConfig::builder().gravity(9.81).seed(42).build();
//! let mut sim = Simulation::new(config)?;
//!
//! for _ in 0..60 {
//!     sim.advance(1.0 / 60.0)?;
//!     let frame = sim.render_frame(Vec2::new(400.0, 300.0));
//!     assert_eq!(frame.bodies.len(), 1);
//! }
//! # Ok::<(), PendulumError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Formulas are kept in their textbook form
    clippy::imprecise_flops,
    clippy::many_single_char_names,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
)]

pub mod config;
pub mod domains;
pub mod engine;
pub mod error;
pub mod pendulum;
pub mod scenarios;
pub mod visualization;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{SimConfig, SimConfigBuilder};
    pub use crate::domains::physics::{IntegratorKind, Linkage};
    pub use crate::engine::jidoka::{JidokaConfig, JidokaGuard, JidokaWarning};
    pub use crate::engine::rng::SimRng;
    pub use crate::engine::state::{AngularState, Joint, Vec2};
    pub use crate::engine::{SimTime, Simulation, StepReport};
    pub use crate::error::{PendulumError, PendulumResult};
    pub use crate::pendulum::{
        BodyId, Energy, PathTrace, PendulumBody, PendulumEnsemble, PendulumParameters, Rgb,
    };
    pub use crate::scenarios::PendulumScenario;
    pub use crate::visualization::{BodyFrame, EnsembleFrame};
}

/// Re-export for public API
pub use error::{PendulumError, PendulumResult};
