//! Domain-specific simulation engines.
//!
//! - Physics: double-pendulum equations of motion and their integrators

pub mod physics;

pub use physics::{
    angular_accelerations, normalize_angle, HalfStepVerletIntegrator, Integrator, IntegratorKind,
    Linkage, RK4Integrator,
};
