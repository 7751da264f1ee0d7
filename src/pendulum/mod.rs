//! Double-pendulum bodies and the ensemble that owns them.
//!
//! - [`PendulumParameters`]: initial configuration of one pendulum
//! - [`PathTrace`]: bounded trail of recent second-bob positions
//! - [`PendulumBody`]: integration, drag reparameterization, energy
//! - [`PendulumEnsemble`]: keyed collection with selection and hit-testing

pub mod body;
pub mod energy;
pub mod ensemble;
pub mod params;
pub mod trace;

use serde::{Deserialize, Serialize};

pub use body::{DragState, PendulumBody, HIT_RADIUS_MIN, MIN_DRAG_LENGTH};
pub use energy::Energy;
pub use ensemble::PendulumEnsemble;
pub use params::{PendulumParameters, Rgb};
pub use trace::{PathTrace, DEFAULT_SAMPLE_RATE};

/// Identifier of a body within its ensemble.
///
/// Ids are allocated from a monotonically increasing counter and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct BodyId(u64);

impl BodyId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
