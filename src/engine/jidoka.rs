//! Jidoka (自働化) - Autonomous anomaly detection.
//!
//! Inspects every body after a step and stops the line when the numbers stop
//! making sense.
//!
//! # Anomaly Types
//!
//! 1. **Non-finite values**: NaN or Inf in an angle, angular velocity or bob
//!    offset. The equations of motion do not guard their denominator, so a
//!    degenerate linkage surfaces here.
//! 2. **Energy drift**: a body's total energy deviates from its reference
//!    energy. The default integrator is not energy-conserving and large
//!    speed multipliers feed it large steps, so drift is reported rather
//!    than fatal unless `halt_on_drift` is set.
//!
//! # Severity Levels
//!
//! - **Acceptable**: Within tolerance, continue normally
//! - **Warning**: Approaching tolerance, log and continue
//! - **Critical**: Tolerance exceeded, report and re-base the reference
//!   (or stop the line with `halt_on_drift`)
//! - **Fatal**: Unrecoverable state, halt immediately
//!
//! Bodies being dragged are skipped; their reference energy is re-recorded
//! once the drag ends, since the user changed the energy on purpose.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PendulumError, PendulumResult};
use crate::pendulum::{BodyId, Energy, PendulumBody, PendulumEnsemble};

/// Severity levels for Jidoka violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Acceptable variance within tolerance (continue).
    Acceptable,
    /// Warning: approaching tolerance boundary (log, continue).
    Warning,
    /// Critical: tolerance exceeded (stop the line).
    Critical,
    /// Fatal: unrecoverable state (halt immediately).
    Fatal,
}

/// Warning from Jidoka check (non-critical issue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaWarning {
    /// Energy drift approaching tolerance.
    EnergyDriftApproaching {
        /// Body whose energy is drifting.
        body: BodyId,
        /// Current relative drift.
        drift: f64,
        /// Tolerance threshold.
        tolerance: f64,
    },
    /// Energy drift exceeded the tolerance; the reference was re-based.
    EnergyDriftExceeded {
        /// Body whose energy drifted.
        body: BodyId,
        /// Relative drift at the time of the report.
        drift: f64,
        /// Tolerance threshold.
        tolerance: f64,
    },
}

/// Classifier for graduated Jidoka responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityClassifier {
    /// Warning threshold as fraction of tolerance (e.g., 0.8 = warn at 80%).
    pub warning_fraction: f64,
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self {
            warning_fraction: 0.8,
        }
    }
}

impl SeverityClassifier {
    /// Create a new severity classifier.
    #[must_use]
    pub const fn new(warning_fraction: f64) -> Self {
        Self { warning_fraction }
    }

    /// Classify energy drift severity.
    #[must_use]
    pub fn classify_energy_drift(&self, drift: f64, tolerance: f64) -> ViolationSeverity {
        if drift.is_nan() || drift.is_infinite() {
            ViolationSeverity::Fatal
        } else if drift > tolerance {
            ViolationSeverity::Critical
        } else if drift > tolerance * self.warning_fraction {
            ViolationSeverity::Warning
        } else {
            ViolationSeverity::Acceptable
        }
    }
}

/// Jidoka guard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JidokaConfig {
    /// NaN/Inf detection enabled.
    pub check_finite: bool,
    /// Enable the energy drift check.
    pub check_energy: bool,
    /// Maximum allowed relative energy drift per body.
    pub energy_tolerance: f64,
    /// Treat drift beyond the tolerance as a violation instead of a warning.
    pub halt_on_drift: bool,
    /// Severity classifier for graduated responses.
    pub severity_classifier: SeverityClassifier,
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            check_finite: true,
            check_energy: true,
            energy_tolerance: 0.1,
            halt_on_drift: false,
            severity_classifier: SeverityClassifier::default(),
        }
    }
}

/// Jidoka guard for autonomous anomaly detection.
///
/// # Example
///
/// ```rust
/// use double_pendulum::engine::jidoka::{JidokaConfig, JidokaGuard};
/// use double_pendulum::pendulum::{PendulumEnsemble, PendulumParameters};
///
/// let mut ensemble = PendulumEnsemble::new();
/// ensemble.create(PendulumParameters::default()).ok();
/// let mut guard = JidokaGuard::new(JidokaConfig::default());
///
/// assert!(guard.check(&ensemble, 9.81).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct JidokaGuard {
    config: JidokaConfig,
    reference_energy: HashMap<BodyId, Energy>,
}

impl JidokaGuard {
    /// Create a new Jidoka guard with given configuration.
    #[must_use]
    pub fn new(config: JidokaConfig) -> Self {
        Self {
            config,
            reference_energy: HashMap::new(),
        }
    }

    /// Check every body for anomalies.
    ///
    /// # Errors
    ///
    /// Returns `NonFiniteValue` for the first offending body, or
    /// `EnergyDrift` when `halt_on_drift` is set.
    pub fn check(&mut self, ensemble: &PendulumEnsemble, gravity: f64) -> PendulumResult<()> {
        self.check_with_warnings(ensemble, gravity).map(|_| ())
    }

    /// Check with graduated severity.
    ///
    /// Returns warnings for drift approaching or exceeding the tolerance
    /// without stopping.
    ///
    /// # Errors
    ///
    /// Returns error for Fatal violations, and for Critical ones when
    /// `halt_on_drift` is set.
    pub fn check_with_warnings(
        &mut self,
        ensemble: &PendulumEnsemble,
        gravity: f64,
    ) -> PendulumResult<Vec<JidokaWarning>> {
        self.reference_energy
            .retain(|id, _| ensemble.get(*id).is_some());

        let mut warnings = Vec::new();
        for body in ensemble.iter() {
            if self.config.check_finite {
                Self::check_finite(body)?;
            }
            if self.config.check_energy {
                if let Some(warning) = self.check_energy(body, gravity)? {
                    warn!(body = %body.id(), ?warning, "energy drift");
                    warnings.push(warning);
                }
            }
        }
        Ok(warnings)
    }

    fn check_finite(body: &PendulumBody) -> PendulumResult<()> {
        let state = body.state();
        let (bob1, bob2) = body.cartesian_positions();
        let fields = [
            ("angle1", state.angle1),
            ("angle2", state.angle2),
            ("velocity1", state.velocity1),
            ("velocity2", state.velocity2),
            ("bob1.x", bob1.x),
            ("bob1.y", bob1.y),
            ("bob2.x", bob2.x),
            ("bob2.y", bob2.y),
        ];
        match fields.iter().find(|(_, value)| !value.is_finite()) {
            Some((name, _)) => Err(PendulumError::NonFiniteValue {
                location: format!("body {}: {name}", body.id()),
            }),
            None => Ok(()),
        }
    }

    fn check_energy(
        &mut self,
        body: &PendulumBody,
        gravity: f64,
    ) -> PendulumResult<Option<JidokaWarning>> {
        let id = body.id();
        if body.is_dragging() {
            self.reference_energy.remove(&id);
            return Ok(None);
        }

        let current = body.energy(gravity);
        let Some(&reference) = self.reference_energy.get(&id) else {
            if current.is_finite() {
                self.reference_energy.insert(id, current);
            }
            return Ok(None);
        };

        // A body hanging at rest has no energy to drift from.
        if reference.total.abs() < f64::EPSILON {
            return Ok(None);
        }

        let drift = current.relative_drift(&reference);
        let tolerance = self.config.energy_tolerance;
        match self
            .config
            .severity_classifier
            .classify_energy_drift(drift, tolerance)
        {
            ViolationSeverity::Acceptable => Ok(None),
            ViolationSeverity::Warning => Ok(Some(JidokaWarning::EnergyDriftApproaching {
                body: id,
                drift,
                tolerance,
            })),
            ViolationSeverity::Critical if self.config.halt_on_drift => {
                Err(PendulumError::EnergyDrift {
                    body: id,
                    drift,
                    tolerance,
                })
            }
            ViolationSeverity::Critical => {
                self.reference_energy.insert(id, current);
                Ok(Some(JidokaWarning::EnergyDriftExceeded {
                    body: id,
                    drift,
                    tolerance,
                }))
            }
            ViolationSeverity::Fatal => Err(PendulumError::NonFiniteValue {
                location: format!("body {id}: energy"),
            }),
        }
    }

    /// Drop the reference energy of one body (after its parameters changed).
    pub fn forget(&mut self, id: BodyId) {
        self.reference_energy.remove(&id);
    }

    /// Reset the guard (clear all reference energies).
    pub fn reset(&mut self) {
        self.reference_energy.clear();
    }

    /// Reference energy recorded for a body.
    #[must_use]
    pub fn reference_energy(&self, id: BodyId) -> Option<f64> {
        self.reference_energy.get(&id).map(|energy| energy.total)
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }
}
