//! Error types for the pendulum engine.
//!
//! All fallible operations return `Result<T, PendulumError>` instead of
//! panicking. Domain conditions (bad parameters, unknown ids) are values the
//! caller can match on.

use thiserror::Error;

use crate::pendulum::BodyId;

/// Result type alias for pendulum operations.
pub type PendulumResult<T> = Result<T, PendulumError>;

/// Unified error type for all pendulum operations.
#[derive(Debug, Error)]
pub enum PendulumError {
    // ===== Jidoka Violations =====
    /// Numerical instability detected (NaN or Inf).
    #[error("Jidoka: non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    /// Energy drift of one body beyond tolerance.
    #[error("Jidoka: body {body} energy drift {drift:.6e} exceeds tolerance {tolerance:.6e}")]
    EnergyDrift {
        /// Body whose energy drifted.
        body: BodyId,
        /// Relative energy drift from the reference energy.
        drift: f64,
        /// Configured tolerance threshold.
        tolerance: f64,
    },

    // ===== Domain Errors =====
    /// A parameter was rejected; the previous value is still in place.
    #[error("Invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name (e.g. `length1`).
        name: String,
        /// The rejected value.
        value: f64,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// No body with this id exists in the ensemble.
    #[error("Pendulum {0} not found")]
    BodyNotFound(BodyId),

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PendulumError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid-parameter error.
    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value,
            reason,
        }
    }

    /// Check if this error is a Jidoka violation (simulation health problem).
    #[must_use]
    pub const fn is_jidoka_violation(&self) -> bool {
        matches!(self, Self::NonFiniteValue { .. } | Self::EnergyDrift { .. })
    }
}

/// Reject non-positive or non-finite values.
pub(crate) fn require_positive(name: impl Into<String>, value: f64) -> PendulumResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PendulumError::invalid_parameter(
            name,
            value,
            "must be a positive, finite number",
        ))
    }
}

/// Reject negative or non-finite values.
pub(crate) fn require_non_negative(name: impl Into<String>, value: f64) -> PendulumResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PendulumError::invalid_parameter(
            name,
            value,
            "must be a non-negative, finite number",
        ))
    }
}
