//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs
//! - Declarative range checks via `validator`
//! - Runtime semantic validation
//!
//! Every section is optional; an empty document yields the stock setup
//! (standard gravity, one pendulum at 0.8/0.5 rad, two-second trails).

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::domains::physics::IntegratorKind;
use crate::engine::clock::{DEFAULT_GRAVITY, DEFAULT_TIME_STEP};
use crate::engine::jidoka::JidokaConfig;
use crate::error::{PendulumError, PendulumResult};
use crate::pendulum::{PendulumParameters, DEFAULT_SAMPLE_RATE};

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Gravity, time step and pacing.
    #[validate(nested)]
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Seed for perturbed initial conditions.
    #[serde(default)]
    pub reproducibility: ReproducibilityConfig,

    /// Parameters for newly spawned pendulums.
    #[validate(nested)]
    #[serde(default = "default_body_parameters")]
    pub defaults: PendulumParameters,

    /// Trail sampling.
    #[validate(nested)]
    #[serde(default)]
    pub trace: TraceConfig,

    /// Integrator for new pendulums.
    #[serde(default)]
    pub integrator: IntegratorKind,

    /// Jidoka (stop-on-error) configuration.
    #[serde(default)]
    pub jidoka: JidokaConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

/// Parameters of the first pendulum the application shows.
#[must_use]
pub fn default_body_parameters() -> PendulumParameters {
    PendulumParameters::default().with_angles(0.8, 0.5)
}

impl SimConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> PendulumResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> PendulumResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Run schema and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first failed constraint.
    pub fn check(&self) -> PendulumResult<()> {
        // Poka-Yoke: validate all constraints
        self.validate()?;
        self.validate_semantic()
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::default()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> PendulumResult<()> {
        let sim = &self.simulation;
        if !sim.gravity.is_finite() {
            return Err(PendulumError::config(format!(
                "gravity must be finite, got {}",
                sim.gravity
            )));
        }
        if !sim.time_step.is_finite() || sim.time_step <= 0.0 {
            return Err(PendulumError::config("time_step must be positive"));
        }
        if !sim.speed.is_finite() {
            return Err(PendulumError::config("speed must be finite"));
        }

        self.defaults.check()?;

        let jidoka = &self.jidoka;
        if !(jidoka.energy_tolerance.is_finite() && jidoka.energy_tolerance > 0.0) {
            return Err(PendulumError::config(
                "jidoka.energy_tolerance must be positive",
            ));
        }
        let fraction = jidoka.severity_classifier.warning_fraction;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(PendulumError::config(format!(
                "jidoka warning_fraction must be within [0, 1], got {fraction}"
            )));
        }

        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            simulation: SimulationSettings::default(),
            reproducibility: ReproducibilityConfig::default(),
            defaults: default_body_parameters(),
            trace: TraceConfig::default(),
            integrator: IntegratorKind::default(),
            jidoka: JidokaConfig::default(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct SimConfigBuilder {
    gravity: Option<f64>,
    time_step: Option<f64>,
    speed: Option<f64>,
    start_running: Option<bool>,
    seed: Option<u64>,
    defaults: Option<PendulumParameters>,
    sample_rate: Option<f64>,
    integrator: Option<IntegratorKind>,
    jidoka: Option<JidokaConfig>,
}

impl SimConfigBuilder {
    /// Set gravity.
    #[must_use]
    pub const fn gravity(mut self, gravity: f64) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Set the base time step in seconds.
    #[must_use]
    pub const fn time_step(mut self, dt: f64) -> Self {
        self.time_step = Some(dt);
        self
    }

    /// Set the speed multiplier.
    #[must_use]
    pub const fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Start running or paused.
    #[must_use]
    pub const fn start_running(mut self, running: bool) -> Self {
        self.start_running = Some(running);
        self
    }

    /// Set the random seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set parameters for new pendulums.
    #[must_use]
    pub const fn defaults(mut self, params: PendulumParameters) -> Self {
        self.defaults = Some(params);
        self
    }

    /// Set trail samples per second.
    #[must_use]
    pub const fn sample_rate(mut self, rate: f64) -> Self {
        self.sample_rate = Some(rate);
        self
    }

    /// Set the integrator.
    #[must_use]
    pub const fn integrator(mut self, integrator: IntegratorKind) -> Self {
        self.integrator = Some(integrator);
        self
    }

    /// Set Jidoka configuration.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JidokaConfig doesn't impl Copy
    pub fn jidoka(mut self, config: JidokaConfig) -> Self {
        self.jidoka = Some(config);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SimConfig {
        let mut config = SimConfig::default();

        if let Some(gravity) = self.gravity {
            config.simulation.gravity = gravity;
        }
        if let Some(dt) = self.time_step {
            config.simulation.time_step = dt;
        }
        if let Some(speed) = self.speed {
            config.simulation.speed = speed;
        }
        if let Some(running) = self.start_running {
            config.simulation.start_running = running;
        }
        if let Some(seed) = self.seed {
            config.reproducibility.seed = seed;
        }
        if let Some(defaults) = self.defaults {
            config.defaults = defaults;
        }
        if let Some(rate) = self.sample_rate {
            config.trace.sample_rate = rate;
        }
        if let Some(integrator) = self.integrator {
            config.integrator = integrator;
        }
        if let Some(jidoka) = self.jidoka {
            config.jidoka = jidoka;
        }

        config
    }
}

/// Gravity, time step and pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    /// Gravity; any finite value is accepted.
    #[serde(default = "default_gravity")]
    pub gravity: f64,

    /// Base time step for fixed stepping (seconds).
    #[validate(range(min = 0.000_001, max = 1.0))]
    #[serde(default = "default_time_step")]
    pub time_step: f64,

    /// Speed multiplier applied to frame time.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Whether the simulation runs as soon as it is created.
    #[serde(default = "default_true")]
    pub start_running: bool,
}

const fn default_gravity() -> f64 {
    DEFAULT_GRAVITY
}

const fn default_time_step() -> f64 {
    DEFAULT_TIME_STEP
}

const fn default_speed() -> f64 {
    1.0
}

const fn default_true() -> bool {
    true
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            time_step: default_time_step(),
            speed: default_speed(),
            start_running: true,
        }
    }
}

/// Reproducibility settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReproducibilityConfig {
    /// Master seed for perturbations.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

const fn default_seed() -> u64 {
    42
}

impl Default for ReproducibilityConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

/// Trail sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TraceConfig {
    /// Trail samples recorded per second.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,
}

const fn default_sample_rate() -> f64 {
    DEFAULT_SAMPLE_RATE
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pendulum::Rgb;

    #[test]
    fn test_config_defaults() {
        let config = SimConfig::default();

        assert_eq!(config.schema_version, "1.0");
        assert_eq!(config.reproducibility.seed, 42);
        assert!((config.simulation.gravity - 9.81).abs() < f64::EPSILON);
        assert!((config.simulation.time_step - 0.01).abs() < f64::EPSILON);
        assert!((config.defaults.angle1 - 0.8).abs() < f64::EPSILON);
        assert!((config.defaults.angle2 - 0.5).abs() < f64::EPSILON);
        assert!((config.trace.sample_rate - 60.0).abs() < f64::EPSILON);
        assert_eq!(config.integrator, IntegratorKind::HalfStepVerlet);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = SimConfig::from_yaml("{}").unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_config_builder() {
        let config = SimConfig::builder()
            .gravity(1.62)
            .time_step(0.005)
            .speed(2.0)
            .start_running(false)
            .seed(12345)
            .sample_rate(30.0)
            .integrator(IntegratorKind::Rk4)
            .build();

        assert!((config.simulation.gravity - 1.62).abs() < f64::EPSILON);
        assert!((config.simulation.time_step - 0.005).abs() < f64::EPSILON);
        assert!(!config.simulation.start_running);
        assert_eq!(config.reproducibility.seed, 12345);
        assert_eq!(config.integrator, IntegratorKind::Rk4);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_config_yaml_parse() {
        let yaml = r"
simulation:
  gravity: 3.7
  speed: 0.5
defaults:
  length1: 80.0
  mass2: 20.0
  path_color: [255, 0, 0]
trace:
  sample_rate: 30.0
integrator: rk4
jidoka:
  energy_tolerance: 0.2
";
        let config = SimConfig::from_yaml(yaml).unwrap();
        assert!((config.simulation.gravity - 3.7).abs() < f64::EPSILON);
        assert!((config.defaults.length1 - 80.0).abs() < f64::EPSILON);
        assert_eq!(config.defaults.path_color, Rgb::new(255, 0, 0));
        assert_eq!(config.integrator, IntegratorKind::Rk4);
        assert!((config.jidoka.energy_tolerance - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        assert!(SimConfig::from_yaml("gravity: 9.81\n").is_err());
        assert!(SimConfig::from_yaml("simulation:\n  gravty: 9.81\n").is_err());
    }

    #[test]
    fn test_config_validation_fails_bad_time_step() {
        assert!(SimConfig::from_yaml("simulation:\n  time_step: -0.001\n").is_err());
        assert!(SimConfig::from_yaml("simulation:\n  time_step: 2.0\n").is_err());
    }

    #[test]
    fn test_config_validation_fails_bad_body() {
        let err = SimConfig::from_yaml("defaults:\n  mass1: 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            PendulumError::Validation(_) | PendulumError::InvalidParameter { .. }
        ));
    }

    #[test]
    fn test_config_validation_fails_bad_sample_rate() {
        assert!(SimConfig::from_yaml("trace:\n  sample_rate: 0.0\n").is_err());
    }

    #[test]
    fn test_config_validation_fails_bad_jidoka() {
        let yaml = "jidoka:\n  energy_tolerance: -1.0\n";
        assert!(matches!(
            SimConfig::from_yaml(yaml),
            Err(PendulumError::Config { .. })
        ));
    }

    #[test]
    fn test_builder_output_can_fail_check() {
        let config = SimConfig::builder().gravity(f64::NAN).build();
        assert!(config.check().is_err());
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = SimConfig::load("/nonexistent/pendulum.yaml").unwrap_err();
        assert!(matches!(err, PendulumError::Io(_)));
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        let config = SimConfig::builder().gravity(5.0).build();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back = SimConfig::from_yaml(&yaml).unwrap();
        assert!((back.simulation.gravity - 5.0).abs() < f64::EPSILON);
        assert_eq!(back.defaults, config.defaults);
    }
}
