//! Core simulation engine.
//!
//! Implements the central simulation loop with:
//! - A clock holding gravity, time step, speed and the run/pause flag
//! - Deterministic RNG (PCG with partitioned seeds)
//! - Jidoka guards for stop-on-error
//! - The [`Simulation`] driver that forwards all of it to the ensemble

pub mod clock;
pub mod jidoka;
pub mod rng;
pub mod state;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use clock::SimulationClock;
pub use jidoka::{JidokaConfig, JidokaGuard, JidokaWarning};
pub use rng::SimRng;

use crate::config::SimConfig;
use crate::engine::state::{Joint, Vec2};
use crate::error::{require_non_negative, PendulumError, PendulumResult};
use crate::pendulum::{BodyId, PendulumBody, PendulumEnsemble, PendulumParameters};
use crate::scenarios::staggered;
use crate::visualization::EnsembleFrame;

/// Simulation time representation.
///
/// Uses a fixed-point representation for reproducibility across platforms.
/// Internal representation is in nanoseconds to avoid floating-point issues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SimTime {
    /// Time in nanoseconds from simulation start.
    nanos: u64,
}

impl SimTime {
    /// Zero time (simulation start).
    pub const ZERO: Self = Self { nanos: 0 };

    /// Create time from seconds.
    ///
    /// Negative and NaN inputs clamp to zero; overly large ones saturate.
    #[must_use]
    pub fn from_secs(secs: f64) -> Self {
        // float-to-int `as` saturates and maps NaN to 0
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let nanos = (secs * 1_000_000_000.0) as u64;
        Self { nanos }
    }

    /// Create time from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Get time as seconds (f64).
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    /// Get time as nanoseconds.
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.nanos
    }
}

impl std::ops::Add for SimTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            nanos: self.nanos.saturating_add(rhs.nanos),
        }
    }
}

impl std::ops::Sub for SimTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            nanos: self.nanos.saturating_sub(rhs.nanos),
        }
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.9}s", self.as_secs_f64())
    }
}

/// Outcome of one [`Simulation::advance`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Time step actually applied (frame time times speed), zero when paused.
    pub dt: f64,
    /// Whether the bodies were integrated.
    pub stepped: bool,
    /// Energy drift warnings that did not stop the simulation.
    pub warnings: Vec<JidokaWarning>,
}

/// Main simulation driver.
///
/// Coordinates all subsystems:
/// - Clock (gravity, time step, speed, pause)
/// - Pendulum ensemble and selection
/// - Jidoka monitoring
/// - Seeded perturbations for twin pendulums
#[derive(Debug, Clone)]
pub struct Simulation {
    clock: SimulationClock,
    ensemble: PendulumEnsemble,
    jidoka: JidokaGuard,
    rng: SimRng,
    defaults: PendulumParameters,
}

impl Simulation {
    /// Create a simulation from configuration and spawn the first pendulum.
    ///
    /// # Errors
    ///
    /// Returns error if configuration validation fails.
    pub fn new(config: SimConfig) -> PendulumResult<Self> {
        config.check()?;

        let settings = &config.simulation;
        let mut clock = SimulationClock::new(settings.gravity, settings.time_step)?;
        clock.set_speed(settings.speed)?;
        clock.set_running(settings.start_running);

        let ensemble = PendulumEnsemble::with_sample_rate(config.trace.sample_rate)?
            .with_integrator(config.integrator);

        let mut sim = Self {
            clock,
            ensemble,
            jidoka: JidokaGuard::new(config.jidoka),
            rng: SimRng::new(config.reproducibility.seed),
            defaults: config.defaults,
        };
        sim.spawn_default()?;

        info!(
            seed = config.reproducibility.seed,
            gravity = settings.gravity,
            integrator = ?config.integrator,
            "simulation created"
        );
        Ok(sim)
    }

    /// Advance by one rendered frame of `frame_dt` seconds.
    ///
    /// Bodies are only integrated while running, with the frame time scaled
    /// by the speed multiplier. The Jidoka guard runs either way.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a negative or non-finite frame time,
    /// or the Jidoka violation that stopped the simulation.
    pub fn advance(&mut self, frame_dt: f64) -> PendulumResult<StepReport> {
        if !(frame_dt.is_finite() && frame_dt >= 0.0) {
            return Err(PendulumError::invalid_parameter(
                "frame_dt",
                frame_dt,
                "must be finite and non-negative",
            ));
        }

        let mut report = StepReport::default();
        if self.clock.is_running() {
            let dt = self.clock.scaled_dt(frame_dt);
            self.integrate(dt);
            report.dt = dt;
            report.stepped = true;
        }
        report.warnings = self
            .jidoka
            .check_with_warnings(&self.ensemble, self.clock.gravity())?;
        Ok(report)
    }

    /// Step forward by the base time step, ignoring pause and speed.
    ///
    /// # Errors
    ///
    /// Returns the Jidoka violation, if one is detected.
    pub fn step(&mut self) -> PendulumResult<()> {
        self.integrate(self.clock.time_step());
        self.jidoka.check(&self.ensemble, self.clock.gravity())
    }

    /// Run fixed steps for the specified duration.
    ///
    /// # Errors
    ///
    /// Returns error if any step fails.
    pub fn run_for(&mut self, duration: SimTime) -> PendulumResult<()> {
        let end_time = self.clock.elapsed() + duration;

        while self.clock.elapsed() < end_time {
            self.step()?;
        }

        Ok(())
    }

    fn integrate(&mut self, dt: f64) {
        self.ensemble.step_all(dt, self.clock.gravity());
        self.clock.tick(dt);
    }

    // ===== Ensemble management =====

    /// Add a pendulum from the configured defaults, staggered from the
    /// existing ones and with the next palette color. It becomes selected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the defaults are rejected.
    pub fn spawn_default(&mut self) -> PendulumResult<BodyId> {
        let params = staggered(&self.defaults, self.ensemble.len());
        self.ensemble.create(params)
    }

    /// Add a near-identical copy of the selected pendulum, both angles
    /// nudged by up to `epsilon` radians. It becomes selected.
    ///
    /// The copy starts from the selected body's creation parameters (same
    /// anchor) with the next palette color, so the two trails overlap until
    /// they diverge.
    ///
    /// # Errors
    ///
    /// Returns `Config` when nothing is selected.
    pub fn spawn_twin(&mut self, epsilon: f64) -> PendulumResult<BodyId> {
        let Some(source) = self.ensemble.selected() else {
            return Err(PendulumError::config("no pendulum selected to copy"));
        };
        let base = *source.initial_parameters();
        let color = staggered(&base, self.ensemble.len()).path_color;

        let mut streams = self.rng.partition(1);
        let twin = streams
            .first_mut()
            .map_or(base, |stream| base.perturbed(stream, epsilon))
            .with_color(color);

        let id = self.ensemble.create(twin)?;
        debug!(body = %id, epsilon, "spawned perturbed twin");
        Ok(id)
    }

    /// Remove the selected pendulum unless it is the last one.
    pub fn remove_selected(&mut self) -> Option<BodyId> {
        let removed = self.ensemble.remove_selected()?;
        self.jidoka.forget(removed);
        Some(removed)
    }

    /// Restore the selected pendulum to its creation parameters.
    pub fn reset_selected(&mut self) -> Option<BodyId> {
        let id = self.ensemble.selected_id()?;
        self.reset_body(id).ok()?;
        Some(id)
    }

    /// Restore one pendulum to its creation parameters.
    ///
    /// # Errors
    ///
    /// Returns `BodyNotFound` for an unknown id.
    pub fn reset_body(&mut self, id: BodyId) -> PendulumResult<()> {
        if !self.ensemble.reset(id) {
            return Err(PendulumError::BodyNotFound(id));
        }
        self.jidoka.forget(id);
        Ok(())
    }

    /// Mutable access to one pendulum for parameter edits.
    ///
    /// Its Jidoka reference energy is dropped and re-recorded on the next
    /// check, since edits change the energy.
    ///
    /// # Errors
    ///
    /// Returns `BodyNotFound` for an unknown id.
    pub fn body_mut(&mut self, id: BodyId) -> PendulumResult<&mut PendulumBody> {
        self.jidoka.forget(id);
        self.ensemble
            .get_mut(id)
            .ok_or(PendulumError::BodyNotFound(id))
    }

    /// Select a pendulum by id.
    ///
    /// # Errors
    ///
    /// Returns `BodyNotFound` for an unknown id.
    pub fn select(&mut self, id: BodyId) -> PendulumResult<()> {
        self.ensemble
            .select(id)
            .map(|_| ())
            .ok_or(PendulumError::BodyNotFound(id))
    }

    /// Change the trail duration of the selected pendulum.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a negative or non-finite duration.
    pub fn set_trail_duration(&mut self, seconds: f64) -> PendulumResult<()> {
        let seconds = require_non_negative("path_duration", seconds)?;
        if let Some(body) = self.ensemble.selected_mut() {
            body.set_trail_duration(seconds);
        }
        Ok(())
    }

    // ===== Global settings =====

    /// Change gravity for every pendulum.
    ///
    /// Reference energies are dropped since they depend on gravity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for non-finite values.
    pub fn set_gravity(&mut self, gravity: f64) -> PendulumResult<()> {
        self.clock.set_gravity(gravity)?;
        self.jidoka.reset();
        info!(gravity, "gravity changed");
        Ok(())
    }

    /// Change the speed multiplier.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for negative or non-finite values.
    pub fn set_speed(&mut self, speed: f64) -> PendulumResult<()> {
        self.clock.set_speed(speed)?;
        debug!(speed, "speed changed");
        Ok(())
    }

    /// Pause or resume; returns whether the simulation now runs.
    pub fn toggle_running(&mut self) -> bool {
        let running = self.clock.toggle_running();
        info!(running, "toggled pause");
        running
    }

    // ===== Pointer input =====

    /// Pointer pressed: select the pendulum under it and grab the bob hit.
    pub fn press(&mut self, pointer: Vec2, origin: Vec2) -> Option<(BodyId, Joint)> {
        self.ensemble.begin_drag(pointer, origin)
    }

    /// Pointer moved while pressed.
    pub fn drag_to(&mut self, pointer: Vec2, origin: Vec2) {
        self.ensemble.update_drag(pointer, origin);
    }

    /// Pointer released.
    pub fn release(&mut self) {
        self.ensemble.end_drag();
    }

    // ===== Rendering =====

    /// Record one trail sample per body and capture a render snapshot.
    pub fn render_frame(&mut self, origin: Vec2) -> EnsembleFrame {
        self.ensemble.record_traces(origin);
        self.ensemble.frame(origin, self.clock.gravity())
    }

    // ===== Accessors =====

    /// Get the clock.
    #[must_use]
    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Get the ensemble.
    #[must_use]
    pub const fn ensemble(&self) -> &PendulumEnsemble {
        &self.ensemble
    }

    /// Get the Jidoka guard.
    #[must_use]
    pub const fn jidoka(&self) -> &JidokaGuard {
        &self.jidoka
    }

    /// Get simulated time so far.
    #[must_use]
    pub const fn current_time(&self) -> SimTime {
        self.clock.elapsed()
    }

    /// Parameters used for new pendulums.
    #[must_use]
    pub const fn defaults(&self) -> &PendulumParameters {
        &self.defaults
    }
}
