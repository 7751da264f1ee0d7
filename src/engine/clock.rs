//! Simulation clock.
//!
//! Holds the global scalars the driver forwards to every body: gravity, the
//! base time step, the speed multiplier and the run/pause flag. It also
//! counts elapsed simulated time.

use serde::{Deserialize, Serialize};

use crate::engine::SimTime;
use crate::error::{require_non_negative, require_positive, PendulumError, PendulumResult};

/// Standard gravity used when nothing else is configured.
pub const DEFAULT_GRAVITY: f64 = 9.81;

/// Default base time step (seconds).
pub const DEFAULT_TIME_STEP: f64 = 0.01;

/// Gravity, time step and pacing for one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationClock {
    gravity: f64,
    time_step: f64,
    speed: f64,
    running: bool,
    elapsed: SimTime,
    step_count: u64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            time_step: DEFAULT_TIME_STEP,
            speed: 1.0,
            running: true,
            elapsed: SimTime::ZERO,
            step_count: 0,
        }
    }
}

impl SimulationClock {
    /// Create a running clock at normal speed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for non-finite gravity or a non-positive
    /// time step.
    pub fn new(gravity: f64, time_step: f64) -> PendulumResult<Self> {
        let mut clock = Self::default();
        clock.set_gravity(gravity)?;
        clock.set_time_step(time_step)?;
        Ok(clock)
    }

    /// Gravity (any finite value, including zero and negative).
    #[must_use]
    pub const fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Set gravity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for NaN or infinite values.
    pub fn set_gravity(&mut self, gravity: f64) -> PendulumResult<()> {
        if !gravity.is_finite() {
            return Err(PendulumError::invalid_parameter(
                "gravity",
                gravity,
                "must be finite",
            ));
        }
        self.gravity = gravity;
        Ok(())
    }

    /// Base time step (seconds) used for fixed stepping.
    #[must_use]
    pub const fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Set the base time step.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for non-positive or non-finite values.
    pub fn set_time_step(&mut self, time_step: f64) -> PendulumResult<()> {
        self.time_step = require_positive("time_step", time_step)?;
        Ok(())
    }

    /// Speed multiplier applied to frame time.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the speed multiplier. Zero freezes the simulation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for negative or non-finite values.
    pub fn set_speed(&mut self, speed: f64) -> PendulumResult<()> {
        self.speed = require_non_negative("speed", speed)?;
        Ok(())
    }

    /// Whether frames advance the simulation.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Start or pause.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Flip between running and paused; returns the new state.
    pub fn toggle_running(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Frame time scaled by the speed multiplier.
    #[must_use]
    pub fn scaled_dt(&self, frame_dt: f64) -> f64 {
        frame_dt * self.speed
    }

    /// Record one step of `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> SimTime {
        self.elapsed = self.elapsed + SimTime::from_secs(dt);
        self.step_count += 1;
        self.elapsed
    }

    /// Simulated time so far.
    #[must_use]
    pub const fn elapsed(&self) -> SimTime {
        self.elapsed
    }

    /// Number of steps taken.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Zero elapsed time and the step counter; settings are kept.
    pub fn reset(&mut self) {
        self.elapsed = SimTime::ZERO;
        self.step_count = 0;
    }
}
