//! A single double pendulum.
//!
//! Owns its angular state and linkage, keeps the anchor-relative bob offsets
//! in sync with them, and implements pointer-drag reparameterization.
//!
//! # Coordinate Conventions
//!
//! Bob offsets use the screen convention (y down-positive):
//!
//! ```text
//! x1 = l1 sin(a1)        y1 = l1 cos(a1)
//! x2 = x1 + l2 sin(a2)   y2 = y1 + l2 cos(a2)
//! ```
//!
//! The anchor sits at `origin + offset`, where `origin` is supplied by the
//! renderer (usually the screen center).

use serde::{Deserialize, Serialize};

use crate::domains::physics::{IntegratorKind, Linkage};
use crate::engine::state::{AngularState, Joint, Vec2};
use crate::error::{require_positive, PendulumResult};
use crate::pendulum::energy::Energy;
use crate::pendulum::params::PendulumParameters;
use crate::pendulum::trace::PathTrace;
use crate::pendulum::BodyId;

/// Smallest pointer hit radius around a bob, in screen units.
pub const HIT_RADIUS_MIN: f64 = 10.0;

/// Dragging farther than this from the hinge also changes the rod length.
pub const MIN_DRAG_LENGTH: f64 = 10.0;

/// Pointer-drag state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragState {
    /// Integration runs normally.
    #[default]
    NotDragging,
    /// The bob of this joint follows the pointer; integration is suspended.
    Dragging(Joint),
}

impl DragState {
    /// Joint being dragged, if any.
    #[must_use]
    pub const fn joint(self) -> Option<Joint> {
        match self {
            Self::NotDragging => None,
            Self::Dragging(joint) => Some(joint),
        }
    }
}

/// One double pendulum with its trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendulumBody {
    id: BodyId,
    state: AngularState,
    linkage: Linkage,
    offset: Vec2,
    bob1: Vec2,
    bob2: Vec2,
    trace: PathTrace,
    wire_visible: bool,
    drag: DragState,
    integrator: IntegratorKind,
    initial: PendulumParameters,
    sample_rate: f64,
}

impl PendulumBody {
    /// Build a body from validated parameters.
    ///
    /// `sample_rate` is the number of trail samples recorded per second and
    /// sizes the trace from `params.path_duration`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the parameters or the sample rate are
    /// rejected.
    pub fn new(id: BodyId, params: PendulumParameters, sample_rate: f64) -> PendulumResult<Self> {
        params.check()?;
        require_positive("sample_rate", sample_rate)?;

        let mut body = Self {
            id,
            state: params.angular_state(),
            linkage: params.linkage(),
            offset: params.offset,
            bob1: Vec2::zero(),
            bob2: Vec2::zero(),
            trace: PathTrace::with_duration(params.path_duration, sample_rate, params.path_color),
            wire_visible: params.show_wire,
            drag: DragState::NotDragging,
            integrator: IntegratorKind::default(),
            initial: params,
            sample_rate,
        };
        body.update_positions();
        Ok(body)
    }

    /// Use a different integrator.
    #[must_use]
    pub fn with_integrator(mut self, integrator: IntegratorKind) -> Self {
        self.integrator = integrator;
        self
    }

    /// Advance one step of size `dt`. Does nothing while dragging.
    pub fn step(&mut self, dt: f64, gravity: f64) {
        if self.is_dragging() {
            return;
        }
        self.integrator
            .step(&mut self.state, &self.linkage, gravity, dt);
        self.update_positions();
    }

    /// Anchor-relative offsets of the first and second bob.
    #[must_use]
    pub const fn cartesian_positions(&self) -> (Vec2, Vec2) {
        (self.bob1, self.bob2)
    }

    fn update_positions(&mut self) {
        let (sin1, cos1) = self.state.angle1.sin_cos();
        let (sin2, cos2) = self.state.angle2.sin_cos();
        self.bob1 = Vec2::new(self.linkage.length1 * sin1, self.linkage.length1 * cos1);
        self.bob2 = Vec2::new(
            self.bob1.x + self.linkage.length2 * sin2,
            self.bob1.y + self.linkage.length2 * cos2,
        );
    }

    // ===== Parameter setters =====

    /// Change a rod length.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for non-positive or non-finite values; the
    /// previous length is kept.
    pub fn set_length(&mut self, joint: Joint, value: f64) -> PendulumResult<()> {
        let value = require_positive(format!("length{joint}"), value)?;
        self.linkage.set_length(joint, value);
        self.update_positions();
        Ok(())
    }

    /// Change a bob mass.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for non-positive or non-finite values; the
    /// previous mass is kept.
    pub fn set_mass(&mut self, joint: Joint, value: f64) -> PendulumResult<()> {
        let value = require_positive(format!("mass{joint}"), value)?;
        self.linkage.set_mass(joint, value);
        Ok(())
    }

    /// Set a rod angle (radians). The value is wrapped on the next step.
    pub fn set_angle(&mut self, joint: Joint, value: f64) {
        self.state.set_angle(joint, value);
        self.update_positions();
    }

    /// Set an angular velocity (rad/s).
    pub fn set_velocity(&mut self, joint: Joint, value: f64) {
        self.state.set_velocity(joint, value);
    }

    /// Flip rod visibility and return the new value.
    pub fn toggle_wire(&mut self) -> bool {
        self.wire_visible = !self.wire_visible;
        self.wire_visible
    }

    /// Change the trail duration, keeping the oldest samples that still fit.
    ///
    /// Negative durations empty the trail.
    pub fn set_trail_duration(&mut self, seconds: f64) {
        self.trace
            .set_capacity_by_duration(seconds, self.sample_rate);
    }

    /// Restore the creation parameters.
    ///
    /// Clears the trail, ends any drag and keeps the chosen integrator.
    pub fn reset(&mut self) {
        let params = self.initial;
        self.state = params.angular_state();
        self.linkage = params.linkage();
        self.offset = params.offset;
        self.wire_visible = params.show_wire;
        self.drag = DragState::NotDragging;
        self.trace =
            PathTrace::with_duration(params.path_duration, self.sample_rate, params.path_color);
        self.update_positions();
    }

    // ===== Pointer interaction =====

    /// Anchor position on screen for the given renderer origin.
    #[must_use]
    pub fn anchor(&self, origin: Vec2) -> Vec2 {
        origin + self.offset
    }

    /// Screen position of a bob.
    #[must_use]
    pub fn bob_screen_position(&self, joint: Joint, origin: Vec2) -> Vec2 {
        let offset = match joint {
            Joint::First => self.bob1,
            Joint::Second => self.bob2,
        };
        self.anchor(origin) + offset
    }

    /// Pointer hit radius of a bob: its mass, but never below
    /// [`HIT_RADIUS_MIN`].
    #[must_use]
    pub fn hit_radius(&self, joint: Joint) -> f64 {
        self.linkage.mass(joint).max(HIT_RADIUS_MIN)
    }

    /// Bob under the pointer, second bob first since it is drawn on top.
    #[must_use]
    pub fn hit_joint(&self, pointer: Vec2, origin: Vec2) -> Option<Joint> {
        [Joint::Second, Joint::First].into_iter().find(|&joint| {
            pointer.distance(&self.bob_screen_position(joint, origin)) <= self.hit_radius(joint)
        })
    }

    /// Start dragging the bob under the pointer.
    ///
    /// Returns the grabbed joint, or `None` (state unchanged) on a miss.
    pub fn begin_drag(&mut self, pointer: Vec2, origin: Vec2) -> Option<Joint> {
        let joint = self.hit_joint(pointer, origin)?;
        self.drag = DragState::Dragging(joint);
        Some(joint)
    }

    /// Move the dragged bob toward the pointer. No-op when not dragging.
    ///
    /// The rod angle becomes `atan2(rel.y, rel.x)` of the pointer relative to
    /// the rod's hinge; beyond [`MIN_DRAG_LENGTH`] the rod also stretches to
    /// reach it. Both angular velocities are zeroed.
    pub fn update_drag(&mut self, pointer: Vec2, origin: Vec2) {
        let DragState::Dragging(joint) = self.drag else {
            return;
        };

        let hinge = match joint {
            Joint::First => self.anchor(origin),
            Joint::Second => {
                self.update_positions();
                self.anchor(origin) + self.bob1
            }
        };
        let rel = pointer - hinge;

        self.state.set_angle(joint, rel.atan2());
        let reach = rel.magnitude();
        if reach > MIN_DRAG_LENGTH {
            self.linkage.set_length(joint, reach);
        }
        self.state.halt();
        self.update_positions();
    }

    /// Release the drag and start a fresh trail.
    ///
    /// Calling it when not dragging does nothing.
    pub fn end_drag(&mut self) {
        if self.is_dragging() {
            self.drag = DragState::NotDragging;
            self.trace.clear();
        }
    }

    /// Push the second bob's screen position into the trail.
    ///
    /// Skipped while dragging.
    pub fn record_trace(&mut self, origin: Vec2) {
        if !self.is_dragging() {
            let point = self.bob_screen_position(Joint::Second, origin);
            self.trace.push(point);
        }
    }

    // ===== Diagnostics =====

    /// Kinetic, potential and total energy at the given gravity.
    #[must_use]
    pub fn energy(&self, gravity: f64) -> Energy {
        Energy::compute(&self.state, &self.linkage, gravity)
    }

    /// Whether the angular state and the bob offsets are all finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.state.is_finite() && self.bob1.is_finite() && self.bob2.is_finite()
    }

    // ===== Accessors =====

    /// Body id.
    #[must_use]
    pub const fn id(&self) -> BodyId {
        self.id
    }

    /// Angles and angular velocities.
    #[must_use]
    pub const fn state(&self) -> &AngularState {
        &self.state
    }

    /// Rod lengths and bob masses.
    #[must_use]
    pub const fn linkage(&self) -> &Linkage {
        &self.linkage
    }

    /// Anchor offset from the renderer origin.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Trail samples.
    #[must_use]
    pub const fn trace(&self) -> &PathTrace {
        &self.trace
    }

    /// Mutable trail access (color, visibility).
    pub fn trace_mut(&mut self) -> &mut PathTrace {
        &mut self.trace
    }

    /// Whether rods are drawn.
    #[must_use]
    pub const fn wire_visible(&self) -> bool {
        self.wire_visible
    }

    /// Current drag state.
    #[must_use]
    pub const fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Whether a bob is being dragged.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging(_))
    }

    /// Integrator in use.
    #[must_use]
    pub const fn integrator(&self) -> IntegratorKind {
        self.integrator
    }

    /// Parameters the body was created with.
    #[must_use]
    pub const fn initial_parameters(&self) -> &PendulumParameters {
        &self.initial
    }

    /// Trail samples recorded per second.
    #[must_use]
    pub const fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domains::physics::angular_accelerations;
    use crate::pendulum::trace::DEFAULT_SAMPLE_RATE;

    const G: f64 = 9.81;

    fn reference_params() -> PendulumParameters {
        PendulumParameters::default().with_angles(0.8, 0.5)
    }

    fn body(params: PendulumParameters) -> PendulumBody {
        PendulumBody::new(BodyId::new(0), params, DEFAULT_SAMPLE_RATE).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_parameters() {
        let bad = PendulumParameters::default().with_masses(0.0, 10.0);
        assert!(PendulumBody::new(BodyId::new(0), bad, DEFAULT_SAMPLE_RATE).is_err());
        assert!(PendulumBody::new(BodyId::new(0), reference_params(), 0.0).is_err());
    }

    #[test]
    fn test_initial_positions() {
        let b = body(PendulumParameters::default().with_angles(0.0, 0.0));
        let (bob1, bob2) = b.cartesian_positions();
        assert!(bob1.x.abs() < f64::EPSILON);
        assert!((bob1.y - 120.0).abs() < f64::EPSILON);
        assert!((bob2.y - 240.0).abs() < f64::EPSILON);
        assert_eq!(b.trace().capacity(), 120);
    }

    #[test]
    fn test_single_step_matches_scheme() {
        let mut b = body(reference_params());
        let dt = 0.01;
        let start = *b.state();
        let (acc1, acc2) = angular_accelerations(&start, b.linkage(), G);

        b.step(dt, G);

        let expected1 = 0.8 + 0.5 * acc1 * dt * dt;
        let expected2 = 0.5 + 0.5 * acc2 * dt * dt;
        assert!((b.state().angle1 - expected1).abs() < 1e-9);
        assert!((b.state().angle2 - expected2).abs() < 1e-9);

        let (bob1, _) = b.cartesian_positions();
        assert!((bob1.x - 120.0 * b.state().angle1.sin()).abs() < 1e-12);
    }

    #[test]
    fn test_step_suspended_while_dragging() {
        let mut b = body(reference_params());
        let origin = Vec2::new(400.0, 300.0);
        let (_, bob2) = b.cartesian_positions();
        assert_eq!(b.begin_drag(origin + bob2, origin), Some(Joint::Second));

        let before = *b.state();
        for _ in 0..10 {
            b.step(0.01, G);
        }
        assert_eq!(*b.state(), before);
    }

    #[test]
    fn test_setters_validate() {
        let mut b = body(reference_params());
        assert!(b.set_length(Joint::First, -1.0).is_err());
        assert!((b.linkage().length1 - 120.0).abs() < f64::EPSILON);
        assert!(b.set_mass(Joint::Second, 0.0).is_err());
        assert!((b.linkage().mass2 - 10.0).abs() < f64::EPSILON);

        b.set_length(Joint::Second, 60.0).unwrap();
        let (bob1, bob2) = b.cartesian_positions();
        assert!(((bob2 - bob1).magnitude() - 60.0).abs() < 1e-9);

        b.set_mass(Joint::First, 25.0).unwrap();
        assert!((b.hit_radius(Joint::First) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_angle_updates_geometry() {
        let mut b = body(reference_params());
        b.set_angle(Joint::First, 0.0);
        let (bob1, _) = b.cartesian_positions();
        assert!(bob1.x.abs() < f64::EPSILON);

        b.set_velocity(Joint::Second, 3.0);
        assert!((b.state().velocity2 - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_toggle_wire() {
        let mut b = body(reference_params());
        assert!(b.wire_visible());
        assert!(!b.toggle_wire());
        assert!(b.toggle_wire());
    }

    #[test]
    fn test_hit_second_bob_first() {
        // Short second rod puts both bobs inside each other's hit radius.
        let params = reference_params().with_lengths(120.0, 5.0);
        let mut b = body(params);
        let origin = Vec2::zero();
        let (bob1, _) = b.cartesian_positions();

        assert_eq!(b.hit_joint(bob1, origin), Some(Joint::Second));
        assert_eq!(b.begin_drag(bob1, origin), Some(Joint::Second));
    }

    #[test]
    fn test_hit_first_bob() {
        let mut b = body(reference_params());
        let origin = Vec2::new(100.0, 50.0);
        let (bob1, _) = b.cartesian_positions();
        let pointer = origin + bob1 + Vec2::new(3.0, -4.0);
        assert_eq!(b.begin_drag(pointer, origin), Some(Joint::First));
        assert_eq!(b.drag_state(), DragState::Dragging(Joint::First));
    }

    #[test]
    fn test_miss_leaves_state() {
        let mut b = body(reference_params());
        assert_eq!(b.begin_drag(Vec2::new(-1000.0, -1000.0), Vec2::zero()), None);
        assert!(!b.is_dragging());
    }

    #[test]
    fn test_hit_radius_uses_offset() {
        let params = reference_params().with_offset(50.0, 0.0);
        let b = body(params);
        let (_, bob2) = b.cartesian_positions();
        assert_eq!(b.hit_joint(bob2, Vec2::zero()), None);
        assert_eq!(
            b.hit_joint(bob2 + Vec2::new(50.0, 0.0), Vec2::zero()),
            Some(Joint::Second)
        );
    }

    #[test]
    fn test_drag_first_joint() {
        let mut b = body(reference_params());
        b.set_velocity(Joint::First, 1.0);
        b.set_velocity(Joint::Second, -1.0);
        let origin = Vec2::zero();
        let (bob1, _) = b.cartesian_positions();
        b.begin_drag(bob1, origin).unwrap();

        b.update_drag(Vec2::new(0.0, 50.0), origin);

        assert!((b.state().angle1 - 50.0f64.atan2(0.0)).abs() < f64::EPSILON);
        assert!((b.linkage().length1 - 50.0).abs() < f64::EPSILON);
        assert_eq!(b.state().velocity1, 0.0);
        assert_eq!(b.state().velocity2, 0.0);
    }

    #[test]
    fn test_drag_short_reach_keeps_length() {
        let mut b = body(reference_params());
        let origin = Vec2::zero();
        let (bob1, _) = b.cartesian_positions();
        b.begin_drag(bob1, origin).unwrap();

        b.update_drag(Vec2::new(3.0, 4.0), origin);

        assert!((b.linkage().length1 - 120.0).abs() < f64::EPSILON);
        assert!((b.state().angle1 - 4.0f64.atan2(3.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drag_second_joint_relative_to_first_bob() {
        let mut b = body(reference_params());
        let origin = Vec2::new(200.0, 100.0);
        let (bob1, bob2) = b.cartesian_positions();
        b.begin_drag(origin + bob2, origin).unwrap();

        let target = origin + bob1 + Vec2::new(30.0, 40.0);
        b.update_drag(target, origin);

        assert!((b.state().angle2 - 40.0f64.atan2(30.0)).abs() < 1e-12);
        assert!((b.linkage().length2 - 50.0).abs() < 1e-9);
        assert!((b.linkage().length1 - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_drag_without_drag_is_noop() {
        let mut b = body(reference_params());
        let before = b.clone();
        b.update_drag(Vec2::new(10.0, 10.0), Vec2::zero());
        assert_eq!(b, before);
    }

    #[test]
    fn test_end_drag_clears_trace_once() {
        let mut b = body(reference_params());
        let origin = Vec2::zero();
        b.record_trace(origin);
        b.record_trace(origin);
        assert_eq!(b.trace().len(), 2);

        let (_, bob2) = b.cartesian_positions();
        b.begin_drag(bob2, origin).unwrap();
        b.record_trace(origin);
        assert_eq!(b.trace().len(), 2, "no samples while dragging");

        b.end_drag();
        assert!(b.trace().is_empty());
        assert!(!b.is_dragging());

        b.record_trace(origin);
        b.end_drag();
        assert_eq!(b.trace().len(), 1, "second end_drag is a no-op");
    }

    #[test]
    fn test_reset_restores_parameters() {
        let mut b = body(reference_params());
        for _ in 0..100 {
            b.step(0.01, G);
            b.record_trace(Vec2::zero());
        }
        b.set_length(Joint::First, 80.0).unwrap();
        b.toggle_wire();

        b.reset();
        let once = b.clone();
        b.reset();

        assert_eq!(b, once);
        assert_eq!(*b.state(), reference_params().angular_state());
        assert_eq!(*b.linkage(), reference_params().linkage());
        assert!(b.wire_visible());
        assert!(b.trace().is_empty());
    }

    #[test]
    fn test_reset_keeps_integrator() {
        let mut b = body(reference_params()).with_integrator(IntegratorKind::Rk4);
        b.reset();
        assert_eq!(b.integrator(), IntegratorKind::Rk4);
    }

    #[test]
    fn test_trail_duration() {
        let mut b = body(reference_params());
        b.set_trail_duration(0.5);
        assert_eq!(b.trace().capacity(), 30);
        b.set_trail_duration(-1.0);
        assert_eq!(b.trace().capacity(), 0);
    }

    #[test]
    fn test_non_finite_velocity_is_observable() {
        let mut b = body(reference_params());
        assert!(b.is_finite());
        b.set_velocity(Joint::First, f64::INFINITY);
        assert!(!b.is_finite());
        b.step(0.01, G);
        assert!(!b.is_finite());
    }

    #[test]
    fn test_energy_at_rest_is_zero() {
        let b = body(PendulumParameters::default().with_angles(0.0, 0.0));
        assert!(b.energy(G).total.abs() < 1e-9);
    }
}
