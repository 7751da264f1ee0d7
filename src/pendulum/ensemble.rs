//! Keyed collection of pendulums with a selection.
//!
//! Bodies keep insertion order, which is also hit-test order. Ids come from
//! a counter that only grows, so a removed id is never handed out again.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::domains::physics::IntegratorKind;
use crate::engine::state::{Joint, Vec2};
use crate::error::{require_positive, PendulumResult};
use crate::pendulum::body::PendulumBody;
use crate::pendulum::params::PendulumParameters;
use crate::pendulum::trace::DEFAULT_SAMPLE_RATE;
use crate::pendulum::BodyId;
use crate::visualization::EnsembleFrame;

/// Insertion-ordered set of pendulum bodies.
#[derive(Debug, Clone)]
pub struct PendulumEnsemble {
    bodies: IndexMap<BodyId, PendulumBody>,
    selected: Option<BodyId>,
    next_id: u64,
    sample_rate: f64,
    integrator: IntegratorKind,
}

impl Default for PendulumEnsemble {
    fn default() -> Self {
        Self {
            bodies: IndexMap::new(),
            selected: None,
            next_id: 0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            integrator: IntegratorKind::default(),
        }
    }
}

impl PendulumEnsemble {
    /// Create an empty ensemble recording trails at [`DEFAULT_SAMPLE_RATE`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ensemble with a custom trail sample rate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a non-positive sample rate.
    pub fn with_sample_rate(sample_rate: f64) -> PendulumResult<Self> {
        let sample_rate = require_positive("sample_rate", sample_rate)?;
        Ok(Self {
            sample_rate,
            ..Self::default()
        })
    }

    /// Integrator given to bodies created from now on.
    #[must_use]
    pub fn with_integrator(mut self, integrator: IntegratorKind) -> Self {
        self.integrator = integrator;
        self
    }

    /// Trail samples recorded per second.
    #[must_use]
    pub const fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Add a body and select it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `params` fail validation. No id is
    /// consumed in that case.
    pub fn create(&mut self, params: PendulumParameters) -> PendulumResult<BodyId> {
        let id = BodyId::new(self.next_id);
        let body =
            PendulumBody::new(id, params, self.sample_rate)?.with_integrator(self.integrator);
        self.next_id += 1;
        self.bodies.insert(id, body);
        self.selected = Some(id);
        info!(body = %id, count = self.bodies.len(), "created pendulum");
        Ok(id)
    }

    /// Remove a body. Returns `false` for an unknown id.
    ///
    /// Clears the selection if it pointed at the removed body.
    pub fn remove(&mut self, id: BodyId) -> bool {
        if self.bodies.shift_remove(&id).is_none() {
            debug!(body = %id, "remove: pendulum not found");
            return false;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        info!(body = %id, count = self.bodies.len(), "removed pendulum");
        true
    }

    /// Remove the selected body unless it is the last one, then select the
    /// first remaining body.
    ///
    /// Returns the removed id.
    pub fn remove_selected(&mut self) -> Option<BodyId> {
        if self.bodies.len() <= 1 {
            return None;
        }
        let id = self.selected?;
        self.remove(id);
        self.selected = self.bodies.keys().next().copied();
        Some(id)
    }

    /// Remove every body and clear the selection. The id counter keeps
    /// counting.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.selected = None;
        info!("cleared all pendulums");
    }

    /// Select a body by id. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: BodyId) -> Option<&PendulumBody> {
        let body = self.bodies.get(&id)?;
        self.selected = Some(id);
        debug!(body = %id, "selected pendulum");
        Some(body)
    }

    /// Advance every body by `dt`.
    pub fn step_all(&mut self, dt: f64, gravity: f64) {
        for body in self.bodies.values_mut() {
            body.step(dt, gravity);
        }
    }

    /// First body (in insertion order) with a bob under the pointer.
    ///
    /// Pure query; see [`Self::select_at`] for the selecting variant.
    #[must_use]
    pub fn hit_test(&self, pointer: Vec2, origin: Vec2) -> Option<BodyId> {
        self.bodies
            .values()
            .find(|body| body.hit_joint(pointer, origin).is_some())
            .map(PendulumBody::id)
    }

    /// Select the body under the pointer, if any.
    pub fn select_at(&mut self, pointer: Vec2, origin: Vec2) -> Option<BodyId> {
        let id = self.hit_test(pointer, origin)?;
        self.select(id);
        Some(id)
    }

    /// Select the body under the pointer and start dragging the bob hit.
    pub fn begin_drag(&mut self, pointer: Vec2, origin: Vec2) -> Option<(BodyId, Joint)> {
        let id = self.select_at(pointer, origin)?;
        let joint = self.bodies.get_mut(&id)?.begin_drag(pointer, origin)?;
        debug!(body = %id, %joint, "drag started");
        Some((id, joint))
    }

    /// Forward pointer motion to every body being dragged.
    pub fn update_drag(&mut self, pointer: Vec2, origin: Vec2) {
        for body in self.bodies.values_mut().filter(|b| b.is_dragging()) {
            body.update_drag(pointer, origin);
        }
    }

    /// Release every drag in progress.
    pub fn end_drag(&mut self) {
        for body in self.bodies.values_mut() {
            body.end_drag();
        }
    }

    /// Restore a body to its creation parameters. Returns `false` for an
    /// unknown id.
    pub fn reset(&mut self, id: BodyId) -> bool {
        let Some(body) = self.bodies.get_mut(&id) else {
            return false;
        };
        body.reset();
        info!(body = %id, "reset pendulum");
        true
    }

    /// Record one trail sample per non-dragged body.
    pub fn record_traces(&mut self, origin: Vec2) {
        for body in self.bodies.values_mut() {
            body.record_trace(origin);
        }
    }

    /// Render-ready snapshot of every body.
    #[must_use]
    pub fn frame(&self, origin: Vec2, gravity: f64) -> EnsembleFrame {
        EnsembleFrame::capture(self, origin, gravity)
    }

    /// Whether every body has a finite state.
    #[must_use]
    pub fn all_finite(&self) -> bool {
        self.bodies.values().all(PendulumBody::is_finite)
    }

    // ===== Accessors =====

    /// Body by id.
    #[must_use]
    pub fn get(&self, id: BodyId) -> Option<&PendulumBody> {
        self.bodies.get(&id)
    }

    /// Mutable body by id.
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut PendulumBody> {
        self.bodies.get_mut(&id)
    }

    /// Selected body id.
    #[must_use]
    pub const fn selected_id(&self) -> Option<BodyId> {
        self.selected
    }

    /// Selected body.
    #[must_use]
    pub fn selected(&self) -> Option<&PendulumBody> {
        self.selected.and_then(|id| self.bodies.get(&id))
    }

    /// Mutable selected body.
    pub fn selected_mut(&mut self) -> Option<&mut PendulumBody> {
        let id = self.selected?;
        self.bodies.get_mut(&id)
    }

    /// Number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the ensemble has no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Body ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.keys().copied()
    }

    /// Bodies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PendulumBody> {
        self.bodies.values()
    }
}
