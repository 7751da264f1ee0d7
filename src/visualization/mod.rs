//! Render-ready snapshots of the ensemble.
//!
//! The engine draws nothing itself. A renderer asks for an [`EnsembleFrame`]
//! once per frame and draws rods, bobs and fading trails from it. Every type
//! here is plain serde data, so the frame can also cross a process boundary
//! as JSON.
//!
//! # Example
//!
//! ```rust
//! use double_pendulum::prelude::*;
//!
//! let mut ensemble = PendulumEnsemble::new();
//! ensemble.create(PendulumParameters::default()).ok();
//! let frame = ensemble.frame(Vec2::new(400.0, 300.0), 9.81);
//! assert_eq!(frame.bodies.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::engine::state::{Joint, Vec2};
use crate::pendulum::{BodyId, Energy, PendulumBody, PendulumEnsemble, Rgb};

/// Drawn bob radius per unit of mass.
pub const BOB_RADIUS_PER_MASS: f64 = 0.8;

/// One trail sample with its opacity in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailSample {
    /// Screen x.
    pub x: f64,
    /// Screen y.
    pub y: f64,
    /// Opacity, newest sample is 1.0.
    pub opacity: f64,
}

/// Everything needed to draw one pendulum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyFrame {
    /// Body id.
    pub id: BodyId,
    /// Anchor in screen coordinates.
    pub anchor: Vec2,
    /// First bob in screen coordinates.
    pub bob1: Vec2,
    /// Second bob in screen coordinates.
    pub bob2: Vec2,
    /// Drawn radii of the two bobs.
    pub bob_radii: [f64; 2],
    /// Whether rods are drawn.
    pub wire_visible: bool,
    /// Whether this body is the selected one.
    pub selected: bool,
    /// Joint being dragged, if any.
    pub dragging: Option<Joint>,
    /// Trail color.
    pub trail_color: Rgb,
    /// Trail samples, oldest first.
    pub trail: Vec<TrailSample>,
    /// Energy at the frame's gravity.
    pub energy: Energy,
}

impl BodyFrame {
    /// Snapshot one body.
    #[must_use]
    pub fn capture(body: &PendulumBody, origin: Vec2, gravity: f64, selected: bool) -> Self {
        let trace = body.trace();
        let trail = if trace.is_visible() {
            trace
                .render_weights()
                .map(|(p, opacity)| TrailSample {
                    x: p.x,
                    y: p.y,
                    opacity,
                })
                .collect()
        } else {
            Vec::new()
        };
        let linkage = body.linkage();

        Self {
            id: body.id(),
            anchor: body.anchor(origin),
            bob1: body.bob_screen_position(Joint::First, origin),
            bob2: body.bob_screen_position(Joint::Second, origin),
            bob_radii: [
                linkage.mass1 * BOB_RADIUS_PER_MASS,
                linkage.mass2 * BOB_RADIUS_PER_MASS,
            ],
            wire_visible: body.wire_visible(),
            selected,
            dragging: body.drag_state().joint(),
            trail_color: trace.color(),
            trail,
            energy: body.energy(gravity),
        }
    }
}

/// Snapshot of a whole ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleFrame {
    /// Bodies in insertion order.
    pub bodies: Vec<BodyFrame>,
    /// Selected body id.
    pub selected: Option<BodyId>,
    /// Gravity the energies were computed with.
    pub gravity: f64,
}

impl EnsembleFrame {
    /// Snapshot every body of `ensemble`.
    #[must_use]
    pub fn capture(ensemble: &PendulumEnsemble, origin: Vec2, gravity: f64) -> Self {
        let selected = ensemble.selected_id();
        Self {
            bodies: ensemble
                .iter()
                .map(|body| BodyFrame::capture(body, origin, gravity, Some(body.id()) == selected))
                .collect(),
            selected,
            gravity,
        }
    }

    /// Frame of the selected body.
    #[must_use]
    pub fn selected_body(&self) -> Option<&BodyFrame> {
        self.bodies.iter().find(|b| b.selected)
    }

    /// Sum of all bodies' total energy.
    #[must_use]
    pub fn total_energy(&self) -> f64 {
        self.bodies.iter().map(|b| b.energy.total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pendulum::PendulumParameters;

    #[test]
    fn test_frame_positions_and_selection() {
        let mut ensemble = PendulumEnsemble::new();
        let a = ensemble
            .create(PendulumParameters::default().with_offset(-20.0, 0.0))
            .unwrap();
        let b = ensemble.create(PendulumParameters::default()).unwrap();
        let origin = Vec2::new(400.0, 300.0);

        let frame = ensemble.frame(origin, 9.81);

        assert_eq!(frame.bodies.len(), 2);
        assert_eq!(frame.selected, Some(b));
        assert_eq!(frame.selected_body().unwrap().id, b);
        let first = &frame.bodies[0];
        assert_eq!(first.id, a);
        assert_eq!(first.anchor, Vec2::new(380.0, 300.0));
        let (bob1, bob2) = ensemble.get(a).unwrap().cartesian_positions();
        assert_eq!(first.bob1, first.anchor + bob1);
        assert_eq!(first.bob2, first.anchor + bob2);
        assert_eq!(first.bob_radii, [8.0, 8.0]);
        assert!(first.trail.is_empty());
    }

    #[test]
    fn test_trail_opacity() {
        let mut ensemble = PendulumEnsemble::new();
        let a = ensemble.create(PendulumParameters::default()).unwrap();
        for _ in 0..4 {
            ensemble.step_all(0.01, 9.81);
            ensemble.record_traces(Vec2::zero());
        }
        let frame = ensemble.frame(Vec2::zero(), 9.81);
        let opacities: Vec<f64> = frame.bodies[0].trail.iter().map(|s| s.opacity).collect();
        assert_eq!(opacities, vec![0.25, 0.5, 0.75, 1.0]);

        ensemble.get_mut(a).unwrap().trace_mut().set_visible(false);
        let hidden = ensemble.frame(Vec2::zero(), 9.81);
        assert!(hidden.bodies[0].trail.is_empty());
    }

    #[test]
    fn test_frame_serializes_to_json() {
        let mut ensemble = PendulumEnsemble::new();
        ensemble.create(PendulumParameters::default()).unwrap();
        let frame = ensemble.frame(Vec2::zero(), 9.81);

        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"trail_color\":[0,128,255]"));
        let back: EnsembleFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.selected, frame.selected);
        assert_eq!(back.bodies[0].id, frame.bodies[0].id);
        assert_eq!(back.bodies[0].trail_color, frame.bodies[0].trail_color);
    }

    #[test]
    fn test_total_energy() {
        let mut ensemble = PendulumEnsemble::new();
        ensemble.create(PendulumParameters::default()).unwrap();
        ensemble.create(PendulumParameters::default()).unwrap();
        let frame = ensemble.frame(Vec2::zero(), 9.81);
        let single = frame.bodies[0].energy.total;
        assert!((frame.total_energy() - 2.0 * single).abs() < 1e-9);
    }
}
