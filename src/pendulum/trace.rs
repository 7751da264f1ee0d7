//! Bounded trail of recent bob positions.
//!
//! Capacity is expressed as a duration: `floor(seconds * sample_rate)`
//! samples. The renderer draws the stored points oldest-first with opacity
//! rising toward the newest sample.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::engine::state::Vec2;
use crate::pendulum::params::Rgb;

/// Assumed samples per second (one sample per rendered frame at 60 FPS).
pub const DEFAULT_SAMPLE_RATE: f64 = 60.0;

/// Number of samples that cover `seconds` at `sample_rate`.
///
/// Negative or non-finite products saturate to zero.
#[must_use]
pub fn capacity_for(seconds: f64, sample_rate: f64) -> usize {
    // float -> int casts saturate; NaN maps to 0
    (seconds * sample_rate).floor() as usize
}

/// Fixed-capacity FIFO of trail samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathTrace {
    points: VecDeque<Vec2>,
    capacity: usize,
    color: Rgb,
    visible: bool,
}

impl PathTrace {
    /// Create an empty, visible trace holding at most `capacity` samples.
    #[must_use]
    pub fn new(capacity: usize, color: Rgb) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            color,
            visible: true,
        }
    }

    /// Create an empty trace sized for `seconds` of history.
    #[must_use]
    pub fn with_duration(seconds: f64, sample_rate: f64, color: Rgb) -> Self {
        Self::new(capacity_for(seconds, sample_rate), color)
    }

    /// Append a sample, evicting the oldest when over capacity.
    ///
    /// Hidden traces ignore new samples.
    pub fn push(&mut self, point: Vec2) {
        if !self.visible {
            return;
        }
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Re-derive capacity from a duration.
    ///
    /// When shrinking, the *oldest* `capacity` samples survive in their
    /// original order; newer samples are discarded.
    pub fn set_capacity_by_duration(&mut self, seconds: f64, sample_rate: f64) {
        self.set_capacity(capacity_for(seconds, sample_rate));
    }

    /// Set capacity directly, keeping the oldest samples that still fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.points.truncate(capacity);
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Maximum number of samples.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }


    /// Number of stored samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no samples are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Stored samples, oldest first.
    pub fn points(&self) -> impl ExactSizeIterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }

    /// Trail color.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Change the trail color.
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Whether the trace records and shows samples.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the trace.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Each sample paired with its opacity in `(0, 1]`.
    ///
    /// Sample `i` (zero-based, oldest first) gets `(i + 1) / len`, so the
    /// newest sample is fully opaque.
    pub fn render_weights(&self) -> impl ExactSizeIterator<Item = (Vec2, f64)> + '_ {
        let len = self.points.len() as f64;
        self.points
            .iter()
            .enumerate()
            .map(move |(i, p)| (*p, (i + 1) as f64 / len))
    }

    /// Consecutive sample pairs with the opacity of the segment.
    ///
    /// Segment `i` joins samples `i - 1` and `i` and has opacity `i / len`.
    /// Fewer than two samples yields nothing.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2, f64)> + '_ {
        let len = self.points.len() as f64;
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .enumerate()
            .map(move |(i, (from, to))| (*from, *to, (i + 1) as f64 / len))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Falsification: length never exceeds capacity.
        #[test]
        fn prop_len_bounded(capacity in 0usize..50, pushes in 0usize..200) {
            let mut trace = PathTrace::new(capacity, Rgb::default());
            for i in 0..pushes {
                trace.push(Vec2::new(i as f64, 0.0));
                prop_assert!(trace.len() <= trace.capacity());
            }
        }

        /// Falsification: shrinking keeps a prefix of the old samples.
        #[test]
        fn prop_shrink_keeps_prefix(stored in 1usize..40, new_capacity in 0usize..40) {
            let mut trace = PathTrace::new(stored, Rgb::default());
            for i in 0..stored {
                trace.push(Vec2::new(i as f64, 0.0));
            }
            trace.set_capacity(new_capacity);
            let kept: Vec<f64> = trace.points().map(|p| p.x).collect();
            let expected: Vec<f64> = (0..stored.min(new_capacity)).map(|i| i as f64).collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
