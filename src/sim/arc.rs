//! Ring segment geometry
//!
//! Each round lays its segments around the ring as equal angular slices,
//! rotated by a random offset, with a small gap between neighbours.
//! Purely derived data: nothing here affects whether a round is solvable.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::SEGMENT_GAP;
use crate::{angle_of, normalize_angle};

/// Angular extent of one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentArc {
    /// Start angle (radians, normalized to [-π, π))
    pub theta_start: f32,
    /// End angle (radians, normalized to [-π, π))
    pub theta_end: f32,
}

impl SegmentArc {
    pub fn new(theta_start: f32, theta_end: f32) -> Self {
        Self {
            theta_start: normalize_angle(theta_start),
            theta_end: normalize_angle(theta_end),
        }
    }

    /// Angular span of the arc (handles wraparound)
    pub fn angular_span(&self) -> f32 {
        let mut span = self.theta_end - self.theta_start;
        if span < 0.0 {
            span += TAU;
        }
        span
    }

    /// Check if an angle is within the arc's angular extent
    pub fn contains_angle(&self, theta: f32) -> bool {
        let theta = normalize_angle(theta);
        let start = self.theta_start;
        let end = self.theta_end;

        if start <= end {
            theta >= start && theta <= end
        } else {
            // Wraparound case (e.g., start=170°, end=-170°)
            theta >= start || theta <= end
        }
    }

    pub fn mid_angle(&self) -> f32 {
        normalize_angle(self.theta_start + self.angular_span() / 2.0)
    }
}

/// Lay out `count` equal slices starting at `offset`
pub fn layout_ring(count: usize, offset: f32) -> Vec<SegmentArc> {
    if count == 0 {
        return Vec::new();
    }
    let slice = TAU / count as f32;
    (0..count)
        .map(|i| {
            let start = offset + i as f32 * slice + SEGMENT_GAP / 2.0;
            let end = offset + (i + 1) as f32 * slice - SEGMENT_GAP / 2.0;
            SegmentArc::new(start, end)
        })
        .collect()
}

/// Ring layout with a random rotation
pub fn random_layout<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<SegmentArc> {
    let offset = rng.random_range(0.0..TAU);
    layout_ring(count, offset)
}

/// Which segment sits under a pointer angle (None inside a gap)
pub fn segment_at<'a>(arcs: impl IntoIterator<Item = &'a SegmentArc>, theta: f32) -> Option<usize> {
    arcs.into_iter().position(|arc| arc.contains_angle(theta))
}

/// Hit-test a point relative to the ring center
pub fn segment_at_point<'a>(arcs: impl IntoIterator<Item = &'a SegmentArc>, pos: Vec2) -> Option<usize> {
    if pos == Vec2::ZERO {
        return None;
    }
    segment_at(arcs, angle_of(pos))
}
