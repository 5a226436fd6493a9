//! One live puzzle: segment values, the player's selection and the outcome

use serde::{Deserialize, Serialize};

use glam::Vec2;

use super::arc::{SegmentArc, segment_at, segment_at_point};

/// Outcome of a round. Leaves `Active` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    Active,
    Solved,
    TimedOut,
}

/// A ring segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub value: i32,
    pub arc: SegmentArc,
    selected: bool,
}

impl Segment {
    pub fn new(index: usize, value: i32, arc: SegmentArc) -> Self {
        Self {
            index,
            value,
            arc,
            selected: false,
        }
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Input locked or index out of range
    Ignored,
    /// Selection flipped, round still active
    Changed,
    /// This toggle brought the sum to the target
    Solved,
}

/// Round state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// Position in the session (0-based)
    pub index: usize,
    pub segments: Vec<Segment>,
    pub target: i32,
    /// Sum above this is flagged as overshoot
    pub cap: i32,
    /// Negative sums count as overshoot too
    pub signed: bool,
    status: RoundStatus,
}

impl Round {
    pub fn new(index: usize, values: &[i32], arcs: &[SegmentArc], target: i32, cap: i32, signed: bool) -> Self {
        let segments = values
            .iter()
            .zip(arcs)
            .enumerate()
            .map(|(i, (&value, arc))| Segment::new(i, value, arc.clone()))
            .collect();

        Self {
            index,
            segments,
            target,
            cap,
            signed,
            status: RoundStatus::Active,
        }
    }

    #[inline]
    pub fn status(&self) -> RoundStatus {
        self.status
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == RoundStatus::Active
    }

    pub fn values(&self) -> Vec<i32> {
        self.segments.iter().map(|s| s.value).collect()
    }

    pub fn selected(&self) -> Vec<bool> {
        self.segments.iter().map(|s| s.selected).collect()
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.segments
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.index)
            .collect()
    }

    /// Sum of the selected values, recomputed from the segments every call
    pub fn current_sum(&self) -> i32 {
        self.segments
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.value)
            .sum()
    }

    /// Presentation hint only; never blocks input
    pub fn overshoot(&self) -> bool {
        let sum = self.current_sum();
        sum > self.cap || (self.signed && sum < 0)
    }

    /// Flip segment `i`. Only allowed while the round is active; the toggle
    /// that lands exactly on the target solves the round.
    pub fn toggle(&mut self, i: usize) -> ToggleOutcome {
        if !self.is_active() {
            log::debug!("Round {} locked ({:?}), ignoring toggle {}", self.index, self.status, i);
            return ToggleOutcome::Ignored;
        }
        let Some(segment) = self.segments.get_mut(i) else {
            log::debug!("Toggle index {} out of range", i);
            return ToggleOutcome::Ignored;
        };
        segment.selected = !segment.selected;

        if self.current_sum() == self.target {
            self.status = RoundStatus::Solved;
            ToggleOutcome::Solved
        } else {
            ToggleOutcome::Changed
        }
    }

    /// Countdown ran out. Only an active round times out; returns whether
    /// the status changed.
    pub fn expire(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = RoundStatus::TimedOut;
        true
    }

    /// Segment under a pointer angle (None inside a gap)
    pub fn segment_at_angle(&self, theta: f32) -> Option<usize> {
        segment_at(self.segments.iter().map(|s| &s.arc), theta)
    }

    /// Segment under a pointer position relative to the ring center
    pub fn segment_at_point(&self, pos: Vec2) -> Option<usize> {
        segment_at_point(self.segments.iter().map(|s| &s.arc), pos)
    }

    /// Overwrite the selection without the solve check (tests, replays)
    pub fn set_selected(&mut self, i: usize, selected: bool) {
        if let Some(segment) = self.segments.get_mut(i) {
            segment.selected = selected;
        }
    }
}
