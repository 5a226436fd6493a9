//! HUD snapshot
//!
//! Everything the ring renderer needs for one frame, copied out of the
//! session. Rebuild it whenever `tick` returns events.

use serde::{Deserialize, Serialize};

use crate::sim::{GamePhase, GameState, RoundStatus, SegmentArc};

/// End-of-session banners
pub const BANNER_FAILED: &str = "HACK FAILED";
pub const BANNER_PASSED: &str = "HACK PASSED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub round_index: usize,
    pub values: Vec<i32>,
    pub selected: Vec<bool>,
    pub arcs: Vec<SegmentArc>,
    pub current_sum: i32,
    pub overshoot: bool,
    /// Center fill: sum over target, clamped to [0, max_total / target]
    pub fill_fraction: f32,
    pub status: Option<RoundStatus>,
    /// Progress bar per round slot
    pub slots: Vec<f64>,
    pub completed: Vec<usize>,
    pub session_failed: bool,
    pub session_succeeded: bool,
}

impl HudSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let settings = &state.settings;
        let round = state.round();

        let current_sum = round.map(|r| r.current_sum()).unwrap_or(0);
        let clamped = current_sum.clamp(0, settings.max_total as i32);

        Self {
            phase: state.phase(),
            round_index: state.round_index(),
            values: round.map(|r| r.values()).unwrap_or_default(),
            selected: round.map(|r| r.selected()).unwrap_or_default(),
            arcs: round
                .map(|r| r.segments.iter().map(|s| s.arc.clone()).collect())
                .unwrap_or_default(),
            current_sum,
            overshoot: round.map(|r| r.overshoot()).unwrap_or(false),
            fill_fraction: clamped as f32 / settings.target as f32,
            status: round.map(|r| r.status()),
            slots: state.slot_fractions(),
            completed: state.completed().to_vec(),
            session_failed: state.session_failed(),
            session_succeeded: state.session_succeeded(),
        }
    }

    /// Message for a finished session
    pub fn banner(&self) -> Option<&'static str> {
        if self.session_failed {
            Some(BANNER_FAILED)
        } else if self.session_succeeded {
            Some(BANNER_PASSED)
        } else {
            None
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
