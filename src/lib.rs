//! Circle Sum - A timed ring puzzle
//!
//! Pick the ring segments whose values add up to exactly 100 before the
//! countdown runs out, three rounds in a row.
//!
//! Core modules:
//! - `sim`: Deterministic game core (generator, round, countdown, session)
//! - `settings`: Tunable game parameters and presets
//! - `hud`: Read-only snapshot for whatever draws the ring
//! - `error`: Configuration errors

pub mod error;
pub mod hud;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use hud::HudSnapshot;
pub use settings::{DistractorMode, DurationSchedule, Preset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Segments on the ring (classic layout)
    pub const SEGMENT_COUNT: usize = 4;
    /// Sum the player has to hit
    pub const TARGET: u32 = 100;
    /// Budget shared by solving parts and distractors
    pub const MAX_TOTAL: u32 = 150;
    /// Running sum above this is flagged as overshoot
    pub const OVERSHOOT_CAP: i32 = 100;

    /// Time allowed per round
    pub const ROUND_DURATION_MS: u64 = 4500;
    /// Rounds to clear for a successful session
    pub const MAX_ROUNDS: usize = 3;
    /// Pause after a solve before the next round starts
    pub const CONFIRM_DELAY_MS: u64 = 1000;

    /// Empty wedge between neighbouring segments (4 degrees)
    pub const SEGMENT_GAP: f32 = 4.0 * std::f32::consts::PI / 180.0;

    /// Extended preset: distractors drawn from [NEGATIVE_DISTRACTOR_MIN, 0]
    pub const NEGATIVE_DISTRACTOR_MIN: i32 = -50;

    /// Redraws allowed when distractors open an alternate solution
    pub const DISTRACTOR_ATTEMPTS: u32 = 16;
    /// Above this many segments the alternate-solution check is skipped
    pub const MAX_CHECKED_SEGMENTS: usize = 16;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Angle of a point relative to the ring center
#[inline]
pub fn angle_of(pos: Vec2) -> f32 {
    pos.y.atan2(pos.x)
}
