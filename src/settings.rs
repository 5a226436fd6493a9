//! Game settings and presets
//!
//! Compile-time defaults live in `consts`; this is the runtime copy the
//! session actually reads, so variants can be selected without a rebuild.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Known rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Four segments, flat 4.5 s rounds, positive distractors
    #[default]
    Classic,
    /// Six segments, shrinking rounds, negative distractors
    Extended,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Classic => "Classic",
            Preset::Extended => "Extended",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Preset::Classic),
            "extended" | "ext" => Some(Preset::Extended),
            _ => None,
        }
    }
}

/// How values outside the solving subset are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistractorMode {
    /// Split a random total from [0, max_total - target] with the same cut
    /// technique as the solving parts
    #[default]
    Partition,
    /// Independent values in [NEGATIVE_DISTRACTOR_MIN, 0]; a negative
    /// running sum also counts as overshoot
    Negative,
}

/// Per-round time limit: `max(floor_ms, base_ms - round_index * step_ms)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationSchedule {
    pub base_ms: u64,
    pub step_ms: u64,
    pub floor_ms: u64,
}

impl DurationSchedule {
    /// Same duration every round
    pub fn flat(ms: u64) -> Self {
        Self {
            base_ms: ms,
            step_ms: 0,
            floor_ms: 0,
        }
    }

    pub fn duration_for(&self, round_index: usize) -> u64 {
        let shrink = self.step_ms.saturating_mul(round_index as u64);
        self.base_ms.saturating_sub(shrink).max(self.floor_ms)
    }
}

impl Default for DurationSchedule {
    fn default() -> Self {
        Self::flat(ROUND_DURATION_MS)
    }
}

/// Game rules for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Rule set these values came from
    pub preset: Preset,

    // === Generator ===
    /// Segments on the ring (N)
    pub segment_count: usize,
    /// Exact sum the player must select (T)
    pub target: u32,
    /// Budget for solving parts plus distractors (C)
    pub max_total: u32,
    pub distractors: DistractorMode,

    // === Round ===
    /// Running sum above this is flagged as overshoot
    pub overshoot_cap: i32,
    pub duration: DurationSchedule,

    // === Session ===
    pub max_rounds: usize,
    /// Delay between a solve and the next round
    pub confirm_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: Preset::Classic,

            segment_count: SEGMENT_COUNT,
            target: TARGET,
            max_total: MAX_TOTAL,
            distractors: DistractorMode::Partition,

            overshoot_cap: OVERSHOOT_CAP,
            duration: DurationSchedule::default(),

            max_rounds: MAX_ROUNDS,
            confirm_delay_ms: CONFIRM_DELAY_MS,
        }
    }
}

impl Settings {
    /// Create settings from a preset
    pub fn from_preset(preset: Preset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a preset (overwrites generator and timing rules)
    pub fn apply_preset(&mut self, preset: Preset) {
        self.preset = preset;
        match preset {
            Preset::Classic => {
                self.segment_count = SEGMENT_COUNT;
                self.distractors = DistractorMode::Partition;
                self.duration = DurationSchedule::default();
            }
            Preset::Extended => {
                self.segment_count = 6;
                self.distractors = DistractorMode::Negative;
                self.duration = DurationSchedule {
                    base_ms: 11_000,
                    step_ms: 3000,
                    floor_ms: 5000,
                };
            }
        }
    }

    /// Whether a negative running sum is also out of bounds
    pub fn signed_overshoot(&self) -> bool {
        self.distractors == DistractorMode::Negative
    }

    /// Check the generator's input domain
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segment_count == 0 {
            return Err(ConfigError::ZeroSegments);
        }
        if self.target == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        if self.max_total < self.target {
            return Err(ConfigError::TotalBelowTarget {
                max_total: self.max_total,
                target: self.target,
            });
        }
        // Segment values and running sums are i32
        if self.max_total > i32::MAX as u32 {
            return Err(ConfigError::TotalTooLarge(self.max_total));
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        if self.duration.duration_for(0) == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!("Loaded {} settings", settings.preset.as_str());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}
