//! Configuration errors
//!
//! Gameplay itself never fails; only a bad set of parameters can.

use thiserror::Error;

/// Raised when settings would let the generator build an unsolvable round.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("segment count must be at least 1")]
    ZeroSegments,
    #[error("target must be greater than 0")]
    ZeroTarget,
    #[error("max total {max_total} is below the target {target}")]
    TotalBelowTarget { max_total: u32, target: u32 },
    #[error("max total {0} does not fit a signed 32-bit sum")]
    TotalTooLarge(u32),
    #[error("a session needs at least one round")]
    ZeroRounds,
    #[error("round duration must be greater than 0 ms")]
    ZeroDuration,
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
}
