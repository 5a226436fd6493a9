//! Deterministic game core
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only arrives as explicit millisecond timestamps
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod arc;
pub mod countdown;
pub mod partition;
pub mod round;
pub mod state;
pub mod tick;

pub use arc::{SegmentArc, layout_ring, random_layout, segment_at, segment_at_point};
pub use countdown::{Countdown, CountdownState, Expiry};
pub use partition::{Partition, PartitionParams, count_solutions, find_solution, generate, generate_values};
pub use round::{Round, RoundStatus, Segment, ToggleOutcome};
pub use state::{GameEvent, GamePhase, GameState, PendingAdvance, RngState};
pub use tick::{TickInput, idle_move, tick};
