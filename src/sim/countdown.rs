//! Per-round countdown
//!
//! Driven by whoever owns the frame loop: call `advance(now_ms)` once per
//! frame. Progress depends only on wall-clock time against the duration,
//! never on how often it is sampled.

use serde::{Deserialize, Serialize};

/// Countdown lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownState {
    /// Not started for the current round
    Idle,
    Running,
    /// Ran out; expiry has been reported
    Expired,
    /// Stopped early (round solved, replaced, or session over)
    Cancelled,
}

/// Reported exactly once when a running countdown reaches its duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// Ticket of the round this countdown was started for
    pub ticket: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Countdown {
    state: CountdownState,
    ticket: u64,
    started_at_ms: u64,
    duration_ms: u64,
    elapsed_fraction: f64,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            state: CountdownState::Idle,
            ticket: 0,
            started_at_ms: 0,
            duration_ms: 0,
            elapsed_fraction: 0.0,
        }
    }

    /// (Re)start for the round identified by `ticket`
    pub fn start(&mut self, ticket: u64, now_ms: u64, duration_ms: u64) {
        self.state = CountdownState::Running;
        self.ticket = ticket;
        self.started_at_ms = now_ms;
        self.duration_ms = duration_ms;
        self.elapsed_fraction = 0.0;
    }

    /// Sample the clock. Returns the expiry on the one frame it happens.
    pub fn advance(&mut self, now_ms: u64) -> Option<Expiry> {
        if self.state != CountdownState::Running {
            return None;
        }

        let elapsed = now_ms.saturating_sub(self.started_at_ms);
        if elapsed >= self.duration_ms {
            self.elapsed_fraction = 1.0;
            self.state = CountdownState::Expired;
            return Some(Expiry { ticket: self.ticket });
        }

        // Clamp against clocks that step backwards
        let fraction = elapsed as f64 / self.duration_ms as f64;
        self.elapsed_fraction = self.elapsed_fraction.max(fraction.min(1.0));
        None
    }

    /// Stop sampling. The fraction stays where it was.
    pub fn cancel(&mut self) {
        if self.state == CountdownState::Running || self.state == CountdownState::Idle {
            self.state = CountdownState::Cancelled;
        }
    }

    #[inline]
    pub fn state(&self) -> CountdownState {
        self.state
    }

    #[inline]
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    #[inline]
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Progress through the round in [0, 1]
    #[inline]
    pub fn elapsed_fraction(&self) -> f64 {
        self.elapsed_fraction
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.state {
            CountdownState::Running => {
                let elapsed = now_ms.saturating_sub(self.started_at_ms);
                self.duration_ms.saturating_sub(elapsed)
            }
            CountdownState::Expired => 0,
            CountdownState::Idle | CountdownState::Cancelled => {
                let left = 1.0 - self.elapsed_fraction;
                (left * self.duration_ms as f64).round() as u64
            }
        }
    }
}
