//! Session state and round-to-round progression
//!
//! One `GameState` per play-through. It owns the live round and its
//! countdown, and is the only thing that replaces them. Every transition
//! returns the `GameEvent`s it produced so the presentation layer can react
//! without polling.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arc::random_layout;
use super::countdown::{Countdown, Expiry};
use super::partition::{PartitionParams, count_solutions, generate};
use super::round::{Round, RoundStatus, ToggleOutcome};
use crate::consts::MAX_CHECKED_SEGMENTS;
use crate::error::ConfigError;
use crate::settings::Settings;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created, first round not generated yet
    Ready,
    /// Round live, countdown running
    Playing,
    /// Round solved, waiting out the confirmation delay
    Confirming,
    /// All rounds cleared
    Succeeded,
    /// A round timed out
    Failed,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Succeeded | GamePhase::Failed)
    }
}

/// State change notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { round: usize, duration_ms: u64 },
    SelectionChanged { round: usize, index: usize, selected: bool, sum: i32, overshoot: bool },
    RoundSolved { round: usize },
    RoundTimedOut { round: usize },
    SessionSucceeded,
    SessionFailed,
}

/// RNG state wrapper for serialization. Each round draws from its own
/// PCG stream so a session replays from its seed alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }
}

/// Advancement scheduled after a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAdvance {
    /// Ticket of the solved round
    pub ticket: u64,
    pub due_at_ms: u64,
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    pub settings: Settings,
    phase: GamePhase,
    /// Current round (0-based)
    round_index: usize,
    round: Option<Round>,
    countdown: Countdown,
    /// Indices of solved rounds, in order
    completed: Vec<usize>,
    pending: Option<PendingAdvance>,
    /// Identifies the live round; stale timers carry an older one
    ticket: u64,
}

impl GameState {
    /// Create a session. Nothing is generated until `start`.
    pub fn new(settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            seed,
            rng_state: RngState::new(seed),
            settings,
            phase: GamePhase::Ready,
            round_index: 0,
            round: None,
            countdown: Countdown::new(),
            completed: Vec::new(),
            pending: None,
            ticket: 0,
        })
    }

    /// Throw the session away and begin again from `seed`
    pub fn restart(&mut self, seed: u64) {
        log::info!("Session restarted with seed: {}", seed);
        self.countdown.cancel();
        self.seed = seed;
        self.rng_state = RngState::new(seed);
        self.phase = GamePhase::Ready;
        self.round_index = 0;
        self.round = None;
        self.countdown = Countdown::new();
        self.completed.clear();
        self.pending = None;
        self.ticket = 0;
    }

    /// Generate the first round and start its countdown
    pub fn start(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::Ready {
            log::debug!("Session already started ({:?})", self.phase);
            return events;
        }
        log::info!(
            "Session starting: {} rounds of {} segments, seed {}",
            self.settings.max_rounds,
            self.settings.segment_count,
            self.seed
        );
        self.begin_round(now_ms, &mut events);
        events
    }

    fn begin_round(&mut self, now_ms: u64, events: &mut Vec<GameEvent>) {
        // Anything still scheduled belongs to the round being replaced
        self.countdown.cancel();
        self.pending = None;

        self.ticket += 1;
        self.rng_state.stream = self.ticket;
        let mut rng = self.rng_state.to_rng();

        let settings = &self.settings;
        let partition = generate(&mut rng, &PartitionParams::from(settings));
        let arcs = random_layout(&mut rng, settings.segment_count);
        if settings.segment_count <= MAX_CHECKED_SEGMENTS {
            let solutions = count_solutions(&partition.values, settings.target as i32);
            if solutions > 1 {
                log::debug!("Round {} has {} solving subsets", self.round_index + 1, solutions);
            }
        }
        let round = Round::new(
            self.round_index,
            &partition.values,
            &arcs,
            settings.target as i32,
            settings.overshoot_cap,
            settings.signed_overshoot(),
        );

        let duration_ms = settings.duration.duration_for(self.round_index);
        log::info!(
            "Round {} started: values {:?}, {} ms",
            self.round_index + 1,
            partition.values,
            duration_ms
        );

        self.round = Some(round);
        self.countdown.start(self.ticket, now_ms, duration_ms);
        self.phase = GamePhase::Playing;
        events.push(GameEvent::RoundStarted {
            round: self.round_index,
            duration_ms,
        });
    }

    /// Player input: flip segment `index` of the live round
    pub fn toggle(&mut self, index: usize, now_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();

        // The deadline is judged by the input's own timestamp, not by when
        // the last frame happened to sample the clock
        if let Some(expiry) = self.countdown.advance(now_ms) {
            events.extend(self.on_countdown_expired(expiry));
        }

        if self.phase != GamePhase::Playing {
            log::debug!("Toggle {} ignored in {:?}", index, self.phase);
            return events;
        }
        let Some(round) = self.round.as_mut() else {
            return events;
        };

        let outcome = round.toggle(index);
        if outcome == ToggleOutcome::Ignored {
            return events;
        }

        let sum = round.current_sum();
        events.push(GameEvent::SelectionChanged {
            round: self.round_index,
            index,
            selected: round.segments[index].is_selected(),
            sum,
            overshoot: round.overshoot(),
        });
        log::debug!("Toggled segment {} -> sum {}", index, sum);

        if outcome == ToggleOutcome::Solved {
            self.on_round_solved(now_ms, &mut events);
        }
        events
    }

    fn on_round_solved(&mut self, now_ms: u64, events: &mut Vec<GameEvent>) {
        log::info!(
            "Round {} solved with {} ms left",
            self.round_index + 1,
            self.countdown.remaining_ms(now_ms)
        );
        self.countdown.cancel();
        self.pending = Some(PendingAdvance {
            ticket: self.ticket,
            due_at_ms: now_ms.saturating_add(self.settings.confirm_delay_ms),
        });
        self.phase = GamePhase::Confirming;
        events.push(GameEvent::RoundSolved {
            round: self.round_index,
        });
    }

    /// Per-frame step: sample the countdown and fire the post-solve
    /// advancement once it is due
    pub fn advance(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if let Some(expiry) = self.countdown.advance(now_ms) {
            events.extend(self.on_countdown_expired(expiry));
        }

        if let Some(pending) = self.pending {
            if now_ms >= pending.due_at_ms {
                events.extend(self.on_post_solve_timer_fired(pending.ticket, now_ms));
            }
        }

        events
    }

    /// Countdown ran out. Only fails the session if the expiry belongs to the
    /// live round and that round is still active.
    pub fn on_countdown_expired(&mut self, expiry: Expiry) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if expiry.ticket != self.ticket {
            log::warn!("Stale countdown expiry (ticket {} != {})", expiry.ticket, self.ticket);
            return events;
        }
        if self.phase != GamePhase::Playing {
            return events;
        }
        let Some(round) = self.round.as_mut() else {
            return events;
        };
        if !round.expire() {
            return events;
        }

        log::info!("Round {} timed out", self.round_index + 1);
        events.push(GameEvent::RoundTimedOut {
            round: self.round_index,
        });
        self.fail(&mut events);
        events
    }

    /// Confirmation delay elapsed: record the solve, then either finish the
    /// session or start the next round
    pub fn on_post_solve_timer_fired(&mut self, ticket: u64, now_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.pending {
            Some(pending) if pending.ticket == ticket => {}
            _ => {
                log::warn!("Stale post-solve timer (ticket {})", ticket);
                return events;
            }
        }
        self.pending = None;

        if self.phase != GamePhase::Confirming {
            return events;
        }

        self.completed.push(self.round_index);
        if self.completed.len() >= self.settings.max_rounds {
            self.phase = GamePhase::Succeeded;
            log::info!("Session succeeded ({} rounds)", self.completed.len());
            events.push(GameEvent::SessionSucceeded);
            return events;
        }

        self.round_index += 1;
        self.begin_round(now_ms, &mut events);
        events
    }

    fn fail(&mut self, events: &mut Vec<GameEvent>) {
        self.countdown.cancel();
        self.pending = None;
        self.phase = GamePhase::Failed;
        log::info!("Session failed at round {}", self.round_index + 1);
        events.push(GameEvent::SessionFailed);
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn round_index(&self) -> usize {
        self.round_index
    }

    #[inline]
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Mutable access to the live round (tests, replays)
    pub fn round_mut(&mut self) -> Option<&mut Round> {
        self.round.as_mut()
    }

    #[inline]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    #[inline]
    pub fn completed(&self) -> &[usize] {
        &self.completed
    }

    #[inline]
    pub fn pending_advance(&self) -> Option<PendingAdvance> {
        self.pending
    }

    #[inline]
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn session_failed(&self) -> bool {
        self.phase == GamePhase::Failed
    }

    pub fn session_succeeded(&self) -> bool {
        self.phase == GamePhase::Succeeded
    }

    pub fn round_status(&self) -> Option<RoundStatus> {
        self.round.as_ref().map(|r| r.status())
    }

    /// Progress per round slot: cleared rounds are full, the live round
    /// shows its countdown, later rounds are empty
    pub fn slot_fractions(&self) -> Vec<f64> {
        (0..self.settings.max_rounds)
            .map(|k| {
                if self.completed.contains(&k) {
                    1.0
                } else if k == self.round_index && self.round.is_some() {
                    self.countdown.elapsed_fraction()
                } else {
                    0.0
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DurationSchedule;
    use crate::sim::partition::find_solution;

    fn session(duration_ms: u64) -> GameState {
        let mut settings = Settings::default();
        settings.duration = DurationSchedule::flat(duration_ms);
        GameState::new(settings, 12345).unwrap()
    }

    /// Select a solving subset of the live round
    fn solve(state: &mut GameState, now_ms: u64) -> Vec<GameEvent> {
        let round = state.round().unwrap();
        let answer = find_solution(&round.values(), round.target).unwrap();
        let mut events = Vec::new();
        for i in answer {
            events.extend(state.toggle(i, now_ms));
        }
        events
    }

    #[test]
    fn test_start_generates_first_round() {
        let mut state = session(5000);
        assert_eq!(state.phase(), GamePhase::Ready);
        assert!(state.round().is_none());

        let events = state.start(0);
        assert_eq!(
            events,
            vec![GameEvent::RoundStarted {
                round: 0,
                duration_ms: 5000
            }]
        );
        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.round().unwrap().segments.len(), 4);
        assert!(state.start(10).is_empty());
    }

    #[test]
    fn test_timeout_fails_session() {
        let mut state = session(5000);
        state.start(0);

        assert!(state.advance(4999).is_empty());
        let events = state.advance(5001);
        assert_eq!(
            events,
            vec![GameEvent::RoundTimedOut { round: 0 }, GameEvent::SessionFailed]
        );
        assert_eq!(state.round_status(), Some(RoundStatus::TimedOut));
        assert!(state.session_failed());
        assert!(!state.session_succeeded());

        // Terminal: inputs and frames do nothing
        assert!(state.toggle(0, 5100).is_empty());
        assert!(state.advance(20_000).is_empty());
        assert!(state.completed().is_empty());
    }

    #[test]
    fn test_three_solved_rounds_succeed() {
        let mut state = session(5000);
        state.start(0);

        let mut now = 0;
        for round in 0..3 {
            assert_eq!(state.round_index(), round);
            now += 1000;
            let events = solve(&mut state, now);
            assert!(events.contains(&GameEvent::RoundSolved { round }));
            assert_eq!(state.phase(), GamePhase::Confirming);

            // Nothing happens before the confirmation delay
            assert!(state.advance(now + 999).is_empty());
            now += 1000;
            state.advance(now);
        }

        assert_eq!(state.completed(), &[0, 1, 2]);
        assert!(state.session_succeeded());
        assert!(!state.session_failed());
        assert_eq!(state.round_index(), 2);
        // No fourth round
        assert_eq!(state.ticket(), 3);
        assert!(state.advance(now + 60_000).is_empty());
    }

    #[test]
    fn test_solve_beats_late_expiry() {
        let mut state = session(5000);
        state.start(0);
        solve(&mut state, 4990);

        // Frame lands past the deadline but the round is already solved
        let events = state.advance(5005);
        assert!(events.is_empty());
        assert_eq!(state.round_status(), Some(RoundStatus::Solved));

        // Even a forced expiry for the same round is ignored
        let ticket = state.ticket();
        assert!(state.on_countdown_expired(Expiry { ticket }).is_empty());
        assert!(!state.session_failed());

        let events = state.advance(5990);
        assert!(events.contains(&GameEvent::RoundStarted {
            round: 1,
            duration_ms: 5000
        }));
    }

    #[test]
    fn test_stale_timers_ignored() {
        let mut state = session(5000);
        state.start(0);
        let first = state.ticket();
        solve(&mut state, 100);
        state.advance(1100);
        assert_eq!(state.round_index(), 1);

        // Expiry and post-solve timer from round 0 must not touch round 1
        assert!(state.on_countdown_expired(Expiry { ticket: first }).is_empty());
        assert!(state.on_post_solve_timer_fired(first, 1200).is_empty());
        assert_eq!(state.phase(), GamePhase::Playing);
        assert_eq!(state.round_status(), Some(RoundStatus::Active));
        assert_eq!(state.completed(), &[0]);
    }

    #[test]
    fn test_round_countdown_restarts_on_new_round() {
        let mut state = session(5000);
        state.start(0);
        solve(&mut state, 4000);
        state.advance(5000);
        assert_eq!(state.round_index(), 1);

        // Round 1 got a fresh 5 s from t=5000
        assert!(state.advance(9999).is_empty());
        let events = state.advance(10_000);
        assert!(events.contains(&GameEvent::SessionFailed));
        assert_eq!(state.completed(), &[0]);
    }

    #[test]
    fn test_decaying_duration() {
        let mut state = GameState::new(Settings::from_preset(crate::Preset::Extended), 7).unwrap();
        let events = state.start(0);
        assert!(events.contains(&GameEvent::RoundStarted {
            round: 0,
            duration_ms: 11_000
        }));
        solve(&mut state, 10);
        let events = state.advance(1010);
        assert!(events.contains(&GameEvent::RoundStarted {
            round: 1,
            duration_ms: 8000
        }));
        assert_eq!(state.round().unwrap().segments.len(), 6);
    }

    #[test]
    fn test_slot_fractions() {
        let mut state = session(4000);
        state.start(0);
        state.advance(1000);
        assert_eq!(state.slot_fractions(), vec![0.25, 0.0, 0.0]);

        solve(&mut state, 2000);
        state.advance(3000);
        state.advance(5000);
        assert_eq!(state.slot_fractions(), vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_same_seed_same_rounds() {
        let mut a = session(5000);
        let mut b = session(5000);
        a.start(0);
        b.start(0);
        assert_eq!(a.round().unwrap().values(), b.round().unwrap().values());

        a.restart(99);
        a.start(0);
        let mut c = GameState::new(a.settings.clone(), 99).unwrap();
        c.start(0);
        assert_eq!(a.round().unwrap().values(), c.round().unwrap().values());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.target = 0;
        assert!(GameState::new(settings, 1).is_err());
    }

    #[test]
    fn test_late_toggle_times_out_without_frames() {
        let mut state = session(4500);
        state.start(0);
        let answer = {
            let round = state.round().unwrap();
            find_solution(&round.values(), round.target).unwrap()
        };

        // No frame sampled between start and a toggle long after the deadline
        let events = state.toggle(answer[0], 60_000);
        assert_eq!(
            events,
            vec![GameEvent::RoundTimedOut { round: 0 }, GameEvent::SessionFailed]
        );
        for &i in &answer[1..] {
            assert!(state.toggle(i, 60_016).is_empty());
        }
        assert_eq!(state.round_status(), Some(RoundStatus::TimedOut));
        assert_eq!(state.round().unwrap().current_sum(), 0);
        assert!(state.session_failed());
    }

    #[test]
    fn test_toggle_at_deadline_is_too_late() {
        let mut state = session(5000);
        state.start(0);
        assert!(state.advance(4999).is_empty());

        let events = state.toggle(1, 5000);
        assert_eq!(
            events,
            vec![GameEvent::RoundTimedOut { round: 0 }, GameEvent::SessionFailed]
        );
        assert!(!state.round().unwrap().segments[1].is_selected());
    }

    #[test]
    fn test_huge_confirm_delay_saturates() {
        let mut settings = Settings::default();
        settings.confirm_delay_ms = u64::MAX;
        let mut state = GameState::new(settings, 3).unwrap();
        state.start(0);
        solve(&mut state, 10);
        assert_eq!(state.pending_advance().unwrap().due_at_ms, u64::MAX);
        assert!(state.advance(1_000_000).is_empty());
        assert_eq!(state.phase(), GamePhase::Confirming);
    }
}
