//! Per-frame driver
//!
//! The outer loop calls `tick` once per display refresh with the inputs
//! collected since the last frame. Each input is judged against the
//! deadline using the frame's timestamp, so a pick stamped at or past the
//! deadline times the round out instead of solving it.

use glam::Vec2;

use super::partition::find_solution;
use super::state::{GameEvent, GamePhase, GameState};

/// Input collected for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Segment indices clicked this frame, in order
    pub toggles: Vec<usize>,
    /// Pointer angles (radians from ring center) tapped this frame
    pub taps: Vec<f32>,
    /// Pointer positions relative to the ring center tapped this frame
    pub points: Vec<Vec2>,
    /// Idle/demo mode - the game plays itself
    pub idle_mode: bool,
}

/// Advance the session to `now_ms`
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: u64) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if state.phase() == GamePhase::Ready {
        events.extend(state.start(now_ms));
    }

    for &theta in &input.taps {
        let hit = state.round().and_then(|r| r.segment_at_angle(theta));
        match hit {
            Some(index) => events.extend(state.toggle(index, now_ms)),
            None => log::debug!("Tap at {:.3} rad landed in a gap", theta),
        }
    }

    for &pos in &input.points {
        let hit = state.round().and_then(|r| r.segment_at_point(pos));
        match hit {
            Some(index) => events.extend(state.toggle(index, now_ms)),
            None => log::debug!("Pointer at {} missed the ring", pos),
        }
    }

    for &index in &input.toggles {
        events.extend(state.toggle(index, now_ms));
    }

    if input.idle_mode {
        if let Some(index) = idle_move(state) {
            events.extend(state.toggle(index, now_ms));
        }
    }

    events.extend(state.advance(now_ms));
    events
}

/// Next toggle for the demo player: drop anything outside a solving subset,
/// then add the missing members one per frame
pub fn idle_move(state: &GameState) -> Option<usize> {
    if state.phase() != GamePhase::Playing {
        return None;
    }
    let round = state.round()?;
    let answer = find_solution(&round.values(), round.target)?;

    let selected = round.selected_indices();
    if let Some(&wrong) = selected.iter().find(|&&i| !answer.contains(&i)) {
        return Some(wrong);
    }
    answer.into_iter().find(|i| !selected.contains(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{DurationSchedule, Settings};
    use crate::sim::round::RoundStatus;

    fn session() -> GameState {
        let mut settings = Settings::default();
        settings.duration = DurationSchedule::flat(5000);
        GameState::new(settings, 2024).unwrap()
    }

    #[test]
    fn test_first_tick_starts_session() {
        let mut state = session();
        let events = tick(&mut state, &TickInput::default(), 0);
        assert!(matches!(events[0], GameEvent::RoundStarted { round: 0, .. }));
        assert_eq!(state.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_idle_mode_wins_session() {
        let mut state = session();
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        let mut now = 0;
        while !state.phase().is_terminal() && now < 60_000 {
            tick(&mut state, &input, now);
            now += 16;
        }
        assert!(state.session_succeeded());
        assert_eq!(state.completed(), &[0, 1, 2]);
    }

    #[test]
    fn test_idle_player_undoes_wrong_picks() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), 0);

        let answer = {
            let round = state.round().unwrap();
            find_solution(&round.values(), round.target).unwrap()
        };
        if let Some(wrong) = (0..4).find(|i| !answer.contains(i)) {
            state.toggle(wrong, 10);
            assert_eq!(idle_move(&state), Some(wrong));
        }
    }

    #[test]
    fn test_taps_hit_segments() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), 0);

        let mid = state.round().unwrap().segments[2].arc.mid_angle();
        let input = TickInput {
            taps: vec![mid],
            ..Default::default()
        };
        let events = tick(&mut state, &input, 16);
        let selected = state.round().unwrap().segments[2].is_selected();
        let solved = state.round_status() == Some(RoundStatus::Solved);
        assert!(selected || solved);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::SelectionChanged { index: 2, .. })));
    }

    #[test]
    fn test_pointer_positions_hit_segments() {
        let mut state = session();
        tick(&mut state, &TickInput::default(), 0);

        let mid = state.round().unwrap().segments[1].arc.mid_angle();
        let input = TickInput {
            points: vec![Vec2::ZERO, Vec2::new(mid.cos(), mid.sin()) * 3.0],
            ..Default::default()
        };
        let events = tick(&mut state, &input, 16);
        let changed: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::SelectionChanged { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(changed, vec![1]);
        assert!(state.round().unwrap().segments[1].is_selected());
    }

    #[test]
    fn test_no_input_times_out() {
        let mut state = session();
        let mut failed_at = None;
        for frame in 0..400u64 {
            let now = frame * 16;
            let events = tick(&mut state, &TickInput::default(), now);
            if events.contains(&GameEvent::SessionFailed) {
                failed_at = Some(now);
            }
        }
        // First frame at or after 5000 ms
        assert_eq!(failed_at, Some(5008));
        assert_eq!(state.round_status(), Some(RoundStatus::TimedOut));
    }

    /// Pick all but the last answer element early, return the last one
    fn pick_all_but_last(state: &mut GameState) -> usize {
        tick(state, &TickInput::default(), 0);
        let answer = {
            let round = state.round().unwrap();
            find_solution(&round.values(), round.target).unwrap()
        };
        let (last, rest) = answer.split_last().unwrap();
        for &i in rest {
            tick(
                state,
                &TickInput {
                    toggles: vec![i],
                    ..Default::default()
                },
                100,
            );
        }
        *last
    }

    #[test]
    fn test_toggle_just_before_deadline_solves() {
        let mut state = session();
        let last = pick_all_but_last(&mut state);

        let events = tick(
            &mut state,
            &TickInput {
                toggles: vec![last],
                ..Default::default()
            },
            4999,
        );
        assert!(events.contains(&GameEvent::RoundSolved { round: 0 }));
        assert!(!state.session_failed());
    }

    #[test]
    fn test_toggle_and_expiry_same_frame() {
        let mut state = session();
        let last = pick_all_but_last(&mut state);

        // Final pick arrives in the frame where the deadline is crossed
        let events = tick(
            &mut state,
            &TickInput {
                toggles: vec![last],
                ..Default::default()
            },
            5000,
        );
        assert!(!events.contains(&GameEvent::RoundSolved { round: 0 }));
        assert!(events.contains(&GameEvent::SessionFailed));
        assert!(!state.round().unwrap().segments[last].is_selected());
        assert_eq!(state.round_status(), Some(RoundStatus::TimedOut));
    }
}
