//! Circle Sum entry point
//!
//! Runs one session headless in idle/demo mode on a simulated 60 Hz clock
//! and prints the final HUD snapshot. The ring renderer is a separate
//! concern; this exercises the core end to end.

use circle_sum::sim::{GameEvent, GameState, TickInput, tick};
use circle_sum::{HudSnapshot, Preset, Settings};

/// Simulated frame length (~60 Hz)
const FRAME_MS: u64 = 16;
/// Demo player makes a move every this many frames
const IDLE_MOVE_EVERY: u64 = 12;

/// Latest simulated time the demo keeps running: every round at full
/// length plus its confirmation delay, and a frame of slack for each round
/// starting on a frame boundary
fn demo_deadline(settings: &Settings) -> u64 {
    (0..settings.max_rounds)
        .map(|k| {
            settings
                .duration
                .duration_for(k)
                .saturating_add(settings.confirm_delay_ms)
                .saturating_add(FRAME_MS)
        })
        .fold(0u64, u64::saturating_add)
}

fn main() {
    env_logger::init();
    log::info!("Circle Sum (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0xC1AC1E);
    let preset = args
        .next()
        .and_then(|s| Preset::from_str(&s))
        .unwrap_or_default();

    let settings = Settings::from_preset(preset);
    let mut state = match GameState::new(settings, seed) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Invalid settings: {}", e);
            std::process::exit(2);
        }
    };
    log::info!("Game initialized with seed: {} ({})", seed, preset.as_str());

    let mut frame = 0u64;
    let deadline = demo_deadline(&state.settings);
    while !state.phase().is_terminal() && frame * FRAME_MS <= deadline {
        let input = TickInput {
            idle_mode: frame % IDLE_MOVE_EVERY == 0,
            ..Default::default()
        };
        let now = frame * FRAME_MS;
        for event in tick(&mut state, &input, now) {
            match event {
                GameEvent::SelectionChanged { index, sum, overshoot, .. } => {
                    println!("[{:>6} ms] segment {} -> sum {}{}", now, index, sum, if overshoot { " (over)" } else { "" });
                }
                other => println!("[{:>6} ms] {:?}", now, other),
            }
        }
        frame += 1;
    }

    let hud = HudSnapshot::capture(&state);
    if let Some(banner) = hud.banner() {
        println!("{}", banner);
    }
    match hud.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode snapshot: {}", e),
    }
}
