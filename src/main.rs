//! Temporal Courier entry point
//!
//! Headless runner: loads tuning and level data, drives the simulation with a
//! scripted courier run and prints the final frame as JSON.
//!
//! Usage: `temporal-courier [tuning.json]`, with optional
//! `TEMPORAL_COURIER_LEVELS=levels.json` and `TEMPORAL_COURIER_SEED=<u64>`.

use std::error::Error;

use temporal_courier::consts::TICK_MILLIS;
use temporal_courier::platform::{Clock, ManualClock};
use temporal_courier::sim::{GameEvent, LevelRegistry, SimulationState, TickInput, tick};
use temporal_courier::ui::FrameView;
use temporal_courier::Tuning;

const DEFAULT_SEED: u64 = 0x7e3a_c0de;
const RUN_TICKS: u64 = 900;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    log::info!("Temporal Courier (headless) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let levels = match std::env::var("TEMPORAL_COURIER_LEVELS") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)?;
            let levels = LevelRegistry::from_json(&json)?;
            log::info!("Loaded {} levels from {}", levels.len(), path);
            levels
        }
        Err(_) => LevelRegistry::builtin(),
    };
    let seed = std::env::var("TEMPORAL_COURIER_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    let mut state = SimulationState::try_new(seed, tuning, levels)?;
    log::info!("Simulation initialized with seed: {}", seed);

    let clock = ManualClock::new();
    let mut elapsed_ms = 0.0f64;
    for t in 0..RUN_TICKS {
        let input = scripted_input(t);
        tick(&mut state, &input, &clock);
        for event in &state.events {
            match event {
                GameEvent::PowerIgnored { .. } | GameEvent::CloneExpired { .. } => {
                    log::debug!("tick {}: {:?}", state.time_ticks, event)
                }
                _ => log::info!("tick {}: {:?}", state.time_ticks, event),
            }
        }
        // Advance wall time by whole milliseconds, carrying the fraction
        elapsed_ms += TICK_MILLIS;
        let target = elapsed_ms as u64;
        let now = clock.now().as_millis() as u64;
        clock.advance_millis(target.saturating_sub(now));
    }

    state.shutdown();
    let frame = FrameView::capture(&state);
    println!("{}", serde_json::to_string_pretty(&frame)?);
    Ok(())
}

/// Walk to the package, grab it and run right, using every power along the way
fn scripted_input(t: u64) -> TickInput {
    TickInput {
        move_right: (30..45).contains(&t) || t >= 90,
        jump: t >= 90 && t.is_multiple_of(45),
        interact: t == 80,
        activate_slow_time: t == 200,
        activate_rewind: t == 400,
        activate_clone: t == 120,
        ..Default::default()
    }
}
