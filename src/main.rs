//! Vortex Drift entry point
//!
//! Headless driver: runs a scripted session against the simulation core and
//! reports what happened. The rendering front end lives in the host shell;
//! this binary exists for profiling and for watching the event stream.

use glam::Vec2;

use vortex_drift::consts::*;
use vortex_drift::score::ScoreEntry;
use vortex_drift::sim::{GameEvent, InteractionMode, TickInput};
use vortex_drift::{GameConfig, GameLoop};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => GameConfig::from_json(&json),
            Err(e) => {
                log::warn!("could not read config {path}: {e}, using defaults");
                GameConfig::default()
            }
        },
        None => GameConfig::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xD217_F7A1);

    log::info!("Vortex Drift headless run, seed {seed}");
    let mut game = GameLoop::new(seed, config);

    // Scripted session: sweep the field in attract mode for two simulated
    // minutes, firing the Big Bang whenever it is available.
    let frame = SIM_DT;
    let total_frames = 120 * 60;
    let center = Vec2::new(FIELD_WIDTH, FIELD_HEIGHT) * 0.5;

    for i in 0..total_frames {
        let t = i as f32 * frame;
        let sweep = Vec2::new((t * 0.4).cos(), (t * 0.7).sin()) * 350.0;
        let input = TickInput {
            player_pos: Some(center + sweep),
            mode: Some(InteractionMode::Attract),
            big_bang: game.state.big_bang_cooldown == 0,
            upgrade_skill: None,
        };

        let events = game.advance(frame, &input);
        for event in &events.events {
            match event {
                GameEvent::Absorb { .. } => {}
                GameEvent::LevelUp { level } => log::info!("level {level}"),
                GameEvent::WaveStarted { number } => log::info!("wave {number}"),
                GameEvent::BossTriggered { level } => log::info!("boss fight (level {level})"),
                other => log::debug!("{}", other.name()),
            }
        }

        if !game.running {
            break;
        }
    }

    let state = &game.state;
    println!(
        "ticks: {}  level: {}  wave: {}  absorbed: {}  destroyed: {}  health: {:.1}",
        state.tick_count,
        state.progression.level,
        state.progression.wave.number,
        state.particles_absorbed,
        state.enemies_destroyed,
        state.player.health,
    );

    let entry = ScoreEntry::new("headless", state.final_score(), state.seed);
    match entry.to_json() {
        Ok(json) => println!("submission payload: {json}"),
        Err(e) => log::error!("could not serialize score entry: {e}"),
    }
}
