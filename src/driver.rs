//! Fixed-timestep loop driver
//!
//! Decouples the simulation rate from whatever rate the host calls us at.
//! Elapsed wall time goes into an accumulator and the simulation advances
//! in whole `SIM_DT` sub-steps, at most `MAX_SUBSTEPS` per call; leftover
//! backlog is dropped so a long stall slows the game down instead of
//! spiraling.

use crate::config::GameConfig;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::{SimulationState, TickEvents, TickInput, tick};

pub struct GameLoop {
    pub state: SimulationState,
    config: GameConfig,
    accumulator: f32,
    /// Cleared on game over; `advance` becomes a no-op. The host stops the
    /// run by simply not calling `advance` again.
    pub running: bool,
}

impl GameLoop {
    pub fn new(seed: u64, config: GameConfig) -> Self {
        Self {
            state: SimulationState::new(seed, &config),
            config,
            accumulator: 0.0,
            running: true,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Advance by `elapsed` seconds of wall time, running as many fixed
    /// sub-steps as fit. Events from all sub-steps are merged into one
    /// batch. One-shot commands (Big Bang, skill upgrades) apply to the
    /// first sub-step only; held inputs (position, mode) apply to all.
    pub fn advance(&mut self, elapsed: f32, input: &TickInput) -> TickEvents {
        let mut events = TickEvents::default();
        if !self.running {
            return events;
        }

        self.accumulator += elapsed;
        let mut step_input = input.clone();
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            events.merge(tick(&mut self.state, &self.config, &step_input, SIM_DT));
            self.accumulator -= SIM_DT;
            steps += 1;
            step_input.big_bang = false;
            step_input.upgrade_skill = None;
        }

        // Whatever did not fit into this frame's sub-steps is dropped
        if steps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            log::debug!(
                "dropping {:.1} ms of simulation backlog",
                self.accumulator * 1000.0
            );
            self.accumulator = self.accumulator % SIM_DT;
        }

        if self.state.game_over {
            self.running = false;
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> GameLoop {
        GameLoop::new(42, GameConfig::default())
    }

    #[test]
    fn test_small_elapsed_accumulates() {
        let mut g = game();
        // Half a step: nothing runs yet
        g.advance(SIM_DT * 0.5, &TickInput::default());
        assert_eq!(g.state.tick_count, 0);
        // The next half completes the step
        g.advance(SIM_DT * 0.5, &TickInput::default());
        assert_eq!(g.state.tick_count, 1);
    }

    #[test]
    fn test_substeps_are_capped() {
        let mut g = game();
        // A one-second stall must not run 60 steps
        g.advance(1.0, &TickInput::default());
        assert_eq!(g.state.tick_count, MAX_SUBSTEPS as u64);
        // Backlog was dropped, so the next normal frame runs one step
        g.advance(SIM_DT, &TickInput::default());
        assert_eq!(g.state.tick_count, MAX_SUBSTEPS as u64 + 1);
    }

    #[test]
    fn test_events_merged_across_substeps() {
        let mut g = game();
        let events = g.advance(SIM_DT * 3.0, &TickInput::default());
        assert_eq!(g.state.tick_count, 3);
        // Nothing eventful happens this early, but the merge keeps counters
        // coherent either way
        assert_eq!(events.enemies_defeated, 0);
    }

    #[test]
    fn test_game_over_stops_the_loop() {
        let mut g = game();
        g.state.player.health = 0.5;
        g.state.player.invincibility_ticks = 0;
        let e = crate::sim::Enemy {
            id: 1,
            kind: crate::config::EnemyKind::Fast,
            pos: g.state.player.pos,
            vel: glam::Vec2::ZERO,
            base_speed: 1.0,
            health: 1_000_000.0,
            max_health: 1_000_000.0,
            damage: Some(10.0),
            size: 15.0,
            elite: false,
            behavior: crate::sim::Behavior::Stationary,
            collision_cooldown: 0,
            ignores_attraction: false,
            ignores_collision: false,
            teleport_chance: 0.0,
            xp_value: 8,
        };
        g.state.enemies.push(e);

        let events = g.advance(SIM_DT, &TickInput::default());
        assert!(events.contains("gameOver"));
        assert!(!g.running);

        // Further advances are no-ops
        let after = g.advance(SIM_DT, &TickInput::default());
        assert!(after.events.is_empty());
        assert_eq!(g.state.tick_count, 1);
    }

    #[test]
    fn test_fixed_step_is_frame_rate_independent() {
        let mut a = game();
        let mut b = game();
        let input = TickInput::default();
        // 30 fps vs 60 fps over the same wall time
        for _ in 0..30 {
            a.advance(1.0 / 30.0, &input);
        }
        for _ in 0..60 {
            b.advance(1.0 / 60.0, &input);
        }
        assert_eq!(a.state.tick_count, b.state.tick_count);
        assert_eq!(a.state.particles.len(), b.state.particles.len());
        assert_eq!(a.state.player.health, b.state.player.health);
    }
}
