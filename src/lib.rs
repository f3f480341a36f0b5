//! Vortex Drift - simulation core for an attractor/repeller swarm game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, physics, the fixed tick)
//! - `progression`: XP/leveling, quests, wave and boss sequencing
//! - `config`: Data-driven enemy types, quests, skills and tunables
//! - `driver`: Fixed-timestep accumulator decoupling sim from render rate
//! - `score`: Final-score submission entry for the external leaderboard

pub mod config;
pub mod driver;
pub mod progression;
pub mod score;
pub mod sim;

pub use config::GameConfig;
pub use driver::GameLoop;
pub use sim::{SimulationState, TickInput, tick};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the original cadence)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum sub-steps per rendered frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 3;

    /// Play-area dimensions (abstract units; the renderer maps to pixels)
    pub const FIELD_WIDTH: f32 = 1920.0;
    pub const FIELD_HEIGHT: f32 = 1080.0;

    /// Margin past the field edge at which cross-screen enemies despawn
    pub const DESPAWN_MARGIN: f32 = 200.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 150.0;
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const PLAYER_COLLISION_DAMAGE: f32 = 0.5;
    pub const PLAYER_ATTRACTION_DAMAGE: f32 = 10.0;
    /// Ticks of invincibility after taking a collision hit
    pub const PLAYER_INVINCIBILITY_TICKS: u32 = 60;
    /// Radius/damage multiplier while powered up
    pub const POWERUP_MULTIPLIER: f32 = 1.5;
    /// Power-up duration in ticks (10 seconds)
    pub const POWERUP_TICKS: u32 = 600;

    /// Ticks an enemy is immune to repeat collision damage
    pub const ENEMY_COLLISION_COOLDOWN_TICKS: u32 = 30;

    /// Substituted for any missing or non-finite damage value
    pub const FALLBACK_DAMAGE: f32 = 5.0;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = 5.0;
    pub const PROJECTILE_RADIUS: f32 = 5.0;
    pub const PROJECTILE_LIFESPAN_TICKS: u32 = 180;
    pub const EXPLOSION_RADIUS: f32 = 80.0;
    pub const EXPLOSION_DURATION_TICKS: u32 = 60;

    /// Level cap; reaching it arms the final boss
    pub const MAX_LEVEL: u32 = 50;

    /// Big Bang unlock level and cooldown
    pub const BIG_BANG_UNLOCK_LEVEL: u32 = 15;
    pub const BIG_BANG_COOLDOWN_TICKS: u32 = 300;
}

/// Squared distance between two points (cheap pre-filter for radius checks)
#[inline]
pub fn dist_sq(a: Vec2, b: Vec2) -> f32 {
    (a - b).length_squared()
}

/// Unit vector from `from` toward `to`, or zero if coincident
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Perpendicular (counter-clockwise) of a vector, for orbital impulses
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}
