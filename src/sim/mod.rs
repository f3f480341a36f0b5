//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order
//! - No rendering or platform dependencies

pub mod arena;
pub mod events;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod tick;

pub use arena::ParticleArena;
pub use events::{GameEvent, TickEvents};
pub use physics::{circles_overlap, validated_damage};
pub use spawn::{spawn_enemy, spawn_particle, spawn_projectile, spawn_random_enemy};
pub use state::{
    Behavior, Enemy, Explosion, InteractionMode, Particle, ParticleKind, Player, Projectile,
    ProjectileKind, SimulationState, Snapshot,
};
pub use tick::{TickInput, tick};
