//! Simulation state and core entity types
//!
//! Everything the tick mutates lives here, passed explicitly; there is no
//! ambient global state. Rendering consumes read-only snapshots between
//! ticks.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::arena::ParticleArena;
use crate::config::{EnemyKind, GameConfig, SkillId};
use crate::consts::*;
use crate::progression::Progression;

/// Player interaction modes. `Vortex` is accepted as input but applies no
/// field (entities follow their own behavior), same as `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    Attract,
    Repel,
    Vortex,
    #[default]
    Normal,
}

/// Purchased skill levels (the only part of the skill tree that changes
/// during a run)
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillLevels {
    pub attract_radius: u8,
    pub vortex_power: u8,
    pub health_boost: u8,
    pub big_bang_power: u8,
    pub particle_mastery: u8,
}

impl SkillLevels {
    pub fn get(&self, id: SkillId) -> u8 {
        match id {
            SkillId::AttractRadius => self.attract_radius,
            SkillId::VortexPower => self.vortex_power,
            SkillId::HealthBoost => self.health_boost,
            SkillId::BigBangPower => self.big_bang_power,
            SkillId::ParticleMastery => self.particle_mastery,
        }
    }

    pub fn bump(&mut self, id: SkillId) {
        match id {
            SkillId::AttractRadius => self.attract_radius += 1,
            SkillId::VortexPower => self.vortex_power += 1,
            SkillId::HealthBoost => self.health_boost += 1,
            SkillId::BigBangPower => self.big_bang_power += 1,
            SkillId::ParticleMastery => self.particle_mastery += 1,
        }
    }
}

/// The player's field emitter
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub mode: InteractionMode,
    /// Base interaction field radius (before skills/power-ups)
    pub radius: f32,
    /// Collision radius
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    /// Damage per 60 Hz frame applied to enemies inside the field
    pub attraction_damage: f32,
    /// Damage applied to an enemy on body contact
    pub collision_damage: f32,
    /// Remaining power-up ticks (0 = not powered up)
    pub powered_up_ticks: u32,
    /// Remaining invincibility ticks after a hit
    pub invincibility_ticks: u32,
    pub skills: SkillLevels,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            mode: InteractionMode::Attract,
            radius: PLAYER_RADIUS,
            size: PLAYER_SIZE,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            attraction_damage: PLAYER_ATTRACTION_DAMAGE,
            collision_damage: PLAYER_COLLISION_DAMAGE,
            powered_up_ticks: 0,
            invincibility_ticks: 0,
            skills: SkillLevels::default(),
        }
    }

    pub fn is_powered_up(&self) -> bool {
        self.powered_up_ticks > 0
    }

    /// Interaction radius after the attract-radius skill and power-up boost
    pub fn effective_radius(&self) -> f32 {
        let skill = 1.0 + 0.2 * self.skills.attract_radius as f32;
        let boost = if self.is_powered_up() {
            POWERUP_MULTIPLIER
        } else {
            1.0
        };
        self.radius * skill * boost
    }

    /// Attraction damage after the vortex-power skill and power-up boost
    pub fn effective_attraction_damage(&self) -> f32 {
        let skill = 1.0 + 0.3 * self.skills.vortex_power as f32;
        let boost = if self.is_powered_up() {
            POWERUP_MULTIPLIER
        } else {
            1.0
        };
        self.attraction_damage * skill * boost
    }

    /// Entities inside this radius are absorbed (particles) or take
    /// continuous damage (enemies)
    pub fn suction_radius(&self, suction_factor: f32) -> f32 {
        self.effective_radius() * suction_factor
    }
}

/// Maximum trail points per particle (rendering only)
pub const TRAIL_LENGTH: usize = 5;

/// Particle variants; `Common`/`Medium` differ only cosmetically and in XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleKind {
    #[default]
    Common,
    Medium,
    Speed,
    Heal,
    PowerUp,
}

/// A free-floating absorbable particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Size decays toward this value after spawn
    pub target_size: f32,
    /// Cosmetic hue (degrees)
    pub hue: f32,
    pub xp_value: u32,
    pub kind: ParticleKind,
    /// Recent positions, newest last (rendering only)
    pub trail: Vec<Vec2>,
}

impl Particle {
    /// Record current position, keeping the trail bounded
    pub fn record_trail(&mut self) {
        self.trail.push(self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.remove(0);
        }
    }
}

/// Runtime behavior state. Mirrors `config::BehaviorSpec` but carries live
/// cooldowns; a single dispatch in the tick drives movement and attacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Wander,
    Hunt {
        hunt_radius: f32,
    },
    HuntAndShoot {
        hunt_radius: f32,
        preferred_distance: f32,
        shoot_interval: u32,
        cooldown: u32,
    },
    Static {
        shoot_interval: u32,
        cooldown: u32,
        explosive: bool,
    },
    Stationary,
    CrossScreen,
}

/// An enemy entity
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub base_speed: f32,
    pub health: f32,
    pub max_health: f32,
    /// Collision damage; `None` means the type table had no value and the
    /// fallback constant applies at the point of use
    pub damage: Option<f32>,
    pub size: f32,
    pub elite: bool,
    pub behavior: Behavior,
    /// Ticks until this enemy can take collision damage again
    pub collision_cooldown: u32,
    pub ignores_attraction: bool,
    pub ignores_collision: bool,
    pub teleport_chance: f32,
    pub xp_value: u32,
}

impl Enemy {
    pub fn is_boss(&self) -> bool {
        self.kind.is_boss()
    }
}

/// Projectile payloads
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileKind {
    Plain,
    /// Expires into an explosion of the given radius
    Explosive { explosion_radius: f32 },
}

/// An enemy-fired projectile
#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Remaining ticks before expiry
    pub lifespan: u32,
    pub kind: ProjectileKind,
}

/// A timed area-damage marker
#[derive(Debug, Clone)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    /// Remaining ticks
    pub duration: u32,
    pub damage: f32,
    /// The area damages the player at most once
    pub harmed_player: bool,
}

/// Complete simulation state, owned by the tick and the progression machine
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tick_count: u64,
    pub field: Vec2,
    pub player: Player,
    pub particles: ParticleArena,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub progression: Progression,
    /// Ticks until Big Bang may fire again
    pub big_bang_cooldown: u32,
    pub particles_absorbed: u64,
    pub enemies_destroyed: u64,
    pub game_over: bool,
    next_id: u32,
}

impl SimulationState {
    /// Create a fresh run: player at field center, initial particle swarm
    pub fn new(seed: u64, config: &GameConfig) -> Self {
        let field = Vec2::new(FIELD_WIDTH, FIELD_HEIGHT);
        let player = Player::new(field * 0.5);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tick_count: 0,
            field,
            player,
            particles: ParticleArena::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            explosions: Vec::new(),
            progression: Progression::new(config),
            big_bang_cooldown: 0,
            particles_absorbed: 0,
            enemies_destroyed: 0,
            game_over: false,
            next_id: 1,
        };

        for _ in 0..config.tunables.initial_particles {
            let p = super::spawn::spawn_particle(
                &mut state.rng,
                state.field,
                state.player.pos,
                config.tunables.spawn_padding,
            );
            state.particles.insert(p);
        }

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Read-only view for the render sink; taken between ticks only
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            player: &self.player,
            particles: &self.particles,
            enemies: &self.enemies,
            projectiles: &self.projectiles,
            explosions: &self.explosions,
        }
    }

    /// Final score supplied to the external leaderboard at game-over
    pub fn final_score(&self) -> u64 {
        self.particles_absorbed
    }
}

/// Borrowed view of everything the renderer needs for one frame
#[derive(Debug)]
pub struct Snapshot<'a> {
    pub player: &'a Player,
    pub particles: &'a ParticleArena,
    pub enemies: &'a [Enemy],
    pub projectiles: &'a [Projectile],
    pub explosions: &'a [Explosion],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_seeds_particles() {
        let config = GameConfig::default();
        let state = SimulationState::new(7, &config);
        assert_eq!(state.particles.len(), config.tunables.initial_particles);
        assert!(state.enemies.is_empty());
        assert_eq!(state.player.pos, state.field * 0.5);
    }

    #[test]
    fn test_effective_radius_scales_with_skill_and_powerup() {
        let mut player = Player::new(Vec2::ZERO);
        assert_eq!(player.effective_radius(), PLAYER_RADIUS);

        player.skills.attract_radius = 2;
        assert!((player.effective_radius() - PLAYER_RADIUS * 1.4).abs() < 1e-3);

        player.powered_up_ticks = 100;
        assert!((player.effective_radius() - PLAYER_RADIUS * 1.4 * 1.5).abs() < 1e-3);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: 3.0,
            target_size: 3.0,
            hue: 0.0,
            xp_value: 2,
            kind: ParticleKind::Common,
            trail: Vec::new(),
        };
        for i in 0..10 {
            p.pos = Vec2::new(i as f32, 0.0);
            p.record_trail();
        }
        assert_eq!(p.trail.len(), TRAIL_LENGTH);
        // Insertion order, newest last
        assert_eq!(p.trail.last().unwrap().x, 9.0);
        assert_eq!(p.trail.first().unwrap().x, 5.0);
    }

    #[test]
    fn test_entity_ids_monotonic() {
        let config = GameConfig::default();
        let mut state = SimulationState::new(1, &config);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }
}
