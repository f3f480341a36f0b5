//! Data-driven game configuration
//!
//! The enemy type table, quest definitions, skill tree and tunable constants
//! are loaded once at startup and treated as read-only by the simulation.
//! A JSON override can be supplied; anything malformed falls back to the
//! built-in defaults rather than failing the run.

use serde::{Deserialize, Serialize};

/// Enemy type keys. Bosses carry `chance = 0` and are spawned only on
/// explicit triggers, never from a random draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Fast,
    Hunter,
    Cosmic,
    Shooter,
    Boss,
    FinalBoss,
}

impl EnemyKind {
    pub fn is_boss(self) -> bool {
        matches!(self, EnemyKind::Boss | EnemyKind::FinalBoss)
    }
}

/// Behavior specification in the type table. Each variant carries only the
/// fields that behavior needs; `sim::state::Behavior` mirrors this at
/// runtime with live cooldown state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BehaviorSpec {
    /// Drift with a random heading, bouncing off field edges
    Wander,
    /// Move straight at the player while inside `hunt_radius`
    Hunt { hunt_radius: f32 },
    /// Kite at `preferred_distance` and fire every `shoot_interval` ticks
    HuntAndShoot {
        hunt_radius: f32,
        preferred_distance: f32,
        shoot_interval: u32,
    },
    /// Fixed position, fires every `shoot_interval` ticks
    Static {
        shoot_interval: u32,
        explosive: bool,
    },
    /// Fixed position, no attacks
    Stationary,
    /// Enter off one edge, fly to the opposite edge, despawn past the margin
    CrossScreen,
}

/// One row of the enemy type table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyType {
    pub kind: EnemyKind,
    /// Weight for cumulative-probability sampling (0 = never drawn)
    pub chance: f32,
    pub speed: f32,
    pub behavior: BehaviorSpec,
    /// Absolute health; `None` means wave-scaled base health applies
    pub health: Option<f32>,
    /// Multiplier applied to wave-scaled health
    pub health_multiplier: f32,
    /// Collision damage; `None` falls back to `FALLBACK_DAMAGE`
    pub damage: Option<f32>,
    pub size: f32,
    pub xp_value: u32,
    /// Exempt from the player's attraction field (cosmic types)
    pub ignores_attraction: bool,
    /// Never collides with the player
    pub ignores_collision: bool,
    /// Chance per tick to relocate to a random position (final boss)
    pub teleport_chance: f32,
}

impl EnemyType {
    fn new(kind: EnemyKind, chance: f32, speed: f32, behavior: BehaviorSpec) -> Self {
        Self {
            kind,
            chance,
            speed,
            behavior,
            health: None,
            health_multiplier: 1.0,
            damage: None,
            size: 20.0,
            xp_value: 10,
            ignores_attraction: false,
            ignores_collision: false,
            teleport_chance: 0.0,
        }
    }
}

/// The enemy type table plus spawner-wide scaling knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTable {
    /// Health for a type without an absolute value, before wave scaling
    pub base_health: f32,
    /// Added to base health per wave number
    pub health_increase_per_wave: f32,
    /// Independent roll marking any drawn type as elite
    pub elite_chance: f64,
    pub elite_health_mult: f32,
    pub elite_damage_mult: f32,
    pub elite_speed_mult: f32,
    /// Stable iteration order matters for deterministic sampling
    pub types: Vec<EnemyType>,
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            base_health: 5.0,
            health_increase_per_wave: 0.3,
            elite_chance: 0.02,
            elite_health_mult: 1.5,
            elite_damage_mult: 1.3,
            elite_speed_mult: 1.1,
            types: vec![
                EnemyType {
                    health_multiplier: 0.8,
                    xp_value: 8,
                    ..EnemyType::new(EnemyKind::Fast, 0.6, 3.5, BehaviorSpec::Wander)
                },
                EnemyType {
                    xp_value: 15,
                    ..EnemyType::new(
                        EnemyKind::Hunter,
                        0.3,
                        2.0,
                        BehaviorSpec::HuntAndShoot {
                            hunt_radius: 500.0,
                            preferred_distance: 250.0,
                            shoot_interval: 120,
                        },
                    )
                },
                EnemyType {
                    damage: Some(25.0),
                    xp_value: 12,
                    ignores_attraction: true,
                    ..EnemyType::new(EnemyKind::Cosmic, 0.1, 4.5, BehaviorSpec::CrossScreen)
                },
                EnemyType {
                    health_multiplier: 1.2,
                    xp_value: 15,
                    ..EnemyType::new(
                        EnemyKind::Shooter,
                        0.05,
                        0.0,
                        BehaviorSpec::Static {
                            shoot_interval: 180,
                            explosive: true,
                        },
                    )
                },
                EnemyType {
                    health: Some(200.0),
                    size: 40.0,
                    xp_value: 200,
                    ..EnemyType::new(
                        EnemyKind::Boss,
                        0.0,
                        2.5,
                        BehaviorSpec::Hunt {
                            hunt_radius: 1000.0,
                        },
                    )
                },
                EnemyType {
                    health: Some(600.0),
                    size: 60.0,
                    xp_value: 500,
                    teleport_chance: 0.01,
                    ..EnemyType::new(
                        EnemyKind::FinalBoss,
                        0.0,
                        3.0,
                        BehaviorSpec::Hunt {
                            hunt_radius: 2000.0,
                        },
                    )
                },
            ],
        }
    }
}

impl EnemyTable {
    /// Look up a type row. An unknown key is a config error but must never
    /// halt the tick: log and fall back to the first table entry. `None`
    /// only when the table itself is empty.
    pub fn get(&self, kind: EnemyKind) -> Option<&EnemyType> {
        match self.types.iter().find(|t| t.kind == kind) {
            Some(t) => Some(t),
            None => {
                log::warn!("unknown enemy type {kind:?}, falling back to first table entry");
                self.types.first()
            }
        }
    }
}

/// A quest definition (static; live progress is tracked in the progression
/// state, not here)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestDef {
    pub id: String,
    pub title: String,
    pub target: u32,
    /// Progress counter at the start of a run (wave quests start at 1)
    pub start: u32,
    /// XP awarded on completion
    pub reward: u32,
}

fn default_quests() -> Vec<QuestDef> {
    vec![
        QuestDef {
            id: "absorb100".into(),
            title: "Absorb 100 particles".into(),
            target: 100,
            start: 0,
            reward: 50,
        },
        QuestDef {
            id: "defeat20".into(),
            title: "Defeat 20 enemies".into(),
            target: 20,
            start: 0,
            reward: 100,
        },
        QuestDef {
            id: "wave5".into(),
            title: "Reach wave 5".into(),
            target: 5,
            start: 1,
            reward: 200,
        },
    ]
}

/// Skill identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillId {
    AttractRadius,
    VortexPower,
    HealthBoost,
    BigBangPower,
    ParticleMastery,
}

/// A skill tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: SkillId,
    /// Skill points per upgrade
    pub cost: u32,
    pub max_level: u8,
    /// Fractional bonus per level (0.2 = +20%)
    pub bonus_per_level: f32,
    /// Prerequisite skill and its minimum level
    pub requires: Option<(SkillId, u8)>,
}

fn default_skills() -> Vec<SkillDef> {
    vec![
        SkillDef {
            id: SkillId::AttractRadius,
            cost: 2,
            max_level: 5,
            bonus_per_level: 0.2,
            requires: None,
        },
        SkillDef {
            id: SkillId::VortexPower,
            cost: 3,
            max_level: 3,
            bonus_per_level: 0.3,
            requires: None,
        },
        SkillDef {
            id: SkillId::HealthBoost,
            cost: 1,
            max_level: 10,
            bonus_per_level: 0.1,
            requires: None,
        },
        SkillDef {
            id: SkillId::BigBangPower,
            cost: 5,
            max_level: 2,
            bonus_per_level: 0.5,
            requires: None,
        },
        SkillDef {
            id: SkillId::ParticleMastery,
            cost: 4,
            max_level: 3,
            bonus_per_level: 0.2,
            requires: Some((SkillId::AttractRadius, 3)),
        },
    ]
}

/// Tunable simulation constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tunables {
    /// Particles seeded at the start of a run
    pub initial_particles: usize,
    /// Respawn threshold and batch size
    pub min_particles: usize,
    pub respawn_amount: usize,
    /// Ticks between respawn checks
    pub respawn_check_interval: u64,
    /// Particles never spawn within this distance of the player
    pub spawn_padding: f32,
    /// Ticks between wave enemy spawns
    pub wave_spawn_interval: u32,
    /// Chance a defeated enemy drops a particle
    pub drop_chance: f64,
    /// Particles dropped in a ring when a boss dies
    pub boss_burst_count: usize,
    /// Attraction field shape
    pub attract_radial: f32,
    pub attract_tangential: f32,
    pub attract_damping: f32,
    /// Extra damping multiplier for boss-class enemies (inertia: a lower
    /// factor damps their velocity harder, so the field drags them less)
    pub boss_damping_factor: f32,
    /// Repulsion strength (radial only)
    pub repel_strength: f32,
    /// Fraction of the effective radius that absorbs/damages
    pub suction_factor: f32,
    /// Health restored by a heal particle
    pub heal_amount: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            initial_particles: 300,
            min_particles: 150,
            respawn_amount: 50,
            respawn_check_interval: 30,
            spawn_padding: 200.0,
            wave_spawn_interval: 120,
            drop_chance: 0.25,
            boss_burst_count: 20,
            attract_radial: 0.6,
            attract_tangential: 0.3,
            attract_damping: 0.9,
            boss_damping_factor: 0.3,
            repel_strength: 0.2,
            suction_factor: 0.2,
            heal_amount: 10.0,
        }
    }
}

/// Complete load-once configuration surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub enemies: EnemyTable,
    #[serde(default = "default_quests")]
    pub quests: Vec<QuestDef>,
    #[serde(default = "default_skills")]
    pub skills: Vec<SkillDef>,
    #[serde(default)]
    pub tunables: Tunables,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            enemies: EnemyTable::default(),
            quests: default_quests(),
            skills: default_skills(),
            tunables: Tunables::default(),
        }
    }
}

impl GameConfig {
    /// Parse a JSON override; malformed input logs and falls back to the
    /// defaults so a bad config file can never prevent the game starting.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("invalid config JSON ({e}), using defaults");
                Self::default()
            }
        }
    }

    pub fn skill(&self, id: SkillId) -> Option<&SkillDef> {
        self.skills.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_weights() {
        let table = EnemyTable::default();
        let random_weight: f32 = table.types.iter().map(|t| t.chance).sum();
        assert!((random_weight - 1.05).abs() < 1e-6);
        // Bosses are excluded from random draws
        assert_eq!(table.get(EnemyKind::Boss).unwrap().chance, 0.0);
        assert_eq!(table.get(EnemyKind::FinalBoss).unwrap().chance, 0.0);
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let mut table = EnemyTable::default();
        table.types.retain(|t| t.kind != EnemyKind::FinalBoss);
        let t = table.get(EnemyKind::FinalBoss).unwrap();
        assert_eq!(t.kind, EnemyKind::Fast);
    }

    #[test]
    fn test_empty_table_lookup_is_none() {
        let mut table = EnemyTable::default();
        table.types.clear();
        assert!(table.get(EnemyKind::Fast).is_none());
    }

    #[test]
    fn test_config_json_fallback() {
        let cfg = GameConfig::from_json("{ not json }");
        assert_eq!(cfg.quests.len(), 3);
        assert_eq!(cfg.enemies.types.len(), 6);
    }

    #[test]
    fn test_config_json_partial_override() {
        let cfg = GameConfig::from_json(r#"{ "tunables": { "initial_particles": 10, "min_particles": 5, "respawn_amount": 2, "respawn_check_interval": 30, "spawn_padding": 200.0, "wave_spawn_interval": 120, "drop_chance": 0.25, "boss_burst_count": 20, "attract_radial": 0.6, "attract_tangential": 0.3, "attract_damping": 0.9, "boss_damping_factor": 0.3, "repel_strength": 0.2, "suction_factor": 0.2, "heal_amount": 10.0 } }"#);
        assert_eq!(cfg.tunables.initial_particles, 10);
        // Omitted sections fall back to defaults
        assert_eq!(cfg.skills.len(), 5);
    }

    #[test]
    fn test_particle_mastery_requires_attract_radius() {
        let cfg = GameConfig::default();
        let skill = cfg.skill(SkillId::ParticleMastery).unwrap();
        assert_eq!(skill.requires, Some((SkillId::AttractRadius, 3)));
    }
}
