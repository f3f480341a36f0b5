//! Events emitted by the simulation for external sinks (sound, UI,
//! persistence). Event names are the contract external modules key off of.

use serde::Serialize;

use crate::config::EnemyKind;

/// A single gameplay event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A particle was absorbed by the player
    Absorb { xp: u32 },
    /// A power-up particle was collected
    PowerUpCollected,
    /// An enemy died (any cause)
    EnemyDefeated { kind: EnemyKind, elite: bool, xp: u32 },
    /// The player leveled up
    LevelUp { level: u32 },
    /// A quest reached its target
    QuestCompleted { id: String, reward: u32 },
    /// Player health reached zero; score is the final submission value
    GameOver { score: u64 },
    /// A boss fight began (level is 10, 20, ... or the cap)
    BossTriggered { level: u32 },
    /// The active boss died and wave spawning resumes
    BossDefeated,
    /// A new wave began
    WaveStarted { number: u32 },
    /// An enemy fired a projectile
    ProjectileFired,
    /// An explosive projectile expired into an explosion
    ExplosionTriggered,
    /// A defeated enemy dropped a particle
    ParticleDropped,
}

impl GameEvent {
    /// Stable name used by external sinks to route the event
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::Absorb { .. } => "absorb",
            GameEvent::PowerUpCollected => "powerUpCollected",
            GameEvent::EnemyDefeated { .. } => "enemyDefeated",
            GameEvent::LevelUp { .. } => "levelUp",
            GameEvent::QuestCompleted { .. } => "questCompleted",
            GameEvent::GameOver { .. } => "gameOver",
            GameEvent::BossTriggered { .. } => "bossTriggered",
            GameEvent::BossDefeated => "bossDefeated",
            GameEvent::WaveStarted { .. } => "waveStarted",
            GameEvent::ProjectileFired => "projectileFired",
            GameEvent::ExplosionTriggered => "explosionTriggered",
            GameEvent::ParticleDropped => "particleDropped",
        }
    }
}

/// Per-tick event list plus summary counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickEvents {
    pub xp_gained: u32,
    pub particles_absorbed: u32,
    pub enemies_defeated: u32,
    pub projectiles_fired: u32,
    pub explosions_triggered: u32,
    pub particles_dropped: u32,
    pub player_damage_taken: f32,
    pub events: Vec<GameEvent>,
}

impl TickEvents {
    /// Append an event, keeping the summary counters in sync
    pub fn push(&mut self, event: GameEvent) {
        match &event {
            GameEvent::Absorb { xp } => {
                self.particles_absorbed += 1;
                self.xp_gained += xp;
            }
            GameEvent::EnemyDefeated { xp, .. } => {
                self.enemies_defeated += 1;
                self.xp_gained += xp;
            }
            GameEvent::QuestCompleted { reward, .. } => self.xp_gained += reward,
            GameEvent::ProjectileFired => self.projectiles_fired += 1,
            GameEvent::ExplosionTriggered => self.explosions_triggered += 1,
            GameEvent::ParticleDropped => self.particles_dropped += 1,
            _ => {}
        }
        self.events.push(event);
    }

    /// Fold another tick's events into this one (used by the loop driver
    /// when several sub-steps run in a single frame)
    pub fn merge(&mut self, other: TickEvents) {
        self.xp_gained += other.xp_gained;
        self.particles_absorbed += other.particles_absorbed;
        self.enemies_defeated += other.enemies_defeated;
        self.projectiles_fired += other.projectiles_fired;
        self.explosions_triggered += other.explosions_triggered;
        self.particles_dropped += other.particles_dropped;
        self.player_damage_taken += other.player_damage_taken;
        self.events.extend(other.events);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.events.iter().any(|e| e.name() == name)
    }
}
