//! Entity factories
//!
//! All spawning is driven by a seeded RNG and the read-only type tables, so
//! any spawn sequence is reproducible from the run seed.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Behavior, Enemy, Particle, ParticleKind, Projectile, ProjectileKind};
use crate::config::{BehaviorSpec, EnemyKind, EnemyTable};
use crate::consts::*;
use crate::direction;

/// Spawn a particle at a uniformly random on-field position, rejecting
/// points within `padding` of the player on either axis.
pub fn spawn_particle(rng: &mut Pcg32, field: Vec2, player_pos: Vec2, padding: f32) -> Particle {
    let mut pos;
    loop {
        pos = Vec2::new(
            rng.random_range(0.0..field.x),
            rng.random_range(0.0..field.y),
        );
        if (pos.x - player_pos.x).abs() >= padding || (pos.y - player_pos.y).abs() >= padding {
            break;
        }
    }

    // Weighted category table: ~2% powerup; otherwise 80% common and the
    // rest drawn uniformly from the full variant set.
    let (kind, target_size, xp_value, hue) = if rng.random_bool(0.02) {
        (ParticleKind::PowerUp, 10.0, 50, 45.0)
    } else if rng.random_bool(0.8) {
        (ParticleKind::Common, 3.0, 2, rng.random_range(180.0..240.0))
    } else {
        match rng.random_range(0..4u32) {
            0 => (ParticleKind::Common, 3.0, 2, rng.random_range(180.0..240.0)),
            1 => (ParticleKind::Medium, 5.0, 5, rng.random_range(60.0..120.0)),
            2 => (ParticleKind::Speed, 2.0, 7, rng.random_range(300.0..360.0)),
            _ => (ParticleKind::Heal, 6.0, 10, 0.0),
        }
    };

    let speed_scale = if kind == ParticleKind::Speed { 6.0 } else { 3.0 };
    let vel = Vec2::new(
        (rng.random::<f32>() - 0.5) * speed_scale,
        (rng.random::<f32>() - 0.5) * speed_scale,
    );

    Particle {
        pos,
        vel,
        // Spawns oversized and decays toward target
        size: target_size + 2.0,
        target_size,
        hue,
        xp_value,
        kind,
        trail: Vec::new(),
    }
}

/// Draw a type key via cumulative-probability sampling over the table's
/// `chance` weights (boss rows carry zero weight and are never drawn), then
/// spawn it. An empty table yields `None`: a broken config override must
/// never halt the tick, it just spawns nothing.
pub fn spawn_random_enemy(
    rng: &mut Pcg32,
    table: &EnemyTable,
    field: Vec2,
    wave_number: u32,
    id: u32,
) -> Option<Enemy> {
    let Some(first) = table.types.first() else {
        log::warn!("enemy type table is empty, skipping spawn");
        return None;
    };
    let total: f32 = table.types.iter().map(|t| t.chance).sum();
    let mut draw = rng.random::<f32>() * total;
    let mut kind = first.kind;
    for t in &table.types {
        if draw < t.chance {
            kind = t.kind;
            break;
        }
        draw -= t.chance;
    }
    spawn_enemy(rng, table, field, wave_number, kind, id)
}

/// Spawn an enemy of an explicit type (used for bosses and by the random
/// draw above). `None` only when the table has no row to fall back on.
pub fn spawn_enemy(
    rng: &mut Pcg32,
    table: &EnemyTable,
    field: Vec2,
    wave_number: u32,
    kind: EnemyKind,
    id: u32,
) -> Option<Enemy> {
    let ty = table.get(kind)?;

    let mut health = match ty.health {
        Some(h) => h,
        None => {
            (table.base_health + wave_number as f32 * table.health_increase_per_wave)
                * ty.health_multiplier
        }
    };
    let mut damage = ty.damage;
    let mut base_speed = ty.speed;

    // Elites are a modifier on any drawn type, not a type of their own.
    // Bosses are never rolled as elites; their stats are authored.
    let elite = !ty.kind.is_boss() && rng.random_bool(table.elite_chance);
    if elite {
        health *= table.elite_health_mult;
        damage = Some(damage.unwrap_or(FALLBACK_DAMAGE) * table.elite_damage_mult);
        base_speed *= table.elite_speed_mult;
    }

    // Entry position off one of the four field edges
    let edge = rng.random_range(0..4u32);
    let pos = match edge {
        0 => Vec2::new(-50.0, rng.random_range(0.0..field.y)),
        1 => Vec2::new(field.x + 50.0, rng.random_range(0.0..field.y)),
        2 => Vec2::new(rng.random_range(0.0..field.x), -50.0),
        _ => Vec2::new(rng.random_range(0.0..field.x), field.y + 50.0),
    };

    let behavior = match ty.behavior {
        BehaviorSpec::Wander => Behavior::Wander,
        BehaviorSpec::Hunt { hunt_radius } => Behavior::Hunt { hunt_radius },
        BehaviorSpec::HuntAndShoot {
            hunt_radius,
            preferred_distance,
            shoot_interval,
        } => Behavior::HuntAndShoot {
            hunt_radius,
            preferred_distance,
            shoot_interval,
            cooldown: shoot_interval,
        },
        BehaviorSpec::Static {
            shoot_interval,
            explosive,
        } => Behavior::Static {
            shoot_interval,
            cooldown: shoot_interval,
            explosive,
        },
        BehaviorSpec::Stationary => Behavior::Stationary,
        BehaviorSpec::CrossScreen => Behavior::CrossScreen,
    };

    // Cross-screen types fly at a random point on the opposite edge with a
    // constant velocity; others get their heading from behavior dispatch.
    let vel = match behavior {
        Behavior::CrossScreen => {
            let target = match edge {
                0 => Vec2::new(field.x + 50.0, rng.random_range(0.0..field.y)),
                1 => Vec2::new(-50.0, rng.random_range(0.0..field.y)),
                2 => Vec2::new(rng.random_range(0.0..field.x), field.y + 50.0),
                _ => Vec2::new(rng.random_range(0.0..field.x), -50.0),
            };
            direction(pos, target) * base_speed
        }
        Behavior::Wander => {
            let theta = rng.random_range(0.0..std::f32::consts::TAU);
            Vec2::new(theta.cos(), theta.sin()) * base_speed
        }
        _ => Vec2::ZERO,
    };

    Some(Enemy {
        id,
        kind: ty.kind,
        pos,
        vel,
        base_speed,
        health,
        max_health: health,
        damage,
        size: ty.size,
        elite,
        behavior,
        collision_cooldown: 0,
        ignores_attraction: ty.ignores_attraction,
        ignores_collision: ty.ignores_collision,
        teleport_chance: ty.teleport_chance,
        xp_value: ty.xp_value,
    })
}

/// Spawn a projectile from `origin` aimed at `target`
pub fn spawn_projectile(origin: Vec2, target: Vec2, kind: ProjectileKind, damage: f32) -> Projectile {
    Projectile {
        pos: origin,
        vel: direction(origin, target) * PROJECTILE_SPEED,
        radius: PROJECTILE_RADIUS,
        damage,
        lifespan: PROJECTILE_LIFESPAN_TICKS,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> Pcg32 {
        Pcg32::seed_from_u64(seed)
    }

    const FIELD: Vec2 = Vec2::new(1920.0, 1080.0);

    #[test]
    fn test_particle_spawn_respects_padding() {
        let mut r = rng(42);
        let player = Vec2::new(960.0, 540.0);
        for _ in 0..200 {
            let p = spawn_particle(&mut r, FIELD, player, 200.0);
            let close_x = (p.pos.x - player.x).abs() < 200.0;
            let close_y = (p.pos.y - player.y).abs() < 200.0;
            assert!(!(close_x && close_y), "spawned on top of the player");
            assert!(p.pos.x >= 0.0 && p.pos.x <= FIELD.x);
            assert!(p.size > p.target_size);
            assert!(p.trail.is_empty());
        }
    }

    #[test]
    fn test_particle_spawn_deterministic() {
        let a = spawn_particle(&mut rng(7), FIELD, Vec2::ZERO, 200.0);
        let b = spawn_particle(&mut rng(7), FIELD, Vec2::ZERO, 200.0);
        assert_eq!(a.pos, b.pos);
        assert_eq!(a.xp_value, b.xp_value);
        assert_eq!(a.kind, b.kind);
    }

    #[test]
    fn test_random_draw_never_yields_bosses() {
        let table = EnemyTable::default();
        let mut r = rng(123);
        for i in 0..500 {
            let e = spawn_random_enemy(&mut r, &table, FIELD, 1, i).unwrap();
            assert!(!e.kind.is_boss(), "drew a zero-weight boss type");
        }
    }

    #[test]
    fn test_empty_table_spawns_nothing() {
        let mut table = EnemyTable::default();
        table.types.clear();
        let mut r = rng(3);
        assert!(spawn_random_enemy(&mut r, &table, FIELD, 1, 1).is_none());
        assert!(spawn_enemy(&mut r, &table, FIELD, 1, EnemyKind::Boss, 1).is_none());
    }

    #[test]
    fn test_wave_scaled_health() {
        let table = EnemyTable::default();
        // Fast has no absolute health; multiplier 0.8
        let mut r = rng(5);
        let e = spawn_enemy(&mut r, &table, FIELD, 10, EnemyKind::Fast, 1).unwrap();
        if !e.elite {
            let expected = (5.0 + 10.0 * 0.3) * 0.8;
            assert!((e.health - expected).abs() < 1e-4);
        }
        assert_eq!(e.health, e.max_health);
    }

    #[test]
    fn test_boss_health_is_authored() {
        let table = EnemyTable::default();
        let mut r = rng(5);
        let boss = spawn_enemy(&mut r, &table, FIELD, 30, EnemyKind::Boss, 1).unwrap();
        assert_eq!(boss.health, 200.0);
        assert!(!boss.elite);
        let final_boss = spawn_enemy(&mut r, &table, FIELD, 30, EnemyKind::FinalBoss, 2).unwrap();
        assert_eq!(final_boss.health, 600.0);
        assert!(final_boss.teleport_chance > 0.0);
    }

    #[test]
    fn test_elite_multipliers() {
        let table = EnemyTable::default();
        // Scan seeds until the 2% elite roll comes up
        let elite = (0..2000u64)
            .filter_map(|s| spawn_enemy(&mut rng(s), &table, FIELD, 1, EnemyKind::Fast, 1))
            .find(|e| e.elite)
            .expect("no elite in 2000 rolls");
        let base = (5.0 + 0.3) * 0.8;
        assert!((elite.health - base * 1.5).abs() < 1e-3);
        assert!((elite.base_speed - 3.5 * 1.1).abs() < 1e-3);
        assert!(elite.damage.is_some());
    }

    #[test]
    fn test_cross_screen_heads_into_field() {
        let table = EnemyTable::default();
        let mut r = rng(99);
        for i in 0..50 {
            let e = spawn_enemy(&mut r, &table, FIELD, 1, EnemyKind::Cosmic, i).unwrap();
            assert_eq!(e.behavior, Behavior::CrossScreen);
            assert!(e.vel.length() > 0.0);
            // Velocity must carry it toward the field, not away
            let center = FIELD * 0.5;
            let after = e.pos + e.vel * 100.0;
            assert!((after - center).length() < (e.pos - center).length() + FIELD.x);
        }
    }

    #[test]
    fn test_projectile_velocity_is_unit_scaled() {
        let p = spawn_projectile(
            Vec2::ZERO,
            Vec2::new(0.0, 100.0),
            ProjectileKind::Plain,
            10.0,
        );
        assert!((p.vel.length() - PROJECTILE_SPEED).abs() < 1e-4);
        assert!(p.vel.y > 0.0 && p.vel.x.abs() < 1e-4);
        assert_eq!(p.lifespan, PROJECTILE_LIFESPAN_TICKS);
    }
}
