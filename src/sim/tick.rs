//! Fixed timestep simulation tick
//!
//! Advances all entity collections one fixed sub-step and returns the
//! events that occurred. Update order within a tick is fixed: timers,
//! player-field forces, behavior-driven movement, integration, collisions,
//! death/removal, event emission. Entities are kept by filtering at the end
//! of each pass, never removed mid-iteration.

use glam::Vec2;
use rand::Rng;

use super::events::{GameEvent, TickEvents};
use super::physics::{circles_overlap, player_field, validated_damage};
use super::spawn::{spawn_enemy, spawn_particle, spawn_projectile, spawn_random_enemy};
use super::state::{
    Behavior, Enemy, Explosion, InteractionMode, ParticleKind, Player, Projectile, ProjectileKind,
    SimulationState,
};
use crate::config::{EnemyKind, GameConfig, SkillId};
use crate::consts::*;
use crate::progression::WaveCommand;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Target player position (from pointer)
    pub player_pos: Option<Vec2>,
    /// Interaction mode change
    pub mode: Option<InteractionMode>,
    /// Fire the Big Bang (mass-kill), if unlocked and off cooldown
    pub big_bang: bool,
    /// Spend skill points on an upgrade
    pub upgrade_skill: Option<SkillId>,
}

/// Advance the simulation by one fixed sub-step.
///
/// `dt` is the sub-step duration in seconds; the driver always passes
/// `SIM_DT`, and per-frame velocity units are scaled by `dt / SIM_DT` so a
/// different fixed step keeps speeds and damage-per-second unchanged.
pub fn tick(
    state: &mut SimulationState,
    config: &GameConfig,
    input: &TickInput,
    dt: f32,
) -> TickEvents {
    let mut events = TickEvents::default();
    if state.game_over {
        return events;
    }

    let scale = dt / SIM_DT;
    let tun = &config.tunables;
    state.tick_count += 1;

    // --- Input ---
    if let Some(pos) = input.player_pos {
        state.player.pos = pos.clamp(Vec2::ZERO, state.field);
    }
    if let Some(mode) = input.mode {
        state.player.mode = mode;
    }
    if let Some(id) = input.upgrade_skill {
        state
            .progression
            .upgrade_skill(&mut state.player, config, id);
    }

    // --- Player timers (per sub-step, never wall clock) ---
    state.player.invincibility_ticks = state.player.invincibility_ticks.saturating_sub(1);
    state.player.powered_up_ticks = state.player.powered_up_ticks.saturating_sub(1);
    state.big_bang_cooldown = state.big_bang_cooldown.saturating_sub(1);

    // --- Big Bang ---
    let big_bang_fired = input.big_bang
        && state.progression.level >= BIG_BANG_UNLOCK_LEVEL
        && state.big_bang_cooldown == 0;
    if big_bang_fired {
        state.big_bang_cooldown = BIG_BANG_COOLDOWN_TICKS;
        log::info!("big bang fired");
    }

    // Boss triggers can arm from several places this tick; the last wins
    // (they all request the same fight).
    let mut boss_to_trigger: Option<u32> = None;

    update_particles(state, config, scale, &mut events, &mut boss_to_trigger);

    // Particle respawn keeps the field from starving
    if state.tick_count % tun.respawn_check_interval == 0
        && state.particles.len() < tun.min_particles
    {
        for _ in 0..tun.respawn_amount {
            let p = spawn_particle(
                &mut state.rng,
                state.field,
                state.player.pos,
                tun.spawn_padding,
            );
            state.particles.insert(p);
        }
    }

    update_enemies(
        state,
        config,
        scale,
        big_bang_fired,
        &mut events,
        &mut boss_to_trigger,
    );
    update_projectiles(state, scale, &mut events);
    update_explosions(state, &mut events);

    // --- Capped final-boss trigger (idempotent: only with a clear field
    // and no fight already running) ---
    if state.progression.level >= MAX_LEVEL && boss_to_trigger.is_none() {
        let result = crate::progression::check_level_up(
            state.progression.level,
            state.progression.xp,
            state.enemies.len(),
            state.progression.boss_fight_active,
        );
        boss_to_trigger = result.boss_to_trigger;
    }

    // --- Wave machine ---
    let (cmd, wave_boss) = state.progression.update_wave(
        state.enemies.len(),
        tun.wave_spawn_interval,
        &mut events,
    );
    boss_to_trigger = wave_boss.or(boss_to_trigger);
    if cmd == WaveCommand::SpawnEnemy {
        let id = state.next_entity_id();
        if let Some(enemy) = spawn_random_enemy(
            &mut state.rng,
            &config.enemies,
            state.field,
            state.progression.wave.number,
            id,
        ) {
            state.enemies.push(enemy);
        }
    }

    // --- Boss trigger: clear the field, suspend waves, spawn the boss ---
    if let Some(level) = boss_to_trigger {
        if !state.progression.boss_fight_active {
            state.enemies.clear();
            state.progression.begin_boss_fight(level, &mut events);
            let kind = if level >= MAX_LEVEL {
                EnemyKind::FinalBoss
            } else {
                EnemyKind::Boss
            };
            let id = state.next_entity_id();
            if let Some(boss) = spawn_enemy(
                &mut state.rng,
                &config.enemies,
                state.field,
                state.progression.wave.number,
                kind,
                id,
            ) {
                state.enemies.push(boss);
            }
        }
    }

    // --- Game over ---
    if state.player.health <= 0.0 && !state.game_over {
        state.game_over = true;
        let score = state.final_score();
        log::info!("game over, final score {score}");
        events.push(GameEvent::GameOver { score });
    }

    events
}

/// Apply the player's damage with the invincibility gate. Returns the
/// damage dealt (0 while invincible). The raw value is validated so corrupt
/// config can never push health to NaN.
fn damage_player(player: &mut Player, raw: Option<f32>, events: &mut TickEvents) -> f32 {
    if player.invincibility_ticks > 0 {
        return 0.0;
    }
    let dmg = validated_damage(raw);
    player.health -= dmg;
    player.invincibility_ticks = PLAYER_INVINCIBILITY_TICKS;
    events.player_damage_taken += dmg;
    dmg
}

fn update_particles(
    state: &mut SimulationState,
    config: &GameConfig,
    scale: f32,
    events: &mut TickEvents,
    boss_to_trigger: &mut Option<u32>,
) {
    let tun = &config.tunables;
    let player = state.player.clone();
    let effective_radius = player.effective_radius();
    let suction = player.suction_radius(tun.suction_factor);
    let field = state.field;

    let mut absorbed: Vec<usize> = Vec::new();

    for (idx, p) in state.particles.iter_mut() {
        // Size decays toward target after spawn
        if p.size > p.target_size {
            p.size = (p.size - 0.1 * scale).max(p.target_size);
        }

        if let Some(fx) = player_field(
            player.mode,
            player.pos,
            effective_radius,
            p.pos,
            tun,
            scale,
            1.0,
        ) {
            p.vel = p.vel * fx.damping + fx.impulse;
        }

        // Absorption: only in attract mode, deep inside the suction zone
        if player.mode == InteractionMode::Attract {
            let dist = (player.pos - p.pos).length();
            if dist < suction && dist < player.size * 0.8 {
                absorbed.push(idx);
                continue;
            }
        }

        p.pos += p.vel * scale;

        // Bounce off the field edges with a little energy loss
        if p.pos.x < 0.0 || p.pos.x > field.x {
            p.vel.x *= -0.8;
            p.pos.x = p.pos.x.clamp(0.0, field.x);
        }
        if p.pos.y < 0.0 || p.pos.y > field.y {
            p.vel.y *= -0.8;
            p.pos.y = p.pos.y.clamp(0.0, field.y);
        }

        p.record_trail();
    }

    // Release after the pass; arena indices are stable so no shift hazard
    let mastery = 1.0 + 0.2 * state.player.skills.particle_mastery as f32;
    let mut xp_total: u32 = 0;
    let mut count: u32 = 0;
    for idx in absorbed {
        let Some(p) = state.particles.release(idx) else {
            continue;
        };
        let xp = (p.xp_value as f32 * mastery).round() as u32;
        events.push(GameEvent::Absorb { xp });
        xp_total += xp;
        count += 1;
        state.particles_absorbed += 1;

        match p.kind {
            ParticleKind::PowerUp => {
                state.player.powered_up_ticks = POWERUP_TICKS;
                events.push(GameEvent::PowerUpCollected);
            }
            ParticleKind::Heal => {
                state.player.health =
                    (state.player.health + tun.heal_amount).min(state.player.max_health);
            }
            _ => {}
        }
    }

    if count > 0 {
        let enemies_count = state.enemies.len();
        if let Some(level) = state
            .progression
            .update_quest("absorb100", count, enemies_count, events)
        {
            *boss_to_trigger = Some(level);
        }
        if let Some(level) = state.progression.grant_xp(xp_total, enemies_count, events) {
            *boss_to_trigger = Some(level);
        }
    }
}

/// Behavior dispatch: one place decides how each enemy moves and attacks.
fn drive_behavior(
    enemy: &mut Enemy,
    player_pos: Vec2,
    projectiles: &mut Vec<Projectile>,
    events: &mut TickEvents,
) {
    let to_player = player_pos - enemy.pos;
    let dist = to_player.length().max(1.0);
    let dir = to_player / dist;

    match &mut enemy.behavior {
        Behavior::Wander => {
            // Heading set at spawn; edge handling happens after integration
        }
        Behavior::Hunt { hunt_radius } => {
            if dist < *hunt_radius {
                enemy.vel = dir * enemy.base_speed;
            } else {
                enemy.vel *= 0.9;
            }
        }
        Behavior::HuntAndShoot {
            hunt_radius,
            preferred_distance,
            shoot_interval,
            cooldown,
        } => {
            // Kite: close in when far, back off when crowded
            if dist > *preferred_distance {
                enemy.vel = dir * enemy.base_speed;
            } else if dist < *preferred_distance * 0.8 {
                enemy.vel = -dir * enemy.base_speed * 0.7;
            } else {
                enemy.vel *= 0.9;
            }
            *cooldown = cooldown.saturating_sub(1);
            if dist < *hunt_radius && *cooldown == 0 {
                let damage = validated_damage(enemy.damage) * 0.8;
                projectiles.push(spawn_projectile(
                    enemy.pos,
                    player_pos,
                    ProjectileKind::Plain,
                    damage,
                ));
                *cooldown = *shoot_interval;
                events.push(GameEvent::ProjectileFired);
            }
        }
        Behavior::Static {
            shoot_interval,
            cooldown,
            explosive,
        } => {
            enemy.vel = Vec2::ZERO;
            *cooldown = cooldown.saturating_sub(1);
            if *cooldown == 0 {
                let kind = if *explosive {
                    ProjectileKind::Explosive {
                        explosion_radius: EXPLOSION_RADIUS,
                    }
                } else {
                    ProjectileKind::Plain
                };
                let damage = validated_damage(enemy.damage) * 0.8;
                projectiles.push(spawn_projectile(enemy.pos, player_pos, kind, damage));
                *cooldown = *shoot_interval;
                events.push(GameEvent::ProjectileFired);
            }
        }
        Behavior::Stationary => {
            enemy.vel = Vec2::ZERO;
        }
        Behavior::CrossScreen => {
            // Constant velocity from spawn to the opposite edge
        }
    }
}

fn update_enemies(
    state: &mut SimulationState,
    config: &GameConfig,
    scale: f32,
    big_bang_fired: bool,
    events: &mut TickEvents,
    boss_to_trigger: &mut Option<u32>,
) {
    let tun = &config.tunables;
    let field = state.field;
    let effective_radius = state.player.effective_radius();
    let attraction_damage = state.player.effective_attraction_damage();
    let player_mode = state.player.mode;
    let player_pos = state.player.pos;

    // Taking the collection lets this pass borrow the rng and player freely
    let mut enemies = std::mem::take(&mut state.enemies);
    let mut new_projectiles: Vec<Projectile> = Vec::new();

    for enemy in enemies.iter_mut() {
        enemy.collision_cooldown = enemy.collision_cooldown.saturating_sub(1);

        if big_bang_fired && !enemy.is_boss() {
            enemy.health = 0.0;
            continue;
        }

        // Player field and continuous attraction damage. Boss-class
        // velocity is damped harder so the field barely drags them.
        let mut captured = false;
        if !enemy.ignores_attraction {
            let damping_mult = if enemy.is_boss() {
                tun.boss_damping_factor
            } else {
                1.0
            };
            if let Some(fx) = player_field(
                player_mode,
                player_pos,
                effective_radius,
                enemy.pos,
                tun,
                scale,
                damping_mult,
            ) {
                enemy.vel = enemy.vel * fx.damping + fx.impulse;
                captured = true;
            }
            if player_mode == InteractionMode::Attract
                && (player_pos - enemy.pos).length() < effective_radius
            {
                enemy.health -= attraction_damage * scale;
            }
        }

        // Behavior-driven movement only while not captured by the field
        if !captured {
            drive_behavior(enemy, player_pos, &mut new_projectiles, events);
        }

        // Teleport special (final boss)
        if enemy.teleport_chance > 0.0 && state.rng.random_bool(enemy.teleport_chance as f64) {
            enemy.pos = Vec2::new(
                state.rng.random_range(0.0..field.x),
                state.rng.random_range(0.0..field.y),
            );
        }

        enemy.pos += enemy.vel * scale;

        // Boundary policy is type-dependent: wanderers bounce, everything
        // that is not cross-screen stays near the field
        match enemy.behavior {
            Behavior::CrossScreen => {}
            Behavior::Wander => {
                if enemy.pos.x < 0.0 || enemy.pos.x > field.x {
                    enemy.vel.x = -enemy.vel.x;
                    enemy.pos.x = enemy.pos.x.clamp(0.0, field.x);
                }
                if enemy.pos.y < 0.0 || enemy.pos.y > field.y {
                    enemy.vel.y = -enemy.vel.y;
                    enemy.pos.y = enemy.pos.y.clamp(0.0, field.y);
                }
            }
            _ => {
                enemy.pos = enemy.pos.clamp(
                    Vec2::splat(-DESPAWN_MARGIN * 0.5),
                    field + Vec2::splat(DESPAWN_MARGIN * 0.5),
                );
            }
        }

        // Collision with the player, both sides gated by cooldowns
        if !enemy.ignores_collision
            && circles_overlap(player_pos, state.player.size, enemy.pos, enemy.size)
        {
            damage_player(&mut state.player, enemy.damage, events);
            if enemy.collision_cooldown == 0 {
                enemy.health -= state.player.collision_damage;
                enemy.collision_cooldown = ENEMY_COLLISION_COOLDOWN_TICKS;
            }
        }
    }

    state.projectiles.append(&mut new_projectiles);

    // Removal pass: deaths emit events, out-of-bounds despawn silently
    let big_bang_xp_mult = if big_bang_fired {
        1.0 + 0.5 * state.player.skills.big_bang_power as f32
    } else {
        1.0
    };
    let mut defeated: u32 = 0;
    let mut xp_total: u32 = 0;
    let mut drops: Vec<Vec2> = Vec::new();
    let mut bursts: Vec<Vec2> = Vec::new();
    let mut explosions: Vec<Explosion> = Vec::new();
    let mut roll = |rng: &mut rand_pcg::Pcg32| rng.random_bool(tun.drop_chance);

    enemies.retain(|enemy| {
        if enemy.health <= 0.0 {
            let xp = (enemy.xp_value as f32 * big_bang_xp_mult).round() as u32;
            events.push(GameEvent::EnemyDefeated {
                kind: enemy.kind,
                elite: enemy.elite,
                xp,
            });
            defeated += 1;
            xp_total += xp;
            explosions.push(Explosion {
                pos: enemy.pos,
                radius: enemy.size * 2.0,
                duration: EXPLOSION_DURATION_TICKS,
                damage: 0.0,
                harmed_player: true,
            });
            if enemy.is_boss() {
                bursts.push(enemy.pos);
            } else if roll(&mut state.rng) {
                drops.push(enemy.pos);
            }
            return false;
        }
        // Safety net: anything far past the field edge despawns
        let out = enemy.pos.x < -DESPAWN_MARGIN
            || enemy.pos.x > field.x + DESPAWN_MARGIN
            || enemy.pos.y < -DESPAWN_MARGIN
            || enemy.pos.y > field.y + DESPAWN_MARGIN;
        !out
    });
    state.enemies = enemies;
    state.enemies_destroyed += defeated as u64;
    state.explosions.append(&mut explosions);

    // Deferred spawns, once iteration is over
    for pos in drops {
        let mut p = spawn_particle(
            &mut state.rng,
            state.field,
            state.player.pos,
            tun.spawn_padding,
        );
        p.pos = pos;
        state.particles.insert(p);
        events.push(GameEvent::ParticleDropped);
    }
    for center in bursts {
        // A defeated boss scatters a ring of particles
        for i in 0..tun.boss_burst_count {
            let angle = i as f32 / tun.boss_burst_count as f32 * std::f32::consts::TAU;
            let mut p = spawn_particle(
                &mut state.rng,
                state.field,
                state.player.pos,
                tun.spawn_padding,
            );
            p.pos = center;
            p.vel = Vec2::new(angle.cos(), angle.sin()) * 5.0;
            state.particles.insert(p);
            events.push(GameEvent::ParticleDropped);
        }
    }

    if xp_total > 0 {
        let enemies_count = state.enemies.len();
        if let Some(level) =
            state
                .progression
                .update_quest("defeat20", defeated, enemies_count, events)
        {
            *boss_to_trigger = Some(level);
        }
        if let Some(level) = state.progression.grant_xp(xp_total, enemies_count, events) {
            *boss_to_trigger = Some(level);
        }
    }
}

fn update_projectiles(state: &mut SimulationState, scale: f32, events: &mut TickEvents) {
    let field = state.field;
    let mut projectiles = std::mem::take(&mut state.projectiles);
    let mut new_explosions: Vec<Explosion> = Vec::new();

    projectiles.retain_mut(|p| {
        p.lifespan = p.lifespan.saturating_sub(1);
        p.pos += p.vel * scale;

        // Hit the player
        if circles_overlap(state.player.pos, state.player.size, p.pos, p.radius) {
            damage_player(&mut state.player, Some(p.damage), events);
            return false;
        }

        // Expiry: explosive payloads detonate, plain ones just vanish
        if p.lifespan == 0 {
            if let ProjectileKind::Explosive { explosion_radius } = p.kind {
                new_explosions.push(Explosion {
                    pos: p.pos,
                    radius: explosion_radius,
                    duration: EXPLOSION_DURATION_TICKS,
                    damage: p.damage,
                    harmed_player: false,
                });
                events.push(GameEvent::ExplosionTriggered);
            }
            return false;
        }

        // Leave the play area. The margin matters: enemies fire from up to
        // 50 units off-field, and those shots must survive long enough to
        // reach it.
        p.pos.x > -DESPAWN_MARGIN
            && p.pos.x < field.x + DESPAWN_MARGIN
            && p.pos.y > -DESPAWN_MARGIN
            && p.pos.y < field.y + DESPAWN_MARGIN
    });

    state.projectiles = projectiles;
    state.explosions.append(&mut new_explosions);
}

fn update_explosions(state: &mut SimulationState, events: &mut TickEvents) {
    let mut explosions = std::mem::take(&mut state.explosions);
    explosions.retain_mut(|e| {
        e.duration = e.duration.saturating_sub(1);
        // The blast area damages the player at most once
        if !e.harmed_player
            && e.damage > 0.0
            && circles_overlap(state.player.pos, state.player.size, e.pos, e.radius)
        {
            damage_player(&mut state.player, Some(e.damage), events);
            e.harmed_player = true;
        }
        e.duration > 0
    });
    state.explosions = explosions;
}
