//! Field forces, collision tests and the damage validation guard
//!
//! Pure helpers used by the tick. Nothing here touches collections; the
//! tick owns iteration order and removal.

use glam::Vec2;

use super::state::InteractionMode;
use crate::config::Tunables;
use crate::consts::FALLBACK_DAMAGE;
use crate::{direction, dist_sq, perp};

/// Validate a damage value before it is applied to any health pool.
///
/// A missing or non-finite value is replaced with the fallback constant;
/// letting a NaN through would silently corrupt every downstream
/// health-percentage and game-over check.
pub fn validated_damage(raw: Option<f32>) -> f32 {
    match raw {
        Some(d) if d.is_finite() => d,
        Some(d) => {
            log::warn!("non-finite damage value {d}, substituting {FALLBACK_DAMAGE}");
            FALLBACK_DAMAGE
        }
        None => FALLBACK_DAMAGE,
    }
}

/// Circle-circle overlap test
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    let r = a_radius + b_radius;
    dist_sq(a_pos, b_pos) < r * r
}

/// What the player field does to one entity this sub-step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldEffect {
    /// Velocity multiplier applied before the impulse
    pub damping: f32,
    /// Velocity delta for this sub-step
    pub impulse: Vec2,
}

/// Compute the player-field effect on an entity at `entity_pos`.
///
/// Returns `None` when no force applies: entity outside the effective
/// radius, or the player is in a passive mode (`Normal`/`Vortex`).
/// `scale` is the sub-step time factor. `damping_mult` lowers the attract
/// damping factor for heavy entity classes: boss-class velocity is damped
/// harder, so field impulses accumulate less and the drag is weaker
/// (inertia).
pub fn player_field(
    mode: InteractionMode,
    player_pos: Vec2,
    effective_radius: f32,
    entity_pos: Vec2,
    tun: &Tunables,
    scale: f32,
    damping_mult: f32,
) -> Option<FieldEffect> {
    let dist = (player_pos - entity_pos).length();
    if dist >= effective_radius || dist <= f32::EPSILON {
        return None;
    }

    // Pull strengthens toward the center
    let falloff = 1.0 - dist / effective_radius;
    let radial = direction(entity_pos, player_pos);

    match mode {
        InteractionMode::Attract => {
            // Inward pull plus an orbital component: entities spiral rather
            // than fall straight in
            let tangential = perp(radial);
            let impulse = (radial * tun.attract_radial + tangential * tun.attract_tangential)
                * falloff
                * scale;
            Some(FieldEffect {
                damping: tun.attract_damping * damping_mult,
                impulse,
            })
        }
        InteractionMode::Repel => Some(FieldEffect {
            damping: 1.0,
            impulse: -radial * tun.repel_strength * falloff * scale,
        }),
        InteractionMode::Normal | InteractionMode::Vortex => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tun() -> Tunables {
        Tunables::default()
    }

    #[test]
    fn test_attract_pulls_inward_with_orbit() {
        let player = Vec2::ZERO;
        let entity = Vec2::new(100.0, 0.0);
        let fx = player_field(InteractionMode::Attract, player, 150.0, entity, &tun(), 1.0, 1.0)
            .expect("inside radius");
        assert!(fx.damping < 1.0);
        // Net inward component
        assert!(fx.impulse.dot(direction(entity, player)) > 0.0);
        // Non-zero tangential component
        assert!(fx.impulse.dot(perp(direction(entity, player))) > 0.0);
    }

    #[test]
    fn test_attract_stronger_near_center() {
        let player = Vec2::ZERO;
        let near = player_field(
            InteractionMode::Attract,
            player,
            150.0,
            Vec2::new(30.0, 0.0),
            &tun(),
            1.0,
            1.0,
        )
        .unwrap();
        let far = player_field(
            InteractionMode::Attract,
            player,
            150.0,
            Vec2::new(140.0, 0.0),
            &tun(),
            1.0,
            1.0,
        )
        .unwrap();
        assert!(near.impulse.length() > far.impulse.length());
    }

    #[test]
    fn test_heavy_class_damping_is_stronger() {
        let player = Vec2::ZERO;
        let entity = Vec2::new(100.0, 0.0);
        let t = tun();
        let light = player_field(InteractionMode::Attract, player, 150.0, entity, &t, 1.0, 1.0)
            .unwrap();
        let heavy = player_field(
            InteractionMode::Attract,
            player,
            150.0,
            entity,
            &t,
            1.0,
            t.boss_damping_factor,
        )
        .unwrap();
        // Heavier classes lose more velocity per step; the impulse itself
        // is class-independent
        assert!(heavy.damping < light.damping);
        assert_eq!(heavy.impulse, light.impulse);
    }

    #[test]
    fn test_repel_pushes_outward_only() {
        let player = Vec2::ZERO;
        let entity = Vec2::new(100.0, 0.0);
        let fx = player_field(InteractionMode::Repel, player, 150.0, entity, &tun(), 1.0, 1.0)
            .expect("inside radius");
        assert_eq!(fx.damping, 1.0);
        // Purely radial, pointing away
        assert!(fx.impulse.x > 0.0);
        assert!(fx.impulse.y.abs() < 1e-6);
    }

    #[test]
    fn test_no_field_outside_radius_or_passive_modes() {
        let player = Vec2::ZERO;
        let entity = Vec2::new(200.0, 0.0);
        assert!(
            player_field(InteractionMode::Attract, player, 150.0, entity, &tun(), 1.0, 1.0)
                .is_none()
        );

        let inside = Vec2::new(50.0, 0.0);
        assert!(
            player_field(InteractionMode::Normal, player, 150.0, inside, &tun(), 1.0, 1.0)
                .is_none()
        );
        assert!(
            player_field(InteractionMode::Vortex, player, 150.0, inside, &tun(), 1.0, 1.0)
                .is_none()
        );
    }

    #[test]
    fn test_circles_overlap_boundary() {
        assert!(circles_overlap(Vec2::ZERO, 10.0, Vec2::new(19.0, 0.0), 10.0));
        assert!(!circles_overlap(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0));
    }

    #[test]
    fn test_validated_damage_substitutes() {
        assert_eq!(validated_damage(Some(25.0)), 25.0);
        assert_eq!(validated_damage(None), FALLBACK_DAMAGE);
        assert_eq!(validated_damage(Some(f32::NAN)), FALLBACK_DAMAGE);
        assert_eq!(validated_damage(Some(f32::INFINITY)), FALLBACK_DAMAGE);
    }

    proptest::proptest! {
        #[test]
        fn prop_validated_damage_always_finite(raw in proptest::num::f32::ANY) {
            let d = validated_damage(Some(raw));
            proptest::prop_assert!(d.is_finite());
        }

        #[test]
        fn prop_health_never_nan_after_hit(health in 0.0f32..1000.0, raw in proptest::num::f32::ANY) {
            let after = health - validated_damage(Some(raw));
            proptest::prop_assert!(!after.is_nan());
        }
    }
}
