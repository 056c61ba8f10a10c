//! Kinematics for every entity kind.
//!
//! Directed projectiles fly straight and retire on lifetime or leaving the
//! world. Blades and auras ride along with the player instead.

use glam::Vec2;

use swarmfall_core::components::{Enemy, Player, Projectile, XpOrb};
use swarmfall_core::constants::{ORB_COLLECT_SPEED, PROJECTILE_OOB_MARGIN};
use swarmfall_core::enums::WeaponKind;
use swarmfall_core::input::InputState;
use swarmfall_core::math::{direction, distance, point_on_circle};
use swarmfall_core::types::WorldBounds;

use crate::pool::Pool;
use crate::systems::weapons::blade_angle;

/// Move the player along the held direction, clamped to the world.
pub fn move_player(player: &mut Player, input: &InputState, bounds: WorldBounds, dt: f32) {
    let velocity = input.movement() * player.move_speed;
    player.body.velocity = velocity;
    let next = player.body.position + velocity * dt;
    player.body.position = bounds.clamp(next, player.body.radius);
}

/// Steer every enemy straight at the player.
pub fn move_enemies(enemies: &mut Pool<Enemy>, target: Vec2, dt: f32) {
    for (_, enemy) in enemies.iter_mut() {
        let heading = direction(enemy.body.position, target);
        enemy.body.velocity = heading * enemy.body.speed;
        enemy.body.position += enemy.body.velocity * dt;
    }
}

/// Advance projectile lifetimes and straight-line flight; flag the expired.
pub fn move_projectiles(
    projectiles: &mut Pool<Projectile>,
    bounds: WorldBounds,
    dt: f32,
    dt_ms: f64,
) {
    for (_, projectile) in projectiles.iter_mut() {
        projectile.lifetime_ms += dt_ms;
        if projectile.lifetime_ms >= projectile.max_lifetime_ms {
            projectile.body.active = false;
            continue;
        }
        if projectile.weapon.is_directed() {
            projectile.body.position += projectile.body.velocity * dt;
            if !bounds.contains(projectile.body.position, PROJECTILE_OOB_MARGIN) {
                projectile.body.active = false;
            }
        }
    }
}

/// Pin blades to their orbit and auras to the player.
pub fn follow_player(projectiles: &mut Pool<Projectile>, player: Vec2, now_ms: f64) {
    for (_, projectile) in projectiles.iter_mut() {
        match projectile.weapon {
            WeaponKind::Blade => {
                let angle = blade_angle(now_ms, projectile.orbit_offset);
                projectile.body.position = point_on_circle(player, projectile.orbit_radius, angle);
            }
            WeaponKind::Aura => projectile.body.position = player,
            WeaponKind::Bullet | WeaponKind::Fireball | WeaponKind::Lightning => {}
        }
    }
}

/// Home orbs that are being collected toward the player without overshoot.
pub fn move_orbs(orbs: &mut Pool<XpOrb>, target: Vec2, dt: f32) {
    let step = ORB_COLLECT_SPEED * dt;
    for (_, orb) in orbs.iter_mut().filter(|(_, o)| o.is_being_collected) {
        let remaining = distance(orb.body.position, target);
        if remaining <= step {
            orb.body.position = target;
            orb.body.velocity = Vec2::ZERO;
        } else {
            orb.body.velocity = direction(orb.body.position, target) * ORB_COLLECT_SPEED;
            orb.body.position += orb.body.velocity * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarmfall_core::components::Entity;
    use swarmfall_core::enums::Key;

    #[test]
    fn player_is_clamped_inside_world() {
        let mut player = Player {
            move_speed: 200.0,
            ..Player::default()
        };
        player.body.radius = 10.0;
        player.body.position = Vec2::new(12.0, 500.0);
        let bounds = WorldBounds {
            width: 1000.0,
            height: 1000.0,
        };
        move_player(&mut player, &InputState::with_keys([Key::Left]), bounds, 1.0);
        assert_eq!(player.body.position, Vec2::new(10.0, 500.0));
    }

    #[test]
    fn enemies_chase_player() {
        let mut enemies: Pool<Enemy> = Pool::new("enemy", 1, 1);
        let (h, enemy) = enemies.acquire_mut();
        enemy.body.speed = 100.0;
        move_enemies(&mut enemies, Vec2::new(100.0, 0.0), 0.5);
        let enemy = enemies.get(h).unwrap();
        assert_eq!(enemy.body.position, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn projectile_expires_on_lifetime_and_bounds() {
        let bounds = WorldBounds {
            width: 100.0,
            height: 100.0,
        };
        let mut projectiles: Pool<Projectile> = Pool::new("projectile", 2, 2);
        let (aged, p) = projectiles.acquire_mut();
        p.max_lifetime_ms = 100.0;
        p.lifetime_ms = 90.0;
        let (fast, p) = projectiles.acquire_mut();
        p.max_lifetime_ms = 10_000.0;
        p.body.position = Vec2::new(90.0, 50.0);
        p.body.velocity = Vec2::new(1000.0, 0.0);

        move_projectiles(&mut projectiles, bounds, 0.1, 16.0);
        assert!(!projectiles.get(aged).unwrap().is_active());
        assert!(!projectiles.get(fast).unwrap().is_active());
    }

    #[test]
    fn orb_homes_without_overshoot() {
        let mut orbs: Pool<XpOrb> = Pool::new("xp_orb", 1, 1);
        let (h, orb) = orbs.acquire_mut();
        orb.is_being_collected = true;
        orb.body.position = Vec2::new(5.0, 0.0);
        move_orbs(&mut orbs, Vec2::ZERO, 1.0);
        assert_eq!(orbs.get(h).unwrap().body.position, Vec2::ZERO);
    }
}
