//! Weapon system: fires every ready weapon the player carries.
//!
//! Directed kinds (bullet, fireball, lightning) need a target and fire a
//! fan of projectiles at the nearest enemy. Blades spawn evenly spaced on
//! an orbit around the player; the aura spawns one field centred on it.

use std::f32::consts::TAU;

use glam::Vec2;

use swarmfall_core::balance::{BalanceTable, WeaponStats};
use swarmfall_core::components::{Body, Enemy, Projectile, Weapon, PLAYER_OWNER_ID};
use swarmfall_core::constants::{BLADE_ANGULAR_SPEED, BLADE_ORBIT_RADIUS, PROJECTILE_SPREAD};
use swarmfall_core::enums::WeaponKind;
use swarmfall_core::math::{angle_of, distance_sq, from_angle, point_on_circle};

use crate::pool::Pool;
use crate::world::World;

/// Orbit angle of a blade at sim time `now_ms`.
pub fn blade_angle(now_ms: f64, offset: f32) -> f32 {
    (now_ms / 1000.0) as f32 * BLADE_ANGULAR_SPEED + offset
}

/// Position of the live enemy closest to `from`, if any.
pub fn nearest_enemy(enemies: &Pool<Enemy>, from: Vec2) -> Option<Vec2> {
    enemies
        .iter()
        .map(|(_, enemy)| enemy.body.position)
        .min_by(|a, b| distance_sq(from, *a).total_cmp(&distance_sq(from, *b)))
}

/// Fire every weapon whose cooldown has elapsed. Returns projectiles spawned.
pub fn run(world: &mut World, balance: &BalanceTable, now_ms: f64) -> usize {
    let origin = world.player.body.position;
    let target = nearest_enemy(&world.enemies, origin);
    let projectiles = &mut world.projectiles;
    let mut spawned = 0;

    for weapon in world.player.weapons.iter_mut() {
        if !weapon.ready(now_ms) {
            continue;
        }
        let stats = balance.weapon(weapon.kind);
        let fired = match weapon.kind {
            WeaponKind::Bullet | WeaponKind::Fireball | WeaponKind::Lightning => match target {
                Some(target) => fire_directed(projectiles, weapon, stats, origin, target),
                None => 0,
            },
            WeaponKind::Blade => fire_blades(projectiles, weapon, stats, origin, now_ms),
            WeaponKind::Aura => fire_aura(projectiles, weapon, stats, origin),
        };
        if fired > 0 {
            weapon.last_fired_ms = Some(now_ms);
            spawned += fired;
        }
    }
    spawned
}

/// Fan of `projectile_count` shots centred on the bearing to `target`.
fn fire_directed(
    projectiles: &mut Pool<Projectile>,
    weapon: &Weapon,
    stats: &WeaponStats,
    origin: Vec2,
    target: Vec2,
) -> usize {
    let count = weapon.projectile_count.max(1);
    let bearing = angle_of(target - origin);
    let centre = (count - 1) as f32 * 0.5;
    for i in 0..count {
        let heading = from_angle(bearing + (i as f32 - centre) * PROJECTILE_SPREAD);
        let projectile = spawn(projectiles, weapon, stats, origin);
        projectile.direction = heading;
        projectile.body.velocity = heading * weapon.projectile_speed;
    }
    count as usize
}

fn fire_blades(
    projectiles: &mut Pool<Projectile>,
    weapon: &Weapon,
    stats: &WeaponStats,
    origin: Vec2,
    now_ms: f64,
) -> usize {
    let count = weapon.projectile_count.max(1);
    let orbit = BLADE_ORBIT_RADIUS * weapon.area;
    for i in 0..count {
        let offset = i as f32 * TAU / count as f32;
        let position = point_on_circle(origin, orbit, blade_angle(now_ms, offset));
        let projectile = spawn(projectiles, weapon, stats, position);
        projectile.orbit_offset = offset;
        projectile.orbit_radius = orbit;
    }
    count as usize
}

fn fire_aura(
    projectiles: &mut Pool<Projectile>,
    weapon: &Weapon,
    stats: &WeaponStats,
    origin: Vec2,
) -> usize {
    spawn(projectiles, weapon, stats, origin);
    1
}

/// Acquire and initialise a stationary projectile for `weapon`.
fn spawn<'a>(
    projectiles: &'a mut Pool<Projectile>,
    weapon: &Weapon,
    stats: &WeaponStats,
    position: Vec2,
) -> &'a mut Projectile {
    let (_, projectile) = projectiles.acquire_mut();
    projectile.body = Body {
        position,
        velocity: Vec2::ZERO,
        radius: stats.radius * weapon.area,
        health: 1.0,
        max_health: 1.0,
        damage: weapon.damage,
        speed: weapon.projectile_speed,
        active: true,
    };
    projectile.owner = PLAYER_OWNER_ID;
    projectile.weapon = weapon.kind;
    projectile.pierce = weapon.pierce;
    projectile.lifetime_ms = 0.0;
    projectile.max_lifetime_ms = stats.lifetime_ms;
    projectile
}
