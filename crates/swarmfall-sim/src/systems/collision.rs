//! Collision system.
//!
//! Each pass rebuilds the three broad-phase grids from the live pools, then
//! resolves in order: enemy contact on the player, projectile hits on
//! enemies (kills drop orbs), and orb pickup. The grids are kept in step
//! with kills and drops inside the pass.

use glam::Vec2;
use log::debug;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use swarmfall_core::components::{Body, Enemy, Entity, Player, XpOrb};
use swarmfall_core::constants::*;
use swarmfall_core::events::GameEvent;
use swarmfall_core::math::{circles_overlap, direction};
use swarmfall_core::types::Handle;

use crate::pool::Pool;
use crate::spatial::SpatialGrid;
use crate::world::World;

/// What one collision pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub player_hit: bool,
    pub kills: u32,
    pub orbs_collected: u32,
}

pub fn run(world: &mut World, rng: &mut ChaCha8Rng, now_ms: f64) -> CollisionReport {
    rebuild_grids(world);
    let player_hit = enemies_vs_player(world, now_ms);
    let kills = projectiles_vs_enemies(world, rng);
    let orbs_collected = orbs_vs_player(world);
    CollisionReport {
        player_hit,
        kills,
        orbs_collected,
    }
}

/// Clear every grid and re-add each live entity.
pub fn rebuild_grids(world: &mut World) {
    fill(&mut world.enemy_grid, &world.enemies);
    fill(&mut world.projectile_grid, &world.projectiles);
    fill(&mut world.orb_grid, &world.xp_orbs);
}

fn fill<T: Entity>(grid: &mut SpatialGrid, pool: &Pool<T>) {
    grid.clear();
    for (handle, entity) in pool.iter() {
        grid.add(handle, entity.body());
    }
}

/// At most one enemy hit per invulnerability window.
///
/// The first overlapping enemy in query order deals its contact damage and
/// is knocked back along the player-to-enemy direction.
pub fn enemies_vs_player(world: &mut World, now_ms: f64) -> bool {
    let World {
        player,
        enemies,
        enemy_grid,
        events,
        ..
    } = world;

    if let Some(last) = player.last_hit_ms {
        if now_ms - last < INVULNERABILITY_MS {
            return false;
        }
    }

    let centre = player.body.position;
    let reach = player.body.radius + PLAYER_CONTACT_PADDING;
    for handle in enemy_grid.entities_in_radius(centre, reach) {
        let Some(enemy) = enemies.get_mut(handle) else {
            continue;
        };
        if !circles_overlap(centre, player.body.radius, enemy.body.position, enemy.body.radius) {
            continue;
        }

        player.body.health = (player.body.health - enemy.body.damage).max(0.0);
        player.last_hit_ms = Some(now_ms);
        enemy.body.position += direction(centre, enemy.body.position) * KNOCKBACK_DISTANCE;
        enemy_grid.update(handle, &enemy.body);
        events.push(GameEvent::PlayerHit {
            damage: enemy.body.damage,
            remaining_health: player.body.health,
        });
        return true;
    }
    false
}

/// Apply projectile damage, consuming pierce and retiring spent projectiles.
/// Returns the number of kills.
pub fn projectiles_vs_enemies(world: &mut World, rng: &mut ChaCha8Rng) -> u32 {
    let World {
        projectiles,
        enemies,
        xp_orbs,
        enemy_grid,
        orb_grid,
        score,
        kill_count,
        events,
        ..
    } = world;
    let mut kills = 0;

    for shot in projectiles.handles() {
        let Some(projectile) = projectiles.get_mut(shot) else {
            continue;
        };
        let centre = projectile.body.position;
        let radius = projectile.body.radius;

        for target in enemy_grid.entities_in_radius(centre, radius) {
            if projectile.pierce == 0 {
                break;
            }
            if projectile.has_struck(target) {
                continue;
            }
            let Some(enemy) = enemies.get_mut(target) else {
                continue;
            };
            if enemy.body.health <= 0.0
                || !circles_overlap(centre, radius, enemy.body.position, enemy.body.radius)
            {
                continue;
            }

            enemy.body.health -= projectile.body.damage;
            projectile.pierce -= 1;
            projectile.struck.push(target);

            if enemy.body.health <= 0.0 {
                kill(enemy, target, enemy_grid, xp_orbs, orb_grid, events, rng);
                *kill_count += 1;
                *score += enemy.xp_value as u64 * KILL_SCORE_PER_XP;
                kills += 1;
            }
        }

        if projectile.pierce == 0 {
            projectile.body.active = false;
        }
    }
    kills
}

fn kill(
    enemy: &mut Enemy,
    handle: Handle,
    enemy_grid: &mut SpatialGrid,
    xp_orbs: &mut Pool<XpOrb>,
    orb_grid: &mut SpatialGrid,
    events: &mut Vec<GameEvent>,
    rng: &mut ChaCha8Rng,
) {
    enemy.body.active = false;
    enemy_grid.remove(handle);
    let dropped = drop_orbs(xp_orbs, orb_grid, enemy.body.position, enemy.xp_value, rng);
    debug!(
        "{:?} {} killed, {} orbs dropped",
        enemy.kind, handle, dropped
    );
    events.push(GameEvent::EnemyKilled {
        kind: enemy.kind,
        position: enemy.body.position,
        xp_value: enemy.xp_value,
    });
}

/// How many orbs a kill worth `total` drops, and each orb's value.
pub fn orb_split(total: u32) -> (u32, u32) {
    let count = if total >= ORB_SPLIT_THREE_AT {
        3
    } else if total >= ORB_SPLIT_TWO_AT {
        2
    } else {
        1
    };
    (count, total / count)
}

/// Scatter orbs for `total` experience around `at`, indexing them in the grid.
pub fn drop_orbs(
    xp_orbs: &mut Pool<XpOrb>,
    orb_grid: &mut SpatialGrid,
    at: Vec2,
    total: u32,
    rng: &mut ChaCha8Rng,
) -> u32 {
    if total == 0 {
        return 0;
    }
    let (count, value) = orb_split(total);
    for _ in 0..count {
        let jitter = Vec2::new(
            rng.gen_range(-ORB_JITTER..=ORB_JITTER),
            rng.gen_range(-ORB_JITTER..=ORB_JITTER),
        );
        let (handle, orb) = xp_orbs.acquire_mut();
        orb.body = Body {
            position: at + jitter,
            radius: ORB_RADIUS,
            active: true,
            ..Body::default()
        };
        orb.value = value;
        orb.is_being_collected = false;
        orb_grid.add(handle, &orb.body);
    }
    count
}

/// Collect touching orbs and start homing on orbs in pickup reach.
pub fn orbs_vs_player(world: &mut World) -> u32 {
    let World {
        player,
        xp_orbs,
        orb_grid,
        score,
        events,
        ..
    } = world;
    let mut collected = 0;

    let centre = player.body.position;
    let reach = player.body.radius + player.pickup_radius;
    for handle in orb_grid.entities_in_radius(centre, reach) {
        let Some(orb) = xp_orbs.get_mut(handle) else {
            continue;
        };
        if !orb.body.active {
            continue;
        }
        if circles_overlap(centre, player.body.radius, orb.body.position, orb.body.radius) {
            collect(player, orb, score, events);
            orb_grid.remove(handle);
            collected += 1;
            continue;
        }
        if !orb.is_being_collected && circles_overlap(centre, reach, orb.body.position, 0.0) {
            orb.is_being_collected = true;
        }
    }
    collected
}

fn collect(player: &mut Player, orb: &mut XpOrb, score: &mut u64, events: &mut Vec<GameEvent>) {
    player.experience += orb.value;
    *score += orb.value as u64;
    orb.body.active = false;
    events.push(GameEvent::OrbCollected { value: orb.value });
}
