//! Wave spawning system: paces enemy spawns and advances waves on a timer.

use std::f32::consts::TAU;

use log::info;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use swarmfall_core::balance::{BalanceTable, WaveTuning};
use swarmfall_core::components::{Body, Wave};
use swarmfall_core::constants::{BOSS_WAVE_INTERVAL, SPAWN_MARGIN, SPAWN_RING_RADIUS};
use swarmfall_core::enums::EnemyKind;
use swarmfall_core::events::GameEvent;
use swarmfall_core::math::{direction, point_on_circle};

use crate::world::World;

/// Build wave `number` starting at `start_ms`.
pub fn wave_for(number: u32, tuning: &WaveTuning, start_ms: f64) -> Wave {
    let step = number.saturating_sub(1);
    let spawn_rate = (tuning.base_spawn_rate + step as f32 * tuning.spawn_rate_per_wave)
        .min(tuning.max_spawn_rate);
    Wave {
        number,
        enemy_count: tuning.base_enemy_count + step * tuning.enemies_per_wave,
        spawn_rate,
        duration_ms: tuning.duration_ms,
        start_ms,
        spawned: 0,
        last_spawn_ms: None,
    }
}

/// Spawn due enemies, or roll over to the next wave once this one's time is up.
pub fn run(world: &mut World, balance: &BalanceTable, rng: &mut ChaCha8Rng, now_ms: f64) {
    if world.wave.is_over(now_ms) {
        advance(world, balance, now_ms);
        return;
    }

    let wave = &world.wave;
    if wave.spawned >= wave.enemy_count {
        return;
    }
    let since = now_ms - wave.last_spawn_ms.unwrap_or(wave.start_ms);
    if since < wave.spawn_interval_ms() {
        return;
    }

    let kind = choose_kind(wave.number, wave.spawned, rng);
    spawn_enemy(world, balance, rng, kind);
    world.wave.spawned += 1;
    world.wave.last_spawn_ms = Some(now_ms);
}

/// Finish the current wave: award the bonus and start the next one.
fn advance(world: &mut World, balance: &BalanceTable, now_ms: f64) {
    let finished = world.wave.number;
    let bonus = balance.wave.completion_bonus * finished as u64;
    world.score += bonus;
    world.wave = wave_for(finished + 1, &balance.wave, now_ms);
    world.events.push(GameEvent::WaveAdvanced {
        wave: world.wave.number,
        bonus,
    });
    info!(
        "Wave {} started: {} enemies at {:.1}/s (bonus {})",
        world.wave.number, world.wave.enemy_count, world.wave.spawn_rate, bonus
    );
}

/// Enemy mix by wave: basics only early, then weighted mixtures, and a boss
/// as the first spawn of every boss wave.
pub fn choose_kind(wave: u32, spawned: u32, rng: &mut ChaCha8Rng) -> EnemyKind {
    if wave % BOSS_WAVE_INTERVAL == 0 && spawned == 0 {
        return EnemyKind::Boss;
    }
    let weights: &[(EnemyKind, u32)] = match wave {
        0..=2 => return EnemyKind::Basic,
        3..=5 => &[
            (EnemyKind::Basic, 60),
            (EnemyKind::Fast, 25),
            (EnemyKind::Tank, 15),
        ],
        _ => &[
            (EnemyKind::Basic, 40),
            (EnemyKind::Fast, 30),
            (EnemyKind::Tank, 30),
        ],
    };
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for &(kind, weight) in weights {
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    EnemyKind::Basic
}

/// Place one enemy on the spawn ring around the player.
fn spawn_enemy(world: &mut World, balance: &BalanceTable, rng: &mut ChaCha8Rng, kind: EnemyKind) {
    let stats = balance.enemy(kind);
    let scale = 1.0 + world.wave.number.saturating_sub(1) as f32 * balance.wave.health_scale_per_wave;
    let target = world.player.body.position;
    let angle = rng.gen_range(0.0..TAU);
    let position = world
        .bounds
        .clamp(point_on_circle(target, SPAWN_RING_RADIUS, angle), SPAWN_MARGIN);

    let (_, enemy) = world.enemies.acquire_mut();
    let health = stats.health * scale;
    enemy.body = Body {
        position,
        velocity: direction(position, target) * stats.speed,
        radius: stats.radius,
        health,
        max_health: health,
        damage: stats.damage,
        speed: stats.speed,
        active: true,
    };
    enemy.kind = kind;
    enemy.xp_value = stats.xp_value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn wave_scaling_caps_spawn_rate() {
        let tuning = BalanceTable::default().wave;
        let first = wave_for(1, &tuning, 0.0);
        assert_eq!(first.enemy_count, 10);
        assert!((first.spawn_rate - 1.0).abs() < 1e-6);

        let fourth = wave_for(4, &tuning, 0.0);
        assert_eq!(fourth.enemy_count, 25);
        assert!((fourth.spawn_rate - 1.9).abs() < 1e-5);

        let late = wave_for(100, &tuning, 0.0);
        assert_eq!(late.spawn_rate, tuning.max_spawn_rate);
    }

    #[test]
    fn early_waves_are_basic_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for spawned in 0..50 {
            assert_eq!(choose_kind(1, spawned, &mut rng), EnemyKind::Basic);
            assert_eq!(choose_kind(2, spawned, &mut rng), EnemyKind::Basic);
        }
    }

    #[test]
    fn boss_opens_boss_waves_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert_eq!(choose_kind(5, 0, &mut rng), EnemyKind::Boss);
        assert_eq!(choose_kind(10, 0, &mut rng), EnemyKind::Boss);
        for spawned in 1..100 {
            assert_ne!(choose_kind(5, spawned, &mut rng), EnemyKind::Boss);
        }
        assert_ne!(choose_kind(6, 0, &mut rng), EnemyKind::Boss);
    }

    #[test]
    fn late_waves_mix_kinds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let kinds: Vec<_> = (1..300).map(|s| choose_kind(7, s, &mut rng)).collect();
        for kind in [EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Tank] {
            assert!(kinds.contains(&kind), "{kind:?} never rolled");
        }
    }
}
