//! Snapshot system: copies the world into a complete `GameState`.
//!
//! This system is read-only. It never modifies the world.

use swarmfall_core::components::Entity;
use swarmfall_core::events::GameEvent;
use swarmfall_core::state::*;
use swarmfall_core::types::SimClock;

use crate::pool::Pool;
use crate::systems::experience::ExperienceSystem;
use crate::world::World;

/// Build the frame's state view.
pub fn build_snapshot(
    world: &World,
    clock: &SimClock,
    experience: &ExperienceSystem,
    metrics: PerformanceMetrics,
    events: Vec<GameEvent>,
) -> GameState {
    GameState {
        clock: *clock,
        player: world.player.clone(),
        enemies: views(&world.enemies),
        projectiles: views(&world.projectiles),
        xp_orbs: views(&world.xp_orbs),
        wave: world.wave,
        is_paused: world.is_paused,
        is_game_over: world.is_game_over,
        score: world.score,
        elapsed_ms: clock.now_ms,
        kill_count: world.kill_count,
        level_up: LevelUpView {
            pending: experience.pending(),
            choices: experience.choices().to_vec(),
        },
        metrics: PerformanceMetrics {
            entity_count: world.entity_count(),
            ..metrics
        },
        pools: PoolsView {
            enemies: world.enemies.stats(),
            projectiles: world.projectiles.stats(),
            xp_orbs: world.xp_orbs.stats(),
        },
        events,
    }
}

/// Live entities in slot order.
fn views<T: Entity + Clone>(pool: &Pool<T>) -> Vec<EntityView<T>> {
    pool.iter()
        .map(|(handle, entity)| EntityView {
            handle,
            entity: entity.clone(),
        })
        .collect()
}
