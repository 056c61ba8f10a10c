//! Cleanup system: returns entities flagged inactive to their pools.

use swarmfall_core::types::Handle;

use crate::world::World;

/// Release every entity a system deactivated this frame and drop it from
/// its grid. Uses a caller-owned buffer to avoid per-frame allocation.
pub fn run(world: &mut World, released: &mut Vec<Handle>) -> usize {
    let mut total = 0;

    released.clear();
    total += world.enemies.release_inactive(released);
    for handle in released.drain(..) {
        world.enemy_grid.remove(handle);
    }

    total += world.projectiles.release_inactive(released);
    for handle in released.drain(..) {
        world.projectile_grid.remove(handle);
    }

    total += world.xp_orbs.release_inactive(released);
    for handle in released.drain(..) {
        world.orb_grid.remove(handle);
    }

    total
}
