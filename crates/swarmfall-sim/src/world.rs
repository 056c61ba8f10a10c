//! Mutable world state shared by the systems.

use swarmfall_core::balance::BalanceTable;
use swarmfall_core::components::{Enemy, Player, Projectile, Wave, Weapon, XpOrb};
use swarmfall_core::events::GameEvent;
use swarmfall_core::types::WorldBounds;

use crate::engine::EngineConfig;
use crate::pool::Pool;
use crate::spatial::SpatialGrid;
use crate::systems::wave_spawner;

/// Player, entity pools, broad-phase grids, and run counters.
pub struct World {
    pub bounds: WorldBounds,
    pub player: Player,
    pub enemies: Pool<Enemy>,
    pub projectiles: Pool<Projectile>,
    pub xp_orbs: Pool<XpOrb>,
    pub enemy_grid: SpatialGrid,
    pub projectile_grid: SpatialGrid,
    pub orb_grid: SpatialGrid,
    pub wave: Wave,
    pub score: u64,
    pub kill_count: u32,
    pub is_paused: bool,
    pub is_game_over: bool,
    /// Events raised since the last snapshot.
    pub events: Vec<GameEvent>,
}

impl World {
    /// Fresh run: player centred with the starting weapon, wave 1 at t=0.
    pub fn new(config: &EngineConfig) -> Self {
        let balance = &config.balance;
        let bounds = config.world.bounds;
        let cell_size = config.world.cell_size;
        let pools = &config.pools;
        Self {
            bounds,
            player: new_player(balance, bounds),
            enemies: Pool::new("enemy", pools.enemies.initial, pools.enemies.max),
            projectiles: Pool::new(
                "projectile",
                pools.projectiles.initial,
                pools.projectiles.max,
            ),
            xp_orbs: Pool::new("xp_orb", pools.xp_orbs.initial, pools.xp_orbs.max),
            enemy_grid: SpatialGrid::new(bounds, cell_size),
            projectile_grid: SpatialGrid::new(bounds, cell_size),
            orb_grid: SpatialGrid::new(bounds, cell_size),
            wave: wave_spawner::wave_for(1, &balance.wave, 0.0),
            score: 0,
            kill_count: 0,
            is_paused: false,
            is_game_over: false,
            events: Vec::new(),
        }
    }

    /// Live enemies, projectiles, and orbs.
    pub fn entity_count(&self) -> usize {
        self.enemies.active_count() + self.projectiles.active_count() + self.xp_orbs.active_count()
    }
}

fn new_player(balance: &BalanceTable, bounds: WorldBounds) -> Player {
    let kind = balance.player.starting_weapon;
    let weapon = Weapon::from_stats(kind, balance.weapon(kind));
    Player::new(bounds.center(), &balance.player, weapon)
}
