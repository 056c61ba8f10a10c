//! Game state snapshot: everything the presentation layer needs for one frame.

use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::events::GameEvent;
use crate::types::{Handle, SimClock};

/// Complete world view handed to the presenter after each frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub clock: SimClock,
    pub player: Player,
    pub enemies: Vec<EntityView<Enemy>>,
    pub projectiles: Vec<EntityView<Projectile>>,
    pub xp_orbs: Vec<EntityView<XpOrb>>,
    pub wave: Wave,
    pub is_paused: bool,
    pub is_game_over: bool,
    pub score: u64,
    /// Simulated time of this run (ms).
    pub elapsed_ms: f64,
    pub kill_count: u32,
    pub level_up: LevelUpView,
    pub metrics: PerformanceMetrics,
    pub pools: PoolsView,
    /// Events raised by the frame that produced this snapshot.
    pub events: Vec<GameEvent>,
}

/// A live entity and the handle that names it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityView<T> {
    pub handle: Handle,
    pub entity: T,
}

/// Level-up offers awaiting a choice from the menu layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelUpView {
    pub pending: u32,
    pub choices: Vec<Upgrade>,
}

/// Frame cost and throughput.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Smoothed frames per second from host frame spacing.
    pub fps: f64,
    /// Host time between the last two frames (ms, unclamped).
    pub frame_time_ms: f64,
    /// Wall time spent in the last update body (ms).
    pub update_ms: f64,
    /// Live enemies + projectiles + orbs.
    pub entity_count: usize,
}

/// Occupancy of one object pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Slots ever constructed.
    pub total: usize,
    pub active: usize,
    pub free: usize,
    pub max_size: usize,
    /// Active instances forcibly taken back to satisfy an acquire.
    pub reclaimed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolsView {
    pub enemies: PoolStats,
    pub projectiles: PoolStats,
    pub xp_orbs: PoolStats,
}
