//! Simulation constants that are not part of the balance table.

// --- Frame timing ---

/// Largest simulated step for one frame (ms). Longer host gaps are clamped.
pub const MAX_FRAME_MS: f64 = 100.0;

/// Smoothing factor for the exponential fps average.
pub const FPS_SMOOTHING: f64 = 0.1;

// --- World ---

/// Default world width in world units.
pub const WORLD_WIDTH: f32 = 2400.0;

/// Default world height in world units.
pub const WORLD_HEIGHT: f32 = 2400.0;

/// Spatial grid cell edge length.
pub const GRID_CELL_SIZE: f32 = 100.0;

/// Projectiles this far outside the world are retired.
pub const PROJECTILE_OOB_MARGIN: f32 = 50.0;

// --- Pools ---

pub const ENEMY_POOL_INITIAL: usize = 100;
pub const ENEMY_POOL_MAX: usize = 500;
pub const PROJECTILE_POOL_INITIAL: usize = 200;
pub const PROJECTILE_POOL_MAX: usize = 1000;
pub const ORB_POOL_INITIAL: usize = 100;
pub const ORB_POOL_MAX: usize = 500;

// --- Collision ---

/// Minimum time between two enemy hits on the player (ms).
pub const INVULNERABILITY_MS: f64 = 1000.0;

/// Extra reach added to the player radius when querying for contact enemies.
pub const PLAYER_CONTACT_PADDING: f32 = 50.0;

/// Distance an enemy is shoved away after hitting the player.
pub const KNOCKBACK_DISTANCE: f32 = 30.0;

/// Score multiplier applied to an enemy's xp value on kill.
pub const KILL_SCORE_PER_XP: u64 = 10;

/// Totals at or above this split into three orbs.
pub const ORB_SPLIT_THREE_AT: u32 = 20;

/// Totals at or above this split into two orbs.
pub const ORB_SPLIT_TWO_AT: u32 = 10;

/// Maximum per-axis jitter for orbs dropped on a kill.
pub const ORB_JITTER: f32 = 10.0;

// --- Pickups ---

pub const ORB_RADIUS: f32 = 6.0;

/// Homing speed of an orb being collected (units/s).
pub const ORB_COLLECT_SPEED: f32 = 400.0;

// --- Spawning ---

/// Ring radius around the player on which enemies appear.
pub const SPAWN_RING_RADIUS: f32 = 600.0;

/// Keep spawns this far inside the world edge.
pub const SPAWN_MARGIN: f32 = 50.0;

/// Every Nth wave opens with a boss.
pub const BOSS_WAVE_INTERVAL: u32 = 5;

// --- Weapons ---

/// Angular gap between simultaneous directed projectiles (radians).
pub const PROJECTILE_SPREAD: f32 = 0.15;

/// Base orbit radius for blades before the area multiplier.
pub const BLADE_ORBIT_RADIUS: f32 = 80.0;

/// Blade orbit angular speed (radians per second).
pub const BLADE_ANGULAR_SPEED: f32 = 3.0;

// --- Experience ---

/// Fraction of max health restored on each level-up.
pub const LEVEL_UP_HEAL_FRACTION: f32 = 0.2;

/// Score bonus per level reached.
pub const LEVEL_SCORE_BONUS: u64 = 50;

/// Upgrade offers shown per level-up.
pub const UPGRADE_CHOICES: usize = 3;
