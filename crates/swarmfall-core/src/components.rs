//! Entity records and the data they carry.
//!
//! Records are plain data with constructors. Game logic lives in the
//! simulation systems, not here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::balance::{PlayerTuning, WeaponStats};
use crate::enums::*;
use crate::types::Handle;

/// Owner id stamped on projectiles fired by the player.
pub const PLAYER_OWNER_ID: u32 = 0;

/// Shape shared by every simulated entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    pub active: bool,
}

/// Access to the shared body of an entity record.
///
/// `reset` must leave the record zeroed and inert; pools run it on every
/// release and forced reclamation.
pub trait Entity {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
    fn reset(&mut self);

    fn is_active(&self) -> bool {
        self.body().active
    }
}

macro_rules! impl_entity {
    ($ty:ty) => {
        impl Entity for $ty {
            fn body(&self) -> &Body {
                &self.body
            }

            fn body_mut(&mut self) -> &mut Body {
                &mut self.body
            }

            fn reset(&mut self) {
                *self = Self::default();
            }
        }
    };
}

/// The single player-controlled entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,
    pub weapons: Vec<Weapon>,
    pub upgrades: Vec<UpgradeRecord>,
    pub move_speed: f32,
    pub pickup_radius: f32,
    /// Sim time of the last enemy hit, anchoring the invulnerability window.
    pub last_hit_ms: Option<f64>,
}

impl_entity!(Player);

impl Player {
    /// Fresh level-1 player at `position` carrying the starting weapon.
    pub fn new(position: Vec2, tuning: &PlayerTuning, starting_weapon: Weapon) -> Self {
        Self {
            body: Body {
                position,
                velocity: Vec2::ZERO,
                radius: tuning.radius,
                health: tuning.max_health,
                max_health: tuning.max_health,
                damage: 0.0,
                speed: tuning.move_speed,
                active: true,
            },
            level: 1,
            experience: 0,
            experience_to_next: tuning.base_experience,
            weapons: vec![starting_weapon],
            upgrades: Vec::new(),
            move_speed: tuning.move_speed,
            pickup_radius: tuning.pickup_radius,
            last_hit_ms: None,
        }
    }

    pub fn owns_weapon(&self, kind: WeaponKind) -> bool {
        self.weapons.iter().any(|w| w.kind == kind)
    }

    /// Current level of an upgrade line, 0 if never taken.
    pub fn upgrade_level(&self, kind: UpgradeKind) -> u32 {
        self.upgrades
            .iter()
            .find(|r| r.kind == kind)
            .map_or(0, |r| r.level)
    }

    pub fn is_dead(&self) -> bool {
        self.body.health <= 0.0
    }
}

/// A hostile chaser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub kind: EnemyKind,
    pub xp_value: u32,
}

impl_entity!(Enemy);

/// A damaging projectile, including blade and aura instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Body,
    pub owner: u32,
    pub direction: Vec2,
    /// Milliseconds lived so far.
    pub lifetime_ms: f64,
    pub max_lifetime_ms: f64,
    /// Remaining enemies this projectile may damage.
    pub pierce: u32,
    pub weapon: WeaponKind,
    /// Stable angular slot for orbiting blades (radians).
    pub orbit_offset: f32,
    pub orbit_radius: f32,
    /// Enemies already struck by this instance.
    #[serde(skip)]
    pub struck: Vec<Handle>,
}

impl Entity for Projectile {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn reset(&mut self) {
        // Keep the struck list's allocation across reuse.
        let mut struck = std::mem::take(&mut self.struck);
        struck.clear();
        *self = Self {
            struck,
            ..Self::default()
        };
    }
}

impl Projectile {
    pub fn has_struck(&self, enemy: Handle) -> bool {
        self.struck.contains(&enemy)
    }
}

/// An experience pickup dropped by a kill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XpOrb {
    pub body: Body,
    pub value: u32,
    /// Set once in pickup reach; the orb then homes toward the player.
    pub is_being_collected: bool,
}

impl_entity!(XpOrb);

/// A weapon instance owned by the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub level: u32,
    pub damage: f32,
    /// Shots per second.
    pub fire_rate: f32,
    pub projectile_speed: f32,
    pub projectile_count: u32,
    pub pierce: u32,
    /// Area multiplier applied to projectile radius and orbit/aura size.
    pub area: f32,
    /// Sim time of the last shot, `None` before the first.
    pub last_fired_ms: Option<f64>,
}

impl Weapon {
    /// Base-stat, level-1 weapon of a kind.
    pub fn from_stats(kind: WeaponKind, stats: &WeaponStats) -> Self {
        Self {
            kind,
            level: 1,
            damage: stats.damage,
            fire_rate: stats.fire_rate,
            projectile_speed: stats.projectile_speed,
            projectile_count: stats.projectile_count,
            pierce: stats.pierce,
            area: stats.area,
            last_fired_ms: None,
        }
    }

    /// Minimum time between shots (ms).
    pub fn cooldown_ms(&self) -> f64 {
        if self.fire_rate <= 0.0 {
            f64::INFINITY
        } else {
            1000.0 / self.fire_rate as f64
        }
    }

    pub fn ready(&self, now_ms: f64) -> bool {
        match self.last_fired_ms {
            None => true,
            Some(last) => now_ms - last >= self.cooldown_ms(),
        }
    }
}

/// How an upgrade changes a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatChange {
    /// Multiply by `1 + pct`.
    Percent(f32),
    /// Add a flat amount.
    Flat(f32),
}

impl StatChange {
    pub fn apply(self, value: f32) -> f32 {
        match self {
            Self::Percent(pct) => value * (1.0 + pct),
            Self::Flat(amount) => value + amount,
        }
    }

    pub fn apply_count(self, value: u32) -> u32 {
        self.apply(value as f32).round().max(0.0) as u32
    }
}

/// Which of the player's weapons a weapon upgrade touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponTarget {
    All,
    Kind(WeaponKind),
}

impl WeaponTarget {
    pub fn matches(self, kind: WeaponKind) -> bool {
        match self {
            Self::All => true,
            Self::Kind(k) => k == kind,
        }
    }
}

/// What applying an upgrade does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UpgradeEffect {
    Weapons {
        stat: WeaponStat,
        change: StatChange,
        target: WeaponTarget,
    },
    Player {
        stat: PlayerStat,
        change: StatChange,
    },
    UnlockWeapon {
        kind: WeaponKind,
    },
}

/// A level-up offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub id: String,
    pub kind: UpgradeKind,
    pub name: String,
    pub description: String,
    /// Level the line reaches if this offer is taken.
    pub level: u32,
    pub max_level: u32,
    pub effect: UpgradeEffect,
}

/// One entry in the player's upgrade history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRecord {
    pub kind: UpgradeKind,
    pub level: u32,
}

/// Current wave and its spawn bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub number: u32,
    /// Enemies to spawn this wave.
    pub enemy_count: u32,
    /// Spawns per second.
    pub spawn_rate: f32,
    pub duration_ms: f64,
    pub start_ms: f64,
    pub spawned: u32,
    pub last_spawn_ms: Option<f64>,
}

impl Wave {
    pub fn spawn_interval_ms(&self) -> f64 {
        if self.spawn_rate <= 0.0 {
            f64::INFINITY
        } else {
            1000.0 / self.spawn_rate as f64
        }
    }

    pub fn is_over(&self, now_ms: f64) -> bool {
        now_ms - self.start_ms >= self.duration_ms
    }
}
