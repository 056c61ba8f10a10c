//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Enemy archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline chaser.
    #[default]
    Basic,
    /// Fragile, quick.
    Fast,
    /// Slow, heavy, hits hard.
    Tank,
    /// One per boss wave.
    Boss,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [Self::Basic, Self::Fast, Self::Tank, Self::Boss];
}

/// Weapon archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Bullet,
    Fireball,
    Lightning,
    /// Orbits the player.
    Blade,
    /// Damaging field centred on the player.
    Aura,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 5] = [
        Self::Bullet,
        Self::Fireball,
        Self::Lightning,
        Self::Blade,
        Self::Aura,
    ];

    /// Weapons that fire at a target enemy.
    pub fn is_directed(self) -> bool {
        matches!(self, Self::Bullet | Self::Fireball | Self::Lightning)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::Fireball => "fireball",
            Self::Lightning => "lightning",
            Self::Blade => "blade",
            Self::Aura => "aura",
        }
    }
}

/// Weapon attribute touched by an upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponStat {
    Damage,
    FireRate,
    ProjectileSpeed,
    ProjectileCount,
    Pierce,
    Area,
}

/// Player attribute touched by an upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStat {
    MoveSpeed,
    MaxHealth,
    PickupRadius,
}

/// Stat upgrade families offered on level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatUpgrade {
    Damage,
    FireRate,
    ProjectileSpeed,
    ProjectileCount,
    Pierce,
    Area,
    MoveSpeed,
    MaxHealth,
    PickupRadius,
}

impl StatUpgrade {
    pub const ALL: [StatUpgrade; 9] = [
        Self::Damage,
        Self::FireRate,
        Self::ProjectileSpeed,
        Self::ProjectileCount,
        Self::Pierce,
        Self::Area,
        Self::MoveSpeed,
        Self::MaxHealth,
        Self::PickupRadius,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Damage => "damage",
            Self::FireRate => "fire_rate",
            Self::ProjectileSpeed => "projectile_speed",
            Self::ProjectileCount => "projectile_count",
            Self::Pierce => "pierce",
            Self::Area => "area",
            Self::MoveSpeed => "move_speed",
            Self::MaxHealth => "max_health",
            Self::PickupRadius => "pickup_radius",
        }
    }
}

/// Identity of an upgrade line in the player's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum UpgradeKind {
    Stat(StatUpgrade),
    UnlockWeapon(WeaponKind),
}

impl UpgradeKind {
    /// Stable id used by the menu layer to pick an offer.
    pub fn id(self) -> String {
        match self {
            Self::Stat(stat) => stat.as_str().to_string(),
            Self::UnlockWeapon(kind) => format!("unlock_{}", kind.as_str()),
        }
    }
}

/// Keys the engine reacts to. Mapping physical keys onto these is the
/// input collaborator's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Pause,
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}
