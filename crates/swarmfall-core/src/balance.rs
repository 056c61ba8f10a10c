//! Static balance table: per-kind stats and progression constants.
//!
//! The table is injected into the engine read-only. `Default` carries the
//! shipped tuning; hosts can override it from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{StatChange, UpgradeEffect, WeaponTarget};
use crate::enums::*;

/// Errors raised while loading or validating a balance table.
#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("balance table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid balance value `{field}`: {reason}")]
    Invalid { field: String, reason: &'static str },
}

/// Stats for one enemy kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
    pub radius: f32,
    pub xp_value: u32,
}

/// Base stats for one weapon kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub damage: f32,
    /// Shots per second.
    pub fire_rate: f32,
    pub projectile_speed: f32,
    pub projectile_count: u32,
    pub pierce: u32,
    pub area: f32,
    /// Projectile lifetime (ms).
    pub lifetime_ms: f64,
    /// Projectile radius before the area multiplier.
    pub radius: f32,
}

/// Magnitude and cap for one upgrade line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeStats {
    pub value: f32,
    pub max_level: u32,
}

/// Wave progression constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveTuning {
    pub base_enemy_count: u32,
    pub enemies_per_wave: u32,
    /// Spawns per second on wave 1.
    pub base_spawn_rate: f32,
    pub spawn_rate_per_wave: f32,
    pub max_spawn_rate: f32,
    pub duration_ms: f64,
    /// Completion bonus is this times the finished wave's number.
    pub completion_bonus: u64,
    /// Enemy health grows by this fraction per wave after the first.
    pub health_scale_per_wave: f32,
}

/// Player starting values and the experience curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTuning {
    pub radius: f32,
    pub max_health: f32,
    pub move_speed: f32,
    pub pickup_radius: f32,
    /// Experience needed for level 2.
    pub base_experience: u32,
    /// Growth factor of the experience curve.
    pub experience_multiplier: f32,
    pub starting_weapon: WeaponKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyTable {
    pub basic: EnemyStats,
    pub fast: EnemyStats,
    pub tank: EnemyStats,
    pub boss: EnemyStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponTable {
    pub bullet: WeaponStats,
    pub fireball: WeaponStats,
    pub lightning: WeaponStats,
    pub blade: WeaponStats,
    pub aura: WeaponStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTable {
    pub damage: UpgradeStats,
    pub fire_rate: UpgradeStats,
    pub projectile_speed: UpgradeStats,
    pub projectile_count: UpgradeStats,
    pub pierce: UpgradeStats,
    pub area: UpgradeStats,
    pub move_speed: UpgradeStats,
    pub max_health: UpgradeStats,
    pub pickup_radius: UpgradeStats,
}

/// The full balance table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceTable {
    pub player: PlayerTuning,
    pub wave: WaveTuning,
    pub enemies: EnemyTable,
    pub weapons: WeaponTable,
    pub upgrades: UpgradeTable,
}

impl Default for BalanceTable {
    fn default() -> Self {
        Self {
            player: PlayerTuning {
                radius: 16.0,
                max_health: 100.0,
                move_speed: 200.0,
                pickup_radius: 50.0,
                base_experience: 100,
                experience_multiplier: 1.5,
                starting_weapon: WeaponKind::Bullet,
            },
            wave: WaveTuning {
                base_enemy_count: 10,
                enemies_per_wave: 5,
                base_spawn_rate: 1.0,
                spawn_rate_per_wave: 0.3,
                max_spawn_rate: 10.0,
                duration_ms: 30_000.0,
                completion_bonus: 100,
                health_scale_per_wave: 0.1,
            },
            enemies: EnemyTable {
                basic: EnemyStats { health: 20.0, damage: 10.0, speed: 80.0, radius: 12.0, xp_value: 5 },
                fast: EnemyStats { health: 12.0, damage: 8.0, speed: 150.0, radius: 10.0, xp_value: 7 },
                tank: EnemyStats { health: 80.0, damage: 20.0, speed: 50.0, radius: 20.0, xp_value: 15 },
                boss: EnemyStats { health: 500.0, damage: 35.0, speed: 60.0, radius: 40.0, xp_value: 100 },
            },
            weapons: WeaponTable {
                bullet: WeaponStats {
                    damage: 10.0,
                    fire_rate: 2.0,
                    projectile_speed: 500.0,
                    projectile_count: 1,
                    pierce: 1,
                    area: 1.0,
                    lifetime_ms: 2000.0,
                    radius: 5.0,
                },
                fireball: WeaponStats {
                    damage: 25.0,
                    fire_rate: 0.8,
                    projectile_speed: 300.0,
                    projectile_count: 1,
                    pierce: 3,
                    area: 1.0,
                    lifetime_ms: 3000.0,
                    radius: 10.0,
                },
                lightning: WeaponStats {
                    damage: 15.0,
                    fire_rate: 1.5,
                    projectile_speed: 900.0,
                    projectile_count: 1,
                    pierce: 2,
                    area: 1.0,
                    lifetime_ms: 1000.0,
                    radius: 4.0,
                },
                blade: WeaponStats {
                    damage: 8.0,
                    fire_rate: 10.0,
                    projectile_speed: 0.0,
                    projectile_count: 2,
                    pierce: 3,
                    area: 1.0,
                    lifetime_ms: 120.0,
                    radius: 12.0,
                },
                aura: WeaponStats {
                    damage: 3.0,
                    fire_rate: 5.0,
                    projectile_speed: 0.0,
                    projectile_count: 1,
                    pierce: 999,
                    area: 1.0,
                    lifetime_ms: 220.0,
                    radius: 70.0,
                },
            },
            upgrades: UpgradeTable {
                damage: UpgradeStats { value: 0.2, max_level: 5 },
                fire_rate: UpgradeStats { value: 0.15, max_level: 5 },
                projectile_speed: UpgradeStats { value: 0.2, max_level: 3 },
                projectile_count: UpgradeStats { value: 1.0, max_level: 3 },
                pierce: UpgradeStats { value: 1.0, max_level: 3 },
                area: UpgradeStats { value: 0.2, max_level: 5 },
                move_speed: UpgradeStats { value: 0.1, max_level: 5 },
                max_health: UpgradeStats { value: 20.0, max_level: 5 },
                pickup_radius: UpgradeStats { value: 0.25, max_level: 3 },
            },
        }
    }
}

impl BalanceTable {
    /// Parse and validate a table from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, BalanceError> {
        let table: BalanceTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn enemy(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Basic => &self.enemies.basic,
            EnemyKind::Fast => &self.enemies.fast,
            EnemyKind::Tank => &self.enemies.tank,
            EnemyKind::Boss => &self.enemies.boss,
        }
    }

    pub fn weapon(&self, kind: WeaponKind) -> &WeaponStats {
        match kind {
            WeaponKind::Bullet => &self.weapons.bullet,
            WeaponKind::Fireball => &self.weapons.fireball,
            WeaponKind::Lightning => &self.weapons.lightning,
            WeaponKind::Blade => &self.weapons.blade,
            WeaponKind::Aura => &self.weapons.aura,
        }
    }

    pub fn upgrade(&self, stat: StatUpgrade) -> &UpgradeStats {
        match stat {
            StatUpgrade::Damage => &self.upgrades.damage,
            StatUpgrade::FireRate => &self.upgrades.fire_rate,
            StatUpgrade::ProjectileSpeed => &self.upgrades.projectile_speed,
            StatUpgrade::ProjectileCount => &self.upgrades.projectile_count,
            StatUpgrade::Pierce => &self.upgrades.pierce,
            StatUpgrade::Area => &self.upgrades.area,
            StatUpgrade::MoveSpeed => &self.upgrades.move_speed,
            StatUpgrade::MaxHealth => &self.upgrades.max_health,
            StatUpgrade::PickupRadius => &self.upgrades.pickup_radius,
        }
    }

    /// Effect of taking one level of a stat upgrade.
    ///
    /// Counts and max health are flat; everything else is a percentage.
    pub fn upgrade_effect(&self, stat: StatUpgrade) -> UpgradeEffect {
        let value = self.upgrade(stat).value;
        let weapons = |stat, change| UpgradeEffect::Weapons {
            stat,
            change,
            target: WeaponTarget::All,
        };
        match stat {
            StatUpgrade::Damage => weapons(WeaponStat::Damage, StatChange::Percent(value)),
            StatUpgrade::FireRate => weapons(WeaponStat::FireRate, StatChange::Percent(value)),
            StatUpgrade::ProjectileSpeed => {
                weapons(WeaponStat::ProjectileSpeed, StatChange::Percent(value))
            }
            StatUpgrade::ProjectileCount => {
                weapons(WeaponStat::ProjectileCount, StatChange::Flat(value))
            }
            StatUpgrade::Pierce => weapons(WeaponStat::Pierce, StatChange::Flat(value)),
            StatUpgrade::Area => weapons(WeaponStat::Area, StatChange::Percent(value)),
            StatUpgrade::MoveSpeed => UpgradeEffect::Player {
                stat: PlayerStat::MoveSpeed,
                change: StatChange::Percent(value),
            },
            StatUpgrade::MaxHealth => UpgradeEffect::Player {
                stat: PlayerStat::MaxHealth,
                change: StatChange::Flat(value),
            },
            StatUpgrade::PickupRadius => UpgradeEffect::Player {
                stat: PlayerStat::PickupRadius,
                change: StatChange::Percent(value),
            },
        }
    }

    /// Reject tables the simulation cannot run with.
    pub fn validate(&self) -> Result<(), BalanceError> {
        positive("player.radius", self.player.radius)?;
        positive("player.max_health", self.player.max_health)?;
        positive("player.move_speed", self.player.move_speed)?;
        if self.player.base_experience == 0 {
            return Err(invalid("player.base_experience", "must be at least 1"));
        }
        if self.player.experience_multiplier < 1.0 {
            return Err(invalid("player.experience_multiplier", "must be >= 1.0"));
        }

        positive("wave.base_spawn_rate", self.wave.base_spawn_rate)?;
        positive("wave.max_spawn_rate", self.wave.max_spawn_rate)?;
        positive("wave.duration_ms", self.wave.duration_ms as f32)?;

        for kind in EnemyKind::ALL {
            let stats = self.enemy(kind);
            positive(&format!("enemies.{kind:?}.health"), stats.health)?;
            positive(&format!("enemies.{kind:?}.radius"), stats.radius)?;
        }
        for kind in WeaponKind::ALL {
            let stats = self.weapon(kind);
            positive(&format!("weapons.{}.fire_rate", kind.as_str()), stats.fire_rate)?;
            positive(&format!("weapons.{}.radius", kind.as_str()), stats.radius)?;
            positive(&format!("weapons.{}.lifetime_ms", kind.as_str()), stats.lifetime_ms as f32)?;
            if stats.projectile_count == 0 {
                return Err(invalid(
                    &format!("weapons.{}.projectile_count", kind.as_str()),
                    "must be at least 1",
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &'static str) -> BalanceError {
    BalanceError::Invalid {
        field: field.to_string(),
        reason,
    }
}

fn positive(field: &str, value: f32) -> Result<(), BalanceError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a positive finite number"))
    }
}
