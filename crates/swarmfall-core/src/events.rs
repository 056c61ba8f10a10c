//! Events raised during a frame for presentation feedback (sounds, popups).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// An enemy's health reached zero.
    EnemyKilled {
        kind: EnemyKind,
        position: Vec2,
        xp_value: u32,
    },
    /// An enemy got through the invulnerability window.
    PlayerHit { damage: f32, remaining_health: f32 },
    /// An orb reached the player.
    OrbCollected { value: u32 },
    /// The player reached a new level.
    LevelUp { level: u32 },
    /// A wave ended and the next one began.
    WaveAdvanced { wave: u32, bonus: u64 },
    /// An unlock upgrade added a weapon.
    WeaponUnlocked { kind: WeaponKind },
    /// Player health reached zero.
    GameOver { score: u64, wave: u32 },
}
