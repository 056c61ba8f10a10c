//! Input state maintained by the host's input-capture collaborator.
//!
//! The engine only reads this once per frame; it never captures devices.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::{Key, PointerButton};
use crate::math::normalize_or_zero;

/// Keys and pointer state held down at the start of a frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    pub keys: HashSet<Key>,
    /// Pointer position in world units.
    pub pointer: Vec2,
    pub buttons: HashSet<PointerButton>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for hosts and tests.
    pub fn with_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn press(&mut self, key: Key) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Unit movement direction from the held movement keys.
    /// Opposite keys cancel; diagonals are normalised.
    pub fn movement(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.is_down(Key::Up) {
            dir.y -= 1.0;
        }
        if self.is_down(Key::Down) {
            dir.y += 1.0;
        }
        if self.is_down(Key::Left) {
            dir.x -= 1.0;
        }
        if self.is_down(Key::Right) {
            dir.x += 1.0;
        }
        normalize_or_zero(dir)
    }
}
