//! Fundamental identity, time, and world-extent types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Generation-checked reference to a pool slot.
///
/// A handle stays valid only while the slot it names keeps the same
/// generation. Releasing or reclaiming the slot bumps the generation,
/// so stale handles are rejected instead of aliasing a reissued entity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Handle {
    pub index: u32,
    pub generation: u32,
}

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}g{}", self.index, self.generation)
    }
}

/// Simulation clock. Advanced only by the engine's update body, never by
/// host time, so pausing freezes every timer in the game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Number of simulated frames.
    pub frame: u64,
    /// Simulated milliseconds since the run started.
    pub now_ms: f64,
    /// Duration of the last simulated step in milliseconds.
    pub dt_ms: f64,
}

impl SimClock {
    /// Advance by one frame of `dt_ms` milliseconds.
    pub fn advance(&mut self, dt_ms: f64) {
        self.frame += 1;
        self.dt_ms = dt_ms;
        self.now_ms += dt_ms;
    }

    /// Last step in seconds, for kinematics.
    pub fn dt_secs(&self) -> f32 {
        (self.dt_ms / 1000.0) as f32
    }
}

/// Axis-aligned world rectangle anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: crate::constants::WORLD_WIDTH,
            height: crate::constants::WORLD_HEIGHT,
        }
    }
}

impl WorldBounds {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Clamp a point into the rectangle shrunk by `margin` on every side.
    pub fn clamp(&self, point: Vec2, margin: f32) -> Vec2 {
        let margin_x = margin.min(self.width * 0.5);
        let margin_y = margin.min(self.height * 0.5);
        Vec2::new(
            point.x.clamp(margin_x, self.width - margin_x),
            point.y.clamp(margin_y, self.height - margin_y),
        )
    }

    /// Whether a point lies inside the rectangle grown by `margin`.
    pub fn contains(&self, point: Vec2, margin: f32) -> bool {
        point.x >= -margin
            && point.y >= -margin
            && point.x <= self.width + margin
            && point.y <= self.height + margin
    }
}
