//! Simulation engine for SWARMFALL.
//!
//! Owns the pooled entity world, runs the systems once per host frame,
//! and produces `GameState`s for the presentation layer. Completely
//! headless, enabling deterministic testing.

pub mod engine;
pub mod error;
pub mod host;
pub mod pool;
pub mod spatial;
pub mod systems;
pub mod world;

pub use engine::{Engine, EngineConfig};
pub use error::EngineError;
pub use host::{FrameHandle, FrameScheduler, NullPresenter, Presenter};
pub use swarmfall_core as core;

#[cfg(test)]
mod tests;
