//! SWARMFALL headless host.
//!
//! Wires the simulation engine to a virtual frame clock and an autopilot
//! so runs can be played, logged, and summarised without a display.

pub mod game_loop;
pub mod state;

pub use swarmfall_core as core;
