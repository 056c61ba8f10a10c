//! Core types and definitions for the SWARMFALL simulation.
//!
//! This crate defines the vocabulary shared across the other crates:
//! entity records, balance data, input, snapshots, events, and constants.
//! It has no dependency on any runtime or presentation framework.

pub mod balance;
pub mod components;
pub mod constants;
pub mod enums;
pub mod events;
pub mod input;
pub mod math;
pub mod state;
pub mod types;

pub use glam::Vec2;
