//! Systems that operate on the simulation world each frame.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only).
//! The experience system is the exception: it owns the pending level-up
//! count and the offers on the table.

pub mod cleanup;
pub mod collision;
pub mod experience;
pub mod movement;
pub mod snapshot;
pub mod wave_spawner;
pub mod weapons;
