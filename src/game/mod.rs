//! Game logic (deterministic).
//!
//! The per-player transition engine: state container, spell and effect
//! registries, damage, and the round driver that sequences them.

pub mod damage;
pub mod effect;
pub mod error;
pub mod round;
pub mod spell;
pub mod state;
