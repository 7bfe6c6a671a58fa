//! Deterministic primitives shared across the engine.
//!
//! Everything in this module is pure and platform-independent:
//! SHA-256 state hashing and the rolling-seed randomness chain.

pub mod hash;
pub mod rng;
