//! # Spellclash Duel Engine
//!
//! Deterministic per-player state-transition engine for a turn-based
//! two-player spell duel.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SPELLCLASH ENGINE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── hash.rs     - SHA-256 state hashing & identifier space  │
//! │  └── rng.rs      - Rolling-seed randomness chain             │
//! │                                                              │
//! │  game/           - Transition engine (deterministic)         │
//! │  ├── state.rs    - Fixed-shape player state & slot arrays    │
//! │  ├── spell.rs    - Spell registry & cast resolution          │
//! │  ├── effect.rs   - Effect registry & three-queue lifecycle   │
//! │  ├── damage.rs   - Hit/miss and damage magnitude             │
//! │  └── round.rs    - Authoritative round driver                │
//! │                                                              │
//! │  trusted/        - Boundary adapter                          │
//! │  └── mod.rs      - Action decoding, commitment signing       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The entire crate is **100% deterministic**:
//! - No floating-point arithmetic; integer percentages truncate
//! - No HashMap (registries use BTreeMap)
//! - No system time dependencies
//! - All randomness from the rolling SHA-256 seed chain
//!
//! Given an identical starting state, identical seed, and an identical
//! ordered cast batch, the round driver produces **bit-identical**
//! commitments on every independent participant's copy.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod trusted;

// Re-export commonly used types
pub use crate::core::hash::{StateHash, StateHasher};
pub use crate::core::rng::Seed;
pub use game::error::EngineError;
pub use game::round::{run_round, RoundOutput};
pub use game::spell::{SpellCast, SpellPayload};
pub use game::state::{
    CharacterClass, Coord, EffectId, EffectQueue, EffectSlot, PlayerId, PlayerState, SpellId,
    SpellSlot, MAX_EFFECT_SLOTS, MAX_SPELL_SLOTS,
};
pub use trusted::{generate_trusted_state, Action, Signature, Signer, TrustedState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
