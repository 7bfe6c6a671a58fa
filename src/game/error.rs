//! Engine Errors
//!
//! Fatal conditions are protocol violations: they signal a registry or
//! version desync between participants and must propagate to the caller,
//! never be swallowed inside the core.

use crate::game::state::{SpellId, EffectId};

/// Errors produced by the round engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// All spell slots are occupied.
    #[error("spell slots full")]
    SpellSlotsFull,

    /// A cast referenced a spell id missing from the registry.
    #[error("unknown spell id {0:?}")]
    UnknownSpell(SpellId),

    /// A queued effect id is missing from the registry.
    #[error("unknown effect id {0:?}")]
    UnknownEffect(EffectId),

    /// A cast payload did not match the spell's declared schema.
    #[error("malformed payload for spell {spell:?}: {reason}")]
    BadPayload {
        /// Spell whose schema the payload failed to satisfy.
        spell: SpellId,
        /// Decoder failure description.
        reason: String,
    },

    /// Wire encoding or decoding failed.
    #[error("codec failure: {0}")]
    Codec(String),
}
