//! Trusted-State Boundary
//!
//! Thin adapter over the round driver: decodes an external action batch
//! via each spell's declared payload schema, runs the round, and packages
//! the output with a signature over the commitment.
//!
//! Signing and verification belong to the external credential subsystem;
//! the engine only sees the opaque [`Signer`] capability.

use serde::{Serialize, Deserialize};

use crate::core::hash::{hash_with_domain, StateHash};
use crate::game::error::EngineError;
use crate::game::round::run_round;
use crate::game::spell::{self, PayloadSchema, SpellCast, SpellPayload};
use crate::game::state::{Coord, PlayerId, PlayerState, SpellId};

/// One external action: a declared cast with an opaque payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Player declaring the cast.
    pub caster: PlayerId,
    /// Player the cast is aimed at.
    pub target: PlayerId,
    /// Spell identifier.
    pub spell: SpellId,
    /// Opaque payload, decoded via the spell's declared schema.
    pub payload: Vec<u8>,
}

/// Opaque signature bytes produced by the external credential subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

/// External signing capability.
pub trait Signer {
    /// Sign a state commitment.
    fn sign(&self, commitment: &StateHash) -> Signature;
}

/// Per-round output packaged for the counterparty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedState {
    /// Whose round this is.
    pub player: PlayerId,
    /// Commitment over the full private state.
    pub commitment: StateHash,
    /// Canonically encoded public view.
    pub public_state: Vec<u8>,
    /// Signature over the commitment.
    pub signature: Signature,
}

/// Decode one action's payload via its spell's declared schema.
///
/// An unregistered spell id decodes to an empty payload: whether that id
/// is fatal depends on who the cast targets, which is the round driver's
/// call to make.
pub fn decode_action(action: &Action) -> Result<SpellCast, EngineError> {
    let payload = match spell::lookup(action.spell).map(|def| def.schema) {
        None | Some(PayloadSchema::None) => {
            if !action.payload.is_empty() {
                return Err(EngineError::BadPayload {
                    spell: action.spell,
                    reason: "expected an empty payload".into(),
                });
            }
            SpellPayload::None
        }
        Some(PayloadSchema::Coord) => {
            let coord: Coord = bincode::deserialize(&action.payload).map_err(|e| {
                EngineError::BadPayload { spell: action.spell, reason: e.to_string() }
            })?;
            SpellPayload::Coord(coord)
        }
        Some(PayloadSchema::Power) => {
            let power: i32 = bincode::deserialize(&action.payload).map_err(|e| {
                EngineError::BadPayload { spell: action.spell, reason: e.to_string() }
            })?;
            SpellPayload::Power(power)
        }
    };

    Ok(SpellCast {
        caster: action.caster,
        target: action.target,
        spell: action.spell,
        payload,
    })
}

/// Decode an action batch, run one round, and package the signed output.
pub fn generate_trusted_state(
    state: &mut PlayerState,
    actions: &[Action],
    opponent: &PlayerState,
    signer: &dyn Signer,
) -> Result<TrustedState, EngineError> {
    let casts = actions
        .iter()
        .map(decode_action)
        .collect::<Result<Vec<_>, _>>()?;

    let output = run_round(state, &casts, opponent)?;

    let public_state = bincode::serialize(&output.public_view)
        .map_err(|e| EngineError::Codec(e.to_string()))?;
    let signature = signer.sign(&output.commitment);

    Ok(TrustedState {
        player: state.id,
        commitment: output.commitment,
        public_state,
        signature,
    })
}

// =============================================================================
// REFERENCE SIGNER
// =============================================================================

/// Keyed hash signer for demos and tests.
///
/// Production deployments plug in the real credential subsystem; this
/// stand-in only exists so the boundary can be exercised end to end.
pub struct KeyedSigner {
    key: [u8; 32],
}

impl KeyedSigner {
    /// Create a signer from a raw key.
    pub const fn new(key: [u8; 32]) -> Self {
        Self { key }
    }
}

impl Signer for KeyedSigner {
    fn sign(&self, commitment: &StateHash) -> Signature {
        let mut data = Vec::with_capacity(64);
        data.extend_from_slice(&self.key);
        data.extend_from_slice(commitment);
        Signature(hash_with_domain(b"SPELLCLASH_SIG_V1", &data).to_vec())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::spell::spell_id;
    use crate::game::state::CharacterClass;

    fn duelists() -> (PlayerState, PlayerState) {
        let a = PlayerState::new(PlayerId::new([1; 16]), CharacterClass::Arcanist, &[3; 16]);
        let b = PlayerState::new(PlayerId::new([2; 16]), CharacterClass::Vanguard, &[3; 16]);
        (a, b)
    }

    #[test]
    fn test_decode_coord_payload() {
        let (a, _) = duelists();
        let action = Action {
            caster: a.id,
            target: a.id,
            spell: spell_id("blink"),
            payload: bincode::serialize(&Coord::new(3, 4)).unwrap(),
        };

        let cast = decode_action(&action).unwrap();
        assert_eq!(cast.payload, SpellPayload::Coord(Coord::new(3, 4)));
    }

    #[test]
    fn test_decode_rejects_garbage_coord() {
        let (a, _) = duelists();
        let action = Action {
            caster: a.id,
            target: a.id,
            spell: spell_id("blink"),
            payload: vec![1],
        };

        assert!(matches!(
            decode_action(&action),
            Err(EngineError::BadPayload { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_unexpected_payload() {
        let (a, b) = duelists();
        let action = Action {
            caster: a.id,
            target: b.id,
            spell: spell_id("strike"),
            payload: vec![0, 1, 2],
        };

        assert!(matches!(
            decode_action(&action),
            Err(EngineError::BadPayload { .. })
        ));
    }

    #[test]
    fn test_unknown_spell_deferred_to_driver() {
        let (a, b) = duelists();
        // Decoding tolerates the unknown id; the driver rejects it because
        // the cast targets the resolving player.
        let action = Action {
            caster: b.id,
            target: a.id,
            spell: SpellId(0xBAD0_0003),
            payload: vec![],
        };
        let cast = decode_action(&action).unwrap();
        assert_eq!(cast.payload, SpellPayload::None);

        let mut state = a.clone();
        let signer = KeyedSigner::new([0; 32]);
        assert_eq!(
            generate_trusted_state(&mut state, &[action], &b, &signer),
            Err(EngineError::UnknownSpell(SpellId(0xBAD0_0003)))
        );
    }

    #[test]
    fn test_trusted_state_package() {
        let (mut a, b) = duelists();
        let signer = KeyedSigner::new([7; 32]);
        let action = Action {
            caster: b.id,
            target: a.id,
            spell: spell_id("strike"),
            payload: vec![],
        };

        let trusted = generate_trusted_state(&mut a, &[action], &b, &signer).unwrap();

        assert_eq!(trusted.player, a.id);
        assert_eq!(trusted.commitment, a.commitment());

        let view: PlayerState = bincode::deserialize(&trusted.public_state).unwrap();
        assert_eq!(view.stats.hp, 80, "strike resolved before packaging");
        assert_eq!(view.credential.0, [0; 32]);

        // Signature is deterministic for the same key and commitment.
        assert_eq!(trusted.signature, signer.sign(&trusted.commitment));
    }

    #[test]
    fn test_counterparty_reconstructs_view_bit_for_bit() {
        let (mut a, b) = duelists();
        let signer = KeyedSigner::new([1; 32]);
        let trusted = generate_trusted_state(&mut a, &[], &b, &signer).unwrap();

        let view: PlayerState = bincode::deserialize(&trusted.public_state).unwrap();
        let re_encoded = bincode::serialize(&view).unwrap();
        assert_eq!(re_encoded, trusted.public_state);
    }
}
