//! Authoritative Round Driver
//!
//! The single entry point that advances a player's state by exactly one
//! round. No other code path mutates private state outside what this
//! function invokes.
//!
//! # Determinism
//!
//! Given an identical starting state, identical seed, and an identical
//! ordered cast batch, every independent participant computes a
//! bit-identical commitment. The driver therefore:
//! - folds the seed forward from the batch before drawing any randomness
//! - orders casts by a fixed rule (descending priority, stable)
//! - walks the effect queues in index order

use tracing::debug;

use crate::core::hash::StateHash;
use crate::game::effect::{
    apply_end_of_round_effects, apply_on_end_effects, apply_public_effects,
};
use crate::game::error::EngineError;
use crate::game::spell::{apply_spell_cast, sort_casts, SpellCast};
use crate::game::state::{PlayerState, SigningCredential};

/// Result of one round: the commitment over the full private state and
/// the restricted view the opponent is allowed to see.
#[derive(Clone, Debug)]
pub struct RoundOutput {
    /// Hash binding the entire private state after the round.
    pub commitment: StateHash,
    /// Deep copy of the state with public effects applied and the
    /// credential zeroed.
    pub public_view: PlayerState,
}

/// Advance this player's state by one full round.
///
/// `casts` is the turn's complete batch from all participants, in
/// submission order; `opponent` is read-only throughout. When a player
/// fails to act in time, the orchestration layer calls this with an
/// empty batch.
pub fn run_round(
    state: &mut PlayerState,
    casts: &[SpellCast],
    opponent: &PlayerState,
) -> Result<RoundOutput, EngineError> {
    // 1. Evolve the seed: fold the round counter (fresh draws even on an
    //    empty batch), then every cast in submission order.
    state.seed.fold_turn(state.turn);
    for cast in casts {
        state.seed.fold_cast(&cast.hash());
    }

    // 2. Resolve casts in priority order.
    let mut ordered = casts.to_vec();
    sort_casts(&mut ordered);
    for cast in &ordered {
        apply_spell_cast(state, cast, opponent)?;
    }

    // 3. End-of-round effects: permanent, on private state.
    apply_end_of_round_effects(state)?;

    // 4. On-end effects: payload lands only on the expiry round.
    apply_on_end_effects(state)?;

    // 5. Build the public view on a throwaway copy. The credential never
    //    crosses the round boundary.
    let mut public_view = state.clone();
    public_view.credential = SigningCredential::default();
    apply_public_effects(state, &mut public_view)?;

    // 6. Cooldown decay, floored at zero.
    for slot in &mut state.spell_slots {
        slot.current_cooldown = slot.current_cooldown.saturating_sub(1);
    }

    // 7. Advance the round counter.
    state.turn += 1;

    // 8. Commit to the entire private state.
    let commitment = state.commitment();

    debug!(
        player = %state.id.to_uuid_string(),
        turn = state.turn,
        casts = casts.len(),
        hp = state.stats.hp,
        commitment = %hex::encode(&commitment[..8]),
        "round complete"
    );

    Ok(RoundOutput { commitment, public_view })
}

// =============================================================================
// TESTS
// =============================================================================
