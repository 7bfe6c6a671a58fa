//! Hit/Miss and Damage Magnitude
//!
//! All rolls read the resolving player's rolling seed without advancing
//! it; the seed only moves forward once per round (see the round driver).
//!
//! Two readings of the source formulas diverged; the ones pinned here:
//! - Hit roll: `roll >= dodge_chance` of the damage recipient. The
//!   accuracy multiplier was the double-divide defect and is dropped,
//!   which makes the dodge extremes hold regardless of accuracy.
//! - Magnitude: literal multiplicative chain using the caster's attack
//!   and the recipient's own defense percentage, truncating at each
//!   integer division.
//! - Crit: compared against the caster's crit chance using the *same*
//!   roll as the hit check. The correlated-roll behavior is preserved
//!   deliberately; it changes observed probabilities and is part of the
//!   cross-participant contract.

use serde::{Serialize, Deserialize};

use crate::game::state::PlayerState;

/// Outcome of a damage application, for spell follow-ups and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOutcome {
    /// Did the attack land?
    pub hit: bool,
    /// Did it crit? (Only meaningful when `hit` is true.)
    pub crit: bool,
    /// Hit points actually subtracted (0 on a miss).
    pub amount: i32,
}

/// Apply damage to the resolving player's state.
///
/// `state` is the damage recipient (the engine instance resolving the
/// cast); `opponent` is the casting player. Hit points are unclamped and
/// may go negative.
pub fn apply_damage(
    state: &mut PlayerState,
    base_damage: i32,
    opponent: &PlayerState,
) -> DamageOutcome {
    let roll = state.seed.draw_percentage();

    let hit = roll >= state.stats.dodge_chance;
    let crit = roll < opponent.stats.crit_chance;

    let mut full = base_damage * opponent.stats.attack / 100 * state.stats.defense / 100;
    if crit {
        full *= 2;
    }

    let amount = if hit { full } else { 0 };
    state.stats.hp -= amount;

    DamageOutcome { hit, crit, amount }
}

// =============================================================================
// TESTS
// =============================================================================
