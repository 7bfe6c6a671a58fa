//! Effect Registry & Lifecycle Engine
//!
//! A static table of timed effect definitions plus the three-queue
//! lifecycle that the round driver runs every round. The three queues
//! carry three permanence semantics:
//!
//! - **Public**: the effect mutates only the throwaway public view; the
//!   stored entry on private state still counts down and expires.
//! - **End-of-round**: the effect mutates private state immediately and
//!   permanently.
//! - **On-end**: the payload lands on private state only on the round the
//!   entry expires; the countdown always advances.
//!
//! A sentinel id is skipped without lookup; any other id missing from the
//! registry is a registry/version desync between participants and is
//! fatal.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::core::hash::id_from_name;
use crate::game::error::EngineError;
use crate::game::state::{
    count_active, Coord, EffectId, PlayerState, SlotEntry, MAX_EFFECT_SLOTS,
};

/// An effect's state mutation. Receives the state the current queue's
/// semantics direct it at (the view copy, private state, or the expiry
/// candidate) plus the slot's numeric parameter.
pub type EffectFn = fn(&mut PlayerState, i32);

/// One entry in the static effect registry.
pub struct EffectDef {
    /// Stable identifier, derived from the name.
    pub id: EffectId,
    /// Registry name the id was derived from.
    pub name: &'static str,
    /// State mutation.
    pub apply: EffectFn,
}

/// Derive the stable id for an effect name.
pub fn effect_id(name: &str) -> EffectId {
    EffectId(id_from_name(name))
}

/// Pack a coordinate into an effect parameter.
pub fn pack_coord(coord: Coord) -> i32 {
    i32::from(coord.x) | (i32::from(coord.y) << 8)
}

/// Unpack a coordinate from an effect parameter.
pub fn unpack_coord(param: i32) -> Coord {
    Coord::new((param & 0xFF) as u8, ((param >> 8) & 0xFF) as u8)
}

// =============================================================================
// EFFECT IMPLEMENTATIONS
// =============================================================================

/// Public: suppress the position's presence flag on the view.
fn apply_veil(state: &mut PlayerState, _param: i32) {
    state.stats.position.hide();
}

/// Public: show a fake position on the view.
fn apply_decoy(state: &mut PlayerState, param: i32) {
    state.stats.position.reveal(unpack_coord(param));
}

/// End-of-round: damage over time.
fn apply_burn(state: &mut PlayerState, param: i32) {
    state.stats.hp -= param;
}

/// End-of-round: healing over time, capped at max hp.
fn apply_regrowth(state: &mut PlayerState, param: i32) {
    state.stats.hp = (state.stats.hp + param).min(state.stats.max_hp);
}

/// End-of-round: defense increase.
fn apply_ironskin(state: &mut PlayerState, param: i32) {
    state.stats.defense += param;
}

/// On-end: delayed strike landing on the expiry round.
fn apply_ambush(state: &mut PlayerState, param: i32) {
    state.stats.hp -= param;
}

/// On-end: defense surge landing on the expiry round.
fn apply_delayed_ward(state: &mut PlayerState, param: i32) {
    state.stats.defense += param;
}

// =============================================================================
// REGISTRY
// =============================================================================

static REGISTRY: OnceLock<BTreeMap<EffectId, EffectDef>> = OnceLock::new();

fn build_registry() -> BTreeMap<EffectId, EffectDef> {
    let defs: [(&'static str, EffectFn); 7] = [
        ("veil", apply_veil),
        ("decoy", apply_decoy),
        ("burn", apply_burn),
        ("regrowth", apply_regrowth),
        ("ironskin", apply_ironskin),
        ("ambush", apply_ambush),
        ("delayed_ward", apply_delayed_ward),
    ];

    let mut registry = BTreeMap::new();
    for (name, apply) in defs {
        let id = effect_id(name);
        let previous = registry.insert(id, EffectDef { id, name, apply });
        assert!(previous.is_none(), "effect id collision for {name}");
    }
    registry
}

/// The static effect registry, built once at first use.
pub fn registry() -> &'static BTreeMap<EffectId, EffectDef> {
    REGISTRY.get_or_init(build_registry)
}

/// Look up an effect definition by id.
pub fn lookup(id: EffectId) -> Option<&'static EffectDef> {
    registry().get(&id)
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Apply end-of-round effects directly to private state.
///
/// Each entry's mutation and countdown are immediate and permanent.
/// Expired entries are compacted via swap-with-last; the swapped-in tail
/// entry is processed at the same index on the next loop iteration.
pub fn apply_end_of_round_effects(state: &mut PlayerState) -> Result<(), EngineError> {
    let mut i = 0;
    while i < MAX_EFFECT_SLOTS {
        let slot = state.end_of_round_effects[i];
        if slot.effect.is_empty() {
            break;
        }
        let def = lookup(slot.effect).ok_or(EngineError::UnknownEffect(slot.effect))?;
        (def.apply)(state, slot.param);

        let remaining = slot.remaining.saturating_sub(1);
        state.end_of_round_effects[i].remaining = remaining;
        if remaining == 0 {
            let n = count_active(&state.end_of_round_effects);
            state.end_of_round_effects[i] = state.end_of_round_effects[n - 1];
            state.end_of_round_effects[n - 1].clear();
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Apply on-end effects: the payload lands only on the expiry round.
///
/// Equivalent to a speculative snapshot-apply-restore that keeps the
/// candidate only on expiry: the mutation is simply not performed on
/// rounds where the snapshot would have been restored. The countdown
/// persists every round either way.
pub fn apply_on_end_effects(state: &mut PlayerState) -> Result<(), EngineError> {
    let mut i = 0;
    while i < MAX_EFFECT_SLOTS {
        let slot = state.on_end_effects[i];
        if slot.effect.is_empty() {
            break;
        }
        let def = lookup(slot.effect).ok_or(EngineError::UnknownEffect(slot.effect))?;
        if slot.remaining == 1 {
            (def.apply)(state, slot.param);
        }

        let remaining = slot.remaining.saturating_sub(1);
        state.on_end_effects[i].remaining = remaining;
        if remaining == 0 {
            let n = count_active(&state.on_end_effects);
            state.on_end_effects[i] = state.on_end_effects[n - 1];
            state.on_end_effects[n - 1].clear();
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Apply public effects to the throwaway view; tick durations on private.
///
/// The mutation is visible only through `view` (rebuilt and discarded each
/// round); private state's gameplay fields are never altered here, only
/// the stored countdowns.
pub fn apply_public_effects(
    private: &mut PlayerState,
    view: &mut PlayerState,
) -> Result<(), EngineError> {
    let mut i = 0;
    while i < MAX_EFFECT_SLOTS {
        let slot = private.public_effects[i];
        if slot.effect.is_empty() {
            break;
        }
        let def = lookup(slot.effect).ok_or(EngineError::UnknownEffect(slot.effect))?;
        (def.apply)(view, slot.param);

        let remaining = slot.remaining.saturating_sub(1);
        private.public_effects[i].remaining = remaining;
        if remaining == 0 {
            let n = count_active(&private.public_effects);
            private.public_effects[i] = private.public_effects[n - 1];
            private.public_effects[n - 1].clear();
        } else {
            i += 1;
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{CharacterClass, EffectQueue, EffectSlot, PlayerId};
    use proptest::prelude::*;

    fn test_state() -> PlayerState {
        PlayerState::new(PlayerId::new([1; 16]), CharacterClass::Trickster, &[0; 16])
    }

    #[test]
    fn test_registry_has_no_collisions() {
        assert_eq!(registry().len(), 7);
    }

    #[test]
    fn test_unknown_effect_is_fatal() {
        let mut state = test_state();
        state.push_effect(
            EffectQueue::EndOfRound,
            EffectSlot::new(EffectId(0xDEAD_BEEF), 2, 1),
            true,
        );
        assert_eq!(
            apply_end_of_round_effects(&mut state),
            Err(EngineError::UnknownEffect(EffectId(0xDEAD_BEEF)))
        );
    }

    #[test]
    fn test_burn_ticks_and_expires() {
        let mut state = test_state();
        state.push_effect(
            EffectQueue::EndOfRound,
            EffectSlot::new(effect_id("burn"), 2, 5),
            true,
        );

        apply_end_of_round_effects(&mut state).unwrap();
        assert_eq!(state.stats.hp, 95);
        assert_eq!(count_active(&state.end_of_round_effects), 1);
        assert_eq!(state.end_of_round_effects[0].remaining, 1);

        apply_end_of_round_effects(&mut state).unwrap();
        assert_eq!(state.stats.hp, 90);
        assert_eq!(count_active(&state.end_of_round_effects), 0, "expired and compacted");

        apply_end_of_round_effects(&mut state).unwrap();
        assert_eq!(state.stats.hp, 90, "no further ticks after expiry");
    }

    #[test]
    fn test_regrowth_caps_at_max_hp() {
        let mut state = test_state();
        state.stats.hp = 95;
        state.push_effect(
            EffectQueue::EndOfRound,
            EffectSlot::new(effect_id("regrowth"), 1, 20),
            true,
        );
        apply_end_of_round_effects(&mut state).unwrap();
        assert_eq!(state.stats.hp, 100);
    }

    #[test]
    fn test_on_end_payload_only_on_expiry() {
        let mut state = test_state();
        state.push_effect(
            EffectQueue::OnEnd,
            EffectSlot::new(effect_id("ambush"), 3, 40),
            true,
        );

        // Rounds 1 and 2: countdown advances, gameplay fields untouched.
        for expected_remaining in [2u16, 1] {
            apply_on_end_effects(&mut state).unwrap();
            assert_eq!(state.stats.hp, 100);
            assert_eq!(state.on_end_effects[0].remaining, expected_remaining);
        }

        // Round 3: payload lands exactly once, entry expires.
        apply_on_end_effects(&mut state).unwrap();
        assert_eq!(state.stats.hp, 60);
        assert_eq!(count_active(&state.on_end_effects), 0);
    }

    #[test]
    fn test_public_effect_mutates_view_only() {
        let mut private = test_state();
        private.push_effect(
            EffectQueue::Public,
            EffectSlot::new(effect_id("veil"), 2, 0),
            true,
        );

        let mut view = private.clone();
        apply_public_effects(&mut private, &mut view).unwrap();

        assert!(!view.stats.position.known, "view hides the position");
        assert!(private.stats.position.known, "private position untouched");
        assert_eq!(private.public_effects[0].remaining, 1, "countdown is stored privately");
    }

    #[test]
    fn test_decoy_overrides_view_position() {
        let mut private = test_state();
        let fake = Coord::new(6, 2);
        private.push_effect(
            EffectQueue::Public,
            EffectSlot::new(effect_id("decoy"), 1, pack_coord(fake)),
            true,
        );

        let mut view = private.clone();
        apply_public_effects(&mut private, &mut view).unwrap();

        assert_eq!(view.stats.position.coord, fake);
        assert!(view.stats.position.known);
        assert_eq!(private.stats.position.coord, Coord::new(0, 0));
        assert_eq!(count_active(&private.public_effects), 0, "single-round decoy expired");
    }

    #[test]
    fn test_expiry_compaction_processes_swapped_entry() {
        let mut state = test_state();
        // First entry expires this round; the tail entry swapped into its
        // place must still tick in the same pass.
        state.push_effect(EffectQueue::EndOfRound, EffectSlot::new(effect_id("burn"), 1, 5), true);
        state.push_effect(EffectQueue::EndOfRound, EffectSlot::new(effect_id("burn"), 3, 2), true);

        apply_end_of_round_effects(&mut state).unwrap();

        assert_eq!(state.stats.hp, 93, "both entries applied");
        assert_eq!(count_active(&state.end_of_round_effects), 1);
        assert_eq!(state.end_of_round_effects[0].remaining, 2);
    }

    #[test]
    fn test_coord_packing_round_trip() {
        let coord = Coord::new(7, 5);
        assert_eq!(unpack_coord(pack_coord(coord)), coord);
    }

    proptest! {
        #[test]
        fn prop_on_end_leaves_gameplay_fields_until_expiry(
            duration in 2u16..8,
            param in 1i32..100,
        ) {
            let mut state = test_state();
            state.push_effect(
                EffectQueue::OnEnd,
                EffectSlot::new(effect_id("delayed_ward"), duration, param),
                true,
            );

            let baseline = state.stats;
            for _ in 1..duration {
                apply_on_end_effects(&mut state).unwrap();
                prop_assert_eq!(state.stats, baseline, "payload must wait for expiry");
            }

            apply_on_end_effects(&mut state).unwrap();
            prop_assert_eq!(state.stats.defense, baseline.defense + param);
            prop_assert_eq!(count_active(&state.on_end_effects), 0);
        }
    }
}
