//! Spell Registry & Cast Resolution
//!
//! A static table merging every character class's spell set plus the
//! shared spells, keyed by name-derived stable ids (see
//! [`crate::core::hash::id_from_name`]). Both participants build the same
//! table from the same names, so the identifier space agrees across the
//! match; a cast id missing from the table means the participants are
//! running desynced registries and is fatal.
//!
//! Cast resolution runs on the *recipient's* engine instance: the caster
//! is only ever charged the cooldown, and the modifier mutates the
//! resolving player's state while reading the opponent's.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Serialize, Deserialize};

use crate::core::hash::{id_from_name, StateHash, StateHasher, CAST_DOMAIN};
use crate::game::damage::apply_damage;
use crate::game::effect::{effect_id, pack_coord};
use crate::game::error::EngineError;
use crate::game::state::{
    CharacterClass, Coord, EffectQueue, EffectSlot, PlayerId, PlayerState, SpellId,
};

/// Who a spell may be aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    /// The caster's own side.
    Ally,
    /// The opposing player.
    Enemy,
}

/// Declared payload schema, used by the trusted boundary to decode the
/// opaque action payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadSchema {
    /// The spell carries no payload.
    None,
    /// A tile coordinate.
    Coord,
    /// A signed magnitude.
    Power,
}

/// Decoded spell payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum SpellPayload {
    /// No payload.
    #[default]
    None,
    /// A tile coordinate.
    Coord(Coord),
    /// A signed magnitude.
    Power(i32),
}

/// One declared action for the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellCast {
    /// Player declaring the cast.
    pub caster: PlayerId,
    /// Player the cast is aimed at.
    pub target: PlayerId,
    /// Spell identifier.
    pub spell: SpellId,
    /// Decoded payload.
    pub payload: SpellPayload,
}

impl SpellCast {
    /// Hash this cast for seed evolution.
    pub fn hash(&self) -> StateHash {
        let mut hasher = StateHasher::new(CAST_DOMAIN);
        hasher.update_uuid(&self.caster.0);
        hasher.update_uuid(&self.target.0);
        hasher.update_u32(self.spell.0);
        match self.payload {
            SpellPayload::None => hasher.update_u8(0),
            SpellPayload::Coord(c) => {
                hasher.update_u8(1);
                hasher.update_u8(c.x);
                hasher.update_u8(c.y);
            }
            SpellPayload::Power(p) => {
                hasher.update_u8(2);
                hasher.update_i32(p);
            }
        }
        hasher.finalize()
    }
}

/// A spell's modifier: mutates the resolving player's state, reads the
/// opponent's.
pub type SpellFn = fn(&mut PlayerState, &SpellCast, &PlayerState) -> Result<(), EngineError>;

/// One entry in the static spell registry.
pub struct SpellDef {
    /// Stable identifier, derived from the name.
    pub id: SpellId,
    /// Registry name the id was derived from.
    pub name: &'static str,
    /// Owning class.
    pub class: CharacterClass,
    /// Cooldown charged on every declared cast.
    pub base_cooldown: u16,
    /// Target discriminator.
    pub target: TargetKind,
    /// Companion spell resolved immediately after this one.
    pub companion: Option<SpellId>,
    /// Resolution priority; higher resolves first, default 0.
    pub priority: i8,
    /// Declared payload schema.
    pub schema: PayloadSchema,
    /// Modifier function.
    pub apply: SpellFn,
}

/// Derive the stable id for a spell name.
pub fn spell_id(name: &str) -> SpellId {
    SpellId(id_from_name(name))
}

// =============================================================================
// SPELL IMPLEMENTATIONS
// =============================================================================

const STRIKE_DAMAGE: i32 = 20;
const CLEAVE_DAMAGE: i32 = 30;
const FIREBALL_DAMAGE: i32 = 25;
const BURN_TICK: i32 = 5;
const IRONSKIN_BONUS: i32 = 20;
const AMBUSH_DAMAGE: i32 = 40;
const MEND_TICK: i32 = 10;

fn expect_coord(cast: &SpellCast) -> Result<Coord, EngineError> {
    match cast.payload {
        SpellPayload::Coord(c) => Ok(c),
        _ => Err(EngineError::BadPayload {
            spell: cast.spell,
            reason: "expected a coordinate payload".into(),
        }),
    }
}

/// Shared: basic attack.
fn cast_strike(state: &mut PlayerState, _cast: &SpellCast, opponent: &PlayerState) -> Result<(), EngineError> {
    apply_damage(state, STRIKE_DAMAGE, opponent);
    Ok(())
}

/// Vanguard: heavy attack.
fn cast_cleave(state: &mut PlayerState, _cast: &SpellCast, opponent: &PlayerState) -> Result<(), EngineError> {
    apply_damage(state, CLEAVE_DAMAGE, opponent);
    Ok(())
}

/// Vanguard: defense over time.
fn cast_ironskin(state: &mut PlayerState, _cast: &SpellCast, _opponent: &PlayerState) -> Result<(), EngineError> {
    state.push_effect(
        EffectQueue::EndOfRound,
        EffectSlot::new(effect_id("ironskin"), 2, IRONSKIN_BONUS),
        true,
    );
    Ok(())
}

/// Arcanist: direct damage plus a burn, but only when the hit lands.
fn cast_fireball(state: &mut PlayerState, _cast: &SpellCast, opponent: &PlayerState) -> Result<(), EngineError> {
    let outcome = apply_damage(state, FIREBALL_DAMAGE, opponent);
    state.push_effect(
        EffectQueue::EndOfRound,
        EffectSlot::new(effect_id("burn"), 2, BURN_TICK),
        outcome.hit,
    );
    Ok(())
}

/// Arcanist: reposition. The position goes dark mid-dash; the paired
/// companion re-reveals it.
fn cast_blink(state: &mut PlayerState, cast: &SpellCast, _opponent: &PlayerState) -> Result<(), EngineError> {
    let destination = expect_coord(cast)?;
    state.stats.position.coord = destination;
    state.stats.position.hide();
    Ok(())
}

/// Arcanist companion: positional update paired with `blink`.
fn cast_blink_step(state: &mut PlayerState, _cast: &SpellCast, _opponent: &PlayerState) -> Result<(), EngineError> {
    let here = state.stats.position.coord;
    state.stats.position.reveal(here);
    Ok(())
}

/// Trickster: go invisible on the public view.
fn cast_vanish(state: &mut PlayerState, _cast: &SpellCast, _opponent: &PlayerState) -> Result<(), EngineError> {
    state.push_effect(
        EffectQueue::Public,
        EffectSlot::new(effect_id("veil"), 2, 0),
        true,
    );
    Ok(())
}

/// Trickster: project a fake position on the public view.
fn cast_decoy(state: &mut PlayerState, cast: &SpellCast, _opponent: &PlayerState) -> Result<(), EngineError> {
    let fake = expect_coord(cast)?;
    state.push_effect(
        EffectQueue::Public,
        EffectSlot::new(effect_id("decoy"), 2, pack_coord(fake)),
        true,
    );
    Ok(())
}

/// Trickster: delayed strike landing when its countdown expires.
fn cast_ambush(state: &mut PlayerState, _cast: &SpellCast, _opponent: &PlayerState) -> Result<(), EngineError> {
    state.push_effect(
        EffectQueue::OnEnd,
        EffectSlot::new(effect_id("ambush"), 2, AMBUSH_DAMAGE),
        true,
    );
    Ok(())
}

/// Trickster: healing over time.
fn cast_mend(state: &mut PlayerState, _cast: &SpellCast, _opponent: &PlayerState) -> Result<(), EngineError> {
    state.push_effect(
        EffectQueue::EndOfRound,
        EffectSlot::new(effect_id("regrowth"), 2, MEND_TICK),
        true,
    );
    Ok(())
}

// =============================================================================
// REGISTRY
// =============================================================================

static REGISTRY: OnceLock<BTreeMap<SpellId, SpellDef>> = OnceLock::new();

struct SpellRow {
    name: &'static str,
    class: CharacterClass,
    base_cooldown: u16,
    target: TargetKind,
    companion: Option<&'static str>,
    priority: i8,
    schema: PayloadSchema,
    apply: SpellFn,
}

fn build_registry() -> BTreeMap<SpellId, SpellDef> {
    use crate::game::state::CharacterClass::{Arcanist, Shared, Trickster, Vanguard};
    use self::PayloadSchema as Schema;
    use self::TargetKind::{Ally, Enemy};

    let rows = [
        SpellRow { name: "strike", class: Shared, base_cooldown: 1, target: Enemy, companion: None, priority: 0, schema: Schema::None, apply: cast_strike },
        SpellRow { name: "cleave", class: Vanguard, base_cooldown: 2, target: Enemy, companion: None, priority: 0, schema: Schema::None, apply: cast_cleave },
        SpellRow { name: "ironskin", class: Vanguard, base_cooldown: 3, target: Ally, companion: None, priority: 0, schema: Schema::None, apply: cast_ironskin },
        SpellRow { name: "fireball", class: Arcanist, base_cooldown: 2, target: Enemy, companion: None, priority: 0, schema: Schema::None, apply: cast_fireball },
        SpellRow { name: "blink", class: Arcanist, base_cooldown: 3, target: Ally, companion: Some("blink_step"), priority: 10, schema: Schema::Coord, apply: cast_blink },
        SpellRow { name: "blink_step", class: Arcanist, base_cooldown: 0, target: Ally, companion: None, priority: 0, schema: Schema::None, apply: cast_blink_step },
        SpellRow { name: "vanish", class: Trickster, base_cooldown: 4, target: Ally, companion: None, priority: 0, schema: Schema::None, apply: cast_vanish },
        SpellRow { name: "decoy", class: Trickster, base_cooldown: 3, target: Ally, companion: None, priority: 0, schema: Schema::Coord, apply: cast_decoy },
        SpellRow { name: "ambush", class: Trickster, base_cooldown: 3, target: Enemy, companion: None, priority: 0, schema: Schema::None, apply: cast_ambush },
        SpellRow { name: "mend", class: Trickster, base_cooldown: 2, target: Ally, companion: None, priority: 0, schema: Schema::None, apply: cast_mend },
    ];

    let mut registry = BTreeMap::new();
    for row in rows {
        let id = spell_id(row.name);
        let def = SpellDef {
            id,
            name: row.name,
            class: row.class,
            base_cooldown: row.base_cooldown,
            target: row.target,
            companion: row.companion.map(spell_id),
            priority: row.priority,
            schema: row.schema,
            apply: row.apply,
        };
        let previous = registry.insert(id, def);
        assert!(previous.is_none(), "spell id collision for {}", row.name);
    }
    registry
}

/// The static spell registry, built once at first use.
pub fn registry() -> &'static BTreeMap<SpellId, SpellDef> {
    REGISTRY.get_or_init(build_registry)
}

/// Look up a spell definition by id.
pub fn lookup(id: SpellId) -> Option<&'static SpellDef> {
    registry().get(&id)
}

/// Resolution priority for an id; unregistered ids order as 0.
pub fn priority_of(id: SpellId) -> i8 {
    lookup(id).map(|def| def.priority).unwrap_or(0)
}

/// Order a round's casts: descending priority, submission order as the
/// tiebreak (stable sort). Every participant sorts the same batch the
/// same way.
pub fn sort_casts(casts: &mut [SpellCast]) {
    casts.sort_by_key(|cast| std::cmp::Reverse(priority_of(cast.spell)));
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Resolve one spell cast against this engine's state.
///
/// The caster is charged the cooldown unconditionally, whether or not the
/// cast resolves here. A cast aimed at some other player is a silent
/// no-op by contract. An unknown spell id addressed to this player is a
/// fatal desync.
pub fn apply_spell_cast(
    state: &mut PlayerState,
    cast: &SpellCast,
    opponent: &PlayerState,
) -> Result<(), EngineError> {
    if cast.caster == state.id {
        if let Some(slot) = state.find_spell_slot_mut(cast.spell) {
            slot.current_cooldown = slot.base_cooldown;
        }
    }

    if cast.target != state.id {
        return Ok(());
    }

    let def = lookup(cast.spell).ok_or(EngineError::UnknownSpell(cast.spell))?;
    (def.apply)(state, cast, opponent)?;

    if let Some(companion) = def.companion {
        let paired = lookup(companion).ok_or(EngineError::UnknownSpell(companion))?;
        (paired.apply)(state, cast, opponent)?;
    }

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{count_active, SpellSlot};

    fn duelists() -> (PlayerState, PlayerState) {
        let a = PlayerState::new(PlayerId::new([1; 16]), CharacterClass::Arcanist, &[0; 16]);
        let b = PlayerState::new(PlayerId::new([2; 16]), CharacterClass::Vanguard, &[0; 16]);
        (a, b)
    }

    #[test]
    fn test_registry_merges_all_classes() {
        assert_eq!(registry().len(), 10);
        let classes: std::collections::BTreeSet<_> =
            registry().values().map(|def| def.class).collect();
        assert!(classes.contains(&CharacterClass::Shared));
        assert!(classes.contains(&CharacterClass::Vanguard));
        assert!(classes.contains(&CharacterClass::Arcanist));
        assert!(classes.contains(&CharacterClass::Trickster));
    }

    #[test]
    fn test_cast_for_other_player_is_noop() {
        // Scenario: resolving player A while the cast targets player B.
        let (mut a, b) = duelists();
        let before = a.clone();
        let cast = SpellCast {
            caster: b.id,
            target: PlayerId::new([9; 16]),
            spell: spell_id("strike"),
            payload: SpellPayload::None,
        };

        apply_spell_cast(&mut a, &cast, &b).unwrap();
        assert_eq!(a, before, "non-recipient state is untouched");
    }

    #[test]
    fn test_unknown_spell_targeting_me_is_fatal() {
        let (mut a, b) = duelists();
        let before = a.clone();
        let cast = SpellCast {
            caster: b.id,
            target: a.id,
            spell: SpellId(0xBAD0_0001),
            payload: SpellPayload::None,
        };

        assert_eq!(
            apply_spell_cast(&mut a, &cast, &b),
            Err(EngineError::UnknownSpell(SpellId(0xBAD0_0001)))
        );
        assert_eq!(a, before, "state unchanged up to the failure point");
    }

    #[test]
    fn test_cooldown_charged_even_when_not_recipient() {
        let (mut a, b) = duelists();
        a.push_spell(SpellSlot::new(spell_id("strike"), 1)).unwrap();
        let cast = SpellCast {
            caster: a.id,
            target: b.id,
            spell: spell_id("strike"),
            payload: SpellPayload::None,
        };

        apply_spell_cast(&mut a, &cast, &b).unwrap();
        assert_eq!(a.spell_slots[0].current_cooldown, 1, "cooldown reset on declaration");
        assert_eq!(a.stats.hp, 100, "no resolution on the caster's side");
    }

    #[test]
    fn test_strike_resolves_on_recipient() {
        let (mut a, b) = duelists();
        let cast = SpellCast {
            caster: b.id,
            target: a.id,
            spell: spell_id("strike"),
            payload: SpellPayload::None,
        };

        apply_spell_cast(&mut a, &cast, &b).unwrap();
        assert_eq!(a.stats.hp, 80);
    }

    #[test]
    fn test_fireball_burn_requires_hit() {
        let (mut a, b) = duelists();
        a.stats.dodge_chance = 100;
        let cast = SpellCast {
            caster: b.id,
            target: a.id,
            spell: spell_id("fireball"),
            payload: SpellPayload::None,
        };

        apply_spell_cast(&mut a, &cast, &b).unwrap();
        assert_eq!(a.stats.hp, 100, "dodged");
        assert_eq!(count_active(&a.end_of_round_effects), 0, "no burn on a miss");

        a.stats.dodge_chance = 0;
        apply_spell_cast(&mut a, &cast, &b).unwrap();
        assert_eq!(a.stats.hp, 75);
        assert_eq!(a.end_of_round_effects[0].effect, effect_id("burn"));
    }

    #[test]
    fn test_blink_pairs_companion() {
        let (mut a, b) = duelists();
        let cast = SpellCast {
            caster: a.id,
            target: a.id,
            spell: spell_id("blink"),
            payload: SpellPayload::Coord(Coord::new(4, 6)),
        };

        apply_spell_cast(&mut a, &cast, &b).unwrap();
        // Blink hides the position; the companion re-reveals it at the
        // destination in the same resolution.
        assert_eq!(a.stats.position.coord, Coord::new(4, 6));
        assert!(a.stats.position.known);
    }

    #[test]
    fn test_blink_rejects_missing_payload() {
        let (mut a, b) = duelists();
        let cast = SpellCast {
            caster: a.id,
            target: a.id,
            spell: spell_id("blink"),
            payload: SpellPayload::None,
        };

        let err = apply_spell_cast(&mut a, &cast, &b).unwrap_err();
        assert!(matches!(err, EngineError::BadPayload { .. }));
    }

    #[test]
    fn test_sort_casts_priority_then_submission_order() {
        let (a, b) = duelists();
        let strike = |caster: &PlayerState, target: &PlayerState| SpellCast {
            caster: caster.id,
            target: target.id,
            spell: spell_id("strike"),
            payload: SpellPayload::None,
        };

        let blink = SpellCast {
            caster: a.id,
            target: a.id,
            spell: spell_id("blink"),
            payload: SpellPayload::Coord(Coord::new(1, 1)),
        };

        let mut casts = vec![strike(&a, &b), strike(&b, &a), blink];
        sort_casts(&mut casts);

        assert_eq!(casts[0].spell, spell_id("blink"), "priority 10 first");
        assert_eq!(casts[1].caster, a.id, "equal priorities keep submission order");
        assert_eq!(casts[2].caster, b.id);
    }

    #[test]
    fn test_cast_hash_distinguishes_fields() {
        let (a, b) = duelists();
        let base = SpellCast {
            caster: a.id,
            target: b.id,
            spell: spell_id("strike"),
            payload: SpellPayload::None,
        };

        let mut other = base;
        other.spell = spell_id("cleave");
        assert_ne!(base.hash(), other.hash());

        let mut other = base;
        other.payload = SpellPayload::Power(3);
        assert_ne!(base.hash(), other.hash());
    }
}
