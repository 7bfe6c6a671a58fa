//! Player State Definitions
//!
//! The fixed-shape per-player record and its slot-management primitives.
//!
//! Every bounded array (spell slots, the three effect queues) follows the
//! same convention: active entries occupy a contiguous prefix starting at
//! index 0, an entry is empty iff its id equals the zero sentinel, and the
//! active count is never stored — it is recomputed by scanning for the
//! first sentinel. All mutations must preserve that contiguity.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, StateHasher};
use crate::core::rng::Seed;
use crate::game::error::EngineError;

/// Fixed capacity of the spell table.
pub const MAX_SPELL_SLOTS: usize = 5;

/// Fixed capacity of each effect queue.
pub const MAX_EFFECT_SLOTS: usize = 10;

/// Side length of the square tile grid (64 tiles total).
pub const MAP_SIDE: usize = 8;

// =============================================================================
// PLAYER ID
// =============================================================================

/// Unique player identifier (UUID as bytes).
///
/// Implements Ord for deterministic ordering wherever players are sorted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

// =============================================================================
// CHARACTER CLASS
// =============================================================================

/// Character archetype owning a subset of the spell registry.
///
/// Starting-state defaults per class live in the external class registry;
/// the engine only uses the class to tag spell ownership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum CharacterClass {
    /// Spells available to every class.
    #[default]
    Shared = 0,
    /// Front-line bruiser.
    Vanguard = 1,
    /// Ranged caster.
    Arcanist = 2,
    /// Stealth and misdirection.
    Trickster = 3,
}

// =============================================================================
// IDENTIFIERS & SENTINELS
// =============================================================================

/// Stable spell identifier. Zero is the empty-slot sentinel and is never
/// assigned to a real spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub struct SpellId(pub u32);

impl SpellId {
    /// The empty-slot sentinel.
    pub const EMPTY: SpellId = SpellId(0);

    /// Is this the sentinel?
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Stable effect identifier. Zero is the empty-slot sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub struct EffectId(pub u32);

impl EffectId {
    /// The empty-slot sentinel.
    pub const EMPTY: EffectId = EffectId(0);

    /// Is this the sentinel?
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// POSITION
// =============================================================================

/// Tile coordinate on the 8x8 grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub struct Coord {
    /// Column, 0-based.
    pub x: u8,
    /// Row, 0-based.
    pub y: u8,
}

impl Coord {
    /// Create a coordinate.
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// Optional position as a fixed-size (value, presence) pair.
///
/// Invisibility and decoy mechanics toggle `known` without changing the
/// serialized shape; this is never encoded as a variable-size optional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub struct TrackedPosition {
    /// Last coordinate value. Meaningless when `known` is false.
    pub coord: Coord,
    /// Presence flag.
    pub known: bool,
}

impl TrackedPosition {
    /// A known position at the given coordinate.
    pub const fn at(coord: Coord) -> Self {
        Self { coord, known: true }
    }

    /// Hide the position, keeping the stale value in place.
    pub fn hide(&mut self) {
        self.known = false;
    }

    /// Reveal the position at a coordinate.
    pub fn reveal(&mut self, coord: Coord) {
        self.coord = coord;
        self.known = true;
    }
}

// =============================================================================
// STATS
// =============================================================================

/// Combat statistics.
///
/// All percentage fields are integers where 100 = baseline; fractional
/// precision beyond integer-division truncation does not exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Hit points. Signed and unclamped; may go negative.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Position with presence flag.
    pub position: TrackedPosition,
    /// Movement speed.
    pub speed: i32,
    /// Attack percentage.
    pub attack: i32,
    /// Defense percentage.
    pub defense: i32,
    /// Critical-strike chance percentage.
    pub crit_chance: i32,
    /// Dodge chance percentage.
    pub dodge_chance: i32,
    /// Accuracy percentage.
    pub accuracy: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            hp: 100,
            max_hp: 100,
            position: TrackedPosition::at(Coord::new(0, 0)),
            speed: 100,
            attack: 100,
            defense: 100,
            crit_chance: 0,
            dodge_chance: 0,
            accuracy: 100,
        }
    }
}

// =============================================================================
// SLOTS
// =============================================================================

/// Common behavior of bounded-array slot entries.
pub trait SlotEntry {
    /// Does this slot hold the sentinel?
    fn is_empty(&self) -> bool;
    /// Reset the slot to the sentinel value.
    fn clear(&mut self);
}

/// One entry in the spell table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub struct SpellSlot {
    /// Spell identifier (sentinel 0 = empty slot).
    pub spell: SpellId,
    /// Cooldown the slot resets to when the spell is cast.
    pub base_cooldown: u16,
    /// Rounds until the spell is castable again (0 = ready).
    pub current_cooldown: u16,
}

impl SpellSlot {
    /// Create a ready slot for a spell.
    pub const fn new(spell: SpellId, base_cooldown: u16) -> Self {
        Self { spell, base_cooldown, current_cooldown: 0 }
    }
}

impl SlotEntry for SpellSlot {
    #[inline]
    fn is_empty(&self) -> bool {
        self.spell.is_empty()
    }

    #[inline]
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One entry in an effect queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub struct EffectSlot {
    /// Effect identifier (sentinel 0 = empty slot).
    pub effect: EffectId,
    /// Rounds remaining before the effect expires.
    pub remaining: u16,
    /// Effect-specific numeric parameter.
    pub param: i32,
}

impl EffectSlot {
    /// Create an active effect entry.
    pub const fn new(effect: EffectId, remaining: u16, param: i32) -> Self {
        Self { effect, remaining, param }
    }
}

impl SlotEntry for EffectSlot {
    #[inline]
    fn is_empty(&self) -> bool {
        self.effect.is_empty()
    }

    #[inline]
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Count active entries: index of the first sentinel, or full length.
///
/// The contiguity invariant makes this scan exact; it is the only source
/// of truth for the active count.
pub fn count_active<T: SlotEntry>(slots: &[T]) -> usize {
    slots
        .iter()
        .position(SlotEntry::is_empty)
        .unwrap_or(slots.len())
}

// =============================================================================
// EFFECT QUEUES
// =============================================================================

/// The three effect queues, distinguished by permanence semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectQueue {
    /// Applied each round to the throwaway public view only.
    Public,
    /// Applied each round to private state, permanently.
    EndOfRound,
    /// Payload lands on private state only on the expiry round.
    OnEnd,
}

/// Opaque 64-tile grid, stored row-major as 8 rows of 8 bytes.
pub type TileGrid = [[u8; MAP_SIDE]; MAP_SIDE];

/// Opaque signing credential. Owned by the state but never inspected by
/// the engine; zeroed out of the public view before serialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub struct SigningCredential(pub [u8; 32]);

// =============================================================================
// PLAYER STATE
// =============================================================================

/// Complete per-player state, exclusively owned by that player's engine.
///
/// Created once at match start, mutated every round only through the round
/// driver, fixed in shape for the whole match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Player identity.
    pub id: PlayerId,

    /// Character archetype.
    pub class: CharacterClass,

    /// Combat statistics.
    pub stats: Stats,

    /// Fixed spell table.
    pub spell_slots: [SpellSlot; MAX_SPELL_SLOTS],

    /// Effects applied to the public view only.
    pub public_effects: [EffectSlot; MAX_EFFECT_SLOTS],

    /// Effects applied permanently at end of round.
    pub end_of_round_effects: [EffectSlot; MAX_EFFECT_SLOTS],

    /// Effects whose payload lands only on their expiry round.
    pub on_end_effects: [EffectSlot; MAX_EFFECT_SLOTS],

    /// Tile grid, opaque beyond storage and hashing.
    pub map: TileGrid,

    /// Monotonically increasing round counter.
    pub turn: u32,

    /// Rolling seed driving all pseudo-randomness.
    pub seed: Seed,

    /// Opaque signing credential.
    pub credential: SigningCredential,
}

impl PlayerState {
    /// Create a baseline state for a player.
    ///
    /// Class-specific starting stats and granted spells come from the
    /// external class registry; this constructor only fixes the shape.
    pub fn new(id: PlayerId, class: CharacterClass, match_id: &[u8; 16]) -> Self {
        Self {
            id,
            class,
            stats: Stats::default(),
            spell_slots: [SpellSlot::default(); MAX_SPELL_SLOTS],
            public_effects: [EffectSlot::default(); MAX_EFFECT_SLOTS],
            end_of_round_effects: [EffectSlot::default(); MAX_EFFECT_SLOTS],
            on_end_effects: [EffectSlot::default(); MAX_EFFECT_SLOTS],
            map: [[0; MAP_SIDE]; MAP_SIDE],
            turn: 0,
            seed: Seed::from_match_id(match_id),
            credential: SigningCredential::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Spell table management
    // -------------------------------------------------------------------------

    /// Append a spell at the first free slot.
    ///
    /// Fails with [`EngineError::SpellSlotsFull`] when all slots are taken.
    pub fn push_spell(&mut self, entry: SpellSlot) -> Result<(), EngineError> {
        let n = count_active(&self.spell_slots);
        if n == MAX_SPELL_SLOTS {
            return Err(EngineError::SpellSlotsFull);
        }
        self.spell_slots[n] = entry;
        Ok(())
    }

    /// Remove a spell by id via swap-with-last; no-op when absent.
    pub fn remove_spell(&mut self, spell: SpellId) {
        let n = count_active(&self.spell_slots);
        if let Some(hit) = self.spell_slots[..n].iter().position(|s| s.spell == spell) {
            self.spell_slots[hit] = self.spell_slots[n - 1];
            self.spell_slots[n - 1].clear();
        }
    }

    /// Find the slot holding a spell, if granted.
    pub fn find_spell_slot_mut(&mut self, spell: SpellId) -> Option<&mut SpellSlot> {
        let n = count_active(&self.spell_slots);
        self.spell_slots[..n].iter_mut().find(|s| s.spell == spell)
    }

    // -------------------------------------------------------------------------
    // Effect queue management
    // -------------------------------------------------------------------------

    /// Select a queue by tag.
    pub fn queue(&self, which: EffectQueue) -> &[EffectSlot; MAX_EFFECT_SLOTS] {
        match which {
            EffectQueue::Public => &self.public_effects,
            EffectQueue::EndOfRound => &self.end_of_round_effects,
            EffectQueue::OnEnd => &self.on_end_effects,
        }
    }

    /// Select a queue mutably by tag.
    pub fn queue_mut(&mut self, which: EffectQueue) -> &mut [EffectSlot; MAX_EFFECT_SLOTS] {
        match which {
            EffectQueue::Public => &mut self.public_effects,
            EffectQueue::EndOfRound => &mut self.end_of_round_effects,
            EffectQueue::OnEnd => &mut self.on_end_effects,
        }
    }

    /// Insert an effect at the first empty slot, at most once.
    ///
    /// Silent no-op when `should_add` is false or the queue is full: both
    /// are contract behavior, not errors. (The original used a
    /// data-oblivious full scan; an early-exit scan is observably
    /// identical.)
    pub fn push_effect(&mut self, which: EffectQueue, entry: EffectSlot, should_add: bool) {
        if !should_add {
            return;
        }
        let slots = self.queue_mut(which);
        let n = count_active(slots);
        if n < MAX_EFFECT_SLOTS {
            slots[n] = entry;
        }
    }

    /// Remove an effect by id via swap-with-last.
    ///
    /// The last-active slot is sentinel-zeroed even when the id is not
    /// found — carried-over behavior, kept deliberately (a miss drops the
    /// most recently compacted entry). Deterministic either way.
    pub fn remove_effect(&mut self, which: EffectQueue, effect: EffectId) {
        let slots = self.queue_mut(which);
        let n = count_active(slots);
        if n == 0 {
            return;
        }
        if let Some(hit) = slots[..n].iter().position(|s| s.effect == effect) {
            slots[hit] = slots[n - 1];
        }
        slots[n - 1].clear();
    }

    // -------------------------------------------------------------------------
    // Hashing
    // -------------------------------------------------------------------------

    /// Fold the entire state into a hasher, field by field.
    ///
    /// Sentinel slots are hashed too: the commitment binds the full fixed
    /// shape, not just the active prefix.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_uuid(&self.id.0);
        hasher.update_u8(self.class as u8);

        hasher.update_i32(self.stats.hp);
        hasher.update_i32(self.stats.max_hp);
        hasher.update_u8(self.stats.position.coord.x);
        hasher.update_u8(self.stats.position.coord.y);
        hasher.update_bool(self.stats.position.known);
        hasher.update_i32(self.stats.speed);
        hasher.update_i32(self.stats.attack);
        hasher.update_i32(self.stats.defense);
        hasher.update_i32(self.stats.crit_chance);
        hasher.update_i32(self.stats.dodge_chance);
        hasher.update_i32(self.stats.accuracy);

        for slot in &self.spell_slots {
            hasher.update_u32(slot.spell.0);
            hasher.update_u16(slot.base_cooldown);
            hasher.update_u16(slot.current_cooldown);
        }

        for queue in [&self.public_effects, &self.end_of_round_effects, &self.on_end_effects] {
            for slot in queue {
                hasher.update_u32(slot.effect.0);
                hasher.update_u16(slot.remaining);
                hasher.update_i32(slot.param);
            }
        }

        for row in &self.map {
            hasher.update_bytes(row);
        }

        hasher.update_u32(self.turn);
        hasher.update_bytes(&self.seed.0);
        hasher.update_bytes(&self.credential.0);
    }

    /// Compute the commitment binding this entire state.
    pub fn commitment(&self) -> StateHash {
        let mut hasher = StateHasher::for_player_state();
        self.hash_into(&mut hasher);
        hasher.finalize()
    }
}

// =============================================================================
// TESTS
// =============================================================================
