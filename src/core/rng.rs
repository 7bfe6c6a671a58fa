//! Rolling-Seed Randomness
//!
//! All pseudo-randomness in the engine derives from a per-player rolling
//! SHA-256 seed chain. The seed is folded forward once per round from the
//! round's spell casts (see the round driver), so every participant that
//! replays the same batch draws the same values.
//!
//! Drawing a percentage is a *pure* function of the current seed: calling
//! it twice without an intervening fold returns the same value. Call sites
//! that want correlated rolls (hit check + crit check) rely on this.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

use super::hash::StateHash;

/// Domain separator for seed evolution.
pub const SEED_DOMAIN: &[u8] = b"SPELLCLASH_SEED_V1";

/// Domain separator for percentage draws.
pub const ROLL_DOMAIN: &[u8] = b"SPELLCLASH_ROLL_V1";

/// Rolling 256-bit seed.
///
/// # Determinism Guarantee
///
/// Folding the same inputs in the same order from the same starting seed
/// produces an identical seed on any platform. Draws read the seed without
/// advancing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub struct Seed(pub [u8; 32]);

impl Seed {
    /// Create a seed from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an initial seed from a match identifier.
    pub fn from_match_id(match_id: &[u8; 16]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(SEED_DOMAIN);
        hasher.update(match_id);
        Self(hasher.finalize().into())
    }

    /// Fold the round counter into the seed.
    ///
    /// Run once at the top of every round so that rounds with empty cast
    /// batches still draw fresh values.
    pub fn fold_turn(&mut self, turn: u32) {
        let mut hasher = Sha256::new();
        hasher.update(SEED_DOMAIN);
        hasher.update(self.0);
        hasher.update(turn.to_le_bytes());
        self.0 = hasher.finalize().into();
    }

    /// Fold the hash of one spell cast into the seed.
    pub fn fold_cast(&mut self, cast_hash: &StateHash) {
        let mut hasher = Sha256::new();
        hasher.update(SEED_DOMAIN);
        hasher.update(self.0);
        hasher.update(cast_hash);
        self.0 = hasher.finalize().into();
    }

    /// Draw a bounded pseudo-random percentage in `[0, 99]`.
    ///
    /// Hashes the current seed, takes the low-order 10 bits of the digest
    /// (last two bytes, masked), and reduces modulo 100. Does not advance
    /// the seed.
    pub fn draw_percentage(&self) -> i32 {
        let mut hasher = Sha256::new();
        hasher.update(ROLL_DOMAIN);
        hasher.update(self.0);
        let digest: [u8; 32] = hasher.finalize().into();

        let low = u16::from_le_bytes([digest[30], digest[31]]) & 0x03FF;
        i32::from(low % 100)
    }
}

// =============================================================================
// TESTS
// =============================================================================
