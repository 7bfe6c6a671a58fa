//! State Hashing for Commitments
//!
//! Provides deterministic hashing of engine state for:
//! - Per-round state commitments exchanged between participants
//! - The stable spell/effect identifier space
//! - Replay validation

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Domain separator for state commitments.
pub const STATE_DOMAIN: &[u8] = b"SPELLCLASH_STATE_V1";

/// Domain separator for spell-cast hashing (seed evolution).
pub const CAST_DOMAIN: &[u8] = b"SPELLCLASH_CAST_V1";

/// Domain separator for the name-derived identifier space.
pub const ID_DOMAIN: &[u8] = b"SPELLCLASH_ID_V1";

/// Deterministic hasher for engine state.
///
/// Wraps SHA-256 with helpers for the engine's scalar types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for a player-state commitment.
    pub fn for_player_state() -> Self {
        Self::new(STATE_DOMAIN)
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u16 value (little-endian).
    #[inline]
    pub fn update_u16(&mut self, value: u16) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with a UUID (16 bytes).
    #[inline]
    pub fn update_uuid(&mut self, uuid: &[u8; 16]) {
        self.hasher.update(uuid);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute a simple hash of arbitrary data.
pub fn hash_bytes(data: &[u8]) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute hash with domain separator.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive a stable 32-bit identifier from a registry name.
///
/// Spell and effect ids are the low 4 bytes (little-endian) of a
/// domain-separated SHA-256 over the name, computed once at registry
/// construction. Zero is reserved as the empty-slot sentinel, so a
/// digest that lands on it is remapped to 1.
pub fn id_from_name(name: &str) -> u32 {
    let digest = hash_with_domain(ID_DOMAIN, name.as_bytes());
    let id = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    if id == 0 { 1 } else { id }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_player_state();
            hasher.update_u32(100);
            hasher.update_u64(12345);
            hasher.update_i32(-42);
            hasher.update_bool(true);
            hasher.finalize()
        };

        let hash1 = make_hash();
        let hash2 = make_hash();

        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_domain_separation() {
        let data = [1u8, 2, 3, 4];

        let hash1 = hash_with_domain(b"DOMAIN_A", &data);
        let hash2 = hash_with_domain(b"DOMAIN_B", &data);

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_id_from_name_stable() {
        let id1 = id_from_name("fireball");
        let id2 = id_from_name("fireball");
        assert_eq!(id1, id2);
        assert_ne!(id1, 0, "ids never collide with the empty sentinel");
        assert_ne!(id_from_name("fireball"), id_from_name("cleave"));
    }
}
