//! cdb key hash
//!
//! `h = 5381; h = ((h << 5) + h) ^ c` for every byte, in wrapping 32-bit
//! arithmetic. Fixed by the file format: the builder used the same function.

use std::hash::Hasher;

/// Initial value of the hash state
pub const HASH_SEED: u32 = 5381;

/// Hash `key` the way cdb files are indexed
pub fn cdb_hash(key: &[u8]) -> u32 {
    let mut hasher = CdbHasher::new();
    hasher.write(key);
    hasher.value()
}

/// Streaming form of [`cdb_hash`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdbHasher(u32);

impl CdbHasher {
    pub fn new() -> Self {
        Self(HASH_SEED)
    }

    /// The 32-bit hash of everything written so far
    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = HASH_SEED;
    }
}

impl Default for CdbHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for CdbHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &c in bytes {
            self.0 = (self.0 << 5).wrapping_add(self.0) ^ u32::from(c);
        }
    }

    fn finish(&self) -> u64 {
        u64::from(self.0)
    }
}
