//! Reversible bitset backed by 64-bit words.
//!
//! Undo granularity is one word: the first write touching a word in a given
//! world saves the whole word, further writes to it in the same world are
//! free. Dense propagator state (watched sets, instantiated-variable masks)
//! gets near-zero trailing overhead this way.

use crate::trail::Env;

/// A trailed fixed-capacity bitset.
#[derive(Debug, Clone)]
pub struct ReversibleBitSet {
    env: Env,
    index: usize,
    nbits: usize,
}

impl ReversibleBitSet {
    pub(crate) fn new(env: Env, index: usize, nbits: usize) -> Self {
        Self { env, index, nbits }
    }

    /// Number of bits this set was allocated with.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nbits
    }

    /// Reads bit `bit`. Out-of-range bits read as clear.
    #[inline]
    pub fn get(&self, bit: usize) -> bool {
        self.env.bit(self.index, bit)
    }

    /// Sets bit `bit`.
    ///
    /// # Panics
    ///
    /// Panics if `bit` is out of range.
    pub fn set(&self, bit: usize) {
        assert!(bit < self.nbits, "bit {bit} out of range 0..{}", self.nbits);
        self.env.write_bit(self.index, bit, true);
    }

    /// Clears bit `bit`.
    ///
    /// # Panics
    ///
    /// Panics if `bit` is out of range.
    pub fn clear(&self, bit: usize) {
        assert!(bit < self.nbits, "bit {bit} out of range 0..{}", self.nbits);
        self.env.write_bit(self.index, bit, false);
    }

    /// Number of set bits.
    pub fn cardinality(&self) -> u32 {
        self.env.bit_count(self.index)
    }
}
