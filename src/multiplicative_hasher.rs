//! Multiplicative hashing. A key picks its bucket from the fractional part of
//! the key times an irrational constant, scaled up to the bucket count. There
//! is no modulo anywhere, so the spread comes from the constant alone.

use crate::Key;

/// The fractional part of the golden ratio.
pub const GOLDEN_RATIO_FRACTION: f64 = 0.6180339887;

/// Maps keys onto `0..capacity`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MultiplicativeHasher {
    capacity: usize,
}

impl MultiplicativeHasher {
    /// Makes a hasher for a table with `capacity` buckets, which must be at
    /// least one.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The bucket `key` belongs in.
    pub fn bucket(&self, key: Key) -> usize {
        let product = GOLDEN_RATIO_FRACTION * key as f64;

        // floor rather than truncation keeps this in [0, 1) for negative keys
        let frac = product - product.floor();

        // frac can round up to exactly 1.0 when product is a tiny negative
        // number, which would land one past the last bucket
        let idx = (self.capacity as f64 * frac) as usize;
        idx.min(self.capacity - 1)
    }
}
