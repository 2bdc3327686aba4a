// SPDX-License-Identifier: Apache-2.0

//! Chained hash table that enforces one arena index per structural key.
//!
//! Both engines hash-cons through this table: the ROBDD builder keys on
//! `(variable, low, high)` and the automaton minimizer keys on the
//! canonicalized successor pair plus the final flag. The caller computes the
//! hash by composing ids with Cantor's pairing function and must follow the
//! `lookup`-then-`insert` discipline: `insert` appends unconditionally and
//! does not dedupe.

/// Fixed bucket count. A prime spreads Cantor-composed ids better than a
/// power of two, because id products are not uniformly distributed.
pub const TABLE_BUCKETS: usize = 14593;

/// Cantor's pairing function `p(i, j) = ((i + j)(i + j + 1)) / 2 + i`.
///
/// Wrapping arithmetic: large id ranges can push the product past 64 bits,
/// and the table needs determinism, not bijectivity.
pub fn cantor_pair(i: u64, j: u64) -> u64 {
    let s = i.wrapping_add(j);
    (s.wrapping_mul(s.wrapping_add(1)) / 2).wrapping_add(i)
}

/// Composes a triple as `p(v, p(a, b))`.
pub fn cantor_triple(v: u64, a: u64, b: u64) -> u64 {
    cantor_pair(v, cantor_pair(a, b))
}

/// Hash table from a structural key to an arena index, with external chains
/// per bucket.
pub struct UniqueTable<K> {
    buckets: Vec<Vec<(K, usize)>>,
    collisions: usize,
    len: usize,
}

impl<K: Copy + Eq> UniqueTable<K> {
    pub fn new() -> Self {
        Self::with_buckets(TABLE_BUCKETS)
    }

    pub fn with_buckets(bucket_count: usize) -> Self {
        assert!(bucket_count > 0, "unique table needs at least one bucket");
        Self {
            buckets: (0..bucket_count).map(|_| Vec::new()).collect(),
            collisions: 0,
            len: 0,
        }
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// Returns the arena index stored for `key`, if present. Amortized
    /// constant; worst case linear in the chain length.
    pub fn lookup(&self, hash: u64, key: &K) -> Option<usize> {
        self.buckets[self.bucket_of(hash)]
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, index)| *index)
    }

    /// Appends to the chain at `hash`. The caller must have just verified
    /// absence via [`lookup`](Self::lookup).
    pub fn insert(&mut self, hash: u64, key: K, index: usize) {
        let bucket = self.bucket_of(hash);
        let chain = &mut self.buckets[bucket];
        debug_assert!(
            chain.iter().all(|(k, _)| k != &key),
            "insert without a prior failed lookup"
        );
        if !chain.is_empty() {
            self.collisions += 1;
        }
        chain.push((key, index));
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of inserts that landed in a non-empty bucket.
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

impl<K: Copy + Eq> Default for UniqueTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cantor_pair_known_values() {
        assert_eq!(cantor_pair(0, 0), 0);
        assert_eq!(cantor_pair(1, 0), 2);
        assert_eq!(cantor_pair(0, 1), 1);
        assert_eq!(cantor_pair(1, 2), 7);
        assert_eq!(cantor_pair(2, 1), 8);
    }

    #[test]
    fn test_cantor_pair_injective_on_small_range() {
        let mut seen = std::collections::HashSet::new();
        for i in 0..64u64 {
            for j in 0..64u64 {
                assert!(seen.insert(cantor_pair(i, j)), "collision at ({}, {})", i, j);
            }
        }
    }

    #[test]
    fn test_lookup_then_insert() {
        let mut table: UniqueTable<(usize, usize, usize)> = UniqueTable::new();
        let key = (1, 0, 1);
        let hash = cantor_triple(1, 0, 1);
        assert_eq!(table.lookup(hash, &key), None);
        table.insert(hash, key, 2);
        assert_eq!(table.lookup(hash, &key), Some(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_chain_survives_bucket_collision() {
        // Two buckets force every second insert to chain.
        let mut table: UniqueTable<u64> = UniqueTable::with_buckets(2);
        for k in 0..10u64 {
            table.insert(k, k, k as usize);
        }
        for k in 0..10u64 {
            assert_eq!(table.lookup(k, &k), Some(k as usize));
        }
        assert_eq!(table.collisions(), 8);
    }
}
