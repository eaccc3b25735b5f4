//! A hash table of integer keys and values. Collisions are resolved by
//! chaining, and the bucket array doubles or halves to keep chains short.

use std::fmt;

use log::{debug, trace, warn};

use crate::error::TableError;
use crate::linked_list::{self, LinkedList};
use crate::multiplicative_hasher::MultiplicativeHasher;
use crate::{Key, Value};

/// Buckets in a table made with [`HashTable::new`].
pub const DEFAULT_CAPACITY: usize = 8;

/// The table never shrinks below this many buckets.
pub const MIN_CAPACITY: usize = 8;

/// What `insert` does with a key that is already in the table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Overwrite the stored value and hand back the old one.
    #[default]
    Replace,

    /// Push a second entry for the key. Lookups and removals only ever see
    /// the most recent one until it is removed, at which point the older one
    /// shows through again.
    Shadow,
}

/// One key-value pair in a chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Entry {
    key: Key,
    value: Value,
}

/// A separately chained hash table from [`Key`] to [`Value`].
///
/// The table grows to twice its capacity when an insert finds it at least
/// half full, and halves when a removal leaves it less than an eighth full,
/// never going below [`MIN_CAPACITY`] buckets.
pub struct HashTable {
    buckets: Vec<LinkedList<Entry>>,
    hasher: MultiplicativeHasher,
    /// Entries across all buckets.
    size: usize,
    /// Inserting at this size grows the table first. Always capacity / 2.
    threshold: usize,
    policy: DuplicatePolicy,
}

/// The entries of one bucket, most recently inserted first.
#[derive(Clone)]
pub struct BucketIter<'a> {
    inner: linked_list::Iter<'a, Entry>,
}

impl HashTable {
    /// Makes an empty table with [`DEFAULT_CAPACITY`] buckets.
    pub fn new() -> Self {
        Self::from_buckets(empty_buckets(DEFAULT_CAPACITY), DuplicatePolicy::default())
    }

    /// Makes an empty table with a specific number of buckets.
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Self::with_capacity_and_policy(capacity, DuplicatePolicy::default())
    }

    /// Makes an empty table with a specific number of buckets and a policy for
    /// duplicate keys.
    pub fn with_capacity_and_policy(
        capacity: usize,
        policy: DuplicatePolicy,
    ) -> Result<Self, TableError> {
        if capacity < MIN_CAPACITY {
            return Err(TableError::CapacityTooSmall {
                requested: capacity,
                minimum: MIN_CAPACITY,
            });
        }

        Ok(Self::from_buckets(try_empty_buckets(capacity)?, policy))
    }

    fn from_buckets(buckets: Vec<LinkedList<Entry>>, policy: DuplicatePolicy) -> Self {
        let capacity = buckets.len();
        Self {
            buckets,
            hasher: MultiplicativeHasher::new(capacity),
            size: 0,
            threshold: capacity / 2,
            policy,
        }
    }

    /// The number of entries in the table.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// The size at which the next insert grows the table.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Inserts a key-value pair. Under [`DuplicatePolicy::Replace`] this
    /// returns the previous value if the key was already present.
    ///
    /// Fails only if the table can't allocate the storage it needs, in which
    /// case the pair is not inserted and every existing entry is untouched.
    pub fn insert(&mut self, key: Key, value: Value) -> Result<Option<Value>, TableError> {
        if self.policy == DuplicatePolicy::Replace {
            if let Some(entry) = self.entry_mut(key) {
                let previous = std::mem::replace(&mut entry.value, value);
                trace!("Replaced value for key {}", key);
                return Ok(Some(previous));
            }
        }

        // grow before placing, so the new entry is hashed under the new
        // capacity
        if self.size >= self.threshold {
            // an array this large fails in try_reserve long before saturating
            self.resize(self.capacity().saturating_mul(2))?;
        }

        let idx = self.hasher.bucket(key);
        self.buckets[idx].push(Entry { key, value })?;
        self.size += 1;
        trace!("Inserted key {} into bucket {}", key, idx);

        #[cfg(test)]
        self.consistency_test();

        Ok(None)
    }

    /// Gets the value stored for a key.
    pub fn get(&self, key: Key) -> Option<Value> {
        let chain = &self.buckets[self.hasher.bucket(key)];
        let node = chain.find(|e| e.key == key)?;
        chain.get(node).map(|e| e.value)
    }

    /// Gets a mutable reference to the value stored for a key.
    pub fn get_mut(&mut self, key: Key) -> Option<&mut Value> {
        self.entry_mut(key).map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key, returning its value if it was there. Removing a missing
    /// key changes nothing, though the table may still shrink afterwards if it
    /// is oversized.
    pub fn remove(&mut self, key: Key) -> Option<Value> {
        let idx = self.hasher.bucket(key);
        let chain = &mut self.buckets[idx];
        let removed = chain
            .find(|e| e.key == key)
            .map(|node| chain.remove_node(node).value);

        if removed.is_some() {
            self.size -= 1;
            trace!("Removed key {} from bucket {}", key, idx);
        }

        if self.size < self.threshold / 4 && self.capacity() > MIN_CAPACITY {
            let shrunk = (self.capacity() / 2).max(MIN_CAPACITY);

            // the removal already happened; a table that stays too big is
            // still a valid table
            if let Err(e) = self.resize(shrunk) {
                warn!(
                    "Keeping {} buckets, shrinking to {} failed: {}",
                    self.capacity(),
                    shrunk,
                    e
                );
            }
        }

        #[cfg(test)]
        self.consistency_test();

        removed
    }

    /// Drops every entry and goes back to [`MIN_CAPACITY`] buckets.
    pub fn clear(&mut self) {
        if self.capacity() == MIN_CAPACITY {
            self.buckets.iter_mut().for_each(LinkedList::clear);
        } else {
            self.buckets = empty_buckets(MIN_CAPACITY);
            self.hasher = MultiplicativeHasher::new(MIN_CAPACITY);
        }

        self.size = 0;
        self.threshold = MIN_CAPACITY / 2;
    }

    /// Every bucket in index order, paired with its entries.
    pub fn buckets(&self) -> impl Iterator<Item = (usize, BucketIter<'_>)> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .map(|(idx, chain)| (idx, BucketIter { inner: chain.iter() }))
    }

    /// Every entry in the table, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = (Key, Value)> + '_ {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter())
            .map(|e| (e.key, e.value))
    }

    fn entry_mut(&mut self, key: Key) -> Option<&mut Entry> {
        let chain = &mut self.buckets[self.hasher.bucket(key)];
        let node = chain.find(|e| e.key == key)?;
        chain.get_mut(node)
    }

    /// Rehashes every entry into a fresh array of `new_capacity` buckets. The
    /// old array is only replaced once every entry has a new home, so a failed
    /// allocation leaves the table as it was.
    fn resize(&mut self, new_capacity: usize) -> Result<(), TableError> {
        let hasher = MultiplicativeHasher::new(new_capacity);
        let mut buckets = try_empty_buckets(new_capacity)?;

        for entry in self.buckets.iter().flat_map(|chain| chain.iter()) {
            buckets[hasher.bucket(entry.key)].push(*entry)?;
        }

        debug!(
            "Resized table from {} to {} buckets ({} entries)",
            self.capacity(),
            new_capacity,
            self.size
        );

        self.buckets = buckets;
        self.hasher = hasher;
        self.threshold = new_capacity / 2;

        Ok(())
    }

    /// Checks the bookkeeping against what's actually in the chains.
    #[cfg(test)]
    fn consistency_test(&self) {
        assert!(self.capacity() >= MIN_CAPACITY);
        assert_eq!(self.capacity(), self.hasher.capacity());
        assert_eq!(self.capacity() / 2, self.threshold);

        let mut count = 0;

        for (idx, chain) in self.buckets.iter().enumerate() {
            chain.continuity_test();

            for entry in chain.iter() {
                assert_eq!(idx, self.hasher.bucket(entry.key), "key {} misplaced", entry.key);
                count += 1;
            }
        }

        assert_eq!(self.size, count);
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HashTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, bucket) in self.buckets() {
            write!(f, "Bucket {}: ", idx)?;
            for (key, value) in bucket {
                write!(f, "({}, {}) ", key, value)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Debug for HashTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a> Iterator for BucketIter<'a> {
    type Item = (Key, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (e.key, e.value))
    }
}

fn empty_buckets(capacity: usize) -> Vec<LinkedList<Entry>> {
    std::iter::repeat_with(LinkedList::new).take(capacity).collect()
}

#[cfg(test)]
thread_local! {
    /// Makes every fallible bucket array allocation on this thread fail.
    static FAIL_BUCKET_ALLOCATION: std::cell::Cell<bool> = std::cell::Cell::new(false);
}

fn try_empty_buckets(capacity: usize) -> Result<Vec<LinkedList<Entry>>, TableError> {
    let mut buckets = Vec::new();

    #[cfg(test)]
    {
        if FAIL_BUCKET_ALLOCATION.with(|fail| fail.get()) {
            // more than isize::MAX bytes, which try_reserve always refuses
            buckets.try_reserve_exact(usize::MAX)?;
        }
    }

    buckets.try_reserve_exact(capacity)?;
    buckets.resize_with(capacity, LinkedList::new);
    Ok(buckets)
}
