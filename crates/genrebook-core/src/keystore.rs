//! # Key Store
//!
//! Resizable chained hash table mapping integer ids to owned records.
//!
//! Entries live in one contiguous slot vector; each bucket holds the index
//! of the first slot of its chain and every slot links to the next one.
//! Resizing only rewrites bucket heads and `next` links, so records are
//! never copied and the only allocation is the new head vector.
//!
//! ## Sizing
//!
//! - Insert grows the table (`GROWTH_FACTOR`) when occupancy has reached
//!   the bucket count.
//! - Remove shrinks it when occupancy drops to `1 / SHRINK_DIVISOR` of the
//!   bucket count, never below the floor.
//! - A failed allocation leaves the store exactly as it was.

use crate::primitives::{GROWTH_FACTOR, INITIAL_BUCKETS, SHRINK_DIVISOR};
use crate::{GenreId, KeyStoreError, SongId};

// =============================================================================
// STORE KEY
// =============================================================================

/// Integer-like key accepted by a `KeyStore`.
pub trait StoreKey: Copy + Eq {
    /// The integer the bucket index is derived from.
    fn raw(self) -> i64;
}

impl StoreKey for SongId {
    fn raw(self) -> i64 {
        i64::from(self.0)
    }
}

impl StoreKey for GenreId {
    fn raw(self) -> i64 {
        i64::from(self.0)
    }
}

impl StoreKey for i32 {
    fn raw(self) -> i64 {
        i64::from(self)
    }
}

impl StoreKey for i64 {
    fn raw(self) -> i64 {
        self
    }
}

/// Bucket index of `key` in a table of `buckets` buckets.
///
/// Euclidean remainder keeps negative keys in range.
fn bucket_of<K: StoreKey>(key: K, buckets: usize) -> usize {
    key.raw().rem_euclid(buckets as i64) as usize
}

// =============================================================================
// KEY STORE
// =============================================================================

#[derive(Debug, Clone)]
struct Slot<K, V> {
    key: K,
    value: V,
    next: Option<usize>,
}

/// Chained hash table from `K` to owned `V`.
///
/// The caller guarantees that `insert` is only called for absent keys.
#[derive(Debug, Clone)]
pub struct KeyStore<K, V> {
    /// Bucket heads: index of the first slot of each chain.
    heads: Vec<Option<usize>>,
    /// Entry storage, unordered.
    slots: Vec<Slot<K, V>>,
    /// Initial bucket count and shrink floor.
    floor: usize,
    /// Maximum number of entries, if bounded.
    limit: Option<usize>,
}

impl<K: StoreKey, V> Default for KeyStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StoreKey, V> KeyStore<K, V> {
    /// Create an empty store with `INITIAL_BUCKETS` buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::with_floor(INITIAL_BUCKETS)
    }

    /// Create an empty store with `floor` buckets (at least one).
    ///
    /// The store never shrinks below `floor`.
    #[must_use]
    pub fn with_floor(floor: usize) -> Self {
        let floor = floor.max(1);
        Self {
            heads: vec![None; floor],
            slots: Vec::new(),
            floor,
            limit: None,
        }
    }

    /// Bound the number of entries. Inserting past the bound fails with
    /// `KeyStoreError::AllocationError`.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current number of buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    /// Look up `key` without mutating the store.
    #[must_use]
    pub fn find(&self, key: K) -> Option<&V> {
        self.position(key).map(|slot| &self.slots[slot].value)
    }

    /// Look up `key` for in-place update of its record.
    pub fn find_mut(&mut self, key: K) -> Option<&mut V> {
        self.position(key).map(|slot| &mut self.slots[slot].value)
    }

    /// Check whether `key` is stored.
    #[must_use]
    pub fn contains_key(&self, key: K) -> bool {
        self.position(key).is_some()
    }

    /// Iterate over all entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.slots.iter().map(|slot| (slot.key, &slot.value))
    }

    /// Make room for `additional` inserts.
    ///
    /// After a successful call the next `additional` inserts cannot fail.
    /// On error nothing observable has changed.
    pub fn reserve(&mut self, additional: usize) -> Result<(), KeyStoreError> {
        let wanted = self
            .slots
            .len()
            .checked_add(additional)
            .ok_or(KeyStoreError::AllocationError)?;
        if self.limit.is_some_and(|limit| wanted > limit) {
            return Err(KeyStoreError::AllocationError);
        }

        self.slots
            .try_reserve(additional)
            .map_err(|_| KeyStoreError::AllocationError)?;

        // An insert grows when occupancy has reached the bucket count, so
        // `wanted` entries fit without growth once `wanted <= buckets`.
        let mut target = self.heads.len();
        while target < wanted {
            target = target
                .checked_mul(GROWTH_FACTOR)
                .ok_or(KeyStoreError::AllocationError)?;
        }
        if target != self.heads.len() {
            self.rehash(target)?;
        }
        Ok(())
    }

    /// Insert `value` under `key`. The key must be absent.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), KeyStoreError> {
        debug_assert!(!self.contains_key(key), "insert of a present key");
        self.reserve(1)?;

        let bucket = bucket_of(key, self.heads.len());
        let slot = self.slots.len();
        self.slots.push(Slot {
            key,
            value,
            next: self.heads[bucket],
        });
        self.heads[bucket] = Some(slot);
        Ok(())
    }

    /// Remove `key` and return its record.
    ///
    /// Fails with `KeyStoreError::KeyNotFound` if absent. May shrink the
    /// table; a shrink that cannot allocate is skipped.
    pub fn remove(&mut self, key: K) -> Result<V, KeyStoreError> {
        let bucket = bucket_of(key, self.heads.len());

        let mut prev = None;
        let mut cursor = self.heads[bucket];
        while let Some(slot) = cursor {
            if self.slots[slot].key == key {
                break;
            }
            prev = cursor;
            cursor = self.slots[slot].next;
        }
        let target = cursor.ok_or(KeyStoreError::KeyNotFound)?;

        // Unlink the target from its chain
        let after = self.slots[target].next;
        match prev {
            Some(p) => self.slots[p].next = after,
            None => self.heads[bucket] = after,
        }

        // The last slot is about to move into `target`: repoint its link
        let last = self.slots.len() - 1;
        if target != last {
            self.redirect(last, target);
        }
        let removed = self.slots.swap_remove(target);

        self.maybe_shrink();
        Ok(removed.value)
    }

    /// Index of the slot holding `key`.
    fn position(&self, key: K) -> Option<usize> {
        let mut cursor = self.heads[bucket_of(key, self.heads.len())];
        while let Some(slot) = cursor {
            if self.slots[slot].key == key {
                return Some(slot);
            }
            cursor = self.slots[slot].next;
        }
        None
    }

    /// Replace the link that points at slot `from` with one pointing at `to`.
    fn redirect(&mut self, from: usize, to: usize) {
        let bucket = bucket_of(self.slots[from].key, self.heads.len());
        if self.heads[bucket] == Some(from) {
            self.heads[bucket] = Some(to);
            return;
        }
        let mut cursor = self.heads[bucket];
        while let Some(slot) = cursor {
            if self.slots[slot].next == Some(from) {
                self.slots[slot].next = Some(to);
                return;
            }
            cursor = self.slots[slot].next;
        }
    }

    fn maybe_shrink(&mut self) {
        let buckets = self.heads.len();
        if self.slots.len() > buckets / SHRINK_DIVISOR {
            return;
        }
        let target = (buckets / GROWTH_FACTOR).max(self.floor);
        if target < buckets && self.rehash(target).is_err() {
            tracing::trace!(buckets, target, "key store shrink skipped");
        }
    }

    /// Relink every slot into a fresh table of `buckets` buckets.
    fn rehash(&mut self, buckets: usize) -> Result<(), KeyStoreError> {
        let mut heads = Vec::new();
        heads
            .try_reserve_exact(buckets)
            .map_err(|_| KeyStoreError::AllocationError)?;
        heads.resize(buckets, None);

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let bucket = bucket_of(slot.key, buckets);
            slot.next = heads[bucket];
            heads[bucket] = Some(index);
        }

        tracing::trace!(
            old_buckets = self.heads.len(),
            new_buckets = buckets,
            entries = self.slots.len(),
            "key store resized"
        );
        self.heads = heads;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_find_remove() {
        let mut store: KeyStore<i32, &str> = KeyStore::new();
        store.insert(7, "seven").expect("insert");
        store.insert(24, "twenty-four").expect("insert");

        assert_eq!(store.find(7), Some(&"seven"));
        assert_eq!(store.find(24), Some(&"twenty-four"));
        assert_eq!(store.find(8), None);

        if let Some(value) = store.find_mut(24) {
            *value = "24";
        }
        assert_eq!(store.find(24), Some(&"24"));

        assert_eq!(store.remove(7).expect("remove"), "seven");
        assert_eq!(store.find(7), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_missing_key_fails() {
        let mut store: KeyStore<i32, u8> = KeyStore::new();
        store.insert(1, 1).expect("insert");

        assert_eq!(store.remove(2), Err(KeyStoreError::KeyNotFound));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn negative_keys_hash_in_range() {
        let mut store: KeyStore<i64, i64> = KeyStore::new();
        for key in [-1, -17, -18, i64::MIN, 0, 17] {
            store.insert(key, key).expect("insert");
        }
        assert_eq!(store.find(-17), Some(&-17));
        assert_eq!(store.find(i64::MIN), Some(&i64::MIN));
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn grows_when_occupancy_reaches_bucket_count() {
        let mut store: KeyStore<i32, i32> = KeyStore::new();
        for key in 1..=17 {
            store.insert(key, key).expect("insert");
        }
        assert_eq!(store.bucket_count(), 17);

        store.insert(18, 18).expect("insert");
        assert_eq!(store.bucket_count(), 34);
        for key in 1..=18 {
            assert_eq!(store.find(key), Some(&key));
        }
    }

    #[test]
    fn shrinks_at_quarter_but_not_below_floor() {
        let mut store: KeyStore<i32, i32> = KeyStore::new();
        for key in 1..=18 {
            store.insert(key, key).expect("insert");
        }
        assert_eq!(store.bucket_count(), 34);

        for key in 9..=18 {
            store.remove(key).expect("remove");
        }
        assert_eq!(store.len(), 8);
        assert_eq!(store.bucket_count(), 17);

        for key in 1..=8 {
            store.remove(key).expect("remove");
        }
        assert!(store.is_empty());
        assert_eq!(store.bucket_count(), 17);
    }

    #[test]
    fn removal_keeps_colliding_chains_intact() {
        // Same bucket for every key: 0, 17, 34, ...
        let mut store: KeyStore<i32, i32> = KeyStore::with_floor(17);
        let keys: Vec<i32> = (0..10).map(|k| k * 17).collect();
        for &key in &keys {
            store.insert(key, key + 1).expect("insert");
        }

        store.remove(0).expect("remove");
        store.remove(85).expect("remove");

        for &key in &keys {
            let expected = (key != 0 && key != 85).then_some(key + 1);
            assert_eq!(store.find(key).copied(), expected);
        }
        assert_eq!(store.iter().count(), 8);
    }

    #[test]
    fn limit_reports_allocation_error_without_mutation() {
        let mut store: KeyStore<i32, i32> = KeyStore::new().with_limit(Some(2));
        store.insert(1, 1).expect("insert");
        store.insert(2, 2).expect("insert");

        assert_eq!(store.insert(3, 3), Err(KeyStoreError::AllocationError));
        assert_eq!(store.len(), 2);
        assert!(!store.contains_key(3));
    }

    #[test]
    fn reserve_grows_ahead_of_inserts() {
        let mut store: KeyStore<i32, i32> = KeyStore::with_floor(4);
        store.reserve(9).expect("reserve");
        assert_eq!(store.bucket_count(), 16);

        for key in 0..9 {
            store.insert(key, key).expect("insert");
        }
        assert_eq!(store.bucket_count(), 16);
    }

    #[test]
    fn floor_of_zero_is_clamped() {
        let mut store: KeyStore<i32, ()> = KeyStore::with_floor(0);
        assert_eq!(store.bucket_count(), 1);
        store.insert(5, ()).expect("insert");
        store.insert(6, ()).expect("insert");
        assert_eq!(store.bucket_count(), 2);
    }
}
