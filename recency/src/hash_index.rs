use std::hash::{
    BuildHasher,
    Hash,
};

use tracing::debug;

use crate::RandomState;

/// Bucket count used by [`HashIndex::new`] and by the first insert into a
/// table created with zero buckets.
pub const INITIAL_BUCKETS: usize = 10;

/// Largest allowed ratio of entries to buckets. Inserting past it doubles the
/// bucket count.
pub const MAX_LOAD_FACTOR: usize = 2;

#[derive(Debug, Clone)]
struct Slot<K, V> {
    hash: u64,
    key: K,
    value: V,
}

fn bucket_for(hash: u64, bucket_count: usize) -> usize {
    debug_assert_ne!(bucket_count, 0, "Bucket count must not be zero");
    (hash % bucket_count as u64) as usize
}

/// A hash map with separate chaining.
///
/// Each bucket is a vector of slots kept in insertion order; a bucket only
/// allocates once something is inserted into it and gives its storage back
/// when it empties. The table doubles its bucket count whenever an insert
/// would push the load factor past [`MAX_LOAD_FACTOR`]. Slots cache their
/// key's hash, so growing never hashes a key twice.
///
/// Keys are hashed with the `S` [`BuildHasher`] and compared with [`Eq`].
///
/// # Examples
///
/// ```
/// use recency::HashIndex;
///
/// let mut index = HashIndex::with_buckets(2);
/// for i in 0..100 {
///     assert!(index.insert(i, i * 2).1);
/// }
/// assert!(index.bucket_count() > 2);
/// assert_eq!(index.get(&42), Some(&84));
///
/// // Inserting an existing key updates it in place.
/// let (value, inserted) = index.insert(42, 0);
/// assert_eq!((*value, inserted), (0, false));
/// assert_eq!(index.len(), 100);
/// ```
#[derive(Clone)]
pub struct HashIndex<K, V, S = RandomState> {
    buckets: Vec<Vec<Slot<K, V>>>,
    len: usize,
    hasher: S,
}

impl<K, V, S: Default> Default for HashIndex<K, V, S> {
    fn default() -> Self {
        Self::with_buckets_and_hasher(INITIAL_BUCKETS, S::default())
    }
}

impl<K, V> HashIndex<K, V, RandomState> {
    /// Creates an empty index with [`INITIAL_BUCKETS`] buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index with `bucket_count` buckets. Zero is allowed;
    /// the first insert allocates [`INITIAL_BUCKETS`].
    pub fn with_buckets(bucket_count: usize) -> Self {
        Self::with_buckets_and_hasher(bucket_count, RandomState::default())
    }
}

impl<K, V, S> HashIndex<K, V, S> {
    /// Creates an empty index that hashes keys with `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_buckets_and_hasher(INITIAL_BUCKETS, hasher)
    }

    /// Creates an empty index with `bucket_count` buckets that hashes keys
    /// with `hasher`.
    pub fn with_buckets_and_hasher(bucket_count: usize, hasher: S) -> Self {
        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, Vec::new);
        HashIndex {
            buckets,
            len: 0,
            hasher,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets in the table.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entries per bucket, `0.0` for a table without buckets.
    pub fn load_factor(&self) -> f64 {
        if self.buckets.is_empty() {
            0.0
        } else {
            self.len as f64 / self.buckets.len() as f64
        }
    }

    /// The hasher used for keys.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Drops every entry. The bucket count is kept.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = Vec::new();
        }
        self.len = 0;
    }

    /// Doubles the bucket count and redistributes every entry. A table with
    /// no buckets grows to [`INITIAL_BUCKETS`].
    pub fn expand(&mut self) {
        let bucket_count = match self.buckets.len() {
            0 => INITIAL_BUCKETS,
            count => count * 2,
        };
        debug!(
            from = self.buckets.len(),
            to = bucket_count,
            entries = self.len,
            "expanding hash index"
        );

        let mut buckets: Vec<Vec<Slot<K, V>>> = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, Vec::new);
        for slot in std::mem::take(&mut self.buckets).into_iter().flatten() {
            buckets[bucket_for(slot.hash, bucket_count)].push(slot);
        }
        self.buckets = buckets;
    }

    /// Iterates over all entries in bucket order. The order carries no
    /// meaning.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets
            .iter()
            .flatten()
            .map(|slot| (&slot.key, &slot.value))
    }

    /// Iterates over all entries with mutable access to the values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.buckets
            .iter_mut()
            .flatten()
            .map(|slot| (&slot.key, &mut slot.value))
    }

    /// Iterates over all keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    /// Iterates over all values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> HashIndex<K, V, S> {
    fn locate(&self, key: &K) -> Option<(usize, usize)> {
        self.locate_hashed(self.hasher.hash_one(key), key)
    }

    fn locate_hashed(&self, hash: u64, key: &K) -> Option<(usize, usize)> {
        if self.buckets.is_empty() {
            return None;
        }
        let bucket = bucket_for(hash, self.buckets.len());
        let offset = self.buckets[bucket]
            .iter()
            .position(|slot| slot.hash == hash && slot.key == *key)?;
        Some((bucket, offset))
    }

    /// Looks up `key`, returning the stored key and value.
    pub fn find(&self, key: &K) -> Option<(&K, &V)> {
        let (bucket, offset) = self.locate(key)?;
        let slot = &self.buckets[bucket][offset];
        Some((&slot.key, &slot.value))
    }

    /// Returns the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|(_, v)| v)
    }

    /// Returns the value stored for `key` mutably.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (bucket, offset) = self.locate(key)?;
        Some(&mut self.buckets[bucket][offset].value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).is_some()
    }

    /// Inserts `value` for `key`.
    ///
    /// If `key` is already present its value is overwritten in place and the
    /// returned flag is `false`. Otherwise the entry is appended to its
    /// bucket and the flag is `true`. Either way a reference to the stored
    /// value is returned.
    pub fn insert(&mut self, key: K, value: V) -> (&mut V, bool) {
        let hash = self.hasher.hash_one(&key);
        if let Some((bucket, offset)) = self.locate_hashed(hash, &key) {
            let slot = &mut self.buckets[bucket][offset];
            slot.value = value;
            return (&mut slot.value, false);
        }

        if self.buckets.is_empty() || self.len + 1 > MAX_LOAD_FACTOR * self.buckets.len() {
            self.expand();
        }

        let index = bucket_for(hash, self.buckets.len());
        let bucket = &mut self.buckets[index];
        let offset = bucket.len();
        bucket.push(Slot { hash, key, value });
        self.len += 1;
        (&mut bucket[offset].value, true)
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Removes `key` and returns the stored pair.
    pub fn take(&mut self, key: &K) -> Option<(K, V)> {
        let (bucket, offset) = self.locate(key)?;
        let slots = &mut self.buckets[bucket];
        let slot = slots.remove(offset);
        if slots.is_empty() {
            *slots = Vec::new();
        }
        self.len -= 1;
        Some((slot.key, slot.value))
    }

    #[cfg(all(debug_assertions, feature = "internal-debugging"))]
    #[doc(hidden)]
    pub fn debug_validate(&self) {
        let stored: usize = self.buckets.iter().map(Vec::len).sum();
        assert_eq!(stored, self.len, "Entry count out of sync with buckets");
        assert!(
            self.len <= MAX_LOAD_FACTOR * self.buckets.len(),
            "Load factor exceeded: {} entries in {} buckets",
            self.len,
            self.buckets.len()
        );

        for (index, bucket) in self.buckets.iter().enumerate() {
            for (offset, slot) in bucket.iter().enumerate() {
                assert_eq!(
                    slot.hash,
                    self.hasher.hash_one(&slot.key),
                    "Stale cached hash"
                );
                assert_eq!(
                    bucket_for(slot.hash, self.buckets.len()),
                    index,
                    "Entry stored in the wrong bucket"
                );
                assert!(
                    !bucket[..offset].iter().any(|other| other.key == slot.key),
                    "Duplicate key in bucket {index}"
                );
            }
        }
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, S> std::fmt::Debug for HashIndex<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Extend<(K, V)> for HashIndex<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Default> FromIterator<(K, V)> for HashIndex<K, V, S> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut index = HashIndex::default();
        index.extend(iter);
        index
    }
}
