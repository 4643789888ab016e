use std::{
    fmt::Display,
    hash::{
        BuildHasher,
        Hash,
    },
    io,
    num::NonZeroUsize,
};

use tracing::trace;

use crate::{
    Error,
    LinkedHashMap,
    RandomState,
    linked_hash_map,
    list,
};

/// A fixed-capacity cache that evicts the least recently used entry.
///
/// Entries are kept in a [`LinkedHashMap`] ordered from least to most
/// recently used. Both [`put`](Self::put) and [`get`](Self::get) make the
/// touched entry the most recent one; [`peek`](Self::peek),
/// [`iter`](Self::iter) and [`print`](Self::print) leave the order alone.
///
/// # Examples
///
/// ```rust
/// use std::num::NonZeroUsize;
///
/// use recency::LruCache;
///
/// let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
/// cache.put(1, "a");
/// cache.put(2, "b");
/// assert_eq!(cache.put(3, "c"), Some((1, "a")));
///
/// assert_eq!(cache.get(&2), Some(&"b"));
/// assert_eq!(cache.put(4, "d"), Some((3, "c")));
/// assert_eq!(cache.into_iter().collect::<Vec<_>>(), [(2, "b"), (4, "d")]);
/// ```
pub struct LruCache<K, V, S = RandomState> {
    map: LinkedHashMap<K, V, S>,
    capacity: NonZeroUsize,
}

impl<K, V> LruCache<K, V, RandomState> {
    /// Creates an empty cache that holds at most `capacity` entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use recency::LruCache;
    ///
    /// let cache: LruCache<i32, String> = LruCache::new(NonZeroUsize::new(100).unwrap());
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::with_hasher(capacity, RandomState::default())
    }

    /// Creates an empty cache from a plain `usize` capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recency::{
    ///     Error,
    ///     LruCache,
    /// };
    ///
    /// assert!(LruCache::<i32, i32>::try_new(4).is_ok());
    /// assert_eq!(
    ///     LruCache::<i32, i32>::try_new(0).err(),
    ///     Some(Error::ZeroCapacity)
    /// );
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, Error> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or(Error::ZeroCapacity)
    }
}

impl<K, V, S> LruCache<K, V, S> {
    /// Creates an empty cache that hashes keys with `hasher`.
    pub fn with_hasher(capacity: NonZeroUsize, hasher: S) -> Self {
        LruCache {
            map: LinkedHashMap::with_hasher(hasher),
            capacity,
        }
    }

    /// Maximum number of entries the cache holds.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes every entry. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// The least recently used entry, i.e. the next one to be evicted.
    pub fn oldest(&self) -> Option<(&K, &V)> {
        self.map.front()
    }

    /// The most recently used entry.
    pub fn newest(&self) -> Option<(&K, &V)> {
        self.map.back()
    }

    /// Iterates from the least recently used entry to the most recently used
    /// one without touching any of them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(NonZeroUsize::new(3).unwrap());
    /// cache.put("x", 1);
    /// cache.put("y", 2);
    /// cache.get(&"x");
    ///
    /// let keys: Vec<_> = cache.iter().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, ["y", "x"]);
    /// ```
    pub fn iter(&self) -> linked_hash_map::Iter<'_, K, V> {
        self.map.iter()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LruCache<K, V, S> {
    /// Returns the value for `key` without marking it as used.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(NonZeroUsize::new(3).unwrap());
    /// cache.put(1, "one".to_string());
    /// cache.put(2, "two".to_string());
    ///
    /// assert_eq!(cache.peek(&1), Some(&"one".to_string()));
    /// assert_eq!(cache.peek(&3), None);
    ///
    /// // Peeking leaves 1 as the next entry to be evicted.
    /// assert_eq!(cache.oldest(), Some((&1, &"one".to_string())));
    /// ```
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.peek(key)
    }

    /// Returns `true` if `key` is cached. Does not mark it as used.
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Removes `key` from the cache and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove_key(key)
    }

    /// Removes and returns the least recently used entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(NonZeroUsize::new(3).unwrap());
    /// cache.put(1, "one");
    /// cache.put(2, "two");
    ///
    /// assert_eq!(cache.pop_oldest(), Some((1, "one")));
    /// assert_eq!(cache.pop_oldest(), Some((2, "two")));
    /// assert_eq!(cache.pop_oldest(), None);
    /// ```
    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        let oldest = self.map.begin();
        self.map.remove(oldest).ok()
    }

    #[cfg(all(debug_assertions, feature = "internal-debugging"))]
    #[doc(hidden)]
    pub fn debug_validate(&self) {
        self.map.debug_validate();
        assert!(
            self.map.len() <= self.capacity.get(),
            "Cache holds {} entries with capacity {}",
            self.map.len(),
            self.capacity
        );
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LruCache<K, V, S> {
    /// Caches `value` under `key` as the most recently used entry.
    ///
    /// An existing entry for `key` is replaced and never causes an eviction.
    /// Otherwise, if the cache is full, the least recently used entry is
    /// evicted first and returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
    /// assert_eq!(cache.put(1, "one"), None);
    /// assert_eq!(cache.put(2, "two"), None);
    ///
    /// // Updating never evicts, but it does refresh the entry.
    /// assert_eq!(cache.put(1, "uno"), None);
    /// assert_eq!(cache.put(3, "three"), Some((2, "two")));
    /// assert_eq!(cache.peek(&1), Some(&"uno"));
    /// ```
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.map.remove_key(&key);

        let evicted = if self.map.len() >= self.capacity.get() {
            let oldest = self.map.begin();
            let evicted = self.map.remove(oldest).ok();
            trace!(
                capacity = self.capacity.get(),
                "evicted least recently used entry"
            );
            evicted
        } else {
            None
        };

        self.map.insert(key, value);
        evicted
    }

    /// Returns the value for `key` and marks it as the most recently used
    /// entry.
    ///
    /// A missing key is not an error: the result is `None` and the cache is
    /// unchanged. The returned reference lives until the next call that
    /// mutates the cache.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(NonZeroUsize::new(3).unwrap());
    /// cache.put(1, "one".to_string());
    /// cache.put(2, "two".to_string());
    ///
    /// assert_eq!(cache.get(&1), Some(&"one".to_string()));
    /// assert_eq!(cache.get(&3), None);
    /// assert_eq!(
    ///     cache.into_iter().collect::<Vec<_>>(),
    ///     vec![(2, "two".to_string()), (1, "one".to_string())]
    /// );
    /// ```
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.get_mut(key).map(|value| &*value)
    }

    /// Mutable version of [`get`](Self::get). The entry is marked as used
    /// whether or not the value is modified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::num::NonZeroUsize;
    ///
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(NonZeroUsize::new(3).unwrap());
    /// cache.put(1, "one".to_string());
    /// cache.put(2, "two".to_string());
    ///
    /// if let Some(value) = cache.get_mut(&1) {
    ///     value.push_str("_modified");
    /// }
    /// assert_eq!(cache.newest(), Some((&1, &"one_modified".to_string())));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let pos = self.map.find(key);
        if pos.is_end() {
            return None;
        }

        let (key, value) = match self.map.remove(pos) {
            Ok(entry) => entry,
            Err(_) => {
                #[cfg(debug_assertions)]
                unreachable!("Index pointed at a dead node: {pos:?}");
                #[cfg(not(debug_assertions))]
                return None;
            }
        };
        let (pos, _) = self.map.insert(key, value);
        self.map.get_mut(pos).ok().map(|(_, value)| value)
    }
}

impl<K: Display, V: Display, S> LruCache<K, V, S> {
    /// Prints every entry to stdout as `key value` lines, least recently
    /// used first. The order is not changed.
    pub fn print(&self) {
        print!("{self}");
    }

    /// Writes the same text as [`print`](Self::print) to `out`.
    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{self}")
    }
}

impl<K: Display, V: Display, S> Display for LruCache<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, value) in self.iter() {
            writeln!(f, "{key} {value}")?;
        }
        Ok(())
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, S> std::fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("entries", &self.map)
            .finish()
    }
}

impl<K, V, S> Clone for LruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        LruCache {
            map: self.map.clone(),
            capacity: self.capacity,
        }
    }
}

impl<K, V, S> IntoIterator for LruCache<K, V, S> {
    type IntoIter = list::IntoIter<(K, V)>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a LruCache<K, V, S> {
    type IntoIter = linked_hash_map::Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
