//! An insertion-ordered hash map over a linked list and a hash index.

use std::{
    hash::{
        BuildHasher,
        Hash,
    },
    iter::FusedIterator,
    ops::{
        Index,
        IndexMut,
    },
};

use crate::{
    DoublyLinkedList,
    Error,
    Handle,
    HashIndex,
    RandomState,
    list,
};

/// A hash map that remembers the order its entries were inserted in.
///
/// Entries live in a [`DoublyLinkedList`] of `(key, value)` pairs and a
/// [`HashIndex`] maps every key to the [`Handle`] of its node. Lookups go
/// through the index; iteration walks the list from the oldest entry at
/// [`begin`](Self::begin) to the newest one before [`end`](Self::end).
///
/// Re-inserting an existing key moves the entry to the back, which makes the
/// front of the map the natural eviction candidate for an LRU cache.
///
/// # Examples
///
/// ```
/// use recency::LinkedHashMap;
///
/// let mut map = LinkedHashMap::new();
/// map.insert("a", 1);
/// map.insert("b", 2);
/// map.insert("a", 3);
///
/// assert_eq!(map.iter().collect::<Vec<_>>(), [(&"b", &2), (&"a", &3)]);
/// assert_eq!(map.at(&"a"), Ok(&3));
/// assert_eq!(map.count(&"c"), 0);
///
/// let oldest = map.begin();
/// assert_eq!(map.remove(oldest), Ok(("b", 2)));
/// ```
pub struct LinkedHashMap<K, V, S = RandomState> {
    order: DoublyLinkedList<(K, V)>,
    index: HashIndex<K, Handle, S>,
}

impl<K, V, S: Default> Default for LinkedHashMap<K, V, S> {
    fn default() -> Self {
        LinkedHashMap {
            order: DoublyLinkedList::default(),
            index: HashIndex::default(),
        }
    }
}

impl<K, V> LinkedHashMap<K, V, RandomState> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V, S> LinkedHashMap<K, V, S> {
    /// Creates an empty map that hashes keys with `hasher`.
    pub fn with_hasher(hasher: S) -> Self {
        LinkedHashMap {
            order: DoublyLinkedList::new(),
            index: HashIndex::with_hasher(hasher),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.order.len(), self.index.len());
        self.order.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.order.clear();
        self.index.clear();
    }

    /// Handle to the oldest entry, or [`end`](Self::end) if the map is empty.
    pub fn begin(&self) -> Handle {
        self.order.begin()
    }

    /// The end handle.
    pub fn end(&self) -> Handle {
        self.order.end()
    }

    /// The oldest entry.
    pub fn front(&self) -> Option<(&K, &V)> {
        self.get(self.order.begin()).ok()
    }

    /// The newest entry.
    pub fn back(&self) -> Option<(&K, &V)> {
        self.get(self.order.get_tail()).ok()
    }

    /// Returns the entry at `handle`.
    ///
    /// Fails with [`Error::InvalidDereference`] for the end handle, a handle
    /// whose entry is gone, or a handle from another map.
    pub fn get(&self, handle: Handle) -> Result<(&K, &V), Error> {
        self.order.get(handle).map(|(key, value)| (key, value))
    }

    /// Returns the entry at `handle` with a mutable value.
    pub fn get_mut(&mut self, handle: Handle) -> Result<(&K, &mut V), Error> {
        self.order.get_mut(handle).map(|(key, value)| (&*key, value))
    }

    /// Handle of the entry after `handle`. See [`DoublyLinkedList::next`].
    pub fn next(&self, handle: Handle) -> Result<Handle, Error> {
        self.order.next(handle)
    }

    /// Handle of the entry before `handle`. See [`DoublyLinkedList::prev`].
    pub fn prev(&self, handle: Handle) -> Result<Handle, Error> {
        self.order.prev(handle)
    }

    /// Relinks the entry at `handle` as the newest one. The handle stays
    /// valid and no key is rehashed.
    pub fn move_to_tail(&mut self, handle: Handle) -> Result<(), Error> {
        self.order.move_to_tail(handle)
    }

    /// Iterates from the oldest entry to the newest.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.order.iter(),
        }
    }

    /// Iterates over the keys, oldest first.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates over the values, oldest first.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.iter().map(|(_, value)| value)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LinkedHashMap<K, V, S> {
    /// Handle of the entry for `key`, or [`end`](Self::end) if there is none.
    pub fn find(&self, key: &K) -> Handle {
        self.index.get(key).copied().unwrap_or_else(Handle::end)
    }

    /// Number of entries for `key`: `0` or `1`.
    pub fn count(&self, key: &K) -> usize {
        usize::from(self.index.contains_key(key))
    }

    /// Returns `true` if the map has an entry for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the value for `key` without touching the order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let handle = *self.index.get(key)?;
        self.order.get(handle).ok().map(|(_, value)| value)
    }

    /// Returns the value for `key`, or [`Error::KeyNotFound`].
    pub fn at(&self, key: &K) -> Result<&V, Error> {
        self.peek(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the value for `key` mutably, or [`Error::KeyNotFound`].
    pub fn at_mut(&mut self, key: &K) -> Result<&mut V, Error> {
        let handle = *self.index.get(key).ok_or(Error::KeyNotFound)?;
        self.order
            .get_mut(handle)
            .map(|(_, value)| value)
            .map_err(|_| Error::KeyNotFound)
    }

    /// Removes the entry at `pos` and returns it.
    ///
    /// Fails with [`Error::InvalidPosition`] if `pos` is the end handle or
    /// its entry is already gone; the map is left untouched in that case.
    #[track_caller]
    pub fn remove(&mut self, pos: Handle) -> Result<(K, V), Error> {
        let (key, value) = self.order.remove(pos)?;
        if !self.index.remove(&key) {
            #[cfg(debug_assertions)]
            unreachable!("Key for {pos:?} missing from the index");
        }
        Ok((key, value))
    }

    /// Removes the entry for `key` and returns its value.
    pub fn remove_key(&mut self, key: &K) -> Option<V> {
        let (_, handle) = self.index.take(key)?;
        let removed = self.order.remove(handle);
        debug_assert!(removed.is_ok(), "Index pointed at a dead node: {handle:?}");
        removed.ok().map(|(_, value)| value)
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LinkedHashMap<K, V, S> {
    /// Inserts `value` for `key` as the newest entry.
    ///
    /// An existing entry for `key` is erased first and the new pair is
    /// appended at the back; the returned flag is `false` in that case. The
    /// returned handle points at the new node either way.
    pub fn insert(&mut self, key: K, value: V) -> (Handle, bool) {
        match self.index.get_mut(&key) {
            Some(slot) => {
                if self.order.remove(*slot).is_err() {
                    #[cfg(debug_assertions)]
                    unreachable!("Index pointed at a dead node: {slot:?}");
                }
                let handle = self.order.insert_tail((key, value));
                *slot = handle;
                (handle, false)
            }
            None => {
                let handle = self.order.insert_tail((key.clone(), value));
                self.index.insert(key, handle);
                (handle, true)
            }
        }
    }
}

impl<K, V, S> LinkedHashMap<K, V, S> {
    #[cfg(all(debug_assertions, feature = "internal-debugging"))]
    #[doc(hidden)]
    pub fn debug_validate(&self)
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        self.order.debug_validate();
        self.index.debug_validate();
        assert_eq!(
            self.order.len(),
            self.index.len(),
            "Order list and index disagree on the entry count"
        );
        for (key, handle) in self.index.iter() {
            let Ok((stored, _)) = self.order.get(*handle) else {
                panic!("Index entry points at a dead node: {handle:?}");
            };
            assert!(stored == key, "Index entry points at the wrong key: {handle:?}");
        }
    }
}

impl<K, V, S> Clone for LinkedHashMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        let mut map = LinkedHashMap {
            order: DoublyLinkedList::with_capacity(self.len()),
            index: HashIndex::with_buckets_and_hasher(
                self.index.bucket_count(),
                self.index.hasher().clone(),
            ),
        };
        for (key, value) in self.iter() {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, S> std::fmt::Debug for LinkedHashMap<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Index<&K> for LinkedHashMap<K, V, S> {
    type Output = V;

    #[track_caller]
    fn index(&self, key: &K) -> &V {
        match self.peek(key) {
            Some(value) => value,
            None => panic!("key not found"),
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> IndexMut<&K> for LinkedHashMap<K, V, S> {
    #[track_caller]
    fn index_mut(&mut self, key: &K) -> &mut V {
        match self.at_mut(key) {
            Ok(value) => value,
            Err(_) => panic!("key not found"),
        }
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> Extend<(K, V)> for LinkedHashMap<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher + Default> FromIterator<(K, V)>
    for LinkedHashMap<K, V, S>
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = LinkedHashMap::default();
        map.extend(iter);
        map
    }
}

/// Borrowing iterator over a [`LinkedHashMap`], oldest entry first.
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    inner: list::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, value)| (key, value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V, S> IntoIterator for LinkedHashMap<K, V, S> {
    type IntoIter = list::IntoIter<(K, V)>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a LinkedHashMap<K, V, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use ntest::timeout;

    use super::*;

    fn keys(map: &LinkedHashMap<i32, String>) -> Vec<i32> {
        map.keys().copied().collect()
    }

    fn filled(n: i32) -> LinkedHashMap<i32, String> {
        (0..n).map(|i| (i, i.to_string())).collect()
    }

    #[test]
    #[timeout(1000)]
    fn test_new_and_default() {
        let map: LinkedHashMap<i32, String> = LinkedHashMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.begin(), map.end());
        assert_eq!(map.front(), None);
        assert_eq!(map.back(), None);
    }

    #[test]
    #[timeout(1000)]
    fn test_insert_new_keys() {
        let mut map = LinkedHashMap::new();

        let (one, inserted) = map.insert(1, "one".to_string());
        assert!(inserted);
        assert_eq!(map.get(one), Ok((&1, &"one".to_string())));
        assert_eq!(map.begin(), one);

        let (two, inserted) = map.insert(2, "two".to_string());
        assert!(inserted);
        assert_ne!(one, two);
        assert_eq!(map.next(one), Ok(two));
        assert_eq!(map.next(two), Ok(map.end()));
        assert_eq!(map.len(), 2);
        assert_eq!(keys(&map), [1, 2]);
    }

    #[test]
    #[timeout(1000)]
    fn test_insert_existing_moves_to_back() {
        let mut map = filled(3);
        let old = map.find(&0);

        let (new, inserted) = map.insert(0, "zero".to_string());
        assert!(!inserted);
        assert_ne!(old, new);
        assert_eq!(map.get(old), Err(Error::InvalidDereference));
        assert_eq!(map.find(&0), new);
        assert_eq!(map.len(), 3);
        assert_eq!(keys(&map), [1, 2, 0]);
        assert_eq!(map.back(), Some((&0, &"zero".to_string())));
    }

    #[test]
    #[timeout(1000)]
    fn test_find_and_count() {
        let map = filled(3);
        assert_eq!(map.get(map.find(&1)), Ok((&1, &"1".to_string())));
        assert_eq!(map.find(&7), map.end());
        assert_eq!(map.count(&1), 1);
        assert_eq!(map.count(&7), 0);
        assert!(map.contains_key(&2));
        assert!(!map.contains_key(&7));
    }

    #[test]
    #[timeout(1000)]
    fn test_at_and_index() {
        let mut map = filled(3);
        assert_eq!(map.at(&2).map(String::as_str), Ok("2"));
        assert_eq!(map.at(&5), Err(Error::KeyNotFound));
        assert_eq!(map.at_mut(&5), Err(Error::KeyNotFound));

        map.at_mut(&2).unwrap().push('!');
        assert_eq!(map[&2], "2!");
        map[&1].push('?');
        assert_eq!(map.peek(&1).map(String::as_str), Some("1?"));

        // Neither lookup reorders.
        assert_eq!(keys(&map), [0, 1, 2]);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_index_missing_key_panics() {
        let map = filled(1);
        let _ = &map[&3];
    }

    #[test]
    #[timeout(1000)]
    fn test_remove_at_handle() {
        let mut map = filled(4);
        let two = map.find(&2);

        assert_eq!(map.remove(two), Ok((2, "2".to_string())));
        assert_eq!(map.remove(two), Err(Error::InvalidPosition));
        assert_eq!(map.find(&2), map.end());
        assert_eq!(keys(&map), [0, 1, 3]);

        let begin = map.begin();
        assert_eq!(map.remove(begin), Ok((0, "0".to_string())));
        assert_eq!(keys(&map), [1, 3]);
    }

    #[test]
    #[timeout(1000)]
    fn test_remove_end_is_rejected() {
        let mut map = filled(2);
        let end = map.end();
        assert_eq!(map.remove(end), Err(Error::InvalidPosition));
        assert_eq!(map.len(), 2);
        assert_eq!(keys(&map), [0, 1]);

        let mut empty: LinkedHashMap<i32, i32> = LinkedHashMap::new();
        let begin = empty.begin();
        assert_eq!(empty.remove(begin), Err(Error::InvalidPosition));
    }

    #[test]
    #[timeout(1000)]
    fn test_foreign_handles_are_rejected() {
        let mut first = LinkedHashMap::new();
        first.insert("x", 1);
        let mut second = LinkedHashMap::new();
        second.insert("p", 9);
        second.insert("q", 8);

        let foreign = first.find(&"x");
        assert_eq!(second.get(foreign), Err(Error::InvalidDereference));
        assert_eq!(second.remove(foreign), Err(Error::InvalidPosition));
        assert_eq!(second.move_to_tail(foreign), Err(Error::InvalidPosition));

        let copy = second.clone();
        assert_eq!(second.remove(copy.begin()), Err(Error::InvalidPosition));
        assert_eq!(second.len(), 2);
        assert_eq!(second.keys().copied().collect::<Vec<_>>(), ["p", "q"]);
        assert_eq!(first.get(foreign), Ok((&"x", &1)));
    }

    #[test]
    #[timeout(1000)]
    fn test_remove_key() {
        let mut map = filled(3);
        assert_eq!(map.remove_key(&1), Some("1".to_string()));
        assert_eq!(map.remove_key(&1), None);
        assert_eq!(keys(&map), [0, 2]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    #[timeout(1000)]
    fn test_move_to_tail_keeps_handle() {
        let mut map = filled(3);
        let zero = map.find(&0);

        assert_eq!(map.move_to_tail(zero), Ok(()));
        assert_eq!(keys(&map), [1, 2, 0]);
        assert_eq!(map.find(&0), zero);
        assert_eq!(map.get(zero), Ok((&0, &"0".to_string())));

        let end = map.end();
        assert_eq!(map.move_to_tail(end), Err(Error::InvalidPosition));
    }

    #[test]
    #[timeout(1000)]
    fn test_get_mut_by_handle() {
        let mut map = filled(2);
        let handle = map.find(&1);
        let (key, value) = map.get_mut(handle).unwrap();
        assert_eq!(*key, 1);
        value.push_str("_updated");
        assert_eq!(map.peek(&1).map(String::as_str), Some("1_updated"));
        let end = map.end();
        assert_eq!(map.get_mut(end), Err(Error::InvalidDereference));
    }

    #[test]
    #[timeout(1000)]
    fn test_walk_backwards() {
        let map = filled(3);
        let mut handle = map.end();
        let mut seen = Vec::new();
        while let Ok(prev) = map.prev(handle) {
            seen.push(*map.get(prev).unwrap().0);
            handle = prev;
        }
        assert_eq!(seen, [2, 1, 0]);
        assert_eq!(map.iter().rev().map(|(k, _)| *k).collect::<Vec<_>>(), [2, 1, 0]);
    }

    #[test]
    #[timeout(1000)]
    fn test_iterators() {
        let map = filled(3);
        let values: Vec<_> = map.values().cloned().collect();
        assert_eq!(values, ["0", "1", "2"]);
        assert_eq!(map.iter().len(), 3);

        let borrowed: Vec<_> = (&map).into_iter().map(|(k, _)| *k).collect();
        assert_eq!(borrowed, [0, 1, 2]);

        let owned: Vec<_> = map.into_iter().collect();
        assert_eq!(
            owned,
            [
                (0, "0".to_string()),
                (1, "1".to_string()),
                (2, "2".to_string())
            ]
        );
    }

    #[test]
    #[timeout(1000)]
    fn test_clear() {
        let mut map = filled(5);
        let handle = map.find(&3);
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get(handle), Err(Error::InvalidDereference));
        assert_eq!(map.find(&3), map.end());

        map.insert(3, "three".to_string());
        assert_eq!(keys(&map), [3]);
    }

    #[test]
    #[timeout(1000)]
    fn test_clone_is_deep() {
        let mut map = filled(3);
        let copy = map.clone();

        map.insert(0, "moved".to_string());
        map.remove_key(&1);

        assert_eq!(keys(&copy), [0, 1, 2]);
        assert_eq!(copy.peek(&0).map(String::as_str), Some("0"));
        assert_eq!(copy.get(copy.find(&2)), Ok((&2, &"2".to_string())));
        assert_eq!(keys(&map), [2, 0]);
    }

    #[test]
    #[timeout(1000)]
    fn test_debug_format() {
        let mut map = LinkedHashMap::new();
        map.insert(2, "b");
        map.insert(1, "a");
        assert_eq!(format!("{map:?}"), r#"{2: "b", 1: "a"}"#);
    }

    #[test]
    #[timeout(1000)]
    fn test_many_entries_survive_growth() {
        let mut map = LinkedHashMap::new();
        for i in 0..1000 {
            map.insert(i, i * 2);
        }
        for i in (0..1000).step_by(2) {
            map.insert(i, i * 3);
        }
        assert_eq!(map.len(), 1000);
        for i in 0..1000 {
            let expected = if i % 2 == 0 { i * 3 } else { i * 2 };
            assert_eq!(map.peek(&i), Some(&expected));
        }
        let order: Vec<_> = map.keys().copied().collect();
        let expected: Vec<_> = (1..1000).step_by(2).chain((0..1000).step_by(2)).collect();
        assert_eq!(order, expected);
    }

    #[cfg(all(debug_assertions, feature = "internal-debugging"))]
    #[test]
    #[timeout(1000)]
    fn test_debug_validation() {
        let mut map = LinkedHashMap::new();
        map.debug_validate();
        for i in 0..100 {
            map.insert(i % 30, i);
            map.debug_validate();
        }
        let begin = map.begin();
        map.remove(begin).unwrap();
        map.remove_key(&7);
        map.move_to_tail(map.find(&12)).unwrap();
        map.debug_validate();
    }
}
