//! A slab-backed doubly linked list with generation-checked handles.

use std::{
    iter::FusedIterator,
    sync::atomic::{
        AtomicU64,
        Ordering,
    },
};

use slab::Slab;

use crate::Error;

/// Node stamps, shared by every list in the process.
static NEXT_STAMP: AtomicU64 = AtomicU64::new(0);

/// Slab slot of a neighbouring node, `None` at either end.
type Link = Option<usize>;

/// A position in a [`DoublyLinkedList`].
///
/// Handles are cheap to copy and stay valid until the element they point at
/// is erased, no matter how many other elements are inserted or erased in the
/// meantime. Every element gets a stamp that is unique across all lists when
/// it is allocated, so a handle to an erased element keeps being rejected
/// even after its storage slot is reused, and a handle taken from another
/// list (or from a clone) is never accepted.
///
/// The end handle ([`Handle::end`], also [`Handle::default`]) points one past
/// the last element of any list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Handle {
    slot: Link,
    stamp: u64,
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slot {
            None => write!(f, "Handle(end)"),
            Some(slot) => write!(f, "Handle({slot}#{})", self.stamp),
        }
    }
}

impl Handle {
    /// The end handle.
    pub fn end() -> Self {
        Handle::default()
    }

    /// Returns `true` for the end handle.
    pub fn is_end(&self) -> bool {
        self.slot.is_none()
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    stamp: u64,
    prev: Link,
    next: Link,
}

/// A doubly linked list whose nodes live in a slab.
///
/// Links are slab indices rather than pointers, and positions are exposed as
/// [`Handle`]s. Insertion at either end, erasure at a handle and moving a
/// node to the tail are all O(1).
///
/// # Examples
///
/// ```
/// use recency::DoublyLinkedList;
///
/// let mut list = DoublyLinkedList::new();
/// list.insert_tail(3);
/// list.insert_tail(4);
/// list.insert_head(5);
/// list.insert_tail(6);
///
/// let three = list.next(list.begin()).unwrap();
/// let after = list.erase(three).unwrap();
/// assert_eq!(list.get(after), Ok(&4));
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), [5, 4, 6]);
/// ```
pub struct DoublyLinkedList<T> {
    nodes: Slab<Node<T>>,
    head: Link,
    tail: Link,
}

impl<T> Default for DoublyLinkedList<T> {
    fn default() -> Self {
        DoublyLinkedList {
            nodes: Slab::new(),
            head: None,
            tail: None,
        }
    }
}

impl<T> DoublyLinkedList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        DoublyLinkedList {
            nodes: Slab::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Number of elements in the list.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drops every element. Handles taken before the call are invalidated.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Handle to the first element, or the end handle if the list is empty.
    pub fn begin(&self) -> Handle {
        self.handle_for(self.head)
    }

    /// The end handle.
    pub fn end(&self) -> Handle {
        Handle::end()
    }

    /// Handle to the last element, or the end handle if the list is empty.
    pub fn get_tail(&self) -> Handle {
        self.handle_for(self.tail)
    }

    /// Returns `true` if `handle` points at a live element of this list.
    pub fn contains(&self, handle: Handle) -> bool {
        self.node(handle).is_some()
    }

    /// Returns the element at `handle`.
    ///
    /// Fails with [`Error::InvalidDereference`] for the end handle, a handle
    /// whose element was erased, or a handle from another list.
    pub fn get(&self, handle: Handle) -> Result<&T, Error> {
        self.node(handle)
            .map(|node| &node.value)
            .ok_or(Error::InvalidDereference)
    }

    /// Mutable version of [`get`](Self::get).
    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T, Error> {
        self.node_mut(handle)
            .map(|node| &mut node.value)
            .ok_or(Error::InvalidDereference)
    }

    /// Returns the handle after `handle`; the tail is followed by the end
    /// handle.
    ///
    /// Fails with [`Error::InvalidTraversal`] when called on the end handle
    /// or on a handle that is not live in this list.
    pub fn next(&self, handle: Handle) -> Result<Handle, Error> {
        let node = self.node(handle).ok_or(Error::InvalidTraversal)?;
        Ok(self.handle_for(node.next))
    }

    /// Returns the handle before `handle`. Stepping back from the end handle
    /// yields the tail.
    ///
    /// Fails with [`Error::InvalidTraversal`] when called on the head, on a
    /// handle that is not live in this list, or on the end handle of an
    /// empty list.
    pub fn prev(&self, handle: Handle) -> Result<Handle, Error> {
        let prev = if handle.is_end() {
            self.tail
        } else {
            self.node(handle).ok_or(Error::InvalidTraversal)?.prev
        };
        match prev {
            Some(_) => Ok(self.handle_for(prev)),
            None => Err(Error::InvalidTraversal),
        }
    }

    /// Inserts `value` before the current head and returns its handle.
    pub fn insert_head(&mut self, value: T) -> Handle {
        let slot = self.alloc(value);
        self.attach_head(slot);
        self.handle_for(Some(slot))
    }

    /// Inserts `value` after the current tail and returns its handle.
    pub fn insert_tail(&mut self, value: T) -> Handle {
        let slot = self.alloc(value);
        self.attach_tail(slot);
        self.handle_for(Some(slot))
    }

    /// Removes and returns the first element, if any.
    pub fn delete_head(&mut self) -> Option<T> {
        let slot = self.head?;
        Some(self.unlink(slot).value)
    }

    /// Removes and returns the last element, if any.
    pub fn delete_tail(&mut self) -> Option<T> {
        let slot = self.tail?;
        Some(self.unlink(slot).value)
    }

    /// Erases the element at `handle` and returns the handle of the element
    /// that followed it, i.e. the element now occupying the same logical
    /// position. Erasing the tail returns the end handle.
    ///
    /// Fails with [`Error::InvalidPosition`] for the end handle or a handle
    /// that is not live in this list.
    pub fn erase(&mut self, handle: Handle) -> Result<Handle, Error> {
        let slot = self.live_slot(handle)?;
        let node = self.unlink(slot);
        Ok(self.handle_for(node.next))
    }

    /// Erases the element at `handle` and returns it.
    ///
    /// Fails with [`Error::InvalidPosition`] for the end handle or a handle
    /// that is not live in this list.
    pub fn remove(&mut self, handle: Handle) -> Result<T, Error> {
        let slot = self.live_slot(handle)?;
        Ok(self.unlink(slot).value)
    }

    /// Relinks the element at `handle` after the current tail. The element is
    /// not reallocated, so `handle` stays valid.
    pub fn move_to_tail(&mut self, handle: Handle) -> Result<(), Error> {
        let slot = self.live_slot(handle)?;
        if self.tail != Some(slot) {
            self.detach(slot);
            self.attach_tail(slot);
        }
        Ok(())
    }

    /// Iterates from head to tail. The iterator is double ended.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            front: self.head,
            back: self.tail,
            remaining: self.len(),
            list: self,
        }
    }

    fn node(&self, handle: Handle) -> Option<&Node<T>> {
        let node = self.nodes.get(handle.slot?)?;
        (node.stamp == handle.stamp).then_some(node)
    }

    fn node_mut(&mut self, handle: Handle) -> Option<&mut Node<T>> {
        let node = self.nodes.get_mut(handle.slot?)?;
        (node.stamp == handle.stamp).then_some(node)
    }

    fn live_slot(&self, handle: Handle) -> Result<usize, Error> {
        match (handle.slot, self.contains(handle)) {
            (Some(slot), true) => Ok(slot),
            _ => Err(Error::InvalidPosition),
        }
    }

    fn handle_for(&self, link: Link) -> Handle {
        match link {
            None => Handle::end(),
            Some(slot) => Handle {
                slot: link,
                stamp: self.nodes[slot].stamp,
            },
        }
    }

    fn alloc(&mut self, value: T) -> usize {
        self.nodes.insert(Node {
            value,
            stamp: NEXT_STAMP.fetch_add(1, Ordering::Relaxed),
            prev: None,
            next: None,
        })
    }

    fn attach_head(&mut self, slot: usize) {
        let old_head = self.head.replace(slot);
        let node = &mut self.nodes[slot];
        node.prev = None;
        node.next = old_head;
        match old_head {
            Some(old) => self.nodes[old].prev = Some(slot),
            None => self.tail = Some(slot),
        }
    }

    fn attach_tail(&mut self, slot: usize) {
        let old_tail = self.tail.replace(slot);
        let node = &mut self.nodes[slot];
        node.prev = old_tail;
        node.next = None;
        match old_tail {
            Some(old) => self.nodes[old].next = Some(slot),
            None => self.head = Some(slot),
        }
    }

    fn detach(&mut self, slot: usize) {
        let Node { prev, next, .. } = self.nodes[slot];
        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }
    }

    fn unlink(&mut self, slot: usize) -> Node<T> {
        self.detach(slot);
        self.nodes.remove(slot)
    }

    #[cfg(all(debug_assertions, feature = "internal-debugging"))]
    #[doc(hidden)]
    pub fn debug_validate(&self) {
        let (Some(head), Some(tail)) = (self.head, self.tail) else {
            assert!(self.is_empty(), "Non-empty list without head and tail");
            assert_eq!(self.head, self.tail, "Only one end of the list is set");
            return;
        };

        assert_eq!(self.nodes[head].prev, None, "Head has a previous link");
        assert_eq!(self.nodes[tail].next, None, "Tail has a next link");

        let mut reachable = 0;
        let mut prev = None;
        let mut link = self.head;
        while let Some(slot) = link {
            let node = &self.nodes[slot];
            assert_eq!(node.prev, prev, "Broken back link at slot {slot}");
            reachable += 1;
            assert!(reachable <= self.len(), "Cycle through slot {slot}");
            prev = link;
            link = node.next;
        }
        assert_eq!(prev, self.tail, "Walk should end at the tail");
        assert_eq!(reachable, self.len(), "Unreachable nodes in the slab");
    }
}

impl<T: Clone> Clone for DoublyLinkedList<T> {
    fn clone(&self) -> Self {
        let mut list = DoublyLinkedList::with_capacity(self.len());
        list.extend(self.iter().cloned());
        list
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for DoublyLinkedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DoublyLinkedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for DoublyLinkedList<T> {}

impl<T> Extend<T> for DoublyLinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert_tail(value);
        }
    }
}

impl<T> FromIterator<T> for DoublyLinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = DoublyLinkedList::new();
        list.extend(iter);
        list
    }
}

/// Borrowing iterator over a [`DoublyLinkedList`], head to tail.
#[derive(Debug)]
pub struct Iter<'a, T> {
    front: Link,
    back: Link,
    remaining: usize,
    list: &'a DoublyLinkedList<T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.front?];
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.list.nodes[self.back?];
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator over a [`DoublyLinkedList`], head to tail.
#[derive(Debug)]
pub struct IntoIter<T> {
    list: DoublyLinkedList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.delete_head()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.delete_tail()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for DoublyLinkedList<T> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a DoublyLinkedList<T> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
