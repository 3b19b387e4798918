use std::fmt;
use std::iter::FusedIterator;
use std::ptr;

use crate::error::EndDereference;
use crate::slab::{Ptr, Slab};

use super::{InnerNode, Link};

/// A forward-only position in a [`ThreadedMap`](crate::ThreadedMap)
///
/// A cursor either points at an entry or is at the end of the map. Cursors are obtained from
/// [`begin`](crate::ThreadedMap::begin), [`end`](crate::ThreadedMap::end) and
/// [`find`](crate::ThreadedMap::find), all of which make sure the successor threads are valid. The
/// cursor borrows the map, so the map cannot be modified while the cursor is in use.
///
/// Advancing is O(1) when the current node has no right subtree: the cursor jumps straight to
/// the successor through the thread stored in that node.
pub struct Cursor<'a, K, V> {
    nodes: &'a Slab<InnerNode<K, V>>,
    current: Option<Ptr>,
}

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self {
        Self {..*self}
    }
}

impl<'a, K, V> Copy for Cursor<'a, K, V> {}

impl<'a, K, V> fmt::Debug for Cursor<'a, K, V>
    where K: fmt::Debug,
          V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key_value() {
            Ok((key, value)) => f.debug_tuple("Cursor").field(key).field(value).finish(),
            Err(_) => f.write_str("Cursor(end)"),
        }
    }
}

/// Two cursors are equal if they come from the same map and are at the same position
impl<'a, K, V> PartialEq for Cursor<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.nodes, other.nodes) && self.current == other.current
    }
}

impl<'a, K, V> Eq for Cursor<'a, K, V> {}

impl<'a, K, V> Cursor<'a, K, V> {
    /// The threads of the tree in `nodes` must be valid for as long as the cursor exists
    pub(super) fn new(nodes: &'a Slab<InnerNode<K, V>>, current: Option<Ptr>) -> Self {
        Self {nodes, current}
    }

    /// Returns a cursor at the leftmost node of the subtree rooted at `root`
    pub(super) fn leftmost(nodes: &'a Slab<InnerNode<K, V>>, root: Option<Ptr>) -> Self {
        let mut current = root;
        while let Some(left) = current.and_then(|ptr| nodes[ptr].left) {
            current = Some(left);
        }

        Self::new(nodes, current)
    }

    /// Returns true if the cursor is past the last entry of the map
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Returns the key and value at the cursor
    pub fn key_value(&self) -> Result<(&'a K, &'a V), EndDereference> {
        let ptr = self.current.ok_or(EndDereference)?;
        let node = &self.nodes[ptr];
        Ok((&node.key, &node.value))
    }

    /// Returns the key at the cursor
    pub fn key(&self) -> Result<&'a K, EndDereference> {
        self.key_value().map(|(key, _)| key)
    }

    /// Returns the value at the cursor
    pub fn value(&self) -> Result<&'a V, EndDereference> {
        self.key_value().map(|(_, value)| value)
    }

    /// Moves the cursor to the next entry in ascending key order
    ///
    /// Moving past the last entry puts the cursor at the end. Moving a cursor that is already at
    /// the end does nothing.
    pub fn move_next(&mut self) {
        let ptr = match self.current {
            Some(ptr) => ptr,
            None => return,
        };

        *self = match self.nodes[ptr].right.get() {
            Link::Thread(next) => Self::new(self.nodes, Some(next)),
            Link::Child(right) => Self::leftmost(self.nodes, Some(right)),
            // Only the maximum is left without a thread
            Link::Empty => Self::new(self.nodes, None),
        };
    }
}

/// An iterator over the entries of a [`ThreadedMap`](crate::ThreadedMap) in ascending key order
///
/// Driven by a [`Cursor`], so each step follows a thread instead of keeping a stack of ancestors.
pub struct Iter<'a, K, V> {
    cursor: Cursor<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {..*self}
    }
}

impl<'a, K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(cursor: Cursor<'a, K, V>, len: usize) -> Self {
        Self {cursor, remaining: len}
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.cursor.key_value().ok()?;
        self.cursor.move_next();
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

#[cfg(test)]
mod tests {
    use crate::{ThreadedMap, EndDereference};

    #[test]
    fn walk_begin_to_end() {
        let mut map = ThreadedMap::new();
        for &key in &[5, 3, 8, 1, 4, 7, 9] {
            map.insert(key, key * 2);
        }

        let mut keys = Vec::new();
        let mut cursor = map.begin();
        while cursor != map.end() {
            let (key, value) = cursor.key_value().unwrap();
            assert_eq!(*value, key * 2);
            keys.push(*key);
            cursor.move_next();
        }
        assert_eq!(&keys, &[1, 3, 4, 5, 7, 8, 9]);

        // Moving past the end stays at the end
        cursor.move_next();
        assert!(cursor.is_end());
        assert_eq!(cursor, map.end());
    }

    #[test]
    fn end_dereference_is_an_error() {
        let map: ThreadedMap<i32, i32> = ThreadedMap::new();
        let end = map.end();
        assert_eq!(map.begin(), end);
        assert_eq!(end.key_value(), Err(EndDereference));
        assert_eq!(end.key(), Err(EndDereference));
        assert_eq!(end.value(), Err(EndDereference));
    }

    #[test]
    fn cursors_of_different_maps_differ() {
        let map1: ThreadedMap<i32, ()> = ThreadedMap::new();
        let map2: ThreadedMap<i32, ()> = ThreadedMap::new();
        assert_ne!(map1.end(), map2.end());
        assert_eq!(map1.end(), map1.end());
    }

    #[test]
    fn cursor_from_find_advances() {
        let mut map = ThreadedMap::new();
        for key in &["m", "c", "x", "a", "e", "q"] {
            map.insert(*key, key.len());
        }

        let mut cursor = map.find(&"e");
        assert_eq!(cursor.key(), Ok(&"e"));
        // "e" has no right child, so this follows a thread back up to "m"
        cursor.move_next();
        assert_eq!(cursor.key(), Ok(&"m"));
        cursor.move_next();
        assert_eq!(cursor.key(), Ok(&"q"));
        cursor.move_next();
        assert_eq!(cursor.key(), Ok(&"x"));
        cursor.move_next();
        assert!(cursor.is_end());
    }

    #[test]
    fn iter_is_exact_size() {
        let map: ThreadedMap<_, _> = (0..10).map(|i| (i, -i)).collect();
        let mut iter = map.iter();
        assert_eq!(iter.len(), 10);
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 8);
        assert_eq!(iter.next(), Some((&2, &-2)));
        assert_eq!(iter.count(), 7);
        assert_eq!(format!("{:?}", map.iter().take(2).collect::<Vec<_>>()), "[(0, 0), (1, -1)]");
    }
}
