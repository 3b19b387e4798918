mod node;
mod thread;
mod cursor;
mod inorder;
mod preorder;
#[cfg(feature = "serde")]
mod serde_impl;

pub use node::Node;
pub use cursor::*;
pub use preorder::*;

pub(crate) use node::{InnerNode, Link};

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use std::mem;

use log::debug;

use crate::compare::{Compare, Natural};
use crate::error::KeyNotFound;
use crate::slab::{Ptr, Slab};

use inorder::{Direction, InorderWalk};

/// The place in the tree that owns a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Root,
    /// The left link of the given node
    Left(Ptr),
    /// The right (child) link of the given node
    Right(Ptr),
}

/// An ordered map backed by an unbalanced, threaded binary search tree
///
/// BST properties: For each node with key `k`:
/// - The key of each node in the left subtree is ordered before `k`
/// - The key of each node in the right subtree is ordered after `k`
///
/// Keys are ordered by the comparator `C`, which defaults to the `Ord` implementation of the key.
/// Two keys are the same key when neither is ordered before the other.
///
/// A node without a right subtree uses its right link to point at its inorder successor (a
/// "thread"). Following threads lets a [`Cursor`] step forward in O(1) amortized time without
/// parent pointers or a stack. Any change to the shape of the tree marks the threads as stale, and
/// the next call that hands out a cursor rebuilds all of them in one pass.
///
/// The tree never rebalances itself. Inserting keys in sorted order produces a tree with the shape
/// of a linked list, and operations on it take `O(n)` time.
pub struct ThreadedMap<K, V, C = Natural> {
    nodes: Slab<InnerNode<K, V>>,
    root: Option<Ptr>,
    len: usize,
    compare: C,
    threads_valid: Cell<bool>,
}

impl<K, V, C: Default> Default for ThreadedMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for ThreadedMap<K, V, C> {
    fn clone(&self) -> Self {
        // Cloning the slab keeps every pointer valid, so the clone has the same shape and the
        // same threads as the original
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
            compare: self.compare.clone(),
            threads_valid: self.threads_valid.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for ThreadedMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values(true)).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for ThreadedMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        // We can't just compare the binary trees structurally, since they may be structured
        // differently while still having all the same elements (e.g. if insertion order is
        // different). Instead, we compare the elements in sorted order.

        if self.len() != other.len() {
            return false;
        }

        let ours = InorderWalk::new(&self.nodes, self.root, Direction::Ascending);
        let theirs = InorderWalk::new(&other.nodes, other.root, Direction::Ascending);
        ours.zip(theirs).all(|(a, b)| {
            let (a, b) = (&self.nodes[a], &other.nodes[b]);
            a.key.eq(&b.key) && a.value.eq(&b.value)
        })
    }
}

impl<K: Eq, V: Eq, C> Eq for ThreadedMap<K, V, C> {}

impl<K, V> ThreadedMap<K, V> {
    /// Creates an empty `ThreadedMap` ordered by the `Ord` implementation of `K`
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::ThreadedMap;
    /// let mut map: ThreadedMap<&str, i32> = ThreadedMap::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty `ThreadedMap` that can hold at least `capacity` entries without
    /// reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, Natural)
    }
}

impl<K, V, C> ThreadedMap<K, V, C> {
    /// Creates an empty `ThreadedMap` ordered by the given comparator
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::{ThreadedMap, compare::Reverse};
    ///
    /// let mut map = ThreadedMap::with_comparator(Reverse);
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// assert_eq!(map.values(true), &[(&2, &"b"), (&1, &"a")]);
    /// ```
    pub fn with_comparator(compare: C) -> Self {
        Self::with_capacity_and_comparator(0, compare)
    }

    /// Creates an empty `ThreadedMap` ordered by the given comparator that can hold at least
    /// `capacity` entries without reallocating
    pub fn with_capacity_and_comparator(capacity: usize, compare: C) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            root: None,
            len: 0,
            compare,
            // An empty tree has no threads to compute
            threads_valid: Cell::new(true),
        }
    }

    /// Returns the number of entries in the map (i.e. the number of nodes in the binary search
    /// tree)
    ///
    /// Time complexity: `O(1)`
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::ThreadedMap;
    ///
    /// let mut map = ThreadedMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.len, self.nodes.len());
        self.len
    }

    /// Returns true if the map is empty
    ///
    /// Time complexity: `O(1)`
    pub fn is_empty(&self) -> bool {
        debug_assert!(self.len != 0 || self.root.is_none());
        self.len == 0
    }

    /// Returns the number of entries the map can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Reserves capacity for at least `additional` more entries
    pub fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional)
    }

    /// Shrinks the capacity of the map as much as possible
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit()
    }

    /// Returns the comparator that orders the keys of this map
    pub fn comparator(&self) -> &C {
        &self.compare
    }

    /// Removes every entry from the map
    ///
    /// Nodes are released by walking the owned links of the tree. Threads are never followed.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::ThreadedMap;
    ///
    /// let mut map = ThreadedMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.begin(), map.end());
    /// ```
    pub fn clear(&mut self) {
        debug!("clearing map with {} entries", self.len);

        let mut stack: Vec<Ptr> = self.root.take().into_iter().collect();
        while let Some(ptr) = stack.pop() {
            if let Some(node) = self.nodes.remove(ptr) {
                stack.extend(node.left);
                stack.extend(node.right_child());
            }
        }
        debug_assert!(self.nodes.is_empty(), "bug: node not reachable through owned links");

        self.nodes.clear();
        self.len = 0;
        // An empty tree has no threads to compute
        self.threads_valid.set(true);
    }

    /// Exchanges the entire contents of two maps, including their comparators
    ///
    /// Both maps must have the same comparator type. Takes `O(1)` time.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Returns a cursor at the smallest key of the map, or the end cursor if the map is empty
    ///
    /// Rebuilds the successor threads first if the map was modified since they were last built.
    pub fn begin(&self) -> Cursor<'_, K, V> {
        self.ensure_threaded();
        Cursor::leftmost(&self.nodes, self.root)
    }

    /// Returns the cursor past the largest key of the map
    pub fn end(&self) -> Cursor<'_, K, V> {
        self.ensure_threaded();
        Cursor::new(&self.nodes, None)
    }

    /// Returns an iterator over the entries of the map in ascending key order
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::ThreadedMap;
    ///
    /// let mut map = ThreadedMap::new();
    /// map.insert(3, "c");
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let keys: Vec<_> = map.iter().map(|(key, _)| *key).collect();
    /// assert_eq!(keys, &[1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.begin(), self.len)
    }

    /// Returns a snapshot of every entry in ascending key order, or in exactly the reverse order
    /// if `ascending` is false
    ///
    /// The snapshot walks the owned links of the tree and never needs the threads.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::ThreadedMap;
    ///
    /// let map: ThreadedMap<_, _> = vec![(2, 'b'), (1, 'a'), (3, 'c')].into_iter().collect();
    /// assert_eq!(map.values(true), &[(&1, &'a'), (&2, &'b'), (&3, &'c')]);
    /// assert_eq!(map.values(false), &[(&3, &'c'), (&2, &'b'), (&1, &'a')]);
    /// ```
    pub fn values(&self, ascending: bool) -> Vec<(&K, &V)> {
        let direction = if ascending { Direction::Ascending } else { Direction::Descending };

        let mut entries = Vec::with_capacity(self.len);
        entries.extend(InorderWalk::new(&self.nodes, self.root, direction).map(|ptr| {
            let node = &self.nodes[ptr];
            (&node.key, &node.value)
        }));
        entries
    }

    /// Performs a pre-order traversal of the owned structure of the tree
    pub fn iter_preorder(&self) -> IterPreorder<'_, K, V> {
        IterPreorder::new(&self.nodes, self.root)
    }

    /// Returns the root node of the tree, or `None` if the tree is empty
    ///
    /// Note that the root can be **any** node inserted into the tree. For a guaranteed ordering,
    /// use the various iteration methods.
    ///
    /// This is a low-level API meant to be used for implementing custom traversals. Threads are
    /// not visible through it.
    pub fn root(&self) -> Option<Node<'_, K, V>> {
        self.root.map(|ptr| Node::new(&self.nodes, ptr))
    }

    /// Changes the owner of a node to point at `target`
    fn set_slot(&mut self, slot: Slot, target: Option<Ptr>) {
        match slot {
            Slot::Root => self.root = target,
            Slot::Left(parent) => self.nodes[parent].left = target,
            Slot::Right(parent) => {
                let link = target.map_or(Link::Empty, Link::Child);
                self.nodes[parent].right.set(link);
            },
        }
    }
}

impl<K, V, C: Compare<K>> ThreadedMap<K, V, C> {
    /// Descends from the root looking for `key`
    ///
    /// Returns the node with an equal key, if any, and the slot where the search stopped (the
    /// owner of the found node, or the empty slot where `key` belongs). A thread counts as an
    /// empty slot since it is not a child.
    fn search(&self, key: &K) -> (Option<Ptr>, Slot) {
        let mut slot = Slot::Root;
        let mut current = self.root;
        while let Some(ptr) = current {
            let node = &self.nodes[ptr];
            match self.compare.compare(key, &node.key) {
                Ordering::Less => {
                    slot = Slot::Left(ptr);
                    current = node.left;
                },
                Ordering::Greater => {
                    slot = Slot::Right(ptr);
                    current = node.right_child();
                },
                Ordering::Equal => return (Some(ptr), slot),
            }
        }

        (None, slot)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// Time complexity: `O(h)` where `h` is the height of the tree
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::ThreadedMap;
    ///
    /// let mut map = ThreadedMap::new();
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).0.is_some()
    }

    /// Returns a reference to the value corresponding to the given key, or `None` if no such key
    /// exists in the map
    ///
    /// Does not need the successor threads, so it never triggers a rebuild.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::ThreadedMap;
    ///
    /// let mut map = ThreadedMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let ptr = self.search(key).0?;
        Some(&self.nodes[ptr].value)
    }

    /// Returns a mutable reference to the value corresponding to the given key, or `None` if no
    /// such key exists in the map
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let ptr = self.search(key).0?;
        Some(&mut self.nodes[ptr].value)
    }

    /// Returns a cursor at the entry with the given key, or the end cursor if there is no such
    /// entry
    ///
    /// The threads are rebuilt first if needed, so the returned cursor can be advanced.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::ThreadedMap;
    ///
    /// let mut map = ThreadedMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// let mut cursor = map.find(&1);
    /// assert_eq!(cursor.value(), Ok(&"a"));
    /// cursor.move_next();
    /// assert_eq!(cursor.value(), Ok(&"b"));
    ///
    /// assert_eq!(map.find(&3), map.end());
    /// ```
    pub fn find(&self, key: &K) -> Cursor<'_, K, V> {
        self.ensure_threaded();
        Cursor::new(&self.nodes, self.search(key).0)
    }

    /// Inserts a new value into the map
    ///
    /// Returns the previous value if the key was already present in an existing node or `None` if
    /// a new node was inserted. Replacing a value does not change the shape of the tree, so only a
    /// new node makes the threads stale.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::ThreadedMap;
    ///
    /// let mut map = ThreadedMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert!(!map.is_empty());
    ///
    /// map.insert(37, "b");
    /// assert_eq!(map.insert(37, "c"), Some("b"));
    /// assert_eq!(map.get(&37), Some(&"c"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.search(&key) {
            (Some(ptr), _) => Some(mem::replace(&mut self.nodes[ptr].value, value)),
            (None, slot) => {
                self.attach(slot, key, value);
                None
            },
        }
    }

    /// Inserts every entry of `entries` in order, as if by calling `insert` on each
    pub fn insert_all<I>(&mut self, entries: I)
        where I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }

    /// Returns a mutable reference to the value for `key`, inserting `V::default()` first if the
    /// key is not in the map
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::ThreadedMap;
    ///
    /// let mut map = ThreadedMap::new();
    /// *map.get_or_insert_default("a") += 1;
    /// *map.get_or_insert_default("a") += 1;
    /// assert_eq!(map.get(&"a"), Some(&2));
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
        where V: Default,
    {
        let ptr = match self.search(&key) {
            (Some(ptr), _) => ptr,
            (None, slot) => self.attach(slot, key, V::default()),
        };

        &mut self.nodes[ptr].value
    }

    /// Creates a new node owned by `slot`, which must be empty or hold a thread
    fn attach(&mut self, slot: Slot, key: K, value: V) -> Ptr {
        let ptr = self.nodes.push(InnerNode::new(key, value));
        self.set_slot(slot, Some(ptr));
        self.len += 1;
        self.invalidate_threads();
        ptr
    }

    /// Removes a key from the map, returning the value at the key if the key was previously in the
    /// map.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::ThreadedMap;
    ///
    /// let mut map = ThreadedMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (ptr, slot) = match self.search(key) {
            (Some(ptr), slot) => (ptr, slot),
            (None, _) => return None,
        };

        let node = &self.nodes[ptr];
        let left = node.left;
        let right = node.right_child();

        let replacement = match (left, right) {
            // Leaf, or a node whose only child is on one side: promote that child (if any)
            (None, right) => right,
            (Some(left), None) => Some(left),

            (Some(left), Some(right)) => {
                let successor = self.detach_successor(right);
                let successor_node = &mut self.nodes[successor];
                successor_node.left = Some(left);
                // The successor is only the right child itself when that child has no left
                // subtree, in which case it keeps its own right subtree
                if successor != right {
                    successor_node.right.set(Link::Child(right));
                }
                Some(successor)
            },
        };
        self.set_slot(slot, replacement);

        let node = match self.nodes.remove(ptr) {
            Some(node) => node,
            None => unreachable!("bug: search returned a dangling pointer"),
        };
        self.len -= 1;
        self.invalidate_threads();

        Some(node.value)
    }

    /// Removes the leftmost node of the subtree at `subtree` from its parent and returns it
    ///
    /// The right subtree of the removed node (never a thread) takes its place. The removed node is
    /// left with an empty left link and a right link that is either a child or empty.
    fn detach_successor(&mut self, subtree: Ptr) -> Ptr {
        let mut parent = None;
        let mut current = subtree;
        while let Some(left) = self.nodes[current].left {
            parent = Some(current);
            current = left;
        }

        let node = &self.nodes[current];
        let promoted = node.right_child();
        if node.right.get().is_thread() {
            node.right.set(Link::Empty);
        }

        if let Some(parent) = parent {
            self.nodes[parent].left = promoted;
        }

        current
    }

    /// Removes a key from the map, returning its value
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFound`] carrying the key if it is not in the map. The map is unchanged in
    /// that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use threaded_bst::{ThreadedMap, KeyNotFound};
    ///
    /// let mut map = ThreadedMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.erase(&1), Ok("a"));
    /// assert_eq!(map.erase(&1), Err(KeyNotFound {key: 1}));
    /// ```
    pub fn erase(&mut self, key: &K) -> Result<V, KeyNotFound<K>>
        where K: Clone + fmt::Debug,
    {
        match self.remove(key) {
            Some(value) => Ok(value),
            None => {
                debug!("erase failed, key not found: {:?}", key);
                Err(KeyNotFound {key: key.clone()})
            },
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a ThreadedMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for ThreadedMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.insert_all(iter);
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for ThreadedMap<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.insert_all(iter);
        map
    }
}
