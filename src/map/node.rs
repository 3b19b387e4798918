use std::cell::Cell;
use std::fmt;
use std::ptr;

use crate::slab::{Ptr, Slab};

/// The right slot of a node
///
/// A node either owns its right subtree (`Child`), or has no right subtree. In the latter case the
/// slot is reused to point at the inorder successor of the node (`Thread`), or is `Empty` when the
/// successor has not been computed yet or the node is the maximum of the tree. A `Thread` never
/// owns the node it points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Link {
    Empty,
    Child(Ptr),
    Thread(Ptr),
}

impl Link {
    /// Returns the right subtree, ignoring threads
    #[inline]
    pub fn child(self) -> Option<Ptr> {
        match self {
            Link::Child(ptr) => Some(ptr),
            Link::Empty | Link::Thread(_) => None,
        }
    }

    #[inline]
    pub fn is_thread(self) -> bool {
        matches!(self, Link::Thread(_))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct InnerNode<K, V> {
    pub key: K,
    pub value: V,
    pub left: Option<Ptr>,
    /// Only threads are written through a shared reference. `Child` links are changed exclusively
    /// by operations that hold `&mut` access to the map.
    pub right: Cell<Link>,
}

impl<K, V> InnerNode<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: Cell::new(Link::Empty),
        }
    }

    #[inline]
    pub fn right_child(&self) -> Option<Ptr> {
        self.right.get().child()
    }
}

/// A single node of the threaded binary search tree
///
/// Only the owned structure of the tree is visible through this type. Threads are an internal
/// detail of iteration and are never reported as children.
pub struct Node<'a, K, V> {
    nodes: &'a Slab<InnerNode<K, V>>,
    node: &'a InnerNode<K, V>,
}

impl<'a, K, V> fmt::Debug for Node<'a, K, V>
    where K: fmt::Debug,
          V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", self.key())
            .field("value", self.value())
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

impl<'a, K, V> Clone for Node<'a, K, V> {
    fn clone(&self) -> Self {
        Self {..*self}
    }
}

impl<'a, K, V> Copy for Node<'a, K, V> {}

impl<'a, K: PartialEq, V: PartialEq> PartialEq for Node<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        // If the pointers are the same, the values are guaranteed to be equal (similar to `Arc`
        // using `ptr_eq` to optimize its `PartialEq` impl)
        let ptr_eq = ptr::eq(self.nodes, other.nodes) && ptr::eq(self.node, other.node);
        ptr_eq || (self.key().eq(other.key()) && self.value().eq(other.value()))
    }
}

impl<'a, K: Eq, V: Eq> Eq for Node<'a, K, V> {}

impl<'a, K, V> Node<'a, K, V> {
    pub(super) fn new(nodes: &'a Slab<InnerNode<K, V>>, ptr: Ptr) -> Self {
        Self {nodes, node: &nodes[ptr]}
    }

    /// Returns the key of this node
    pub fn key(&self) -> &'a K {
        &self.node.key
    }

    /// Returns the value of this node
    pub fn value(&self) -> &'a V {
        &self.node.value
    }

    /// Returns true if this node has a left subtree
    pub fn has_left(&self) -> bool {
        self.node.left.is_some()
    }

    /// Returns true if this node owns a right subtree
    pub fn has_right(&self) -> bool {
        self.node.right_child().is_some()
    }

    /// Returns the left child node (subtree) of this node, if any
    pub fn left(&self) -> Option<Self> {
        self.node.left.map(|ptr| Self::new(self.nodes, ptr))
    }

    /// Returns the right child node (subtree) of this node, if any
    ///
    /// A thread to the inorder successor is not a child and is never returned.
    pub fn right(&self) -> Option<Self> {
        self.node.right_child().map(|ptr| Self::new(self.nodes, ptr))
    }
}
