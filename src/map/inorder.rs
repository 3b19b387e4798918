use std::iter::FusedIterator;

use crate::slab::{Ptr, Slab};

use super::InnerNode;

/// Which way an inorder walk visits the keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Ascending,
    Descending,
}

/// An inorder walk over the owned links of the tree, using an explicit stack
///
/// Threads are never followed, so the walk is correct whether or not the threads are currently
/// valid, and it may be used to rebuild them. Each node is yielded as its pointer.
pub(crate) struct InorderWalk<'a, K, V> {
    nodes: &'a Slab<InnerNode<K, V>>,
    stack: Vec<Ptr>,
    direction: Direction,
}

// See: https://www.geeksforgeeks.org/inorder-tree-traversal-without-recursion/
impl<'a, K, V> InorderWalk<'a, K, V> {
    pub fn new(nodes: &'a Slab<InnerNode<K, V>>, root: Option<Ptr>, direction: Direction) -> Self {
        let mut walk = Self {nodes, stack: Vec::new(), direction};
        walk.push_spine(root);
        walk
    }

    /// Pushes `current` and every node down the near edge of its subtree
    fn push_spine(&mut self, mut current: Option<Ptr>) {
        while let Some(ptr) = current {
            self.stack.push(ptr);
            let node = &self.nodes[ptr];
            current = match self.direction {
                Direction::Ascending => node.left,
                Direction::Descending => node.right_child(),
            };
        }
    }
}

impl<'a, K, V> Iterator for InorderWalk<'a, K, V> {
    type Item = Ptr;

    fn next(&mut self) -> Option<Self::Item> {
        let top_ptr = self.stack.pop()?;
        let node = &self.nodes[top_ptr];

        let far = match self.direction {
            Direction::Ascending => node.right_child(),
            Direction::Descending => node.left,
        };
        self.push_spine(far);

        Some(top_ptr)
    }
}

impl<'a, K, V> FusedIterator for InorderWalk<'a, K, V> {}
