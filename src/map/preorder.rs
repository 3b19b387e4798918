use std::iter::FusedIterator;

use crate::slab::{Ptr, Slab};

use super::InnerNode;

/// A pre-order traversal over the owned structure of the tree
///
/// Useful for inspecting the shape of the tree. Threads are never followed.
pub struct IterPreorder<'a, K, V> {
    nodes: &'a Slab<InnerNode<K, V>>,
    stack: Vec<Ptr>,
}

impl<'a, K, V> IterPreorder<'a, K, V> {
    pub(super) fn new(nodes: &'a Slab<InnerNode<K, V>>, root: Option<Ptr>) -> Self {
        Self {
            nodes,
            stack: root.into_iter().collect(),
        }
    }
}

// See: https://www.geeksforgeeks.org/iterative-preorder-traversal/
impl<'a, K, V> Iterator for IterPreorder<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let top_ptr = self.stack.pop()?;
        let node = &self.nodes[top_ptr];
        self.stack.extend(node.right_child());
        self.stack.extend(node.left);
        Some((&node.key, &node.value))
    }
}

impl<'a, K, V> FusedIterator for IterPreorder<'a, K, V> {}
