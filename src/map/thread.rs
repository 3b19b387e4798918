//! Computing the inorder successor threads of the tree
//!
//! Mutations never repair threads. They only mark them stale, and the next operation that needs
//! to follow threads rebuilds all of them in a single O(n) pass.

use log::trace;

use crate::slab::{Ptr, Slab};

use super::{InnerNode, Link, ThreadedMap};
use super::inorder::{Direction, InorderWalk};

/// Turns every thread in the tree back into an empty slot
///
/// Visits every node through owned links with an explicit stack.
pub(super) fn reset_threads<K, V>(nodes: &Slab<InnerNode<K, V>>, root: Option<Ptr>) {
    let mut stack: Vec<Ptr> = root.into_iter().collect();
    while let Some(ptr) = stack.pop() {
        let node = &nodes[ptr];
        match node.right.get() {
            Link::Child(right) => stack.push(right),
            Link::Thread(_) => node.right.set(Link::Empty),
            Link::Empty => {},
        }
        stack.extend(node.left);
    }
}

/// Recomputes every thread in the tree from scratch
///
/// Each empty right slot is pointed at the next node in ascending order. The maximum node is left
/// empty since it has no successor.
pub(super) fn build_threads<K, V>(nodes: &Slab<InnerNode<K, V>>, root: Option<Ptr>) {
    reset_threads(nodes, root);

    let mut prev: Option<Ptr> = None;
    // The walk only reads owned links, and a slot is only written once the walk has moved past
    // that node, so writing threads does not disturb the walk.
    for current in InorderWalk::new(nodes, root, Direction::Ascending) {
        if let Some(prev) = prev {
            let prev_node = &nodes[prev];
            if prev_node.right.get() == Link::Empty {
                prev_node.right.set(Link::Thread(current));
            }
        }
        prev = Some(current);
    }
}

impl<K, V, C> ThreadedMap<K, V, C> {
    /// Rebuilds the threads if any mutation has happened since they were last built
    pub(crate) fn ensure_threaded(&self) {
        if self.threads_valid.get() {
            return;
        }

        trace!("rebuilding threads for {} nodes", self.len);
        build_threads(&self.nodes, self.root);
        self.threads_valid.set(true);
    }

    /// Marks every thread as stale
    #[inline]
    pub(crate) fn invalidate_threads(&mut self) {
        self.threads_valid.set(false);
    }

    /// Returns true if the threads are currently up to date with the shape of the tree
    pub fn is_threaded(&self) -> bool {
        self.threads_valid.get()
    }

    /// Checks that every empty or threaded right slot agrees with the current shape of the tree
    #[cfg(test)]
    pub(crate) fn threads_match_shape(&self) -> bool {
        let order: Vec<Ptr> = InorderWalk::new(&self.nodes, self.root, Direction::Ascending)
            .collect();

        order.iter().enumerate().all(|(i, &ptr)| {
            let expected_next = order.get(i + 1).copied();
            match self.nodes[ptr].right.get() {
                Link::Child(_) => true,
                Link::Thread(next) => Some(next) == expected_next,
                Link::Empty => expected_next.is_none(),
            }
        })
    }
}
