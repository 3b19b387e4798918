//! An ordered map backed by a threaded binary search tree
//!
//! [`ThreadedMap`] stores its entries in an unbalanced binary search tree. Every node that has no
//! right subtree reuses its right link as a "thread" to its inorder successor, so a [`Cursor`] can
//! walk the map in ascending order without parent pointers or a stack of ancestors.
//!
//! ```
//! use threaded_bst::ThreadedMap;
//!
//! let mut map = ThreadedMap::new();
//! for &key in &[5, 3, 8, 1, 4, 7, 9] {
//!     map.insert(key, key * 10);
//! }
//! map.erase(&5).unwrap();
//!
//! let mut cursor = map.begin();
//! let mut keys = Vec::new();
//! while cursor != map.end() {
//!     keys.push(*cursor.key().unwrap());
//!     cursor.move_next();
//! }
//! assert_eq!(keys, &[1, 3, 4, 7, 8, 9]);
//! ```

pub mod compare;
pub mod map;

mod error;
mod slab;

pub use compare::Compare;
pub use error::{EndDereference, KeyNotFound};
pub use map::{Cursor, Iter, ThreadedMap};

#[macro_export(local_inner_macros)]
macro_rules! threadmap {
    // trailing comma case
    ($($key:expr => $value:expr,)+) => (threadmap!($($key => $value),+));

    ( $($key:expr => $value:expr),* ) => {
        {
            let mut _map = $crate::ThreadedMap::new();
            $(
                let _ = _map.insert($key, $value);
            )*
            _map
        }
    };
}
