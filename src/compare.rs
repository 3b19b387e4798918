//! Comparators that decide the order of keys in a [`ThreadedMap`](crate::ThreadedMap)

use std::cmp::Ordering;

/// A strict weak ordering over keys of type `K`
///
/// Two keys are considered equal when neither compares less than the other. The comparator is
/// supplied when the map is constructed and is never changed afterwards.
///
/// Any closure or function of type `Fn(&K, &K) -> bool` is a comparator:
///
/// ```
/// use threaded_bst::ThreadedMap;
///
/// let mut map = ThreadedMap::with_comparator(|a: &i32, b: &i32| a.abs() < b.abs());
/// map.insert(-3, "a");
/// map.insert(2, "b");
/// // -2 and 2 are equal under this ordering
/// assert_eq!(map.insert(-2, "c"), Some("b"));
///
/// let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
/// assert_eq!(keys, &[2, -3]);
/// ```
pub trait Compare<K: ?Sized> {
    /// Returns true if `a` is ordered strictly before `b`
    fn less(&self, a: &K, b: &K) -> bool;

    /// Compares two keys, deriving equality from `less`
    fn compare(&self, a: &K, b: &K) -> Ordering {
        if self.less(a, b) {
            Ordering::Less
        } else if self.less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Orders keys in ascending order using their `Ord` implementation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Natural;

impl<K: Ord + ?Sized> Compare<K> for Natural {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }

    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Orders keys in descending order using their `Ord` implementation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reverse;

impl<K: Ord + ?Sized> Compare<K> for Reverse {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a > b
    }

    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        b.cmp(a)
    }
}

impl<K: ?Sized, F> Compare<K> for F
    where F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}
