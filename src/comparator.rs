//! Key orderings for [`AvlTreeMap`](crate::AvlTreeMap).
//!
//! A comparator is fixed when the map is built and must stay consistent for
//! the lifetime of the map: keys are placed by it and found by it again.

use std::cmp::Ordering;

/// A total order over keys of type `K`.
///
/// Two keys are treated as the same key when the comparator reports
/// [`Ordering::Equal`].
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator:
///
/// ```
/// use avlmap::AvlTreeMap;
/// let mut map = AvlTreeMap::with_comparator(|a: &i32, b: &i32| b.cmp(a));
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [2, 1]);
/// ```
pub trait Comparator<K: ?Sized> {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation. This is the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

/// Orders keys by the reverse of their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder;

/// Adapts a strict weak "less than" predicate into a comparator.
///
/// Keys for which neither `less(a, b)` nor `less(b, a)` holds are equivalent.
///
/// ```
/// use avlmap::{AvlTreeMap, LessThan};
/// let mut map = AvlTreeMap::with_comparator(LessThan(|a: &&str, b: &&str| a.len() < b.len()));
/// map.insert("ccc", 3);
/// map.insert("a", 1);
/// assert!(!map.insert("b", 2).1);
/// assert_eq!(map.get(&"z"), Some(&1));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct LessThan<F>(pub F);

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

impl<K: Ord + ?Sized> Comparator<K> for ReverseOrder {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        rhs.cmp(lhs)
    }
}

impl<K, F> Comparator<K> for LessThan<F>
where
    K: ?Sized,
    F: Fn(&K, &K) -> bool,
{
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        if (self.0)(lhs, rhs) {
            Ordering::Less
        } else if (self.0)(rhs, lhs) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl<K, F> Comparator<K> for F
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}
