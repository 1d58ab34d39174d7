use core::cmp::Ordering;

/// A strict weak ordering over keys.
///
/// `less(a, b)` answers "does `a` sort strictly before `b`?". The collection never asks
/// for equality directly: two keys are equivalent when neither is less than the other,
/// and equivalent keys collapse to a single stored key.
///
/// Every `Fn(&K, &K) -> bool` is a `Compare<K>`, so a closure can be passed wherever a
/// predicate is expected.
///
/// # Examples
///
/// ```
/// use ostreap::OSTreapSet;
///
/// // Descending order.
/// let mut set = OSTreapSet::with_compare(|a: &i32, b: &i32| b < a);
/// set.extend([1, 3, 2]);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
pub trait Compare<K: ?Sized> {
    /// Returns true if `a` sorts strictly before `b`.
    fn less(&self, a: &K, b: &K) -> bool;

    /// Returns true if neither key sorts before the other.
    #[inline]
    fn equivalent(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }

    /// Derives a total [`Ordering`] from the predicate.
    #[inline]
    fn ordering(&self, a: &K, b: &K) -> Ordering {
        if self.less(a, b) {
            Ordering::Less
        } else if self.less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}

/// The ordering given by the key's [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

impl<K: ?Sized + Ord> Compare<K> for Natural {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }

    #[inline]
    fn ordering(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}
