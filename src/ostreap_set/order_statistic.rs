use core::ops::Index;

use super::{Cursor, OSTreapSet};
use crate::Rank;
use crate::compare::Compare;

impl<K, C, R> OSTreapSet<K, C, R> {
    /// Returns a cursor at the key of zero-based `rank` in ascending order, or the end
    /// position if `rank >= len`.
    ///
    /// # Complexity
    ///
    /// O(log n) expected.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let set = OSTreapSet::from([10, 20, 30]);
    /// assert_eq!(set.select(1).key(), Some(&20));
    /// assert_eq!(set.select(1).rank(), 1);
    /// assert!(set.select(3).is_end());
    /// ```
    pub fn select(&self, rank: usize) -> Cursor<'_, K, C, R> {
        Cursor::new(&self.tree, self.tree.select(rank))
    }

    /// Returns the key of zero-based `rank` in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let set = OSTreapSet::from([10, 20, 30]);
    /// assert_eq!(set.get_by_rank(2), Some(&30));
    /// assert!(set.get_by_rank(3).is_none());
    /// ```
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<&K> {
        self.tree.select(rank).map(|h| self.tree.key(h))
    }
}

impl<K, C, R> OSTreapSet<K, C, R>
where
    C: Compare<K>,
{
    /// Returns the zero-based rank of `key` in ascending order, or `None` if the key is
    /// not present.
    ///
    /// # Complexity
    ///
    /// O(log n) expected.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let set = OSTreapSet::from([10, 20]);
    /// assert_eq!(set.rank_of(&20), Some(1));
    /// assert_eq!(set.rank_of(&15), None);
    /// ```
    #[must_use]
    pub fn rank_of(&self, key: &K) -> Option<usize> {
        self.tree.rank_of(key)
    }
}

/// Indexes into the set by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use ostreap::{OSTreapSet, Rank};
///
/// let set = OSTreapSet::from([10, 20, 30]);
/// assert_eq!(set[Rank(1)], 20);
/// ```
impl<K, C, R> Index<Rank> for OSTreapSet<K, C, R> {
    type Output = K;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.get_by_rank(rank.0).expect("index out of bounds")
    }
}
