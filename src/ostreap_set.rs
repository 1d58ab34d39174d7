use core::fmt;
use core::iter::FusedIterator;

use alloc::vec::{self, Vec};

use log::debug;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::compare::{Compare, Natural};
use crate::error::Result;
use crate::raw::{Handle, RawTreap};

mod capacity;
mod cursor;
mod order_statistic;

pub use cursor::{BaseCursor, Cursor, Position, RevCursor};

#[cfg(not(feature = "std"))]
const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// An ordered set of unique keys with O(log n) rank and select queries.
///
/// The set is a treap: a binary search tree whose shape is fixed by a random priority
/// drawn for each key, which keeps the expected depth logarithmic without explicit
/// rebalancing. Each node also counts its subtree, so the set can find the key at a
/// given rank ([`select`](Self::select), [`get_by_rank`](Self::get_by_rank)) and the
/// rank of a key ([`rank_of`](Self::rank_of)) as fast as it can look a key up.
///
/// Keys are ordered by a [`Compare`] predicate, [`Natural`] (the key's [`Ord`]) by
/// default. Two keys the predicate cannot tell apart are the same key to the set.
///
/// Priorities come from `R`, a [`SmallRng`] by default. A seeded generator
/// ([`with_seed`](Self::with_seed)) makes the tree shape reproducible; a poor generator
/// only costs balance, never correctness.
///
/// Besides Rust iterators ([`iter`](Self::iter)), the set hands out [`Cursor`]s: movable
/// positions that can step in both directions, jump by an offset and report their rank.
///
/// It is a logic error for a key to be modified in such a way that its ordering
/// relative to any other key changes while it is in the set.
///
/// # Examples
///
/// ```
/// use ostreap::OSTreapSet;
///
/// let mut set = OSTreapSet::new();
/// for key in [5, 3, 8, 1] {
///     set.insert(key);
/// }
///
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 5, 8]);
/// assert_eq!(set.select(0).key(), Some(&1));
/// assert_eq!(set.select(3).key(), Some(&8));
/// assert!(set.select(4).is_end());
/// assert_eq!(set.lower_bound(&4).key(), Some(&5));
/// assert_eq!(set.upper_bound(&5).key(), Some(&8));
///
/// set.remove(&3);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 5, 8]);
/// assert_eq!(set.len(), 3);
/// ```
pub struct OSTreapSet<K, C = Natural, R = SmallRng> {
    tree: RawTreap<K, C, R>,
}

/// An iterator over the keys of an `OSTreapSet`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`OSTreapSet`].
///
/// # Examples
///
/// ```
/// use ostreap::OSTreapSet;
///
/// let set = OSTreapSet::from([3, 1, 2]);
/// let mut iter = set.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next_back(), Some(&3));
/// assert_eq!(iter.next(), Some(&2));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: OSTreapSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, C = Natural, R = SmallRng> {
    tree: &'a RawTreap<K, C, R>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// An owning iterator over the keys of an `OSTreapSet`, in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`OSTreapSet`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: OSTreapSet#method.into_iter
pub struct IntoIter<K> {
    inner: vec::IntoIter<K>,
}

impl<K> OSTreapSet<K> {
    /// Makes a new, empty set ordered by [`Ord`].
    ///
    /// With the `std` feature the priority generator is seeded from the thread-local
    /// generator; without it every new set starts from the same fixed seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut set: OSTreapSet<i32> = OSTreapSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_compare(Natural)
    }

    /// Makes a new, empty set whose tree shape is fully determined by `seed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let a = OSTreapSet::<u32>::with_seed(42);
    /// let b = OSTreapSet::<u32>::with_seed(42);
    /// assert_eq!(a, b);
    /// ```
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_compare_and_rng(Natural, SmallRng::seed_from_u64(seed))
    }
}

impl<K, C> OSTreapSet<K, C> {
    /// Makes a new, empty set ordered by `compare`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut set = OSTreapSet::with_compare(|a: &&str, b: &&str| a.len() < b.len());
    /// set.insert("ccc");
    /// set.insert("a");
    /// assert!(!set.insert("b")); // Same length as "a".
    /// assert_eq!(set.iter().copied().collect::<Vec<_>>(), ["a", "ccc"]);
    /// ```
    #[must_use]
    pub fn with_compare(compare: C) -> Self {
        Self::with_compare_and_rng(compare, default_rng())
    }
}

#[cfg(feature = "std")]
fn default_rng() -> SmallRng {
    SmallRng::from_rng(&mut rand::rng())
}

#[cfg(not(feature = "std"))]
fn default_rng() -> SmallRng {
    SmallRng::seed_from_u64(DEFAULT_SEED)
}

impl<K, C, R> OSTreapSet<K, C, R> {
    /// Makes a new, empty set ordered by `compare` drawing priorities from `rng`.
    #[must_use]
    pub fn with_compare_and_rng(compare: C, rng: R) -> Self {
        OSTreapSet {
            tree: RawTreap::new(compare, rng),
        }
    }

    /// Returns the number of keys in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut set = OSTreapSet::new();
    /// assert_eq!(set.len(), 0);
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the ordering predicate.
    #[must_use]
    pub const fn compare(&self) -> &C {
        self.tree.compare()
    }

    /// Removes every key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut set = OSTreapSet::from([1, 2]);
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert_eq!(set.begin(), set.end());
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Exchanges the contents, predicates and generators of two sets in O(1).
    ///
    /// Positions taken before the swap follow their keys into the other set.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut a = OSTreapSet::from([1, 2]);
    /// let mut b = OSTreapSet::from([3]);
    /// let position = a.find(&2).position();
    ///
    /// a.swap(&mut b);
    /// assert_eq!(a.iter().copied().collect::<Vec<_>>(), [3]);
    /// assert_eq!(b.remove_at(position), Ok(2));
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Returns a cursor at the smallest key, or the end position if the set is empty.
    pub fn begin(&self) -> Cursor<'_, K, C, R> {
        Cursor::new(&self.tree, self.tree.first())
    }

    /// Returns the end position.
    pub fn end(&self) -> Cursor<'_, K, C, R> {
        Cursor::new(&self.tree, None)
    }

    /// Returns a descending cursor at the largest key, or the end position if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let set = OSTreapSet::from([1, 2, 3]);
    /// let mut cursor = set.rbegin();
    /// let mut keys = Vec::new();
    /// while cursor != set.rend() {
    ///     keys.push(*cursor.key().unwrap());
    ///     cursor.move_next();
    /// }
    /// assert_eq!(keys, [3, 2, 1]);
    /// ```
    pub fn rbegin(&self) -> RevCursor<'_, K, C, R> {
        RevCursor::new(&self.tree, self.tree.last())
    }

    /// Returns the end position of a descending walk.
    pub fn rend(&self) -> RevCursor<'_, K, C, R> {
        RevCursor::new(&self.tree, None)
    }

    /// Gets an iterator that visits the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let set = OSTreapSet::from([3, 1, 2]);
    /// let keys: Vec<_> = set.iter().rev().copied().collect();
    /// assert_eq!(keys, [3, 2, 1]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, C, R> {
        Iter {
            tree: &self.tree,
            front: self.tree.first(),
            back: self.tree.last(),
            remaining: self.tree.len(),
        }
    }

    /// Returns the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.tree.first().map(|h| self.tree.key(h))
    }

    /// Returns the largest key.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.tree.last().map(|h| self.tree.key(h))
    }

    /// Removes the key at `position` and returns it.
    ///
    /// # Errors
    ///
    /// - [`Error::EndPosition`](crate::Error::EndPosition) if `position` is the end position.
    /// - [`Error::ForeignPosition`](crate::Error::ForeignPosition) if it was taken from another set.
    /// - [`Error::StalePosition`](crate::Error::StalePosition) if its key was already removed.
    pub fn remove_at(&mut self, position: Position) -> Result<K> {
        self.tree.remove_at(position.tree(), position.slot())
    }

    /// Removes and returns the smallest key.
    pub fn pop_first(&mut self) -> Option<K> {
        let first = self.begin().position();
        self.remove_at(first).ok()
    }

    /// Removes and returns the largest key.
    pub fn pop_last(&mut self) -> Option<K> {
        let last = self.rbegin().position();
        self.remove_at(last).ok()
    }

    /// Keeps only the keys for which `keep` returns `true`.
    ///
    /// Positions of the kept keys stay valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut set: OSTreapSet<i32> = (0..8).collect();
    /// let six = set.find(&6).position();
    /// set.retain(|k| k % 2 == 0);
    /// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [0, 2, 4, 6]);
    /// assert_eq!(set.remove_at(six), Ok(6));
    /// ```
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&K) -> bool,
    {
        self.tree.retain(keep);
    }
}

impl<K, C, R> OSTreapSet<K, C, R>
where
    C: Compare<K>,
{
    /// Returns `true` if the set holds a key equivalent to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let set = OSTreapSet::from([1, 2, 3]);
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&4));
    /// ```
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Returns the stored key equivalent to `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&K> {
        self.tree.find(key).map(|h| self.tree.key(h))
    }

    /// Returns a cursor at the key equivalent to `key`, or the end position.
    pub fn find(&self, key: &K) -> Cursor<'_, K, C, R> {
        Cursor::new(&self.tree, self.tree.find(key))
    }

    /// Returns a cursor at the first key that is not less than `key`, or the end position.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let set = OSTreapSet::from([10, 20, 30]);
    /// assert_eq!(set.lower_bound(&20).key(), Some(&20));
    /// assert_eq!(set.lower_bound(&21).key(), Some(&30));
    /// assert!(set.lower_bound(&31).is_end());
    /// ```
    pub fn lower_bound(&self, key: &K) -> Cursor<'_, K, C, R> {
        Cursor::new(&self.tree, self.tree.lower_bound(key))
    }

    /// Returns a cursor at the first key greater than `key`, or the end position.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let set = OSTreapSet::from([10, 20, 30]);
    /// assert_eq!(set.upper_bound(&20).key(), Some(&30));
    /// assert_eq!(set.upper_bound(&5).key(), Some(&10));
    /// assert!(set.upper_bound(&30).is_end());
    /// ```
    pub fn upper_bound(&self, key: &K) -> Cursor<'_, K, C, R> {
        Cursor::new(&self.tree, self.tree.upper_bound(key))
    }

    /// Removes the key equivalent to `key`. Returns whether such a key was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut set = OSTreapSet::from([1, 2]);
    /// assert!(set.remove(&2));
    /// assert!(!set.remove(&2));
    /// ```
    pub fn remove(&mut self, key: &K) -> bool {
        self.tree.remove(key).is_some()
    }

    /// Removes and returns the stored key equivalent to `key`.
    pub fn take(&mut self, key: &K) -> Option<K> {
        self.tree.remove(key)
    }

    /// Moves every key `>= key` into a new set, which shares the predicate and gets a
    /// generator seeded from this set's.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut low = OSTreapSet::from([1, 2, 3, 4]);
    /// let high = low.split_off(&3);
    /// assert_eq!(low.iter().copied().collect::<Vec<_>>(), [1, 2]);
    /// assert_eq!(high.iter().copied().collect::<Vec<_>>(), [3, 4]);
    /// ```
    #[must_use = "use `retain` to drop the split-off keys"]
    pub fn split_off(&mut self, key: &K) -> Self
    where
        C: Clone,
        R: RngCore + SeedableRng,
    {
        OSTreapSet {
            tree: self.tree.split_off(key),
        }
    }
}

impl<K, C, R> OSTreapSet<K, C, R>
where
    C: Compare<K>,
    R: RngCore,
{
    /// Adds `key` to the set. Returns whether it was newly inserted.
    ///
    /// If the set already holds an equivalent key, the set is unchanged and `key` is
    /// dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut set = OSTreapSet::new();
    /// assert!(set.insert(2));
    /// assert!(!set.insert(2));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        self.tree.insert(key)
    }

    /// Moves every key of `other` into `self`, leaving `other` empty.
    ///
    /// Keys of `other` that are already present in `self` are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut a = OSTreapSet::from([1, 2]);
    /// let mut b = OSTreapSet::from([2, 3]);
    /// a.append(&mut b);
    /// assert_eq!(a.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
    /// assert!(b.is_empty());
    /// ```
    pub fn append(&mut self, other: &mut Self) {
        let keys = other.tree.drain_sorted();
        debug!("appending {} keys to a set of {}", keys.len(), self.len());
        self.extend(keys);
    }
}

impl<K, C, R> OSTreapSet<K, C, R>
where
    R: RngCore,
{
    /// Moves every key of rank `>= rank` into a new set.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut low = OSTreapSet::from([10, 20, 30, 40, 50]);
    /// let high = low.split_off_rank(2);
    /// assert_eq!(low.iter().copied().collect::<Vec<_>>(), [10, 20]);
    /// assert_eq!(high.iter().copied().collect::<Vec<_>>(), [30, 40, 50]);
    /// ```
    #[must_use = "use `retain` to drop the split-off keys"]
    pub fn split_off_rank(&mut self, rank: usize) -> Self
    where
        C: Clone,
        R: SeedableRng,
    {
        OSTreapSet {
            tree: self.tree.split_off_rank(rank),
        }
    }
}

impl<K: Clone, C: Clone, R: Clone> Clone for OSTreapSet<K, C, R> {
    fn clone(&self) -> Self {
        OSTreapSet {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, C, R> fmt::Debug for OSTreapSet<K, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K> Default for OSTreapSet<K> {
    /// Creates an empty `OSTreapSet`.
    fn default() -> Self {
        Self::new()
    }
}

/// Two sets are equal when they hold pairwise-equal keys in the same order.
impl<K: PartialEq, C, R> PartialEq for OSTreapSet<K, C, R> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, C, R> Eq for OSTreapSet<K, C, R> {}

impl<K: Ord> FromIterator<K> for OSTreapSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = OSTreapSet::new();
        set.extend(iter);
        set
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for OSTreapSet<K> {
    /// Converts a `[K; N]` into an `OSTreapSet<K>`.
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let set1 = OSTreapSet::from([1, 2, 3, 4]);
    /// let set2: OSTreapSet<_> = [1, 2, 3, 4].into();
    /// assert_eq!(set1, set2);
    /// ```
    fn from(arr: [K; N]) -> Self {
        OSTreapSet::from_iter(arr)
    }
}

impl<K, C, R> Extend<K> for OSTreapSet<K, C, R>
where
    C: Compare<K>,
    R: RngCore,
{
    /// Inserts every key of `iter`. An empty set is bulk-built in O(n log n) instead.
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        if !self.is_empty() {
            for key in iter {
                self.insert(key);
            }
            return;
        }

        let mut keys: Vec<K> = iter.into_iter().collect();
        let compare = self.tree.compare();
        // Stable sort plus dedup keeps the first of each run, as repeated inserts would.
        keys.sort_by(|a, b| compare.ordering(a, b));
        keys.dedup_by(|later, earlier| compare.equivalent(later, earlier));
        self.tree.build_sorted(keys);
    }
}

impl<'a, K: Copy + 'a, C, R> Extend<&'a K> for OSTreapSet<K, C, R>
where
    C: Compare<K>,
    R: RngCore,
{
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, K, C, R> IntoIterator for &'a OSTreapSet<K, C, R> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, C, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, C, R> IntoIterator for OSTreapSet<K, C, R> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    /// Gets an iterator for moving out the `OSTreapSet`'s contents in ascending order.
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let set = OSTreapSet::from([3, 1, 2]);
    /// let keys: Vec<_> = set.into_iter().collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    fn into_iter(mut self) -> Self::IntoIter {
        IntoIter {
            inner: self.tree.drain_sorted().into_iter(),
        }
    }
}

impl<'a, K, C, R> Iterator for Iter<'a, K, C, R> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let h = self.front?;
        self.remaining -= 1;
        self.front = self.tree.next(h);
        Some(self.tree.key(h))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, C, R> DoubleEndedIterator for Iter<'_, K, C, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let h = self.back?;
        self.remaining -= 1;
        self.back = self.tree.prev(h);
        Some(self.tree.key(h))
    }
}

impl<K, C, R> ExactSizeIterator for Iter<'_, K, C, R> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, C, R> FusedIterator for Iter<'_, K, C, R> {}

impl<K, C, R> Clone for Iter<'_, K, C, R> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, C, R> fmt::Debug for Iter<'_, K, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> DoubleEndedIterator for IntoIter<K> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back()
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K> FusedIterator for IntoIter<K> {}

impl<K: fmt::Debug> fmt::Debug for IntoIter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.inner.as_slice()).finish()
    }
}
