use super::{OSTreapSet, default_rng};
use crate::Natural;
use crate::raw::RawTreap;

impl<K> OSTreapSet<K> {
    /// Creates an empty set with room for at least `capacity` keys before the node arena
    /// reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let set: OSTreapSet<i32> = OSTreapSet::with_capacity(16);
    /// assert!(set.is_empty());
    /// assert!(set.capacity() >= 16);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OSTreapSet {
            tree: RawTreap::with_capacity(Natural, default_rng(), capacity),
        }
    }
}

impl<K, C, R> OSTreapSet<K, C, R> {
    /// Returns how many keys the set can hold before the node arena reallocates.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Reserves room for at least `additional` more keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use ostreap::OSTreapSet;
    ///
    /// let mut set = OSTreapSet::from([1]);
    /// set.reserve(10);
    /// assert!(set.capacity() >= 11);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        self.tree.reserve(additional);
    }

    /// Releases arena slots no longer in use, as far as the live keys allow.
    pub fn shrink_to_fit(&mut self) {
        self.tree.shrink_to_fit();
    }
}
