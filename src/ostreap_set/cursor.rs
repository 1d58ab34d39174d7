use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use rand::rngs::SmallRng;

use crate::Natural;
use crate::raw::{Handle, RawTreap, TreeId};

/// A read-only position in an [`OSTreapSet`](crate::OSTreapSet).
///
/// A cursor sits either on a key or on the end position. The end position is one past
/// the last key and one before the first: stepping forward off the last key lands on
/// it, stepping forward from it lands on the first key, and the mirror holds for
/// stepping backward.
///
/// `REVERSED` cursors walk the set from largest to smallest; their ranks count from the
/// largest key. Use [`Cursor`] and [`RevCursor`] rather than naming this type directly.
///
/// Moving by an offset resolves the current rank and selects the target rank, so it
/// takes O(log n) regardless of the distance.
///
/// # Examples
///
/// ```
/// use ostreap::OSTreapSet;
///
/// let set = OSTreapSet::from([5, 3, 8, 1]);
///
/// let mut cursor = set.lower_bound(&4);
/// assert_eq!(cursor.key(), Some(&5));
/// cursor.move_next();
/// assert_eq!(cursor.key(), Some(&8));
/// cursor.move_next();
/// assert!(cursor.is_end());
///
/// cursor += 2;    // Out of range stays at the end.
/// assert!(cursor.is_end());
/// cursor -= 3;
/// assert_eq!(cursor.key(), Some(&3));
/// assert_eq!((cursor - 1_usize).key(), Some(&1));
/// assert_eq!(cursor - set.begin(), 1);
/// ```
pub struct BaseCursor<'a, K, C, R, const REVERSED: bool> {
    tree: &'a RawTreap<K, C, R>,
    node: Option<Handle>,
}

/// A cursor walking the set in ascending order.
pub type Cursor<'a, K, C = Natural, R = SmallRng> = BaseCursor<'a, K, C, R, false>;

/// A cursor walking the set in descending order.
pub type RevCursor<'a, K, C = Natural, R = SmallRng> = BaseCursor<'a, K, C, R, true>;

/// A detached cursor position, used to remove the key a cursor points at.
///
/// Unlike a cursor, a position does not borrow the set, so it can be handed to
/// [`OSTreapSet::remove_at`](crate::OSTreapSet::remove_at). It stays valid while other
/// keys are inserted or removed; once its own key is removed it is stale.
///
/// # Examples
///
/// ```
/// use ostreap::{Error, OSTreapSet};
///
/// let mut set = OSTreapSet::from([1, 2, 3]);
/// let position = set.find(&2).position();
/// set.insert(10);
///
/// assert_eq!(set.remove_at(position), Ok(2));
/// assert_eq!(set.remove_at(position), Err(Error::StalePosition));
/// assert_eq!(set.remove_at(set.end().position()), Err(Error::EndPosition));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    tree: TreeId,
    slot: Option<(Handle, u32)>,
}

impl Position {
    /// Returns true if this is the end position.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.slot.is_none()
    }

    pub(crate) const fn tree(&self) -> TreeId {
        self.tree
    }

    pub(crate) const fn slot(&self) -> Option<(Handle, u32)> {
        self.slot
    }
}

impl<'a, K, C, R, const REVERSED: bool> BaseCursor<'a, K, C, R, REVERSED> {
    pub(crate) const fn new(tree: &'a RawTreap<K, C, R>, node: Option<Handle>) -> Self {
        Self {
            tree,
            node,
        }
    }

    /// Returns the key under the cursor, or `None` at the end position.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.node.map(|h| self.tree.key(h))
    }

    /// Returns true if the cursor is at the end position.
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Moves to the next key in this cursor's direction, wrapping through the end position.
    pub fn move_next(&mut self) {
        self.node = if REVERSED { self.backward() } else { self.forward() };
    }

    /// Moves to the previous key in this cursor's direction, wrapping through the end position.
    pub fn move_prev(&mut self) {
        self.node = if REVERSED { self.forward() } else { self.backward() };
    }

    fn forward(&self) -> Option<Handle> {
        match self.node {
            Some(h) => self.tree.next(h),
            None => self.tree.first(),
        }
    }

    fn backward(&self) -> Option<Handle> {
        match self.node {
            Some(h) => self.tree.prev(h),
            None => self.tree.last(),
        }
    }

    /// Returns the position of the cursor in its own iteration order.
    ///
    /// The first key in iteration order has rank 0; the end position has rank `len`.
    #[must_use]
    pub fn rank(&self) -> usize {
        let len = self.tree.len();
        match self.node {
            None => len,
            Some(h) if REVERSED => len - 1 - self.tree.rank_of_handle(h),
            Some(h) => self.tree.rank_of_handle(h),
        }
    }

    /// Returns a cursor `offset` steps away in this cursor's direction.
    ///
    /// Landing outside the set gives the end position; from the end position, an offset
    /// of `-1` lands on the last key.
    #[must_use]
    pub fn offset(&self, offset: isize) -> Self {
        let rank = self.rank();
        let target = if offset >= 0 {
            rank.checked_add(offset.unsigned_abs())
        } else {
            rank.checked_sub(offset.unsigned_abs())
        };
        Self::new(self.tree, target.and_then(|t| self.select_in_order(t)))
    }

    fn select_in_order(&self, rank: usize) -> Option<Handle> {
        let len = self.tree.len();
        if rank >= len {
            None
        } else if REVERSED {
            self.tree.select(len - 1 - rank)
        } else {
            self.tree.select(rank)
        }
    }

    /// Detaches the cursor's position from the borrow of the set.
    #[must_use]
    pub fn position(&self) -> Position {
        Position {
            tree: self.tree.id(),
            slot: self.node.map(|h| (h, self.tree.generation(h))),
        }
    }
}

impl<'a, K, C, R> Cursor<'a, K, C, R> {
    /// Converts into a descending cursor at the same position.
    #[must_use]
    pub const fn reversed(self) -> RevCursor<'a, K, C, R> {
        BaseCursor::new(self.tree, self.node)
    }
}

impl<'a, K, C, R> RevCursor<'a, K, C, R> {
    /// Converts into an ascending cursor at the same position.
    #[must_use]
    pub const fn reversed(self) -> Cursor<'a, K, C, R> {
        BaseCursor::new(self.tree, self.node)
    }
}

impl<K, C, R, const REVERSED: bool> Clone for BaseCursor<'_, K, C, R, REVERSED> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, C, R, const REVERSED: bool> Copy for BaseCursor<'_, K, C, R, REVERSED> {}

impl<K, C, R, const REVERSED: bool> PartialEq for BaseCursor<'_, K, C, R, REVERSED> {
    fn eq(&self, other: &Self) -> bool {
        self.tree.id() == other.tree.id() && self.node == other.node
    }
}

impl<K, C, R, const REVERSED: bool> Eq for BaseCursor<'_, K, C, R, REVERSED> {}

/// Cursors of opposite directions are equal when they sit on the same key of the same
/// set, or both on its end position.
impl<'b, K, C, R> PartialEq<RevCursor<'b, K, C, R>> for Cursor<'_, K, C, R> {
    fn eq(&self, other: &RevCursor<'b, K, C, R>) -> bool {
        self.tree.id() == other.tree.id() && self.node == other.node
    }
}

impl<'b, K, C, R> PartialEq<Cursor<'b, K, C, R>> for RevCursor<'_, K, C, R> {
    fn eq(&self, other: &Cursor<'b, K, C, R>) -> bool {
        other == self
    }
}

impl<K: fmt::Debug, C, R, const REVERSED: bool> fmt::Debug for BaseCursor<'_, K, C, R, REVERSED> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if REVERSED { "RevCursor" } else { "Cursor" };
        match self.key() {
            Some(key) => f.debug_tuple(name).field(key).finish(),
            None => f.debug_tuple(name).field(&format_args!("end")).finish(),
        }
    }
}

impl<K, C, R, const REVERSED: bool> AddAssign<usize> for BaseCursor<'_, K, C, R, REVERSED> {
    fn add_assign(&mut self, steps: usize) {
        let target = self.rank().checked_add(steps);
        self.node = target.and_then(|t| self.select_in_order(t));
    }
}

impl<K, C, R, const REVERSED: bool> SubAssign<usize> for BaseCursor<'_, K, C, R, REVERSED> {
    fn sub_assign(&mut self, steps: usize) {
        let target = self.rank().checked_sub(steps);
        self.node = target.and_then(|t| self.select_in_order(t));
    }
}

impl<K, C, R, const REVERSED: bool> Add<usize> for BaseCursor<'_, K, C, R, REVERSED> {
    type Output = Self;

    fn add(mut self, steps: usize) -> Self {
        self += steps;
        self
    }
}

impl<K, C, R, const REVERSED: bool> Sub<usize> for BaseCursor<'_, K, C, R, REVERSED> {
    type Output = Self;

    fn sub(mut self, steps: usize) -> Self {
        self -= steps;
        self
    }
}

/// The signed rank distance between two cursors of the same set.
impl<K, C, R, const REVERSED: bool> Sub for BaseCursor<'_, K, C, R, REVERSED> {
    type Output = isize;

    #[allow(clippy::cast_possible_wrap)]
    fn sub(self, other: Self) -> isize {
        debug_assert_eq!(self.tree.id(), other.tree.id(), "cursors belong to different trees");
        self.rank() as isize - other.rank() as isize
    }
}
