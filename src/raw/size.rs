use core::num::NonZero;

use super::handle::{Handle, RawHandle};

/// The node count of a subtree, its root included.
///
/// A subtree always holds its root, so the count is stored as is in a `NonZero` of the
/// handle's width and never needs the handle's bias.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Size(NonZero<RawHandle>);

impl Size {
    /// One subtree spanning every addressable slot.
    pub(crate) const MAX: usize = Handle::MAX + 1;
    pub(crate) const LEAF: Self = Self(NonZero::<RawHandle>::MIN);

    /// The size of a node whose children hold `left` and `right` nodes.
    #[inline]
    pub(crate) const fn of_children(left: usize, right: usize) -> Self {
        let size = 1 + left + right;
        assert!(size <= Self::MAX, "`Size::of_children()` - subtree > `Size::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        Self(NonZero::new(size as RawHandle).unwrap())
    }

    #[inline]
    pub(crate) const fn get(self) -> usize {
        self.0.get() as usize
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // Nodes keep a size beside three handle links; all four are the same width.
    assert_eq_size!(Size, Option<Size>);
    assert_eq_size!(Size, Handle);

    #[test]
    #[should_panic(expected = "`Size::of_children()` - subtree > `Size::MAX`!")]
    fn oversized_subtree_panics() {
        let _ = Size::of_children(Size::MAX, 0);
    }

    #[test]
    fn leaf_counts_itself() {
        assert_eq!(Size::LEAF.get(), 1);
        assert_eq!(Size::of_children(0, 0), Size::LEAF);
        assert_eq!(Size::of_children(Size::MAX - 1, 0).get(), Size::MAX);
    }

    proptest! {
        #[test]
        fn size_adds_both_children(left in 0..Size::MAX / 2, right in 0..Size::MAX / 2) {
            prop_assert_eq!(Size::of_children(left, right).get(), left + right + 1);
        }
    }
}
