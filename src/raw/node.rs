use super::handle::Handle;
use super::size::Size;

/// A single treap vertex.
///
/// The key and priority are fixed at creation. Links and size are rewritten by the
/// structural primitives; `parent` is a back link and never owns anything.
#[derive(Clone)]
pub(crate) struct Node<K> {
    key: K,
    priority: u64,
    // Node count of the subtree rooted here, including this node.
    size: Size,
    left: Option<Handle>,
    right: Option<Handle>,
    parent: Option<Handle>,
}

impl<K> Node<K> {
    /// Creates a detached leaf.
    pub(crate) const fn new(key: K, priority: u64) -> Self {
        Self {
            key,
            priority,
            size: Size::LEAF,
            left: None,
            right: None,
            parent: None,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn into_key(self) -> K {
        self.key
    }

    #[inline]
    pub(crate) const fn priority(&self) -> u64 {
        self.priority
    }

    #[inline]
    pub(crate) const fn size(&self) -> usize {
        self.size.get()
    }

    #[inline]
    pub(crate) fn resize(&mut self, left: usize, right: usize) {
        self.size = Size::of_children(left, right);
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    /// Returns true if this node has no children.
    pub(crate) const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}
