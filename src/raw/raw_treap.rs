use core::cmp::Ordering::{Equal, Greater, Less};
use core::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use alloc::vec::Vec;

use log::{debug, trace};
use rand::{RngCore, SeedableRng};
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::Node;
use super::primitives::{self, Nodes, refresh, size_of};
use crate::compare::Compare;
use crate::error::{Error, Result};

static NEXT_TREE_ID: AtomicUsize = AtomicUsize::new(0);

/// Identifies one tree instance for as long as the process runs.
///
/// Cursors and positions carry it so that a position can only be used with the tree it
/// was taken from. It travels with the tree through `swap`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) struct TreeId(usize);

impl TreeId {
    fn fresh() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// The core treap backing `OSTreapSet`.
///
/// Invariants between calls: in-order keys are strictly increasing under `compare`,
/// priorities are max-heap ordered, every node's size counts its subtree, every child
/// points back at its parent and the root has no parent.
pub(crate) struct RawTreap<K, C, R> {
    /// Arena storing all tree nodes.
    nodes: Nodes<K>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    compare: C,
    /// Source of node priorities.
    rng: R,
    id: TreeId,
}

impl<K, C, R> RawTreap<K, C, R> {
    pub(crate) fn new(compare: C, rng: R) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            compare,
            rng,
            id: TreeId::fresh(),
        }
    }

    pub(crate) fn with_capacity(compare: C, rng: R, capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            ..Self::new(compare, rng)
        }
    }

    /// Returns the number of keys in the tree.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        size_of(&self.nodes, self.root)
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    #[inline]
    pub(crate) const fn id(&self) -> TreeId {
        self.id
    }

    #[inline]
    pub(crate) const fn compare(&self) -> &C {
        &self.compare
    }

    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    #[inline]
    pub(crate) fn generation(&self, handle: Handle) -> u32 {
        self.nodes.generation(handle)
    }

    /// Drops every node.
    pub(crate) fn clear(&mut self) {
        trace!("clearing treap of {} keys", self.len());
        self.nodes.clear();
        self.root = None;
    }

    /// Exchanges the complete state of two trees, identities included.
    pub(crate) fn swap(&mut self, other: &mut Self) {
        trace!("swapping treaps of {} and {} keys", self.len(), other.len());
        core::mem::swap(self, other);
    }

    fn set_root(&mut self, root: Option<Handle>) {
        if let Some(h) = root {
            self.nodes.get_mut(h).set_parent(None);
        }
        self.root = root;
    }

    fn leftmost(&self, mut v: Handle) -> Handle {
        while let Some(left) = self.nodes.get(v).left() {
            v = left;
        }
        v
    }

    fn rightmost(&self, mut v: Handle) -> Handle {
        while let Some(right) = self.nodes.get(v).right() {
            v = right;
        }
        v
    }

    /// Returns the smallest node.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.leftmost(root))
    }

    /// Returns the largest node.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.rightmost(root))
    }

    /// Returns the in-order successor of `v`, or `None` past the largest node.
    pub(crate) fn next(&self, v: Handle) -> Option<Handle> {
        let node = self.nodes.get(v);
        if let Some(right) = node.right() {
            return Some(self.leftmost(right));
        }

        // Climb until we leave a left subtree.
        let mut child = v;
        let mut up = node.parent();
        while let Some(parent) = up {
            let parent_node = self.nodes.get(parent);
            if parent_node.left() == Some(child) {
                return Some(parent);
            }
            child = parent;
            up = parent_node.parent();
        }
        None
    }

    /// Returns the in-order predecessor of `v`, or `None` before the smallest node.
    pub(crate) fn prev(&self, v: Handle) -> Option<Handle> {
        let node = self.nodes.get(v);
        if let Some(left) = node.left() {
            return Some(self.rightmost(left));
        }

        let mut child = v;
        let mut up = node.parent();
        while let Some(parent) = up {
            let parent_node = self.nodes.get(parent);
            if parent_node.right() == Some(child) {
                return Some(parent);
            }
            child = parent;
            up = parent_node.parent();
        }
        None
    }

    /// Returns the node at zero-based `rank` in sorted order.
    pub(crate) fn select(&self, rank: usize) -> Option<Handle> {
        if rank >= self.len() {
            return None;
        }

        let mut v = self.root?;
        let mut remaining = rank;
        loop {
            let node = self.nodes.get(v);
            let left_size = size_of(&self.nodes, node.left());
            match remaining.cmp(&left_size) {
                Less => v = node.left()?,
                Equal => return Some(v),
                Greater => {
                    remaining -= left_size + 1;
                    v = node.right()?;
                }
            }
        }
    }

    /// Returns the zero-based rank of `v` by walking up to the root.
    pub(crate) fn rank_of_handle(&self, v: Handle) -> usize {
        let node = self.nodes.get(v);
        let mut rank = size_of(&self.nodes, node.left());

        let mut child = v;
        let mut up = node.parent();
        while let Some(parent) = up {
            let parent_node = self.nodes.get(parent);
            if parent_node.right() == Some(child) {
                rank += size_of(&self.nodes, parent_node.left()) + 1;
            }
            child = parent;
            up = parent_node.parent();
        }
        rank
    }

    /// Removes the node behind `v` and returns its key.
    ///
    /// The node is located again by rank and carved out with two rank splits.
    fn remove_handle(&mut self, v: Handle) -> K {
        let rank = self.rank_of_handle(v);
        let (left, rest) = primitives::split_by_rank(&mut self.nodes, self.root, rank);
        let (mid, right) = primitives::split_by_rank(&mut self.nodes, rest, 1);
        debug_assert_eq!(mid, Some(v), "`RawTreap::remove_handle()` - rank split missed the node!");
        let root = primitives::merge(&mut self.nodes, left, right);
        self.set_root(root);
        self.nodes.take(v).into_key()
    }

    /// Removes the key `slot` points at, if `slot` still names a node of this tree.
    pub(crate) fn remove_at(&mut self, tree: TreeId, slot: Option<(Handle, u32)>) -> Result<K> {
        let outcome = if tree == self.id {
            match slot {
                None => Err(Error::EndPosition),
                Some((handle, generation)) if self.nodes.is_live(handle, generation) => Ok(handle),
                Some(_) => Err(Error::StalePosition),
            }
        } else {
            Err(Error::ForeignPosition)
        };

        match outcome {
            Ok(handle) => Ok(self.remove_handle(handle)),
            Err(err) => {
                debug!("rejected removal by position: {err}");
                Err(err)
            }
        }
    }

    /// Removes every node and returns the keys in sorted order.
    pub(crate) fn drain_sorted(&mut self) -> Vec<K> {
        let mut order = Vec::with_capacity(self.len());
        let mut cursor = self.first();
        while let Some(h) = cursor {
            order.push(h);
            cursor = self.next(h);
        }

        let keys = order.into_iter().map(|h| self.nodes.take(h).into_key()).collect();
        self.nodes.clear();
        self.root = None;
        keys
    }

    /// Removes every node whose key `keep` rejects. Survivors stay in their slots.
    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K) -> bool,
    {
        let mut rejected = Vec::new();
        let mut cursor = self.first();
        while let Some(h) = cursor {
            if !keep(self.key(h)) {
                rejected.push(h);
            }
            cursor = self.next(h);
        }

        trace!("retain drops {} of {} keys", rejected.len(), self.len());
        for h in rejected {
            drop(self.remove_handle(h));
        }
    }

    // Recomputes sizes and parent links bottom-up below `v`.
    fn refresh_subtree(&mut self, v: Handle) {
        let node = self.nodes.get(v);
        let (left, right) = (node.left(), node.right());
        for child in [left, right].into_iter().flatten() {
            self.refresh_subtree(child);
        }
        refresh(&mut self.nodes, v);
    }

    /// Moves the subtree at `v` out of `source` into this tree's arena, keeping its
    /// shape and priorities. Returns the new handle of the subtree root.
    fn adopt(&mut self, source: &mut Nodes<K>, v: Option<Handle>) -> Option<Handle> {
        let node = source.take(v?);
        let (left, right, priority) = (node.left(), node.right(), node.priority());
        let moved = self.nodes.alloc(Node::new(node.into_key(), priority));

        let left = self.adopt(source, left);
        let right = self.adopt(source, right);
        let moved_node = self.nodes.get_mut(moved);
        moved_node.set_left(left);
        moved_node.set_right(right);
        refresh(&mut self.nodes, moved);
        Some(moved)
    }
}

impl<K, C, R> RawTreap<K, C, R>
where
    C: Compare<K>,
{
    /// Descends towards `key` and returns the node holding it or, failing that, the node
    /// that would become its parent.
    fn search(&self, key: &K) -> Option<Handle> {
        let mut v = self.root?;
        loop {
            let node = self.nodes.get(v);
            let next = match self.compare.ordering(node.key(), key) {
                Less => node.right(),
                Greater => node.left(),
                Equal => return Some(v),
            };
            match next {
                Some(child) => v = child,
                None => return Some(v),
            }
        }
    }

    /// Returns the node holding a key equivalent to `key`.
    pub(crate) fn find(&self, key: &K) -> Option<Handle> {
        self.search(key).filter(|&v| self.compare.equivalent(self.key(v), key))
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns the first node whose key is not less than `key`.
    pub(crate) fn lower_bound(&self, key: &K) -> Option<Handle> {
        let v = self.search(key)?;
        if self.compare.less(self.key(v), key) { self.next(v) } else { Some(v) }
    }

    /// Returns the first node whose key is greater than `key`.
    pub(crate) fn upper_bound(&self, key: &K) -> Option<Handle> {
        let v = self.search(key)?;
        if self.compare.less(key, self.key(v)) { Some(v) } else { self.next(v) }
    }

    /// Returns the rank `key` holds, if present.
    pub(crate) fn rank_of(&self, key: &K) -> Option<usize> {
        let mut v = self.root?;
        let mut rank = 0;
        loop {
            let node = self.nodes.get(v);
            match self.compare.ordering(key, node.key()) {
                Less => v = node.left()?,
                Equal => return Some(rank + size_of(&self.nodes, node.left())),
                Greater => {
                    rank += size_of(&self.nodes, node.left()) + 1;
                    v = node.right()?;
                }
            }
        }
    }

    /// Removes the key equivalent to `key` and returns the stored key.
    pub(crate) fn remove(&mut self, key: &K) -> Option<K> {
        let (left, rest) = primitives::split(&mut self.nodes, self.root, key, &self.compare);
        let (mid, right) = primitives::split_at_or_after(&mut self.nodes, rest, key, &self.compare);
        let root = primitives::merge(&mut self.nodes, left, right);
        self.set_root(root);

        mid.map(|h| {
            debug_assert!(self.nodes.get(h).is_leaf(), "`RawTreap::remove()` - duplicate keys in the tree!");
            self.nodes.take(h).into_key()
        })
    }

    /// Detaches every key `>= key` into a new tree.
    pub(crate) fn split_off(&mut self, key: &K) -> Self
    where
        C: Clone,
        R: RngCore + SeedableRng,
    {
        let (left, right) = primitives::split(&mut self.nodes, self.root, key, &self.compare);
        self.set_root(left);
        self.detach_into_new(right)
    }
}

impl<K, C, R> RawTreap<K, C, R>
where
    R: RngCore,
{
    /// Detaches every key with rank `>= rank` into a new tree.
    pub(crate) fn split_off_rank(&mut self, rank: usize) -> Self
    where
        C: Clone,
        R: SeedableRng,
    {
        let (left, right) = primitives::split_by_rank(&mut self.nodes, self.root, rank);
        self.set_root(left);
        self.detach_into_new(right)
    }

    fn detach_into_new(&mut self, subtree: Option<Handle>) -> Self
    where
        C: Clone,
        R: SeedableRng,
    {
        let rng = R::from_rng(&mut self.rng);
        let mut other = Self::with_capacity(self.compare.clone(), rng, size_of(&self.nodes, subtree));
        let root = other.adopt(&mut self.nodes, subtree);
        other.set_root(root);
        debug!("split off {} keys, {} remain", other.len(), self.len());
        other
    }

    /// Replaces the contents of an empty tree with `keys`, which must be strictly
    /// increasing under the tree's ordering.
    ///
    /// Builds the treap in linear time by keeping the right spine on a stack.
    pub(crate) fn build_sorted<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
    {
        debug_assert!(self.is_empty(), "`RawTreap::build_sorted()` - tree is not empty!");

        let mut spine: SmallVec<[Handle; 64]> = SmallVec::new();
        for key in keys {
            let priority = self.rng.next_u64();
            let v = self.nodes.alloc(Node::new(key, priority));

            // Everything popped is smaller and weaker, so it hangs left of `v`.
            let mut below = None;
            while let Some(&top) = spine.last() {
                if self.nodes.get(top).priority() >= priority {
                    break;
                }
                below = spine.pop();
            }
            self.nodes.get_mut(v).set_left(below);
            if let Some(&top) = spine.last() {
                self.nodes.get_mut(top).set_right(Some(v));
            }
            spine.push(v);
        }

        if let Some(&root) = spine.first() {
            self.refresh_subtree(root);
            self.set_root(Some(root));
        }
        trace!("built treap of {} keys", self.len());
    }
}

impl<K, C, R> RawTreap<K, C, R>
where
    C: Compare<K>,
    R: RngCore,
{
    /// Inserts `key` unless an equivalent key is present. Returns true if inserted.
    pub(crate) fn insert(&mut self, key: K) -> bool {
        let (root, inserted) = Self::insert_below(&mut self.nodes, &self.compare, &mut self.rng, self.root, key);
        if inserted {
            self.set_root(Some(root));
        }
        inserted
    }

    // Returns the new root of the subtree at `at` and whether a node was created.
    fn insert_below(nodes: &mut Nodes<K>, compare: &C, rng: &mut R, at: Option<Handle>, key: K) -> (Handle, bool) {
        let Some(v) = at else {
            return (nodes.alloc(Node::new(key, rng.next_u64())), true);
        };

        let node = nodes.get(v);
        let (left, right) = (node.left(), node.right());
        match compare.ordering(&key, node.key()) {
            Less => {
                let (child, inserted) = Self::insert_below(nodes, compare, rng, left, key);
                if !inserted {
                    return (v, false);
                }
                nodes.get_mut(v).set_left(Some(child));
                refresh(nodes, v);
                if nodes.get(child).priority() > nodes.get(v).priority() {
                    return (primitives::rotate_right(nodes, v), true);
                }
                (v, true)
            }
            Greater => {
                let (child, inserted) = Self::insert_below(nodes, compare, rng, right, key);
                if !inserted {
                    return (v, false);
                }
                nodes.get_mut(v).set_right(Some(child));
                refresh(nodes, v);
                if nodes.get(child).priority() > nodes.get(v).priority() {
                    return (primitives::rotate_left(nodes, v), true);
                }
                (v, true)
            }
            Equal => (v, false),
        }
    }
}

impl<K: Clone, C: Clone, R: Clone> Clone for RawTreap<K, C, R> {
    fn clone(&self) -> Self {
        // Handles index the arena, so a slot-for-slot copy keeps every link valid.
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            compare: self.compare.clone(),
            rng: self.rng.clone(),
            id: TreeId::fresh(),
        }
    }
}
