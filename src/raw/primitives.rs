//! Link-level treap surgery.
//!
//! Every function here takes the node arena and subtree roots and returns subtree
//! roots. Returned roots are detached: the caller wires their parent link when it
//! attaches them (through [`refresh`]) or leaves them as the tree root. None of these
//! functions check their preconditions.

use crate::compare::Compare;

use super::arena::Arena;
use super::handle::Handle;
use super::node::Node;

pub(crate) type Nodes<K> = Arena<Node<K>>;

/// Returns the size of the subtree behind `link`, zero for an empty link.
#[inline]
pub(crate) fn size_of<K>(nodes: &Nodes<K>, link: Option<Handle>) -> usize {
    link.map_or(0, |h| nodes.get(h).size())
}

/// Recomputes `v`'s size from its children and points both children back at `v`.
pub(crate) fn refresh<K>(nodes: &mut Nodes<K>, v: Handle) {
    let node = nodes.get(v);
    let (left, right) = (node.left(), node.right());

    let left_size = reparent(nodes, left, v);
    let right_size = reparent(nodes, right, v);
    nodes.get_mut(v).resize(left_size, right_size);
}

// Points `child` at `parent` and returns the child's subtree size.
#[inline]
fn reparent<K>(nodes: &mut Nodes<K>, child: Option<Handle>, parent: Handle) -> usize {
    child.map_or(0, |h| {
        let child = nodes.get_mut(h);
        child.set_parent(Some(parent));
        child.size()
    })
}

#[inline]
fn detach<K>(nodes: &mut Nodes<K>, link: Option<Handle>) -> Option<Handle> {
    if let Some(h) = link {
        nodes.get_mut(h).set_parent(None);
    }
    link
}

/// Lifts `v`'s left child above it and returns the child.
///
/// The lifted node inherits `v`'s parent link.
pub(crate) fn rotate_right<K>(nodes: &mut Nodes<K>, v: Handle) -> Handle {
    let above = nodes.get(v).parent();
    let x = nodes.get(v).left().expect("`rotate_right()` - `v` has no left child!");
    let inner = nodes.get(x).right();

    nodes.get_mut(v).set_left(inner);
    nodes.get_mut(x).set_right(Some(v));
    // Bottom-up: `v` is now below `x`.
    refresh(nodes, v);
    refresh(nodes, x);
    nodes.get_mut(x).set_parent(above);
    x
}

/// Lifts `v`'s right child above it and returns the child.
///
/// The lifted node inherits `v`'s parent link.
pub(crate) fn rotate_left<K>(nodes: &mut Nodes<K>, v: Handle) -> Handle {
    let above = nodes.get(v).parent();
    let y = nodes.get(v).right().expect("`rotate_left()` - `v` has no right child!");
    let inner = nodes.get(y).left();

    nodes.get_mut(v).set_right(inner);
    nodes.get_mut(y).set_left(Some(v));
    refresh(nodes, v);
    refresh(nodes, y);
    nodes.get_mut(y).set_parent(above);
    y
}

/// Splits the subtree at `v` into keys `< key` and keys `>= key`.
pub(crate) fn split<K, C>(nodes: &mut Nodes<K>, v: Option<Handle>, key: &K, compare: &C) -> (Option<Handle>, Option<Handle>)
where
    C: Compare<K>,
{
    split_by(nodes, v, &|node_key: &K| compare.less(node_key, key))
}

/// Splits the subtree at `v` into keys `<= key` and keys `> key`.
pub(crate) fn split_at_or_after<K, C>(
    nodes: &mut Nodes<K>,
    v: Option<Handle>,
    key: &K,
    compare: &C,
) -> (Option<Handle>, Option<Handle>)
where
    C: Compare<K>,
{
    split_by(nodes, v, &|node_key: &K| !compare.less(key, node_key))
}

// `goes_left` must be monotone over the in-order sequence: true for a prefix, false after.
fn split_by<K, F>(nodes: &mut Nodes<K>, v: Option<Handle>, goes_left: &F) -> (Option<Handle>, Option<Handle>)
where
    F: Fn(&K) -> bool,
{
    let Some(v) = v else {
        return (None, None);
    };

    let node = nodes.get(v);
    let (left, right) = (node.left(), node.right());
    if goes_left(node.key()) {
        let (inner, rest) = split_by(nodes, right, goes_left);
        nodes.get_mut(v).set_right(inner);
        refresh(nodes, v);
        (detach(nodes, Some(v)), detach(nodes, rest))
    } else {
        let (rest, inner) = split_by(nodes, left, goes_left);
        nodes.get_mut(v).set_left(inner);
        refresh(nodes, v);
        (detach(nodes, rest), detach(nodes, Some(v)))
    }
}

/// Splits the subtree at `v` into its first `rank` nodes and the remainder.
pub(crate) fn split_by_rank<K>(nodes: &mut Nodes<K>, v: Option<Handle>, rank: usize) -> (Option<Handle>, Option<Handle>) {
    let Some(v) = v else {
        return (None, None);
    };

    let node = nodes.get(v);
    let (left, right) = (node.left(), node.right());
    let left_size = size_of(nodes, left);

    if rank <= left_size {
        let (rest, inner) = split_by_rank(nodes, left, rank);
        nodes.get_mut(v).set_left(inner);
        refresh(nodes, v);
        (detach(nodes, rest), detach(nodes, Some(v)))
    } else {
        let (inner, rest) = split_by_rank(nodes, right, rank - left_size - 1);
        nodes.get_mut(v).set_right(inner);
        refresh(nodes, v);
        (detach(nodes, Some(v)), detach(nodes, rest))
    }
}

/// Joins two treaps where every key of `left` sorts before every key of `right`.
///
/// The root with the higher priority stays on top; ties keep `left` on top.
pub(crate) fn merge<K>(nodes: &mut Nodes<K>, left: Option<Handle>, right: Option<Handle>) -> Option<Handle> {
    let (l, r) = match (left, right) {
        (None, only) | (only, None) => return detach(nodes, only),
        (Some(l), Some(r)) => (l, r),
    };

    if nodes.get(l).priority() >= nodes.get(r).priority() {
        let l_right = nodes.get(l).right();
        let inner = merge(nodes, l_right, Some(r));
        nodes.get_mut(l).set_right(inner);
        refresh(nodes, l);
        detach(nodes, Some(l))
    } else {
        let r_left = nodes.get(r).left();
        let inner = merge(nodes, Some(l), r_left);
        nodes.get_mut(r).set_left(inner);
        refresh(nodes, r);
        detach(nodes, Some(r))
    }
}
