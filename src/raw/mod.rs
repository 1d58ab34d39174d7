mod arena;
mod handle;
mod node;
mod primitives;
mod raw_treap;
mod size;

pub(crate) use handle::Handle;
pub(crate) use raw_treap::{RawTreap, TreeId};
