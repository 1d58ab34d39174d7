//! Order-statistic treap collections for Rust.
//!
//! This crate provides [`OSTreapSet`], an ordered set of unique keys in the shape of the
//! standard library's `BTreeSet`, with additional O(log n) order-statistic operations:
//!
//! - [`select`](OSTreapSet::select) / [`get_by_rank`](OSTreapSet::get_by_rank) - the key at a given sorted position
//! - [`rank_of`](OSTreapSet::rank_of) - the sorted position of a key
//! - Indexing by [`Rank`] - e.g., `set[Rank(0)]` for the smallest key
//! - [`Cursor`](ostreap_set::Cursor)s that step in both directions, jump by offsets and
//!   report their rank, with a single end position reachable from both ends
//!
//! # Example
//!
//! ```
//! use ostreap::{OSTreapSet, Rank};
//!
//! let mut scores = OSTreapSet::new();
//! scores.insert(100);
//! scores.insert(85);
//! scores.insert(92);
//!
//! // The median.
//! assert_eq!(scores.get_by_rank(1), Some(&92));
//! assert_eq!(scores.rank_of(&100), Some(2));
//! assert_eq!(scores[Rank(0)], 85);
//!
//! // Cursors move by rank in O(log n).
//! let best = scores.rbegin();
//! assert_eq!(best.key(), Some(&100));
//! assert_eq!((best + 2).key(), Some(&85));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`; the default `std` feature only
//!   seeds new sets from the thread-local generator
//! - **Custom orderings** - Any strict weak ordering through [`Compare`]
//! - **Reproducible shapes** - Priorities come from an injectable, seedable generator
//!
//! # Implementation
//!
//! The set is a treap: a binary search tree kept in max-heap order on a random
//! priority per key, which gives expected logarithmic depth. Nodes live in an arena and
//! link to their children and parent by handle; each node counts its subtree.
//! Insertion descends and rotates back up; removal splits the key out and merges the
//! two halves.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod compare;
mod error;
mod order_statistic;
mod raw;

pub mod ostreap_set;

pub use compare::{Compare, Natural};
pub use error::{Error, Result};
pub use order_statistic::Rank;
pub use ostreap_set::OSTreapSet;
