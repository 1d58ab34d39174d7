/// A zero-based rank into the sorted order of a set.
///
/// # Examples
///
/// ```
/// use ostreap::{OSTreapSet, Rank};
///
/// let set = OSTreapSet::from(["b", "a"]);
/// assert_eq!(set[Rank(0)], "a");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
