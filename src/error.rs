use thiserror::Error;

/// Errors reported by fallible [`OSTreapSet`](crate::OSTreapSet) operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The position is the end position, which holds no key.
    #[error("position is the end position")]
    EndPosition,
    /// The position was taken from a different tree.
    #[error("position belongs to another tree")]
    ForeignPosition,
    /// The key the position pointed at has since been removed.
    #[error("position refers to a removed key")]
    StalePosition,
}

/// A specialized [`Result`](core::result::Result) for this crate's fallible operations.
pub type Result<T> = core::result::Result<T, Error>;
