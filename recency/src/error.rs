use thiserror::Error;

/// Errors reported by the containers in this crate.
///
/// Every fallible operation leaves the container it was called on unchanged
/// when it returns one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A [`Handle`](crate::Handle) was dereferenced while pointing at the end
    /// of a list or at an element that has since been erased.
    #[error("invalid dereference: handle does not point at a live element")]
    InvalidDereference,

    /// A [`Handle`](crate::Handle) was advanced past the end or moved back
    /// before the head of a list.
    #[error("invalid traversal: cannot move the handle past either end of the list")]
    InvalidTraversal,

    /// An erase or remove was requested through the end handle or through a
    /// handle whose element has already been erased.
    #[error("invalid position: nothing to remove at this handle")]
    InvalidPosition,

    /// A checked lookup did not find the requested key.
    #[error("key not found")]
    KeyNotFound,

    /// A cache was configured with a capacity of zero.
    #[error("cache capacity must be at least one entry")]
    ZeroCapacity,

    /// A matrix was built from rows of different lengths.
    #[error("matrix rows must all have the same length")]
    RaggedRows,
}
