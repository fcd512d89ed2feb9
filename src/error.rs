//! Error signals surfaced by `flexvec` operations (spec §6/§7).
//!
//! Every condition a caller can hit is a variant here; nothing is
//! swallowed and nothing retries on the caller's behalf.

use crate::lock::Priority;

/// The result type used throughout the crate.
pub type Result<T> = core::result::Result<T, VectorError>;

/// A programmer, resource, structural, or concurrency error raised by a
/// `DynVec` operation.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum VectorError {
    /// The operation was attempted on a vector that has already been
    /// consumed (for example, the source of a [`merge`](crate::DynVec::merge)).
    #[error("operation on an undefined (already consumed) vector")]
    UndefinedVector,

    /// `index` is not a valid position for a vector of length `len`.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The allocator could not satisfy a growth request.
    #[error("allocation failed")]
    OutOfMemory,

    /// `begin > end`, violating invariant 1 of the data model.
    #[error("vector corrupted: begin {begin} > end {end}")]
    VectorCorrupted { begin: usize, end: usize },

    /// A caller attempted to acquire the lock at `requested` priority
    /// while it was already held at the higher `held` priority.
    #[error("lock held at priority {held:?}, cannot acquire at {requested:?}")]
    RaceCondition { requested: Priority, held: Priority },

    /// Two vectors involved in a bulk operation disagree on `data_size`.
    #[error("data size mismatch: expected {expected}, found {found}")]
    DataSizeMismatch { expected: usize, found: usize },

    /// A caller-supplied destination range is too small for the data
    /// being copied/moved into it.
    #[error("destination too small: need {needed}, have {available}")]
    DestinationTooSmall { needed: usize, available: usize },

    /// The operation requires at least one element but the vector is empty.
    #[error("vector is empty")]
    VectorEmpty,
}
