//! Error kinds for the scheduler, per spec.md §7.
//!
//! Every write operation either succeeds or leaves state unchanged: writers abort
//! their transaction on any `Err` before it escapes, so no partial `request` batch
//! is ever observable (see `scheduler::engine::request`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The scheduler's on-disk directory could not be created or opened.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Allocation failure (e.g. the store could not be grown).
    #[error("memory allocation failure: {0}")]
    Memory(String),

    /// A store error, comparator misuse, or transaction failure. Carries a
    /// chained message the way the C original's `error_add` appended context
    /// as it unwound.
    #[error("internal error: {0}")]
    Internal(String),

    /// A caller passed a value the API requires to be well-formed, e.g. a NaN
    /// score or a non-positive frequency where a positive one is required.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<heed::Error> for Error {
    fn from(e: heed::Error) -> Self {
        Error::Internal(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
