//! Failure kinds surfaced to callers. None of these are used for
//! control flow; every operation reports them as a plain `Result`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressError {
    /// Rating input from a UI layer was outside the four-value set.
    #[error("invalid rating '{0}'")]
    InvalidRating(String),

    /// The persistence commit failed. The in-memory aggregate is rolled
    /// back, so the caller may retry the operation as a whole.
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A snapshot file could not be read or written.
    #[error("snapshot i/o failure: {0}")]
    SnapshotIo(#[from] std::io::Error),

    /// Snapshot data is malformed or breaks an aggregate invariant.
    /// Imports are rejected wholesale, never applied partially.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}
