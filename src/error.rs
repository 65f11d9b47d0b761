//! Error type for the few operations that can fail.

use thiserror::Error;

/// Failures surfaced by `HashTable`.
///
/// Missing keys are never reported here; lookups return `Option` and
/// updates return `bool`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A bucket array with `capacity` slots could not be reserved.
    #[error("failed to allocate a bucket array of {capacity} buckets")]
    AllocationFailed { capacity: usize },

    /// The growth target `len * 2` does not fit in `usize`.
    #[error("bucket count overflow while growing a table of {len} records")]
    CapacityOverflow { len: usize },

    /// A `TableConfig` was rejected by `TableConfig::validate`.
    #[error("invalid table configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, TableError>;
