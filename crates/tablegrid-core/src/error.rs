//! Error types for tablegrid-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tablegrid-core
///
/// Every variant describes a rejected call. The model is never left
/// partially mutated when one of these is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Range with `start > end` on an axis
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds for a mutation
    #[error("Row index {0} out of bounds (count: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds for a mutation
    #[error("Column index {0} out of bounds (count: {1})")]
    ColumnOutOfBounds(u32, u32),

    /// Negative, non-finite or oversized size passed to a resize
    #[error("Invalid size {0}: sizes must be finite, >= 0 and <= 1048576")]
    InvalidSize(f64),

    /// Non-positive count passed to insert/delete, or a count overflowing the grid
    #[error("Invalid count {0}: {1}")]
    InvalidCount(u32, &'static str),

    /// Content write to a non-anchor address of a merged region
    #[error("Cell {0} is part of a merged region")]
    MergedCellConflict(String),
}
