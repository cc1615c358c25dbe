//! Error types for dataset operations.

use thiserror::Error;

/// Errors that can occur while addressing or reshaping a [`Dataset`](crate::Dataset).
///
/// Variants fall into two tiers. Recoverable errors leave the dataset
/// untouched and are meant to be reported and skipped. Fatal errors
/// (see [`DataError::is_fatal`]) mean the calling chain should abort.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DataError {
    /// Column name or index does not resolve.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Row index outside `-nrows..nrows`.
    #[error("row index {row} out of range for {nrows} rows")]
    RowOutOfRange { row: isize, nrows: usize },

    /// Renaming onto a name that is already used.
    #[error("column name already in use: {0}")]
    DuplicateColumn(String),

    /// Row vector does not match the column count.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Statistic requested on a column with no rows.
    #[error("column {0} has no values")]
    EmptyColumn(String),

    /// Rows can only be added once columns exist.
    #[error("cannot add rows to a dataset with no columns")]
    NoColumns,

    /// Horizontal concatenation with a different row count.
    #[error("incompatible data: expected {expected} rows, got {actual}")]
    RowCountMismatch { expected: usize, actual: usize },

    /// Vertical concatenation with a different column count.
    #[error("incompatible data: expected {expected} columns, got {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    /// Inline construction from columns of unequal length.
    #[error("column {name} has {actual} values, expected {expected}")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Concatenation would introduce a second column with this name.
    #[error("concatenated data repeats column name {0}")]
    ConcatDuplicate(String),

    /// `unique_name` ran out of candidates.
    #[error("not able to come up with a unique name for prefix {0:?}")]
    UniqueNameExhausted(String),

    /// A column that was just appended cannot be found.
    #[error("column {0} is missing after append")]
    MissingAfterAppend(String),
}

impl DataError {
    /// True for errors that must abort the calling chain.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::RowCountMismatch { .. }
                | Self::ColumnCountMismatch { .. }
                | Self::ColumnLengthMismatch { .. }
                | Self::ConcatDuplicate(_)
                | Self::UniqueNameExhausted(_)
                | Self::MissingAfterAppend(_)
        )
    }
}

/// Result type for dataset operations.
pub type DataResult<T> = Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_tier() {
        assert!(DataError::RowCountMismatch { expected: 2, actual: 3 }.is_fatal());
        assert!(DataError::UniqueNameExhausted("z".into()).is_fatal());
        assert!(DataError::MissingAfterAppend("REAL(z)".into()).is_fatal());
        assert!(!DataError::ColumnNotFound("x".into()).is_fatal());
        assert!(!DataError::RowOutOfRange { row: 5, nrows: 2 }.is_fatal());
    }
}
