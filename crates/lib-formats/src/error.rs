//! Error types for reading and writing data files.

use lib_types::DataError;
use thiserror::Error;

/// Errors that can occur while reading or writing a data file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// I/O error on the underlying file or stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset construction failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Syntax error in the file.
    #[error("Syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Invalid value for a header field.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Structure does not match what the format requires.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        format: &'static str,
        message: String,
    },

    /// The requested block is not in the file.
    #[error("block {block} not found in {format} file")]
    BlockNotFound { format: &'static str, block: usize },

    /// Input ended before a section was complete.
    #[error("unexpected end of {format} data: {message}")]
    Truncated {
        format: &'static str,
        message: String,
    },

    /// The file could not be classified.
    #[error("cannot determine data file format")]
    UnknownFormat,

    /// Nom parsing error (internal).
    #[error("Parse error: {0}")]
    Nom(String),
}

impl ReadError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid format error and log it.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!("{}: {}", format, message);
        Self::InvalidFormat { format, message }
    }

    pub fn truncated(format: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!("{}: truncated input, {}", format, message);
        Self::Truncated { format, message }
    }

    pub fn block_not_found(format: &'static str, block: usize) -> Self {
        tracing::warn!("{}: block {} not found", format, block);
        Self::BlockNotFound { format, block }
    }

    /// True when the dataset error underneath is unrecoverable.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Data(e) => e.is_fatal(),
            _ => false,
        }
    }
}

/// Convert nom errors to our error type.
impl<'a> From<nom::Err<nom::error::Error<&'a str>>> for ReadError {
    fn from(err: nom::Err<nom::error::Error<&'a str>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => ReadError::Nom("Incomplete input".to_string()),
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                let preview: String = e.input.chars().take(20).collect();
                ReadError::Nom(format!("{:?} at '{}...'", e.code, preview))
            }
        }
    }
}

/// Result type for readers and writers.
pub type ReadResult<T> = Result<T, ReadError>;
