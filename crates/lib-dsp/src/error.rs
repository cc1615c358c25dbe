//! Error types for waveform analyses.

use lib_expr::ExprError;
use lib_types::DataError;
use thiserror::Error;

/// Errors that can occur during an analysis.
#[derive(Debug, Error)]
pub enum DspError {
    /// Dataset addressing or reshaping failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// An intermediate equation failed.
    #[error(transparent)]
    Expr(#[from] ExprError),

    /// FFT size is not a power of 2.
    #[error("FFT size must be power of 2, got {0}")]
    InvalidFftSize(usize),

    /// Insufficient data for operation.
    #[error("Insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Argument outside its valid range.
    #[error("invalid {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// Time axis is not strictly ascending.
    #[error("{0} is not strictly ascending")]
    NotAscending(String),

    /// Least-squares normal equations are singular.
    #[error("{0} regression matrix is singular")]
    Singular(&'static str),

    /// Transform backend failure.
    #[error("Numerical failure: {0}")]
    Numerical(String),
}

impl DspError {
    /// Create an invalid parameter error and log it.
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!("invalid {}: {}", name, message);
        Self::InvalidParameter { name, message }
    }

    pub fn insufficient(needed: usize, got: usize) -> Self {
        tracing::warn!("insufficient data: need at least {}, got {}", needed, got);
        Self::InsufficientData { needed, got }
    }

    pub fn singular(kind: &'static str) -> Self {
        tracing::warn!("{} regression matrix is singular", kind);
        Self::Singular(kind)
    }

    /// True when the error underneath is unrecoverable.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Data(e) => e.is_fatal(),
            Self::Expr(e) => e.is_fatal(),
            _ => false,
        }
    }
}

/// Result type for analyses.
pub type DspResult<T> = Result<T, DspError>;
