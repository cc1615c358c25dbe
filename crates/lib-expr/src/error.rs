//! Error types for equation evaluation.

use lib_types::DataError;
use thiserror::Error;

/// Errors raised while interpolating, tokenizing or evaluating equations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExprError {
    /// Dataset operation failed underneath the evaluator.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Equation is not of the form `lhs = rhs` with 1 to 3 rhs tokens.
    #[error("malformed equation: {0}")]
    Malformed(String),

    /// Operator not in the unary or binary table.
    #[error("unsupported {arity} operator: {op}")]
    UnsupportedOperator { op: String, arity: &'static str },

    /// Operand is neither a column, a named constant nor a number.
    #[error("invalid operand: {0}")]
    InvalidOperand(String),
}

impl ExprError {
    /// True when the underlying dataset error is unrecoverable.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Data(e) => e.is_fatal(),
            _ => false,
        }
    }

    pub(crate) fn unsupported(op: &str, arity: &'static str) -> Self {
        tracing::warn!("unsupported {} operator: {}", arity, op);
        Self::UnsupportedOperator {
            op: op.to_string(),
            arity,
        }
    }
}

/// Result type for equation evaluation.
pub type ExprResult<T> = Result<T, ExprError>;
