//! Splitting equation text into single assignments.

use crate::error::{ExprError, ExprResult};

/// Output of an [`EquationTokenizer`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tokenized {
    /// Single-assignment statements, `lhs = rhs`, in evaluation order.
    pub statements: Vec<String>,

    /// Columns introduced by the tokenizer that must be deleted afterwards.
    pub temporaries: Vec<String>,
}

/// Turns equation text into an ordered list of `lhs = rhs` statements.
///
/// `known` holds the column names of the target dataset, so a tokenizer that
/// introduces intermediate variables can avoid collisions.
pub trait EquationTokenizer {
    fn tokenize(&self, text: &str, known: &[String]) -> ExprResult<Tokenized>;
}

/// Statements separated by `;` or newlines, each already in
/// `lhs = rhs` form. Runs of whitespace collapse to a single space.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatementSplitter;

impl EquationTokenizer for StatementSplitter {
    fn tokenize(&self, text: &str, _known: &[String]) -> ExprResult<Tokenized> {
        let mut statements = Vec::new();
        for raw in text.split(|c| c == ';' || c == '\n') {
            let stmt = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if stmt.is_empty() {
                continue;
            }
            let Some((lhs, rhs)) = stmt.split_once('=') else {
                tracing::warn!("equation has no '=': {}", stmt);
                return Err(ExprError::Malformed(stmt));
            };
            if lhs.trim().is_empty() || rhs.trim().is_empty() {
                tracing::warn!("equation has an empty side: {}", stmt);
                return Err(ExprError::Malformed(stmt));
            }
            statements.push(format!("{} = {}", lhs.trim(), rhs.trim()));
        }
        Ok(Tokenized {
            statements,
            temporaries: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_statements() {
        let t = StatementSplitter
            .tokenize("x  =  a +   b; y = - x\n\n z = x", &[])
            .unwrap();
        assert_eq!(t.statements, vec!["x = a + b", "y = - x", "z = x"]);
        assert!(t.temporaries.is_empty());
    }

    #[test]
    fn test_comparison_operators_keep_first_equals() {
        let t = StatementSplitter.tokenize("m = a == b", &[]).unwrap();
        assert_eq!(t.statements, vec!["m = a == b"]);
    }

    #[test]
    fn test_missing_sides() {
        assert!(StatementSplitter.tokenize("a + b", &[]).is_err());
        assert!(StatementSplitter.tokenize(" = b", &[]).is_err());
    }
}
