//! # lib-expr
//!
//! Column expression engine for wavetab datasets.
//!
//! Equations are assignments whose right-hand side has one, two or three
//! whitespace-separated tokens:
//!
//! ```text
//! z = a          copy a column, constant, `index` or number
//! z = sqrt a     unary operator
//! z = a + b      binary operator
//! ```
//!
//! There is no precedence and no nesting; longer computations go through
//! intermediate columns, typically held in a [`TempColumns`] guard.
//!
//! Before evaluation the text passes through an [`Interpolator`] (external
//! scalars) and an [`EquationTokenizer`] (statement splitting). Both are
//! seams: [`Evaluator`] accepts any implementation.

pub mod error;
pub mod eval;
pub mod interpolate;
pub mod ops;
pub mod temp;
pub mod tokenizer;

pub use error::{ExprError, ExprResult};
pub use interpolate::{Interpolator, NoInterpolation, ScalarScope};
pub use ops::{BinaryOp, UnaryOp};
pub use temp::TempColumns;
pub use tokenizer::{EquationTokenizer, StatementSplitter, Tokenized};

use lib_types::Dataset;

/// Interpolation and tokenization front end for equation evaluation.
pub struct Evaluator {
    interpolator: Box<dyn Interpolator>,
    tokenizer: Box<dyn EquationTokenizer>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            interpolator: Box::new(NoInterpolation),
            tokenizer: Box::new(StatementSplitter),
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interpolator(mut self, interpolator: impl Interpolator + 'static) -> Self {
        self.interpolator = Box::new(interpolator);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: impl EquationTokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    fn run(
        &self,
        ds: &mut Dataset,
        text: &str,
        step: fn(&mut Dataset, &str) -> ExprResult<()>,
    ) -> ExprResult<()> {
        let text = self.interpolator.interpolate(text);
        let tokenized = self.tokenizer.tokenize(&text, ds.column_names())?;
        let mut scope = TempColumns::adopt(ds, tokenized.temporaries);
        for stmt in &tokenized.statements {
            tracing::trace!("evaluating {}", stmt);
            step(&mut scope, stmt)?;
        }
        Ok(())
    }

    /// Evaluate real equations; tokenizer temporaries are removed afterwards.
    pub fn set(&self, ds: &mut Dataset, text: &str) -> ExprResult<()> {
        self.run(ds, text, eval::set_parsed)
    }

    /// Evaluate complex equations; tokenizer temporaries are removed afterwards.
    pub fn cxset(&self, ds: &mut Dataset, text: &str) -> ExprResult<()> {
        self.run(ds, text, eval::cxset_parsed)
    }

    /// Keep the rows for which `condition` (a right-hand side such as
    /// `freq < 1e6`) evaluates nonzero.
    pub fn filter(&self, ds: &mut Dataset, condition: &str) -> ExprResult<()> {
        let mut scope = TempColumns::new(ds);
        let flag = scope.real("filter")?;
        self.set(&mut scope, &format!("{} = {}", flag, condition))?;
        let mask: Vec<bool> = scope.get(flag.as_str())?.iter().map(|&v| v != 0.0).collect();
        scope.retain_rows(&mask)?;
        Ok(())
    }
}

/// Equation evaluation directly on a [`Dataset`] with the default
/// [`Evaluator`].
pub trait Equations {
    fn set(&mut self, text: &str) -> ExprResult<()>;
    fn cxset(&mut self, text: &str) -> ExprResult<()>;
    fn set_parsed(&mut self, eqn: &str) -> ExprResult<()>;
    fn cxset_parsed(&mut self, eqn: &str) -> ExprResult<()>;
    fn filter(&mut self, condition: &str) -> ExprResult<()>;
}

impl Equations for Dataset {
    fn set(&mut self, text: &str) -> ExprResult<()> {
        Evaluator::default().set(self, text)
    }

    fn cxset(&mut self, text: &str) -> ExprResult<()> {
        Evaluator::default().cxset(self, text)
    }

    fn set_parsed(&mut self, eqn: &str) -> ExprResult<()> {
        eval::set_parsed(self, eqn)
    }

    fn cxset_parsed(&mut self, eqn: &str) -> ExprResult<()> {
        eval::cxset_parsed(self, eqn)
    }

    fn filter(&mut self, condition: &str) -> ExprResult<()> {
        Evaluator::default().filter(self, condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> Dataset {
        Dataset::from_columns(&[
            ("a", vec![1.0, 2.0, 3.0]),
            ("b", vec![10.0, 20.0, 30.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_set_sum() {
        let mut d = ab();
        d.set("z = a + b").unwrap();
        let a = d.get_vec("a").unwrap();
        let b = d.get_vec("b").unwrap();
        let z = d.get_vec("z").unwrap();
        assert_eq!(z, vec![11.0, 22.0, 33.0]);
        for i in 0..3 {
            assert_eq!(z[i], a[i] + b[i]);
        }
    }

    #[test]
    fn test_interpolated_chain() {
        let mut d = ab();
        let scope: ScalarScope = [("k", 0.5)].into_iter().collect();
        Evaluator::new()
            .with_interpolator(scope)
            .set(&mut d, "t = a * $k; u = t + b")
            .unwrap();
        assert_eq!(d.get_vec("u").unwrap(), vec![10.5, 21.0, 31.5]);
    }

    #[test]
    fn test_filter_keeps_nonzero_rows() {
        let mut d = ab();
        d.filter("a != 2").unwrap();
        assert_eq!(d.get_vec("b").unwrap(), vec![10.0, 30.0]);
        assert_eq!(d.names(), vec!["a", "b"]);
    }

    struct WithScratch;

    impl EquationTokenizer for WithScratch {
        fn tokenize(&self, text: &str, known: &[String]) -> ExprResult<Tokenized> {
            assert!(!known.iter().any(|n| n == "scratch"));
            Ok(Tokenized {
                statements: vec!["scratch = a * 2".into(), format!("{} = scratch + b", text)],
                temporaries: vec!["scratch".into()],
            })
        }
    }

    #[test]
    fn test_tokenizer_temporaries_deleted() {
        let mut d = ab();
        Evaluator::new().with_tokenizer(WithScratch).set(&mut d, "y").unwrap();
        assert_eq!(d.names(), vec!["a", "b", "y"]);
        assert_eq!(d.get_vec("y").unwrap(), vec![12.0, 24.0, 36.0]);
    }

    #[test]
    fn test_cxset_via_trait() {
        let mut d = ab();
        d.cxset("w = a - b").unwrap();
        assert_eq!(d.get_vec("REAL(w)").unwrap(), vec![-9.0, -18.0, -27.0]);
        assert!((d.get_entry(0, "PH(w)").unwrap().abs() - 180.0).abs() < 1e-9);
    }
}
