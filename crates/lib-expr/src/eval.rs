//! Real and complex evaluation of single-assignment equations.

use crate::error::{ExprError, ExprResult};
use crate::ops::{BinaryOp, UnaryOp};
use lib_types::{Dataset, Complex64};

/// Named numeric constants accepted as operands.
pub const CONSTANTS: [(&str, f64); 6] = [
    ("pi", std::f64::consts::PI),
    ("e0", 8.854215e-14),
    ("qe", 1.602192e-19),
    ("kb", 1.380622e-23),
    ("kbev", 8.61708e-5),
    ("tabs", 273.15),
];

pub fn constant(name: &str) -> Option<f64> {
    CONSTANTS.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

/// Split `lhs = rhs` into the target name and 1 to 3 rhs tokens.
pub fn split_equation(eqn: &str) -> ExprResult<(&str, Vec<&str>)> {
    let malformed = || {
        tracing::warn!("cannot parse equation: {}", eqn);
        ExprError::Malformed(eqn.to_string())
    };
    let (lhs, rhs) = eqn.split_once('=').ok_or_else(malformed)?;
    let lhs = lhs.trim();
    let tokens: Vec<&str> = rhs.split_whitespace().collect();
    if lhs.is_empty() || lhs.contains(char::is_whitespace) || !(1..=3).contains(&tokens.len()) {
        return Err(malformed());
    }
    Ok((lhs, tokens))
}

// ============================================================================
// Real operands
// ============================================================================

enum Real {
    Column(Vec<f64>),
    Scalar(f64),
}

impl Real {
    fn resolve(ds: &Dataset, token: &str) -> ExprResult<Self> {
        if let Ok(col) = ds.get_vec(token) {
            return Ok(Real::Column(col));
        }
        if let Some(v) = constant(token) {
            return Ok(Real::Scalar(v));
        }
        if token == "index" {
            return Ok(Real::Column((0..ds.nrows()).map(|i| i as f64).collect()));
        }
        token.parse::<f64>().map(Real::Scalar).map_err(|_| {
            tracing::warn!("{} is not a column, a constant or a number", token);
            ExprError::InvalidOperand(token.to_string())
        })
    }

    fn into_vec(self, n: usize) -> Vec<f64> {
        match self {
            Real::Column(v) => v,
            Real::Scalar(s) => vec![s; n],
        }
    }
}

/// Evaluate the right-hand side of a real equation.
fn eval_real(ds: &Dataset, tokens: &[&str]) -> ExprResult<Vec<f64>> {
    let n = ds.nrows();
    match *tokens {
        [x] => Ok(Real::resolve(ds, x)?.into_vec(n)),
        [op, x] => {
            let op: UnaryOp = op.parse().map_err(|_| ExprError::unsupported(op, "unary"))?;
            let x = Real::resolve(ds, x)?.into_vec(n);
            Ok(op.apply(&x))
        }
        [y, op, x] => {
            let op: BinaryOp = op.parse().map_err(|_| ExprError::unsupported(op, "binary"))?;
            let y = Real::resolve(ds, y)?.into_vec(n);
            let x = Real::resolve(ds, x)?.into_vec(n);
            Ok(op.apply(&y, &x))
        }
        _ => Err(ExprError::Malformed(tokens.join(" "))),
    }
}

// ============================================================================
// Complex operands
// ============================================================================

enum Cx {
    Column(Vec<Complex64>),
    Scalar(Complex64),
}

impl Cx {
    fn resolve(ds: &Dataset, token: &str) -> ExprResult<Self> {
        if let Ok(z) = ds.cx_values(token) {
            return Ok(Cx::Column(z));
        }
        match Real::resolve(ds, token)? {
            Real::Column(v) => Ok(Cx::Column(
                v.into_iter().map(|re| Complex64::new(re, 0.0)).collect(),
            )),
            Real::Scalar(s) => Ok(Cx::Scalar(Complex64::new(s, 0.0))),
        }
    }

    fn into_vec(self, n: usize) -> Vec<Complex64> {
        match self {
            Cx::Column(v) => v,
            Cx::Scalar(s) => vec![s; n],
        }
    }
}

fn eval_complex(ds: &Dataset, tokens: &[&str]) -> ExprResult<Vec<Complex64>> {
    let n = ds.nrows();
    match *tokens {
        [x] => Ok(Cx::resolve(ds, x)?.into_vec(n)),
        [op_name, x] => {
            let op: UnaryOp = op_name
                .parse()
                .map_err(|_| ExprError::unsupported(op_name, "complex unary"))?;
            if op.complex(Complex64::new(0.0, 0.0)).is_none() {
                return Err(ExprError::unsupported(op_name, "complex unary"));
            }
            let x = Cx::resolve(ds, x)?.into_vec(n);
            Ok(x.into_iter()
                .map(|z| op.complex(z).unwrap_or(Complex64::new(f64::NAN, f64::NAN)))
                .collect())
        }
        [y, op_name, x] => {
            let op: BinaryOp = op_name
                .parse()
                .map_err(|_| ExprError::unsupported(op_name, "complex binary"))?;
            let one = Complex64::new(1.0, 0.0);
            if op.complex(one, one).is_none() {
                return Err(ExprError::unsupported(op_name, "complex binary"));
            }
            let y = Cx::resolve(ds, y)?.into_vec(n);
            let x = Cx::resolve(ds, x)?.into_vec(n);
            Ok(y.into_iter()
                .zip(x)
                .map(|(a, b)| op.complex(a, b).unwrap_or(Complex64::new(f64::NAN, f64::NAN)))
                .collect())
        }
        _ => Err(ExprError::Malformed(tokens.join(" "))),
    }
}

/// Evaluate one real assignment. The target column is appended when absent;
/// nothing is mutated when evaluation fails.
pub fn set_parsed(ds: &mut Dataset, eqn: &str) -> ExprResult<()> {
    let (lhs, tokens) = split_equation(eqn)?;
    let values = eval_real(ds, &tokens)?;
    ds.append([lhs]);
    ds.set_column(lhs, &values)?;
    Ok(())
}

/// Evaluate one complex assignment into `REAL(lhs)`/`IMAG(lhs)` and
/// regenerate the derived `MAG`/`DB`/`PH` columns of `lhs`.
pub fn cxset_parsed(ds: &mut Dataset, eqn: &str) -> ExprResult<()> {
    let (lhs, tokens) = split_equation(eqn)?;
    let values = eval_complex(ds, &tokens)?;
    ds.set_cx_values(lhs, &values)?;
    Ok(())
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
    fn test_single_token_forms() {
        let mut d = ab();
        set_parsed(&mut d, "c = a").unwrap();
        set_parsed(&mut d, "k = pi").unwrap();
        set_parsed(&mut d, "i = index").unwrap();
        set_parsed(&mut d, "n = -2.5e-3").unwrap();
        assert_eq!(d.get_vec("c").unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(d.get_entry(1, "k").unwrap(), std::f64::consts::PI);
        assert_eq!(d.get_vec("i").unwrap(), vec![0.0, 1.0, 2.0]);
        assert_eq!(d.get_entry(2, "n").unwrap(), -2.5e-3);
    }

    #[test]
    fn test_unary_and_binary() {
        let mut d = ab();
        set_parsed(&mut d, "s = square a").unwrap();
        set_parsed(&mut d, "r = b / a").unwrap();
        set_parsed(&mut d, "g = a >= 2").unwrap();
        set_parsed(&mut d, "a = a * 2").unwrap();
        assert_eq!(d.get_vec("s").unwrap(), vec![1.0, 4.0, 9.0]);
        assert_eq!(d.get_vec("r").unwrap(), vec![10.0, 10.0, 10.0]);
        assert_eq!(d.get_vec("g").unwrap(), vec![0.0, 1.0, 1.0]);
        assert_eq!(d.get_vec("a").unwrap(), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_failures_leave_dataset_unchanged() {
        let mut d = ab();
        let before = d.dup();
        assert!(matches!(
            set_parsed(&mut d, "z = a ** b"),
            Err(ExprError::UnsupportedOperator { .. })
        ));
        assert!(matches!(
            set_parsed(&mut d, "z = nosuch"),
            Err(ExprError::InvalidOperand(_))
        ));
        assert!(matches!(
            set_parsed(&mut d, "z = a + b + a"),
            Err(ExprError::Malformed(_))
        ));
        assert!(set_parsed(&mut d, "z a + b").is_err());
        assert_eq!(d, before);
    }

    #[test]
    fn test_complex_assignment() {
        let mut d = ab();
        cxset_parsed(&mut d, "w = a").unwrap();
        cxset_parsed(&mut d, "w = w * w").unwrap();
        cxset_parsed(&mut d, "v = reciprocal w").unwrap();
        assert_eq!(d.get_vec("REAL(w)").unwrap(), vec![1.0, 4.0, 9.0]);
        assert_eq!(d.get_vec("IMAG(w)").unwrap(), vec![0.0, 0.0, 0.0]);
        assert!((d.get_entry(1, "DB(w)").unwrap() - 20.0 * 4f64.log10()).abs() < 1e-12);
        assert!((d.get_entry(2, "REAL(v)").unwrap() - 1.0 / 9.0).abs() < 1e-15);
        assert!(d.contains("PH(v)"));
    }

    #[test]
    fn test_complex_rejects_real_only_operators() {
        let mut d = ab();
        let before = d.dup();
        assert!(cxset_parsed(&mut d, "w = floor a").is_err());
        assert!(cxset_parsed(&mut d, "w = a hypot b").is_err());
        assert_eq!(d, before);
    }
}
