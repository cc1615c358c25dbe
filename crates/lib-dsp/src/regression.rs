//! Least-squares polynomial fits.

use crate::error::{DspError, DspResult};
use crate::report::e10;
use lib_types::Dataset;
use serde::Serialize;

/// Fitted coefficients, constant term first, and a text rendering of the
/// fitted polynomial.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Regression {
    pub coefficients: Vec<f64>,
    pub report: String,
}

fn polynomial_report(xcol: &str, ycol: &str, b: &[f64]) -> String {
    let mut lines = vec![format!("{} =", ycol)];
    for (power, coef) in b.iter().enumerate() {
        lines.push(match power {
            0 => format!("   {}", e10(*coef)),
            1 => format!(" + {} * {}", e10(*coef), xcol),
            _ => format!(" + {} * {}^{}", e10(*coef), xcol, power),
        });
    }
    lines.join("\n")
}

/// `ycol = b0 + b1 * xcol`.
pub fn linreg(ds: &Dataset, xcol: &str, ycol: &str) -> DspResult<Regression> {
    let xs = ds.get(xcol)?;
    let ys = ds.get(ycol)?;
    let n = ds.nrows() as f64;
    let (mut s1, mut s2, mut r1, mut r2) = (0.0, 0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        s1 += x;
        s2 += x * x;
        r1 += y;
        r2 += x * y;
    }
    let r = n * s2 - s1 * s1;
    if r == 0.0 {
        return Err(DspError::singular("linear"));
    }
    let b = [(s2 * r1 - s1 * r2) / r, (n * r2 - s1 * r1) / r];
    Ok(Regression {
        report: polynomial_report(xcol, ycol, &b),
        coefficients: b.to_vec(),
    })
}

/// `ycol = b0 + b1 * xcol + b2 * xcol^2`, solving the normal equations by
/// Gaussian elimination without pivoting.
pub fn quadreg(ds: &Dataset, xcol: &str, ycol: &str) -> DspResult<Regression> {
    let xs = ds.get(xcol)?;
    let ys = ds.get(ycol)?;
    let (mut s1, mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0, 0.0);
    let (mut r1, mut r2, mut r3) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        let x2 = x * x;
        s1 += x;
        s2 += x2;
        s3 += x2 * x;
        s4 += x2 * x2;
        r1 += y;
        r2 += x * y;
        r3 += x2 * y;
    }
    let a11 = ds.nrows() as f64;
    let (a12, a13) = (s1, s2);
    let (mut a22, mut a23) = (s2, s3);
    let (mut a32, mut a33) = (s3, s4);
    if a11 == 0.0 {
        return Err(DspError::singular("quadratic"));
    }
    let r = s1 / a11;
    a22 -= a12 * r;
    a23 -= a13 * r;
    r2 -= r1 * r;
    let r = s2 / a11;
    a32 -= a12 * r;
    a33 -= a13 * r;
    r3 -= r1 * r;
    if a22 == 0.0 {
        return Err(DspError::singular("quadratic"));
    }
    let r = a32 / a22;
    a33 -= a23 * r;
    r3 -= r2 * r;
    if a33 == 0.0 {
        return Err(DspError::singular("quadratic"));
    }
    let b2 = r3 / a33;
    let b1 = (r2 - b2 * a23) / a22;
    let b0 = (r1 - b2 * a13 - b1 * a12) / a11;
    let b = [b0, b1, b2];
    Ok(Regression {
        report: polynomial_report(xcol, ycol, &b),
        coefficients: b.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(f: impl Fn(f64) -> f64) -> Dataset {
        let x: Vec<f64> = (0..11).map(|i| i as f64 * 0.5).collect();
        let y = x.iter().map(|&x| f(x)).collect();
        Dataset::from_columns(&[("x", x), ("y", y)]).unwrap()
    }

    #[test]
    fn test_linreg_exact_line() {
        let fit = linreg(&xy(|x| 2.0 + 3.0 * x), "x", "y").unwrap();
        assert!((fit.coefficients[0] - 2.0).abs() < 1e-12);
        assert!((fit.coefficients[1] - 3.0).abs() < 1e-12);
        assert_eq!(fit.report, "y =\n    2.000e+00\n +  3.000e+00 * x");
    }

    #[test]
    fn test_quadreg_exact_parabola() {
        let fit = quadreg(&xy(|x| 1.0 - x + 0.5 * x * x), "x", "y").unwrap();
        let expected = [1.0, -1.0, 0.5];
        for (c, e) in fit.coefficients.iter().zip(expected) {
            assert!((c - e).abs() < 1e-9, "{} != {}", c, e);
        }
        assert!(fit.report.ends_with(" +  5.000e-01 * x^2"));
    }

    #[test]
    fn test_singular() {
        let d = Dataset::from_columns(&[("x", vec![1.0, 1.0, 1.0]), ("y", vec![1.0, 2.0, 3.0])]).unwrap();
        assert!(matches!(linreg(&d, "x", "y"), Err(DspError::Singular("linear"))));
        assert!(matches!(quadreg(&d, "x", "y"), Err(DspError::Singular("quadratic"))));
        assert!(linreg(&d, "x", "z").is_err());
    }
}
