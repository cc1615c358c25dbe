//! Fourier series coefficients over the full record.

use crate::error::DspResult;
use crate::report::{e10, fmt_e};
use lib_expr::{Equations, TempColumns};
use lib_types::Dataset;
use serde::Serialize;
use std::f64::consts::PI;

/// Coefficients `[a0, a1, b1, a2, b2, ...]` of
/// `y = a0 + sum(an * cos(n*w*x) + bn * sin(n*w*x))` with `w = 2*pi/T` and
/// `T` the span of x, plus a text report with the cos/sin form followed by
/// the amplitude/phase form.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FourierSeries {
    pub coefficients: Vec<f64>,
    pub report: String,
}

/// Trapezoidal integral of `integrand` against `xcol` through a scratch
/// column.
fn integral(ds: &mut TempColumns<'_>, scratch: &str, integrand: &str, xcol: &str) -> DspResult<f64> {
    ds.set_parsed(&format!("{} = {} integ {}", scratch, integrand, xcol))?;
    Ok(ds.get_entry(-1, scratch)?)
}

/// First `nfour` harmonics of `ycol` against `xcol`.
///
/// Works through temporary columns on `ds`; they are removed before
/// returning.
pub fn fourcoeff(ds: &mut Dataset, xcol: &str, ycol: &str, nfour: usize) -> DspResult<FourierSeries> {
    let period = ds.max(xcol)? - ds.min(xcol)?;
    let mut scope = TempColumns::new(ds);
    let wto = scope.real("wto")?;
    let basis = scope.real("basis")?;
    let product = scope.real("product")?;
    let integ = scope.real("integ")?;
    scope.set_parsed(&format!("{} = {} * {}", wto, xcol, 2.0 * PI / period))?;

    let f0 = integral(&mut scope, &integ, ycol, xcol)? / period;
    let mut coefficients = vec![f0];
    let mut lines = vec![format!("{} =", ycol), format!("   {}", e10(f0))];
    let mut polar = vec![format!(" = {}", e10(f0))];

    for n in 1..=nfour {
        let mut harmonic = |func: &str| -> DspResult<f64> {
            scope.set_parsed(&format!("{} = {} * {}", basis, wto, n))?;
            scope.set_parsed(&format!("{} = {} {}", basis, func, basis))?;
            scope.set_parsed(&format!("{} = {} * {}", product, ycol, basis))?;
            Ok(2.0 * integral(&mut scope, &integ, &product, xcol)? / period)
        };
        let fc = harmonic("cos")?;
        let fs = harmonic("sin")?;
        let fa = fc.hypot(fs);
        let fp = fc.atan2(fs);
        coefficients.extend([fc, fs]);
        lines.push(format!(" + {} * cos({}*2*PI*{}/T)", e10(fc), n, xcol));
        lines.push(format!(" + {} * sin({}*2*PI*{}/T)", e10(fs), n, xcol));
        polar.push(format!(" + {} * sin({}*2*PI*{}/T + {})", e10(fa), n, xcol, fmt_e(fp, 6)));
    }
    lines.extend(polar);
    Ok(FourierSeries {
        coefficients,
        report: lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_harmonics() {
        let x: Vec<f64> = (0..=1000).map(|i| i as f64 / 1000.0).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&x| 1.0 + 2.0 * (2.0 * PI * x).cos() + 3.0 * (4.0 * PI * x).sin())
            .collect();
        let mut d = Dataset::from_columns(&[("x", x), ("y", y)]).unwrap();
        let f = fourcoeff(&mut d, "x", "y", 3).unwrap();
        assert_eq!(f.coefficients.len(), 7);
        let expected = [1.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0];
        for (c, e) in f.coefficients.iter().zip(expected) {
            assert!((c - e).abs() < 1e-6, "{} != {}", c, e);
        }
        assert_eq!(d.names(), vec!["x", "y"]);
        let lines: Vec<&str> = f.report.lines().collect();
        assert_eq!(lines[0], "y =");
        assert_eq!(lines[1], "    1.000e+00");
        assert_eq!(lines[2], " +  2.000e+00 * cos(1*2*PI*x/T)");
        assert_eq!(lines[8], " =  1.000e+00");
        assert!(lines[9].starts_with(" +  2.000e+00 * sin(1*2*PI*x/T + 1.570796e+00)"));
    }
}
