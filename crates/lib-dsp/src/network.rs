//! One- and two-port network parameter conversions.
//!
//! Parameters are complex variables (`REAL(x)`/`IMAG(x)` column pairs).
//! Every conversion writes its outputs as complex variables with derived
//! `MAG/DB/PH` columns and leaves no intermediate columns behind. `r0` is
//! the reference impedance in ohms.

use crate::error::DspResult;
use lib_expr::{Equations, TempColumns};
use lib_types::Dataset;

/// Default reference impedance.
pub const R0: f64 = 50.0;

/// Runs complex assignments against a scope of temporaries.
struct Program<'s, 'd> {
    scope: &'s mut TempColumns<'d>,
}

impl<'s, 'd> Program<'s, 'd> {
    fn temp(&mut self, prefix: &str) -> DspResult<String> {
        Ok(self.scope.complex(prefix)?)
    }

    fn eq(&mut self, lhs: &str, rhs: &str) -> DspResult<()> {
        self.scope.cxset_parsed(&format!("{} = {}", lhs, rhs))?;
        Ok(())
    }
}

fn with_program<F>(ds: &mut Dataset, body: F) -> DspResult<()>
where
    F: FnOnce(&mut Program<'_, '_>) -> DspResult<()>,
{
    let mut scope = TempColumns::new(ds);
    let mut p = Program { scope: &mut scope };
    body(&mut p)
}

/// `s = (1 - y/y0) / (1 + y/y0)` with `y0 = 1/r0`.
pub fn oneport_ytos(ds: &mut Dataset, y: &str, s: &str, r0: f64) -> DspResult<()> {
    with_program(ds, |p| {
        let (yn, num, den) = (p.temp("yn")?, p.temp("num")?, p.temp("den")?);
        p.eq(&yn, &format!("{} * {}", y, r0))?;
        p.eq(&num, &format!("1 - {}", yn))?;
        p.eq(&den, &format!("1 + {}", yn))?;
        p.eq(s, &format!("{} / {}", num, den))
    })
}

/// `y = y0 * (1 - s) / (1 + s)`.
pub fn oneport_stoy(ds: &mut Dataset, s: &str, y: &str, r0: f64) -> DspResult<()> {
    with_program(ds, |p| {
        let (num, den) = (p.temp("num")?, p.temp("den")?);
        p.eq(&num, &format!("1 - {}", s))?;
        p.eq(&den, &format!("1 + {}", s))?;
        p.eq(&num, &format!("{} / {}", num, den))?;
        p.eq(y, &format!("{} / {}", num, r0))
    })
}

/// `s = (z/r0 - 1) / (z/r0 + 1)`.
pub fn oneport_ztos(ds: &mut Dataset, z: &str, s: &str, r0: f64) -> DspResult<()> {
    with_program(ds, |p| {
        let (zn, num, den) = (p.temp("zn")?, p.temp("num")?, p.temp("den")?);
        p.eq(&zn, &format!("{} / {}", z, r0))?;
        p.eq(&num, &format!("{} - 1", zn))?;
        p.eq(&den, &format!("{} + 1", zn))?;
        p.eq(s, &format!("{} / {}", num, den))
    })
}

/// `z = r0 * (1 + s) / (1 - s)`.
pub fn oneport_stoz(ds: &mut Dataset, s: &str, z: &str, r0: f64) -> DspResult<()> {
    with_program(ds, |p| {
        let (num, den) = (p.temp("num")?, p.temp("den")?);
        p.eq(&num, &format!("1 + {}", s))?;
        p.eq(&den, &format!("1 - {}", s))?;
        p.eq(&num, &format!("{} / {}", num, den))?;
        p.eq(z, &format!("{} * {}", num, r0))
    })
}

/// Two-port parameter names in `[p11, p12, p21, p22]` order.
pub type Ports<'a> = [&'a str; 4];

/// 2x2 matrix inverse: shared by Y to Z and Z to Y.
fn invert(p: &mut Program<'_, '_>, a: Ports<'_>, b: Ports<'_>) -> DspResult<()> {
    let [a11, a12, a21, a22] = a;
    let [b11, b12, b21, b22] = b;
    let (det, t) = (p.temp("det")?, p.temp("t")?);
    p.eq(&det, &format!("{} * {}", a11, a22))?;
    p.eq(&t, &format!("{} * {}", a12, a21))?;
    p.eq(&det, &format!("{} - {}", det, t))?;
    p.eq(b11, &format!("{} / {}", a22, det))?;
    p.eq(&t, &format!("- {}", a12))?;
    p.eq(b12, &format!("{} / {}", t, det))?;
    p.eq(&t, &format!("- {}", a21))?;
    p.eq(b21, &format!("{} / {}", t, det))?;
    p.eq(b22, &format!("{} / {}", a11, det))
}

/// Y to hybrid and hybrid to Y have the same form.
fn hybrid(p: &mut Program<'_, '_>, a: Ports<'_>, b: Ports<'_>) -> DspResult<()> {
    let [a11, a12, a21, a22] = a;
    let [b11, b12, b21, b22] = b;
    let (t, u) = (p.temp("t")?, p.temp("u")?);
    p.eq(&t, &format!("{} * {}", a11, a22))?;
    p.eq(&u, &format!("{} * {}", a21, a12))?;
    p.eq(&t, &format!("{} - {}", t, u))?;
    p.eq(b22, &format!("{} / {}", t, a11))?;
    p.eq(&t, &format!("- {}", a12))?;
    p.eq(b12, &format!("{} / {}", t, a11))?;
    p.eq(b21, &format!("{} / {}", a21, a11))?;
    p.eq(b11, &format!("1 / {}", a11))
}

/// `z = inverse(y)`.
pub fn twoport_ytoz(ds: &mut Dataset, y: Ports<'_>, z: Ports<'_>) -> DspResult<()> {
    with_program(ds, |p| invert(p, y, z))
}

/// `y = inverse(z)`.
pub fn twoport_ztoy(ds: &mut Dataset, z: Ports<'_>, y: Ports<'_>) -> DspResult<()> {
    with_program(ds, |p| invert(p, z, y))
}

/// `h11 = 1/y11, h12 = -y12/y11, h21 = y21/y11, h22 = det(y)/y11`.
pub fn twoport_ytoh(ds: &mut Dataset, y: Ports<'_>, h: Ports<'_>) -> DspResult<()> {
    with_program(ds, |p| hybrid(p, y, h))
}

/// `y11 = 1/h11, y12 = -h12/h11, y21 = h21/h11, y22 = det(h)/h11`.
pub fn twoport_htoy(ds: &mut Dataset, h: Ports<'_>, y: Ports<'_>) -> DspResult<()> {
    with_program(ds, |p| hybrid(p, h, y))
}

/// Shared S-parameter kernel.
///
/// With `a` normalized, computes `den = (1+a11)(1+a22) - a12 a21` and
/// `b11 = ((1-a11)(1+a22) + a12 a21)/den`,
/// `b22 = ((1+a11)(1-a22) + a12 a21)/den`, `b12 = -2 a12/den`,
/// `b21 = -2 a21/den`, each scaled by `scale`.
fn bilinear(p: &mut Program<'_, '_>, a: Ports<'_>, b: Ports<'_>, scale: f64) -> DspResult<()> {
    let [a11, a12, a21, a22] = a;
    let [b11, b12, b21, b22] = b;
    let (p11, m11, p22, m22) = (p.temp("p11")?, p.temp("m11")?, p.temp("p22")?, p.temp("m22")?);
    let (cross, den, t) = (p.temp("cross")?, p.temp("den")?, p.temp("t")?);
    p.eq(&p11, &format!("1 + {}", a11))?;
    p.eq(&m11, &format!("1 - {}", a11))?;
    p.eq(&p22, &format!("1 + {}", a22))?;
    p.eq(&m22, &format!("1 - {}", a22))?;
    p.eq(&cross, &format!("{} * {}", a12, a21))?;
    p.eq(&den, &format!("{} * {}", p11, p22))?;
    p.eq(&den, &format!("{} - {}", den, cross))?;
    p.eq(&den, &format!("{} / {}", den, scale))?;
    let entries = [
        (b11, format!("{} * {}", m11, p22), true),
        (b22, format!("{} * {}", p11, m22), true),
        (b12, format!("{} * -2", a12), false),
        (b21, format!("{} * -2", a21), false),
    ];
    for (out, first, add_cross) in entries {
        p.eq(&t, &first)?;
        if add_cross {
            p.eq(&t, &format!("{} + {}", t, cross))?;
        }
        p.eq(out, &format!("{} / {}", t, den))?;
    }
    Ok(())
}

/// Y to S, normalizing with `y0 = 1/r0`.
pub fn twoport_ytos(ds: &mut Dataset, y: Ports<'_>, s: Ports<'_>, r0: f64) -> DspResult<()> {
    with_program(ds, |p| {
        let mut norm = Vec::with_capacity(4);
        for (yij, prefix) in y.iter().zip(["y11n", "y12n", "y21n", "y22n"]) {
            let n = p.temp(prefix)?;
            p.eq(&n, &format!("{} * {}", yij, r0))?;
            norm.push(n);
        }
        let yn = [norm[0].as_str(), norm[1].as_str(), norm[2].as_str(), norm[3].as_str()];
        bilinear(p, yn, s, 1.0)
    })
}

/// S to Y, scaling by `y0 = 1/r0`.
pub fn twoport_stoy(ds: &mut Dataset, s: Ports<'_>, y: Ports<'_>, r0: f64) -> DspResult<()> {
    with_program(ds, |p| bilinear(p, s, y, 1.0 / r0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::Complex64;

    fn close(a: &[Complex64], b: &[Complex64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).norm() < 1e-12)
    }

    fn oneport(y: Complex64) -> Dataset {
        let mut d = Dataset::from_columns(&[("freq", vec![1.0])]).unwrap();
        d.set_cx_values("Y", &[y]).unwrap();
        d
    }

    #[test]
    fn test_oneport_y_s_round_trip() {
        let y = Complex64::new(0.02, -0.01);
        let mut d = oneport(y);
        oneport_ytos(&mut d, "Y", "S", R0).unwrap();
        let yn = y * R0;
        let expected = (Complex64::new(1.0, 0.0) - yn) / (Complex64::new(1.0, 0.0) + yn);
        assert!(close(&d.cx_values("S").unwrap(), &[expected]));
        oneport_stoy(&mut d, "S", "Y2", R0).unwrap();
        assert!(close(&d.cx_values("Y2").unwrap(), &[y]));
        assert_eq!(d.cx_vars(), vec!["Y", "S", "Y2"]);
        assert_eq!(d.ncols(), 16);
    }

    #[test]
    fn test_oneport_matched_load() {
        let mut d = oneport(Complex64::new(0.0, 0.0));
        d.set_cx_values("Z", &[Complex64::new(R0, 0.0)]).unwrap();
        oneport_ztos(&mut d, "Z", "S", R0).unwrap();
        assert!(d.cx_values("S").unwrap()[0].norm() < 1e-15);
        oneport_stoz(&mut d, "S", "Z2", R0).unwrap();
        assert!(close(&d.cx_values("Z2").unwrap(), &[Complex64::new(R0, 0.0)]));
    }

    fn twoport() -> Dataset {
        let mut d = Dataset::from_columns(&[("freq", vec![1e6, 2e6])]).unwrap();
        let vals = [
            ("Y11", [Complex64::new(0.03, 0.01), Complex64::new(0.02, 0.02)]),
            ("Y12", [Complex64::new(-0.001, 0.0), Complex64::new(-0.002, 0.001)]),
            ("Y21", [Complex64::new(0.05, -0.01), Complex64::new(0.04, -0.02)]),
            ("Y22", [Complex64::new(0.01, 0.005), Complex64::new(0.012, 0.004)]),
        ];
        for (name, v) in vals {
            d.set_cx_values(name, &v).unwrap();
        }
        d
    }

    const Y: Ports<'static> = ["Y11", "Y12", "Y21", "Y22"];
    const BACK: Ports<'static> = ["B11", "B12", "B21", "B22"];

    fn assert_same(d: &Dataset, a: Ports<'_>, b: Ports<'_>) {
        for (x, y) in a.iter().zip(b) {
            assert!(close(&d.cx_values(x).unwrap(), &d.cx_values(y).unwrap()), "{} != {}", x, y);
        }
    }

    #[test]
    fn test_twoport_inverse_round_trips() {
        let mut d = twoport();
        let z = ["Z11", "Z12", "Z21", "Z22"];
        twoport_ytoz(&mut d, Y, z).unwrap();
        twoport_ztoy(&mut d, z, BACK).unwrap();
        assert_same(&d, Y, BACK);

        let y11 = d.cx_values("Y11").unwrap()[0];
        let h = ["H11", "H12", "H21", "H22"];
        twoport_ytoh(&mut d, Y, h).unwrap();
        assert!(close(&d.cx_values("H11").unwrap()[..1], &[Complex64::new(1.0, 0.0) / y11]));
        twoport_htoy(&mut d, h, BACK).unwrap();
        assert_same(&d, Y, BACK);
        assert_eq!(d.ncols(), 1 + 5 * 16);
    }

    #[test]
    fn test_twoport_s_round_trip() {
        let mut d = twoport();
        let s = ["S11", "S12", "S21", "S22"];
        twoport_ytos(&mut d, Y, s, R0).unwrap();
        twoport_stoy(&mut d, s, BACK, R0).unwrap();
        assert_same(&d, Y, BACK);
        assert_eq!(d.ncols(), 1 + 5 * 12);
    }
}
