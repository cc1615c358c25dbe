//! Elementwise helpers shared by the expression engine and the analyses.
//!
//! These follow the conventions of array-oriented numeric code: gradients
//! are central differences in the interior and one-sided at the ends, phase
//! unwrapping removes jumps larger than pi, and sample grids include their
//! end point.

use std::f64::consts::PI;

/// Successive difference with the last difference repeated, so the output
/// has the same length as the input.
pub fn diff_repeat_last(x: &[f64]) -> Vec<f64> {
    if x.len() < 2 {
        return vec![0.0; x.len()];
    }
    let mut out: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let last = out[out.len() - 1];
    out.push(last);
    out
}

/// Numerical gradient with unit spacing.
pub fn gradient(y: &[f64]) -> Vec<f64> {
    let n = y.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut out = Vec::with_capacity(n);
    out.push(y[1] - y[0]);
    for i in 1..n - 1 {
        out.push((y[i + 1] - y[i - 1]) * 0.5);
    }
    out.push(y[n - 1] - y[n - 2]);
    out
}

/// Cumulative trapezoidal integral of `y` over `x`, starting at 0.
pub fn cumtrapz(y: &[f64], x: &[f64]) -> Vec<f64> {
    let n = y.len().min(x.len());
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }
    let mut acc = 0.0;
    out.push(0.0);
    for i in 1..n {
        acc += (y[i - 1] + y[i]) * 0.5 * (x[i] - x[i - 1]);
        out.push(acc);
    }
    out
}

/// Trapezoidal integral of `y` over `x`.
pub fn trapz(y: &[f64], x: &[f64]) -> f64 {
    cumtrapz(y, x).last().copied().unwrap_or(0.0)
}

/// Remove phase jumps larger than pi by adding multiples of 2*pi (radians).
pub fn unwrap_phase(p: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(p.len());
    let Some(&first) = p.first() else {
        return out;
    };
    out.push(first);
    let mut correction = 0.0;
    for w in p.windows(2) {
        let dd = w[1] - w[0];
        let mut ddmod = (dd + PI).rem_euclid(2.0 * PI) - PI;
        if ddmod == -PI && dd > 0.0 {
            ddmod = PI;
        }
        if dd.abs() >= PI {
            correction += ddmod - dd;
        }
        out.push(w[1] + correction);
    }
    out
}

/// `num` evenly spaced samples from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut out: Vec<f64> = (0..num).map(|i| start + step * i as f64).collect();
            out[num - 1] = stop;
            out
        }
    }
}

/// Samples `start, start+step, ...` up to and including `stop`.
///
/// The end point is kept when it falls within `1e-9 * step` of the grid.
/// A non-positive step or reversed range yields only `start`.
pub fn range_sample(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || stop < start {
        return vec![start];
    }
    let count = ((stop - start) / step + 1e-9).floor() as usize + 1;
    (0..count).map(|i| start + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_repeat_last() {
        assert_eq!(diff_repeat_last(&[1.0, 4.0, 9.0]), vec![3.0, 5.0, 5.0]);
    }

    #[test]
    fn test_gradient() {
        assert_eq!(gradient(&[1.0, 2.0, 4.0, 7.0]), vec![1.0, 1.5, 2.5, 3.0]);
    }

    #[test]
    fn test_cumtrapz() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 2.0, 2.0];
        assert_eq!(cumtrapz(&y, &x), vec![0.0, 1.0, 3.0]);
        assert_eq!(trapz(&y, &x), 3.0);
    }

    #[test]
    fn test_unwrap_phase() {
        let p = [3.0, -3.0, -2.5];
        let u = unwrap_phase(&p);
        assert!((u[1] - (-3.0 + 2.0 * PI)).abs() < 1e-12);
        assert!((u[2] - (-2.5 + 2.0 * PI)).abs() < 1e-12);
        assert_eq!(unwrap_phase(&[0.1, 0.2]), vec![0.1, 0.2]);
    }

    #[test]
    fn test_sample_grids() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(range_sample(0.0, 1.0, 0.5), vec![0.0, 0.5, 1.0]);
        assert_eq!(range_sample(0.0, 0.3, 0.1).len(), 4);
        assert_eq!(range_sample(1.0, 0.0, 0.1), vec![1.0]);
    }
}
