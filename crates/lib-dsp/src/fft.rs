//! Real FFT of a dataset column onto a uniform grid.

use crate::error::{DspError, DspResult};
use crate::window::Window;
use lib_types::numeric::linspace;
use lib_types::{ComplexPart, Dataset};
use num_complex::Complex64;
use realfft::RealFftPlanner;

/// Real-to-complex FFT engine with a cached planner.
pub struct FftEngine {
    planner: RealFftPlanner<f64>,
}

impl FftEngine {
    pub fn new() -> Self {
        Self {
            planner: RealFftPlanner::new(),
        }
    }

    /// Forward real-to-complex FFT.
    ///
    /// Input: N real samples, N a power of two.
    /// Output: N/2 + 1 complex samples, unnormalized.
    pub fn rfft(&mut self, data: &[f64]) -> DspResult<Vec<Complex64>> {
        let len = data.len();
        if !len.is_power_of_two() {
            return Err(DspError::InvalidFftSize(len));
        }
        let r2c = self.planner.plan_fft_forward(len);
        let mut input = data.to_vec();
        let mut output = r2c.make_output_vec();
        r2c.process(&mut input, &mut output)
            .map_err(|e| DspError::Numerical(e.to_string()))?;
        Ok(output)
    }
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Power of two nearest to `nr` in log scale, doubled when that falls short.
pub fn fft_size(nr: usize) -> usize {
    let mut np = 1usize << ((nr as f64).log2() + 0.5) as u32;
    if np < nr {
        np *= 2;
    }
    np
}

/// Linear interpolation of `(x, y)` at ascending `grid` points, clamped to
/// the end values outside the sampled range.
fn resample(x: &[f64], y: &[f64], grid: &[f64]) -> Vec<f64> {
    let last = x.len() - 1;
    let mut n = 0;
    grid.iter()
        .map(|&g| {
            while n < last && x[n] < g {
                n += 1;
            }
            if n > 0 && x[n] >= g {
                let (xm, ym) = (x[n - 1], y[n - 1]);
                ym + (y[n] - ym) * (g - xm) / (x[n] - xm)
            } else {
                y[n]
            }
        })
        .collect()
}

/// Spectrum of `ycol` against `xcol`.
///
/// The column is resampled onto [`fft_size`] uniform points spanning the
/// first to last `xcol` value, windowed and transformed. The result holds
/// `frequency` (multiples of `1 / (xn - x0)`), then the `REAL/IMAG/MAG/DB/PH`
/// group of `zcol`.
pub fn fft(ds: &Dataset, zcol: &str, ycol: &str, xcol: &str, window: Window) -> DspResult<Dataset> {
    let x = ds.get_vec(xcol)?;
    let y = ds.get_vec(ycol)?;
    let nr = x.len();
    if nr < 2 {
        return Err(DspError::insufficient(2, nr));
    }
    let (x0, xn) = (x[0], x[nr - 1]);
    if xn == x0 {
        return Err(DspError::invalid("xcol", format!("{} has zero span", xcol)));
    }

    let np = fft_size(nr);
    let grid = linspace(x0, xn, np);
    let mut samples = resample(&x, &y, &grid);
    window.apply(&mut samples);
    let spectrum = FftEngine::new().rfft(&samples)?;
    tracing::debug!("fft of {}: {} rows onto {} points, {} window", ycol, nr, np, window);

    let fd = 1.0 / (xn - x0);
    let frequency: Vec<f64> = (0..spectrum.len()).map(|i| i as f64 * fd).collect();
    let re: Vec<f64> = spectrum.iter().map(|z| z.re).collect();
    let im: Vec<f64> = spectrum.iter().map(|z| z.im).collect();
    let mut out = Dataset::from_columns(&[
        ("frequency".to_string(), frequency),
        (ComplexPart::Real.column(zcol), re),
        (ComplexPart::Imag.column(zcol), im),
    ])?;
    out.cxmag(zcol)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rfft_sizes() {
        let mut engine = FftEngine::new();
        let out = engine.rfft(&[1.0; 8]).unwrap();
        assert_eq!(out.len(), 5);
        assert!((out[0].re - 8.0).abs() < 1e-12);
        assert!(out[1..].iter().all(|z| z.norm() < 1e-12));
        assert!(matches!(engine.rfft(&[0.0; 6]), Err(DspError::InvalidFftSize(6))));
    }

    #[test]
    fn test_fft_size() {
        assert_eq!(fft_size(64), 64);
        assert_eq!(fft_size(100), 128);
        assert_eq!(fft_size(90), 128);
        assert_eq!(fft_size(1000), 1024);
    }

    #[test]
    fn test_resample_linear() {
        let r = resample(&[0.0, 1.0, 3.0], &[0.0, 2.0, 6.0], &[-1.0, 0.5, 2.0, 3.0]);
        assert_eq!(r, vec![0.0, 1.0, 4.0, 6.0]);
    }

    #[test]
    fn test_dataset_fft_peak() {
        let t = linspace(0.0, 1.0, 64);
        let y: Vec<f64> = t.iter().map(|t| (2.0 * PI * 4.0 * t).sin()).collect();
        let d = Dataset::from_columns(&[("t", t), ("y", y)]).unwrap();
        let f = fft(&d, "Y", "y", "t", Window::Hamming).unwrap();
        assert_eq!(f.nrows(), 33);
        assert_eq!(
            f.names(),
            vec!["frequency", "REAL(Y)", "IMAG(Y)", "MAG(Y)", "DB(Y)", "PH(Y)"]
        );
        let mag = f.get_vec("MAG(Y)").unwrap();
        let peak = mag
            .iter()
            .enumerate()
            .fold(0, |best, (i, &m)| if m > mag[best] { i } else { best });
        assert_eq!(peak, 4);
        assert_eq!(f.get_entry(4, "frequency").unwrap(), 4.0);
    }
}
