//! Windowing functions for spectral analysis.
//!
//! Coefficients follow the symmetric definitions used by numpy
//! (`bartlett`, `blackman`, `hamming`, `hanning`): for length `M` the window
//! spans `n = 0..M` with `M - 1` in the denominator, and `M == 1` gives `[1]`.

use crate::error::DspError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Window applied before an FFT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    /// Triangular, zero at both ends.
    Bartlett,
    Blackman,
    /// Raised cosine on a 0.08 pedestal.
    #[default]
    Hamming,
    /// Raised cosine, zero at both ends (Hann).
    Hanning,
}

impl Window {
    pub const ALL: [Window; 4] = [Self::Bartlett, Self::Blackman, Self::Hamming, Self::Hanning];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bartlett => "bartlett",
            Self::Blackman => "blackman",
            Self::Hamming => "hamming",
            Self::Hanning => "hanning",
        }
    }

    /// Window coefficients of length `length`.
    pub fn coefficients(self, length: usize) -> Vec<f64> {
        match length {
            0 => return Vec::new(),
            1 => return vec![1.0],
            _ => {}
        }
        let m = (length - 1) as f64;
        (0..length)
            .map(|i| {
                let n = i as f64;
                let x = 2.0 * PI * n / m;
                match self {
                    Self::Bartlett => 2.0 / m * (m / 2.0 - (n - m / 2.0).abs()),
                    Self::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
                    Self::Hamming => 0.54 - 0.46 * x.cos(),
                    Self::Hanning => 0.5 - 0.5 * x.cos(),
                }
            })
            .collect()
    }

    /// Multiply `data` by the window in place.
    pub fn apply(self, data: &mut [f64]) {
        let n = data.len();
        for (v, w) in data.iter_mut().zip(self.coefficients(n)) {
            *v *= w;
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Window {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DspError::invalid("window", format!("unknown window {:?}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-12)
    }

    #[test]
    fn test_numpy_values() {
        assert!(close(&Window::Bartlett.coefficients(5), &[0.0, 0.5, 1.0, 0.5, 0.0]));
        assert!(close(&Window::Hanning.coefficients(5), &[0.0, 0.5, 1.0, 0.5, 0.0]));
        assert!(close(&Window::Hamming.coefficients(3), &[0.08, 1.0, 0.08]));
        let b = Window::Blackman.coefficients(3);
        assert!(b[0].abs() < 1e-12 && (b[1] - 1.0).abs() < 1e-12);
        for w in Window::ALL {
            assert_eq!(w.coefficients(1), vec![1.0]);
            assert!(w.coefficients(0).is_empty());
        }
    }

    #[test]
    fn test_symmetric() {
        for w in Window::ALL {
            let c = w.coefficients(16);
            for i in 0..8 {
                assert!((c[i] - c[15 - i]).abs() < 1e-12, "{} not symmetric", w);
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("Hanning".parse::<Window>().unwrap(), Window::Hanning);
        assert_eq!(Window::default(), Window::Hamming);
        assert!("kaiser".parse::<Window>().is_err());
    }
}
