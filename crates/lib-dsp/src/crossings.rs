//! Level-crossing detection.
//!
//! A crossing is reported between consecutive samples whose level-shifted
//! values change sign (zero counts as its own sign), at the linearly
//! interpolated x position. A sample sitting exactly on the level therefore
//! yields a crossing on each side of it.

use crate::error::{DspError, DspResult};
use lib_types::Dataset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which crossings to keep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// Shifted value after the crossing is `>= 0`.
    #[default]
    Rising,
    /// Shifted value after the crossing is `< 0`.
    Falling,
    Both,
}

impl Edge {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Both => "both",
        }
    }

    fn accepts(self, rising: bool) -> bool {
        match self {
            Self::Rising => rising,
            Self::Falling => !rising,
            Self::Both => true,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Edge {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rising" => Ok(Self::Rising),
            "falling" => Ok(Self::Falling),
            "both" => Ok(Self::Both),
            _ => Err(DspError::invalid("edge", format!("{:?} is not rising, falling or both", s))),
        }
    }
}

/// One crossing with its direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub time: f64,
    pub rising: bool,
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// All crossings of `y` through `level`, in sample order.
pub fn find_transitions(x: &[f64], y: &[f64], level: f64) -> Vec<Transition> {
    let mut out = Vec::new();
    for (xs, ys) in x.windows(2).zip(y.windows(2)) {
        let (y0, y1) = (ys[0] - level, ys[1] - level);
        if y0.is_nan() || y1.is_nan() || sign(y0) == sign(y1) {
            continue;
        }
        let (x0, x1) = (xs[0], xs[1]);
        out.push(Transition {
            time: x0 - y0 * (x1 - x0) / (y1 - y0),
            rising: y1 >= 0.0,
        });
    }
    out
}

/// Crossing positions of `y` through `level` that match `edge`.
pub fn find_crossings(x: &[f64], y: &[f64], level: f64, edge: Edge) -> Vec<f64> {
    find_transitions(x, y, level)
        .into_iter()
        .filter(|t| edge.accepts(t.rising))
        .map(|t| t.time)
        .collect()
}

/// Crossings of column `ycol` against column `xcol`.
pub fn crossings(ds: &Dataset, xcol: &str, ycol: &str, level: f64, edge: Edge) -> DspResult<Vec<f64>> {
    let x = ds.get_vec(xcol)?;
    let y = ds.get_vec(ycol)?;
    Ok(find_crossings(&x, &y, level, edge))
}

/// Rising and falling crossings of `ycol`, flagged by direction.
pub fn transitions(ds: &Dataset, xcol: &str, ycol: &str, level: f64) -> DspResult<Vec<Transition>> {
    let x = ds.get_vec(xcol)?;
    let y = ds.get_vec(ycol)?;
    Ok(find_transitions(&x, &y, level))
}

/// Halfway between the column's minimum and maximum.
pub fn midpoint_level(ds: &Dataset, col: &str) -> DspResult<f64> {
    Ok(0.5 * (ds.max(col)? + ds.min(col)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_unit_sine_single_rising_crossing() {
        let n = 101;
        let t: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
        let y: Vec<f64> = t.iter().map(|t| (2.0 * PI * t).sin()).collect();
        let rising = find_crossings(&t, &y, 0.0, Edge::Rising);
        assert_eq!(rising.len(), 1);
        assert!(rising[0].abs() < 1e-12);
        let falling = find_crossings(&t, &y, 0.0, Edge::Falling);
        assert_eq!(falling.len(), 1);
        assert!((falling[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_linear_interpolation_and_level() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 2.0, 0.0, 2.0];
        let t = find_transitions(&x, &y, 1.0);
        assert_eq!(
            t,
            vec![
                Transition { time: 0.5, rising: true },
                Transition { time: 1.5, rising: false },
                Transition { time: 2.5, rising: true },
            ]
        );
        assert_eq!(find_crossings(&x, &y, 1.0, Edge::Both).len(), 3);
    }

    #[test]
    fn test_dataset_columns() {
        let d = Dataset::from_columns(&[("t", vec![0.0, 1.0, 2.0]), ("v", vec![-1.0, 1.0, -1.0])]).unwrap();
        assert_eq!(crossings(&d, "t", "v", 0.0, Edge::Rising).unwrap(), vec![0.5]);
        assert_eq!(midpoint_level(&d, "v").unwrap(), 0.0);
        assert!(crossings(&d, "t", "missing", 0.0, Edge::Both).is_err());
        assert_eq!("FALLING".parse::<Edge>().unwrap(), Edge::Falling);
        assert!("transitions".parse::<Edge>().is_err());
    }
}
