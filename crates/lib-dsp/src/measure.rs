//! Record-level measurements: averages, RMS, bus decoding and sampling
//! checks.

use crate::crossings::{crossings, midpoint_level, Edge};
use crate::error::{DspError, DspResult};
use lib_expr::{Equations, TempColumns};
use lib_types::numeric::{range_sample, trapz};
use lib_types::Dataset;
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, u32 as bit},
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

fn span(ds: &Dataset, time: &str) -> DspResult<f64> {
    Ok(ds.get_entry(-1, time)? - ds.get_entry(0, time)?)
}

/// Trapezoidal integral of `col` over the record divided by its duration.
pub fn time_average(ds: &mut Dataset, time: &str, col: &str) -> DspResult<f64> {
    let duration = span(ds, time)?;
    let mut scope = TempColumns::new(ds);
    let integ = scope.real("integ")?;
    scope.set_parsed(&format!("{} = {} integ {}", integ, col, time))?;
    Ok(scope.get_entry(-1, integ.as_str())? / duration)
}

/// Square root of the time average of `col` squared.
pub fn rms(ds: &mut Dataset, time: &str, col: &str) -> DspResult<f64> {
    let duration = span(ds, time)?;
    let mut scope = TempColumns::new(ds);
    let integ = scope.real("integ")?;
    scope.set(&format!(
        "{i} = {c} * {c}; {i} = {i} integ {t}; {i} = {i} / {d}; {i} = sqrt {i}",
        i = integ,
        c = col,
        t = time,
        d = duration
    ))?;
    Ok(scope.get_entry(-1, integ.as_str())?)
}

/// How [`period_time_average`] cuts the record into cycles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleSplit {
    /// At crossings of another column; `level` defaults to its midpoint.
    Trigger {
        col: String,
        #[serde(default)]
        level: Option<f64>,
        #[serde(default)]
        edge: Edge,
    },
    /// Every `period` starting at `offset`.
    Period {
        period: f64,
        #[serde(default)]
        offset: f64,
    },
}

/// Time average of `col` within each cycle, as a `time, avg` Dataset with
/// the cycle midpoints in `time`.
///
/// Each cycle covers the samples from one boundary (inclusive) to the next
/// (exclusive). Cycles holding fewer than two samples are skipped.
pub fn period_time_average(ds: &Dataset, time: &str, col: &str, split: &CycleSplit) -> DspResult<Dataset> {
    let boundaries = match split {
        CycleSplit::Trigger { col: trigger, level, edge } => {
            let level = match level {
                Some(l) => *l,
                None => midpoint_level(ds, trigger)?,
            };
            crossings(ds, time, trigger, level, *edge)?
        }
        CycleSplit::Period { period, offset } => {
            if *period <= 0.0 {
                return Err(DspError::invalid("period", "must be > 0"));
            }
            range_sample(*offset, ds.max(time)?, *period)
        }
    };
    let t = ds.get_vec(time)?;
    let s = ds.get_vec(col)?;
    let rows: Vec<usize> = boundaries.iter().map(|b| t.partition_point(|v| v < b)).collect();

    let mut mids = Vec::new();
    let mut avgs = Vec::new();
    for w in rows.windows(2) {
        let (i1, i2) = (w[0], w[1]);
        if i2 < i1 + 2 {
            continue;
        }
        let (t1, t2) = (t[i1], t[i2 - 1]);
        mids.push(0.5 * (t1 + t2));
        avgs.push(trapz(&s[i1..i2], &t[i1..i2]) / (t2 - t1));
    }
    Ok(Dataset::from_columns(&[("time", mids), ("avg", avgs)])?)
}

/// `prefix<hi:lo>suffix`
fn bus_range(input: &str) -> IResult<&str, (&str, u32, u32, &str)> {
    let (input, prefix) = take_till1(|c: char| c == '<').parse(input)?;
    let (input, (_, hi, _, lo, _)) = (char('<'), bit, char(':'), bit, char('>')).parse(input)?;
    Ok(("", (prefix, hi, lo, input)))
}

/// Bus bit columns named by `bus`, most significant first.
pub fn bus_columns(bus: &str) -> Vec<String> {
    match bus_range(bus) {
        Ok((_, (prefix, hi, lo, suffix))) => {
            let (hi, lo) = if hi < lo { (lo, hi) } else { (hi, lo) };
            (lo..=hi)
                .rev()
                .map(|i| format!("{}<{}>{}", prefix, i, suffix))
                .collect()
        }
        Err(_) => bus.split_whitespace().map(str::to_string).collect(),
    }
}

/// Decode `bus` into integer values in `col`, a bit being 1 when its
/// column exceeds `slice`.
///
/// `bus` is either `prefix<hi:lo>suffix` or the bit columns listed most
/// significant first. Every bit column must exist.
pub fn a2d(ds: &mut Dataset, col: &str, bus: &str, slice: f64) -> DspResult<()> {
    let bits = bus_columns(bus);
    if let Some(missing) = bits.iter().find(|b| !ds.contains(b)) {
        return Err(DspError::invalid("bus", format!("bus column {:?} not found", missing)));
    }
    let mut scope = TempColumns::new(ds);
    let high = scope.real("bit")?;
    scope.set_parsed(&format!("{} = 0", col))?;
    for b in &bits {
        scope.set(&format!(
            "{h} = {b} > {s}; {c} = {c} * 2; {c} = {c} + {h}",
            h = high,
            b = b,
            s = slice,
            c = col
        ))?;
    }
    Ok(())
}

/// True when every second difference of `col` is within `threshold` of 0.
pub fn is_equally_spaced(ds: &mut Dataset, col: &str, threshold: f64) -> DspResult<bool> {
    let mut scope = TempColumns::new(ds);
    let tmp = scope.real("tmp")?;
    scope.set(&format!(
        "{t} = del {c}; {t} = del {t}; {t} = abs {t}; {t} = {t} > {th}",
        t = tmp,
        c = col,
        th = threshold
    ))?;
    Ok(scope.unique(tmp.as_str())? == [0.0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine() -> Dataset {
        let t: Vec<f64> = (0..=1000).map(|i| i as f64 / 1000.0).collect();
        let v: Vec<f64> = t.iter().map(|t| 1.0 + (2.0 * PI * t).sin()).collect();
        Dataset::from_columns(&[("t", t), ("v", v)]).unwrap()
    }

    #[test]
    fn test_time_average_and_rms() {
        let mut d = sine();
        assert!((time_average(&mut d, "t", "v").unwrap() - 1.0).abs() < 1e-9);
        // mean of (1 + sin)^2 is 1.5
        assert!((rms(&mut d, "t", "v").unwrap() - 1.5f64.sqrt()).abs() < 1e-6);
        assert_eq!(d.names(), vec!["t", "v"]);
    }

    #[test]
    fn test_period_time_average() {
        let t: Vec<f64> = (0..=40).map(|i| i as f64 * 0.25).collect();
        let v: Vec<f64> = t.iter().map(|&t| if t < 5.0 { 1.0 } else { 3.0 }).collect();
        let d = Dataset::from_columns(&[("t", t), ("v", v)]).unwrap();
        let split = CycleSplit::Period { period: 2.5, offset: 0.0 };
        let avg = period_time_average(&d, "t", "v", &split).unwrap();
        assert_eq!(avg.names(), vec!["time", "avg"]);
        assert_eq!(avg.nrows(), 4);
        assert!((avg.get_entry(0, "avg").unwrap() - 1.0).abs() < 1e-12);
        assert!((avg.get_entry(1, "avg").unwrap() - 1.0).abs() < 1e-12);
        assert!((avg.get_entry(2, "avg").unwrap() - 3.0).abs() < 1e-12);
        assert!((avg.get_entry(3, "avg").unwrap() - 3.0).abs() < 1e-12);
        assert!((avg.get_entry(0, "time").unwrap() - 1.125).abs() < 1e-12);
    }

    #[test]
    fn test_bus_columns() {
        assert_eq!(bus_columns("d<0:2>_q"), vec!["d<2>_q", "d<1>_q", "d<0>_q"]);
        assert_eq!(bus_columns("b<1:0>"), vec!["b<1>", "b<0>"]);
        assert_eq!(bus_columns("msb lsb"), vec!["msb", "lsb"]);
    }

    #[test]
    fn test_a2d() {
        let mut d = Dataset::from_columns(&[
            ("b<1>", vec![0.0, 0.0, 1.0, 1.0]),
            ("b<0>", vec![0.0, 1.0, 0.0, 1.0]),
        ])
        .unwrap();
        a2d(&mut d, "bus", "b<1:0>", 0.5).unwrap();
        assert_eq!(d.get_vec("bus").unwrap(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(d.ncols(), 3);
        assert!(a2d(&mut d, "bus", "b<2:0>", 0.5).is_err());
    }

    #[test]
    fn test_is_equally_spaced() {
        let mut d = Dataset::from_columns(&[
            ("even", vec![0.0, 1.0, 2.0, 3.0]),
            ("uneven", vec![0.0, 1.0, 3.0, 4.0]),
        ])
        .unwrap();
        assert!(is_equally_spaced(&mut d, "even", 1e-15).unwrap());
        assert!(!is_equally_spaced(&mut d, "uneven", 1e-15).unwrap());
        assert_eq!(d.ncols(), 2);
    }
}
