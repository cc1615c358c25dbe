//! Period, duty-cycle, delay, skew and edge-rate measurements built on
//! [`crate::crossings`].

use crate::crossings::{crossings, midpoint_level, transitions, Edge};
use crate::error::{DspError, DspResult};
use lib_types::Dataset;
use serde::{Deserialize, Serialize};

/// Period used by [`measure_freq`] when fewer than two crossings exist.
pub const FALLBACK_PERIOD: f64 = 1e8;

fn level_or_midpoint(ds: &Dataset, col: &str, level: Option<f64>) -> DspResult<f64> {
    match level {
        Some(level) => Ok(level),
        None => midpoint_level(ds, col),
    }
}

/// One row per full cycle: `time, frequency, period, duty_cycle`.
///
/// A cycle runs between consecutive rising crossings. `duty_cycle` is the
/// percentage of the cycle before the falling crossing inside it. The level
/// defaults to the signal midpoint.
pub fn periods(ds: &Dataset, xcol: &str, ycol: &str, level: Option<f64>) -> DspResult<Dataset> {
    let level = level_or_midpoint(ds, ycol, level)?;
    let mut time = Vec::new();
    let mut frequency = Vec::new();
    let mut period = Vec::new();
    let mut duty = Vec::new();

    let mut t_fall: Option<f64> = None;
    let mut t_rise: Option<f64> = None;
    for tr in transitions(ds, xcol, ycol, level)? {
        if !tr.rising {
            t_fall = Some(tr.time);
            continue;
        }
        let Some(t0) = t_rise.replace(tr.time) else {
            continue;
        };
        let t2 = tr.time;
        let p = t2 - t0;
        let (f, d) = if p > 0.0 {
            let f = 1.0 / p;
            (f, 100.0 * (t_fall.unwrap_or(t0) - t0) * f)
        } else {
            (0.0, 0.0)
        };
        time.push(t2);
        frequency.push(f);
        period.push(p);
        duty.push(d);
    }
    Ok(Dataset::from_columns(&[
        ("time", time),
        ("frequency", frequency),
        ("period", period),
        ("duty_cycle", duty),
    ])?)
}

/// Crossing selection for two-signal measurements.
///
/// `level2` and `edge2` apply to the second signal and default to `level`
/// and `edge`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossingPair {
    pub level: f64,
    pub level2: Option<f64>,
    pub edge: Edge,
    pub edge2: Option<Edge>,
}

impl CrossingPair {
    fn crossings(&self, ds: &Dataset, time: &str, sig1: &str, sig2: &str) -> DspResult<(Vec<f64>, Vec<f64>)> {
        let t1s = crossings(ds, time, sig1, self.level, self.edge)?;
        let t2s = crossings(
            ds,
            time,
            sig2,
            self.level2.unwrap_or(self.level),
            self.edge2.unwrap_or(self.edge),
        )?;
        Ok((t1s, t2s))
    }
}

/// Walks the ascending crossings of the first signal alongside those of the
/// second. For each `t2` yields `(before, at_or_after)`: the last first-signal
/// crossing before `t2` and the first one not before it, each clamped to the
/// list ends.
fn bracket(t1s: &[f64], t2s: &[f64]) -> Vec<(f64, f64, f64)> {
    let mut out = Vec::with_capacity(t2s.len());
    let Some(&first) = t1s.first() else {
        return out;
    };
    let (mut t1, mut t1l, mut next) = (first, first, 1);
    for &t2 in t2s {
        while t1 < t2 && next < t1s.len() {
            t1l = t1;
            t1 = t1s[next];
            next += 1;
        }
        out.push((t2, t1l, t1));
    }
    out
}

/// Time from each crossing of `sig2` back to the nearest preceding crossing
/// of `sig1`. Crossings of `sig2` before the first of `sig1` are skipped.
pub fn delays(ds: &Dataset, time: &str, sig1: &str, sig2: &str, pair: &CrossingPair) -> DspResult<Vec<f64>> {
    let (t1s, t2s) = pair.crossings(ds, time, sig1, sig2)?;
    Ok(bracket(&t1s, &t2s)
        .into_iter()
        .filter_map(|(t2, t1l, t1)| {
            let before = if t1 <= t2 { t1 } else { t1l };
            (t2 >= before).then_some(t2 - before)
        })
        .collect())
}

/// Signed distance from each crossing of `sig2` to the nearest crossing of
/// `sig1` in either direction.
pub fn skews(ds: &Dataset, time: &str, sig1: &str, sig2: &str, pair: &CrossingPair) -> DspResult<Vec<f64>> {
    let (t1s, t2s) = pair.crossings(ds, time, sig1, sig2)?;
    Ok(bracket(&t1s, &t2s)
        .into_iter()
        .map(|(t2, t1l, t1)| {
            if (t2 - t1).abs() < (t2 - t1l).abs() {
                t2 - t1
            } else {
                t2 - t1l
            }
        })
        .collect())
}

/// Symmetric bands reported by [`edges`], in percent.
pub const EDGE_BANDS: [(u32, u32); 4] = [(10, 90), (20, 80), (30, 70), (40, 60)];

/// Rise/fall times and slew rates per edge.
///
/// Crossings are taken at every 10% of `vhigh - vlow` (defaults: column
/// minimum and maximum). Each list drops a leading crossing that precedes
/// the first crossing of the previous level, and all lists are cut to the
/// shortest. The result has `rise_time_L_H, fall_time_L_H, rise_slew_L_H,
/// fall_slew_L_H` for each band in [`EDGE_BANDS`], then `point`.
pub fn edges(ds: &Dataset, xcol: &str, ycol: &str, vlow: Option<f64>, vhigh: Option<f64>) -> DspResult<Dataset> {
    let vlow = match vlow {
        Some(v) => v,
        None => ds.min(ycol)?,
    };
    let vhigh = match vhigh {
        Some(v) => v,
        None => ds.max(ycol)?,
    };
    let dv = vhigh - vlow;

    // index k holds the crossings at (k + 1) * 10 percent
    let mut rise: Vec<Vec<f64>> = vec![Vec::new(); 9];
    let mut fall: Vec<Vec<f64>> = vec![Vec::new(); 9];
    let (mut tr, mut tf) = (0.0, 0.0);
    let mut len = usize::MAX;
    for pctr in 1..=9 {
        let pctf = 10 - pctr;
        let mut r = crossings(ds, xcol, ycol, vlow + dv * 0.1 * pctr as f64, Edge::Rising)?;
        let mut f = crossings(ds, xcol, ycol, vlow + dv * 0.1 * pctf as f64, Edge::Falling)?;
        if r.first().is_some_and(|&t| t < tr) {
            r.remove(0);
        }
        if f.first().is_some_and(|&t| t < tf) {
            f.remove(0);
        }
        if let Some(&t) = r.first() {
            tr = t;
        }
        if let Some(&t) = f.first() {
            tf = t;
        }
        len = len.min(r.len()).min(f.len());
        rise[pctr - 1] = r;
        fall[pctf - 1] = f;
    }
    if len == 0 {
        tracing::warn!("equalized lists of rise and fall times are empty");
        return Err(DspError::insufficient(1, 0));
    }

    let mut columns: Vec<(String, Vec<f64>)> = Vec::new();
    for (lo, hi) in EDGE_BANDS {
        let (l, h) = ((lo / 10 - 1) as usize, (hi / 10 - 1) as usize);
        let dvp = dv * 0.01 * (hi - lo) as f64;
        let rise_time: Vec<f64> = (0..len).map(|i| rise[h][i] - rise[l][i]).collect();
        let fall_time: Vec<f64> = (0..len).map(|i| fall[l][i] - fall[h][i]).collect();
        let rise_slew = rise_time.iter().map(|t| dvp / t).collect();
        let fall_slew = fall_time.iter().map(|t| dvp / t).collect();
        columns.push((format!("rise_time_{}_{}", lo, hi), rise_time));
        columns.push((format!("fall_time_{}_{}", lo, hi), fall_time));
        columns.push((format!("rise_slew_{}_{}", lo, hi), rise_slew));
        columns.push((format!("fall_slew_{}_{}", lo, hi), fall_slew));
    }
    columns.push(("point".to_string(), (0..len).map(|i| i as f64).collect()));
    Ok(Dataset::from_columns(&columns)?)
}

/// Frequency from the last few crossings.
///
/// Uses half the span of the last three crossings when four or more exist,
/// otherwise the last interval. With fewer than two crossings the period
/// falls back to [`FALLBACK_PERIOD`].
pub fn measure_freq(ds: &Dataset, xcol: &str, ycol: &str, level: Option<f64>, edge: Edge) -> DspResult<f64> {
    let level = level_or_midpoint(ds, ycol, level)?;
    let c = crossings(ds, xcol, ycol, level, edge)?;
    let n = c.len();
    let period = match n {
        0 | 1 => {
            tracing::warn!("not enough crossings to determine frequency");
            FALLBACK_PERIOD
        }
        2 | 3 => c[n - 1] - c[n - 2],
        _ => (c[n - 1] - c[n - 3]) / 2.0,
    };
    Ok(1.0 / period)
}

/// Duty cycle in percent from the last three transitions.
///
/// Returns 0 when fewer than three transitions exist or the last period is
/// not positive.
pub fn measure_duty(ds: &Dataset, xcol: &str, ycol: &str, level: Option<f64>) -> DspResult<f64> {
    let level = level_or_midpoint(ds, ycol, level)?;
    let tr = transitions(ds, xcol, ycol, level)?;
    let [.., a, b, c] = tr.as_slice() else {
        tracing::warn!("not enough crossings to determine duty_cycle");
        return Ok(0.0);
    };
    let period = c.time - a.time;
    if period <= 0.0 {
        tracing::warn!("period is not > 0");
        return Ok(0.0);
    }
    let high = if b.rising { c.time - b.time } else { b.time - a.time };
    Ok(100.0 * high / period)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pulse train high for 3 of every 4 time units, sampled every 0.5.
    fn clock() -> Dataset {
        let t: Vec<f64> = (0..33).map(|i| i as f64 * 0.5).collect();
        let v: Vec<f64> = t.iter().map(|t| if (t % 4.0) < 3.0 { 1.0 } else { 0.0 }).collect();
        Dataset::from_columns(&[("t", t), ("v", v)]).unwrap()
    }

    #[test]
    fn test_periods_and_duty() {
        let d = periods(&clock(), "t", "v", None).unwrap();
        assert_eq!(d.names(), vec!["time", "frequency", "period", "duty_cycle"]);
        assert!(d.nrows() >= 2);
        for i in 0..d.nrows() as isize {
            assert!((d.get_entry(i, "period").unwrap() - 4.0).abs() < 1e-12);
            assert!((d.get_entry(i, "duty_cycle").unwrap() - 75.0).abs() < 1e-9);
        }
        assert!((measure_freq(&clock(), "t", "v", None, Edge::Rising).unwrap() - 0.25).abs() < 1e-12);
        let duty = measure_duty(&clock(), "t", "v", None).unwrap();
        assert!((duty - 75.0).abs() < 1e-9 || (duty - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_measure_freq_fallback() {
        let d = Dataset::from_columns(&[("t", vec![0.0, 1.0]), ("v", vec![0.0, 1.0])]).unwrap();
        assert_eq!(measure_freq(&d, "t", "v", None, Edge::Rising).unwrap(), 1.0 / FALLBACK_PERIOD);
        assert_eq!(measure_duty(&d, "t", "v", None).unwrap(), 0.0);
    }

    #[test]
    fn test_delays_and_skews() {
        let t: Vec<f64> = (0..=40).map(f64::from).collect();
        let a: Vec<f64> = t.iter().map(|t| if (t % 10.0) < 5.0 { 1.0 } else { -1.0 }).collect();
        let b: Vec<f64> = t.iter().map(|t| if ((t - 2.0) % 10.0 + 10.0) % 10.0 < 5.0 { 1.0 } else { -1.0 }).collect();
        let d = Dataset::from_columns(&[("t", t), ("a", a), ("b", b)]).unwrap();
        let pair = CrossingPair::default();
        let dl = delays(&d, "t", "a", "b", &pair).unwrap();
        assert!(!dl.is_empty());
        assert!(dl.iter().all(|v| (v - 2.0).abs() < 1e-12));
        let sk = skews(&d, "t", "b", "a", &pair).unwrap();
        assert!(sk.iter().all(|v| (v.abs() - 2.0).abs() < 1e-12));
    }

    #[test]
    fn test_edges_linear_ramp() {
        let t: Vec<f64> = (0..=20).map(f64::from).collect();
        let v: Vec<f64> = t
            .iter()
            .map(|&t| if t <= 10.0 { t / 10.0 } else { (20.0 - t) / 10.0 })
            .collect();
        let d = Dataset::from_columns(&[("t", t), ("v", v)]).unwrap();
        let e = edges(&d, "t", "v", None, None).unwrap();
        assert_eq!(e.nrows(), 1);
        assert_eq!(e.names().last().map(String::as_str), Some("point"));
        assert!((e.get_entry(0, "rise_time_10_90").unwrap() - 8.0).abs() < 1e-9);
        assert!((e.get_entry(0, "fall_time_20_80").unwrap() - 6.0).abs() < 1e-9);
        assert!((e.get_entry(0, "rise_slew_10_90").unwrap() - 0.1).abs() < 1e-9);
    }
}
