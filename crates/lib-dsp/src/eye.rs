//! Folded time axes for eye-diagram and triggered oscilloscope views.

use crate::crossings::{midpoint_level, Edge};
use crate::error::{DspError, DspResult};
use crate::filter::store;
use lib_types::Dataset;

/// Write `time` folded modulo `period` (phase origin at `offset`) into
/// `eyetime`. Every value lies in `[0, period)`.
pub fn eye_time(ds: &mut Dataset, time: &str, eyetime: &str, period: f64, offset: f64) -> DspResult<()> {
    if period <= 0.0 {
        return Err(DspError::invalid("period", "must be > 0"));
    }
    let folded: Vec<f64> = ds
        .get(time)?
        .iter()
        .map(|t| (t - offset).rem_euclid(period))
        .collect();
    store(ds, eyetime, &folded)
}

/// Write a sweep time into `osctime` that restarts at each `trigger`
/// crossing of `level` and holds at 0 from `period` after the crossing until
/// the next one.
///
/// `level` defaults to the trigger midpoint.
pub fn osc_time(
    ds: &mut Dataset,
    time: &str,
    osctime: &str,
    trigger: &str,
    period: f64,
    level: Option<f64>,
    edge: Edge,
) -> DspResult<()> {
    let level = match level {
        Some(l) => l,
        None => midpoint_level(ds, trigger)?,
    };
    let rising = matches!(edge, Edge::Rising | Edge::Both);
    let falling = matches!(edge, Edge::Falling | Edge::Both);
    let t = ds.get_vec(time)?;
    let s = ds.get_vec(trigger)?;

    let mut sweep = vec![0.0; t.len()];
    let mut start: Option<f64> = None;
    for i in 1..t.len() {
        match start {
            None => {
                let (tp, sp) = (t[i - 1], s[i - 1]);
                let up = s[i] >= level && sp < level;
                let down = s[i] <= level && sp > level;
                if (rising && up) || (falling && down) {
                    let tx = tp + (level - sp) * (t[i] - tp) / (s[i] - sp);
                    sweep[i] = t[i] - tx;
                    start = Some(tx);
                }
            }
            Some(tx) => {
                let to = t[i] - tx;
                if to > period {
                    start = None;
                } else {
                    sweep[i] = to;
                }
            }
        }
    }
    store(ds, osctime, &sweep)
}
