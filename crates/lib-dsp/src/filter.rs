//! Time-domain smoothing filters.

use crate::error::{DspError, DspResult};
use lib_types::numeric::diff_repeat_last;
use lib_types::Dataset;

/// Write `values` into `col`, appending the column when it is new.
pub(crate) fn store(ds: &mut Dataset, col: &str, values: &[f64]) -> DspResult<()> {
    ds.append([col]);
    ds.set_column(col, values)?;
    Ok(())
}

/// Single-pole low-pass filter of `signal` into `out`.
///
/// Bilinear update on the trapezoidal average of consecutive samples, so
/// uneven time steps are handled. `time` must be strictly ascending and
/// `fpole` must lie in `(0, 0.5 / min(dt))`.
pub fn lpf(ds: &mut Dataset, out: &str, signal: &str, time: &str, fpole: f64) -> DspResult<()> {
    let y = ds.get_vec(signal)?;
    let tdel = diff_repeat_last(&ds.get_vec(time)?);
    let Some(tdelmin) = tdel.iter().copied().reduce(f64::min) else {
        return Err(DspError::insufficient(1, 0));
    };
    if tdel.len() > 1 && tdelmin <= 0.0 {
        tracing::warn!("{} is not strictly ascending: min(delta({})) = {}", time, time, tdelmin);
        return Err(DspError::NotAscending(time.to_string()));
    }
    if fpole <= 0.0 || fpole >= 0.5 / tdelmin {
        return Err(DspError::invalid(
            "fpole",
            format!("pole {} must be > 0 and < {}", fpole, 0.5 / tdelmin),
        ));
    }

    let mut z = y[0];
    let mut filtered = Vec::with_capacity(y.len());
    filtered.push(z);
    for i in 1..y.len() {
        let ya = 0.5 * (y[i] + y[i - 1]);
        let a = (fpole * tdel[i]).tan();
        let a = 2.0 / (1.0 + 1.0 / a);
        z += a * (ya - z);
        filtered.push(z);
    }
    store(ds, out, &filtered)
}

/// Centered moving average of `signal` into `out`.
///
/// An even `navg` is widened by one. The `(navg - 1) / 2` rows at each end
/// have no full window and are set to 0.
pub fn moving_average_filter(ds: &mut Dataset, out: &str, signal: &str, navg: usize) -> DspResult<()> {
    let y = ds.get_vec(signal)?;
    let navg = if navg % 2 == 0 { navg + 1 } else { navg };
    let npts = y.len();
    if navg > npts {
        return Err(DspError::insufficient(navg, npts));
    }
    let m = (navg - 1) / 2;
    let mut filtered = vec![0.0; npts];
    let mut acc: f64 = y[..navg].iter().sum();
    filtered[m] = acc / navg as f64;
    for i in m + 1..npts - m {
        acc += y[i + m] - y[i - m - 1];
        filtered[i] = acc / navg as f64;
    }
    store(ds, out, &filtered)
}
