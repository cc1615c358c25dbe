//! Low-pass loop-gain figures from a frequency response.
//!
//! The response is read from the `MAG`, `DB` and `PH` columns of a complex
//! variable. Figures whose defining crossing does not exist take sentinel
//! values instead of failing: frequencies become [`NO_FREQUENCY`] (never
//! reached) or 0 (passed before the first point), margins become
//! `±`[`NO_MARGIN`].

use crate::crossings::{crossings, Edge};
use crate::error::{DspError, DspResult};
use lib_expr::Equations;
use lib_types::{ComplexPart, Dataset};
use serde::Serialize;

pub const NO_FREQUENCY: f64 = 1e18;
pub const NO_MARGIN: f64 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LoopResponse {
    /// Magnitude, gain (dB) and phase (degrees) at the first point.
    pub dcmag: f64,
    pub dcdb: f64,
    pub dcph: f64,
    /// Unity-gain frequency and phase margin.
    pub f0db: f64,
    pub pm: f64,
    /// Frequency where the phase is 180 degrees past dc, and gain margin.
    pub f180deg: f64,
    pub gm: f64,
    /// Gain one decade below unity-gain times that frequency.
    pub gbw_dec: f64,
    pub f3db: f64,
    pub gbw_3db: f64,
    pub f1db: f64,
    pub gbw_1db: f64,
    /// Peak gain below `f3db`, where it occurs, and the dB/decade slope at
    /// the last point below `f3db`.
    pub peakdb: f64,
    pub fpeak: f64,
    pub rolloff: f64,
    pub f125deg: f64,
    pub g125deg: f64,
}

fn first(ds: &Dataset, xcol: &str, ycol: &str, level: f64) -> DspResult<Option<f64>> {
    Ok(crossings(ds, xcol, ycol, level, Edge::Both)?.first().copied())
}

/// Loop figures of `signal` against the `frequency` column.
///
/// The dc phase is moved by `±180` degrees when that brings it closer to 0,
/// unless `dcph_assumed` is given.
pub fn low_pass_pars(ds: &Dataset, frequency: &str, signal: &str, dcph_assumed: Option<f64>) -> DspResult<LoopResponse> {
    let mag = ComplexPart::Mag.column(signal);
    let db = ComplexPart::Db.column(signal);
    let ph = ComplexPart::Ph.column(signal);
    if !(ds.contains(&mag) && ds.contains(&db) && ds.contains(&ph)) {
        return Err(DspError::invalid(
            "signal",
            format!("magnitude, dB or phase columns for {} not present", signal),
        ));
    }
    let freq = frequency;
    let (mag, db, ph) = (mag.as_str(), db.as_str(), ph.as_str());

    let dcmag = ds.get_entry(0, mag)?;
    let dcdb = ds.get_entry(0, db)?;
    let mut dcph = ds.get_entry(0, ph)?;
    let (db_max, db_min) = (ds.max(db)?, ds.min(db)?);
    let (ph_max, ph_min) = (ds.max(ph)?, ds.min(ph)?);
    match dcph_assumed {
        Some(assumed) => dcph = assumed,
        None => {
            if (dcph + 180.0).abs() < dcph.abs() {
                dcph += 180.0;
            } else if (dcph - 180.0).abs() < dcph.abs() {
                dcph -= 180.0;
            }
        }
    }
    let dcph_180 = dcph - 180.0;

    let (f0db, pm) = if db_min > 0.0 {
        (NO_FREQUENCY, -NO_MARGIN)
    } else if db_max <= 0.0 {
        (0.0, NO_MARGIN)
    } else {
        match first(ds, freq, db, 0.0)? {
            Some(f0db) => {
                let p0db = first(ds, ph, freq, f0db)?.unwrap_or(0.0);
                (f0db, p0db - dcph_180)
            }
            None => (NO_FREQUENCY, -NO_MARGIN),
        }
    };

    let (f180deg, gm) = if ph_min >= dcph_180 {
        (NO_FREQUENCY, NO_MARGIN)
    } else if ph_max < dcph_180 {
        (0.0, -NO_MARGIN)
    } else {
        match first(ds, freq, ph, dcph_180)? {
            Some(f180) => (f180, -first(ds, db, freq, f180)?.unwrap_or(-NO_MARGIN)),
            None => (NO_FREQUENCY, NO_MARGIN),
        }
    };

    let (f125deg, g125deg) = match first(ds, freq, ph, dcph - 125.0)? {
        Some(f125) => (f125, first(ds, db, freq, f125)?.unwrap_or(-NO_MARGIN)),
        None => (0.0, -NO_MARGIN),
    };

    let bandwidth = |drop: f64| -> DspResult<(f64, f64)> {
        let level = dcdb - drop;
        if db_min > level {
            return Ok((NO_FREQUENCY, NO_FREQUENCY));
        }
        Ok(match first(ds, freq, db, level)? {
            Some(f) => (f, dcmag * f),
            None => (NO_FREQUENCY, NO_FREQUENCY),
        })
    };
    let (f3db, gbw_3db) = bandwidth(3.0)?;
    let (f1db, gbw_1db) = bandwidth(1.0)?;

    let fdec = 0.1 * f0db;
    let gbw_dec = first(ds, db, freq, fdec)?.map_or(0.0, |gain| gain * fdec);

    let mut passband = ds.dup();
    passband.filter(&format!("{} < {}", freq, f3db))?;
    let (peakdb, fpeak, rolloff) = if passband.nrows() > 1 {
        let peakdb = passband.max(db)?;
        let fpeak = first(ds, freq, db, peakdb)?.unwrap_or(0.0);
        let logfreq = passband.unique_name("logfreq")?;
        let slope = passband.unique_name("slope")?;
        passband.set_parsed(&format!("{} = log10 {}", logfreq, freq))?;
        passband.set_parsed(&format!("{} = {} dY/dX {}", slope, db, logfreq))?;
        (peakdb, fpeak, passband.get_entry(-1, slope.as_str())?)
    } else {
        (0.0, 0.0, 0.0)
    };

    Ok(LoopResponse {
        dcmag,
        dcdb,
        dcph,
        f0db,
        pm,
        f180deg,
        gm,
        gbw_dec,
        f3db,
        gbw_3db,
        f1db,
        gbw_1db,
        peakdb,
        fpeak,
        rolloff,
        f125deg,
        g125deg,
    })
}
