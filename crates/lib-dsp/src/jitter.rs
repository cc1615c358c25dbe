//! Absolute, period and cycle-to-cycle jitter against an ideal clock.

use crate::crossings::{crossings, Edge};
use crate::error::{DspError, DspResult};
use crate::report::g12;
use lib_expr::Equations;
use lib_types::Dataset;
use serde::{Deserialize, Serialize};

/// Columns of [`Jitter::table`].
pub const JITTER_COLUMNS: [&str; 7] = ["tref", "t", "J", "P", "dJ", "dP", "point"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterOptions {
    /// Window start; defaults to the first time sample.
    pub tmin: Option<f64>,
    /// Window end; defaults to the last time sample.
    pub tmax: Option<f64>,
    /// Reference clock frequency; derived from the crossings when absent.
    /// Required for data signals.
    pub freq: Option<f64>,
    /// Crossing level; defaults to the signal midpoint.
    pub level: Option<f64>,
    /// `false` treats the signal as data: both edges are used and each
    /// crossing is matched to the nearest ideal clock edge.
    pub clock: bool,
    pub edge: Edge,
    /// Label in the report heading.
    pub prefix: String,
}

impl Default for JitterOptions {
    fn default() -> Self {
        Self {
            tmin: None,
            tmax: None,
            freq: None,
            level: None,
            clock: true,
            edge: Edge::Rising,
            prefix: "jitter".to_string(),
        }
    }
}

/// Peak-to-peak and RMS of the three jitter metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JitterMetrics {
    pub ja_pp: f64,
    pub jp_pp: f64,
    pub jc_pp: f64,
    pub ja_rms: f64,
    pub jp_rms: f64,
    pub jc_rms: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Jitter {
    pub metrics: JitterMetrics,
    /// One row per crossing after the first; see [`JITTER_COLUMNS`].
    pub table: Dataset,
    /// Empty when there was nothing to measure.
    pub report: String,
}

impl Jitter {
    fn empty() -> Self {
        let mut table = Dataset::new();
        table.append(JITTER_COLUMNS);
        Self {
            metrics: JitterMetrics::default(),
            table,
            report: String::new(),
        }
    }
}

struct Spread {
    min: f64,
    max: f64,
    std: f64,
}

impl Spread {
    fn of(ds: &Dataset, col: &str) -> DspResult<Self> {
        Ok(Self {
            min: ds.min(col)?,
            max: ds.max(col)?,
            std: ds.std(col)?,
        })
    }

    fn pp(&self) -> f64 {
        self.max - self.min
    }
}

/// Jitter of `signal` crossings against an ideal clock.
///
/// Fewer than two crossings inside the window, a zero derived period or a
/// non-positive `freq` give zero metrics and an empty report. A data signal
/// without `freq` is an error.
pub fn jitter(ds: &Dataset, time: &str, signal: &str, opts: &JitterOptions) -> DspResult<Jitter> {
    let tmin = match opts.tmin {
        Some(t) => t,
        None => ds.min(time)?,
    };
    let tmax = match opts.tmax {
        Some(t) => t,
        None => ds.max(time)?,
    };
    let vmin = ds.min(signal)?;
    let vmax = ds.max(signal)?;
    let vavg = ds.mean(signal)?;
    let level = opts.level.unwrap_or(0.5 * (vmin + vmax));

    let edge = if opts.clock { opts.edge } else { Edge::Both };
    if !opts.clock && opts.freq.is_none() {
        return Err(DspError::invalid("freq", "must be given for a data signal"));
    }

    let tx: Vec<f64> = crossings(ds, time, signal, level, edge)?
        .into_iter()
        .filter(|t| *t >= tmin && *t <= tmax)
        .collect();
    let ncross = tx.len();
    let [t1, rest @ ..] = tx.as_slice() else {
        tracing::warn!("less than 2 signal crossings found");
        return Ok(Jitter::empty());
    };
    let Some(&t2) = rest.last() else {
        tracing::warn!("less than 2 signal crossings found");
        return Ok(Jitter::empty());
    };
    let t1 = *t1;

    let (freq, period, rstep) = match opts.freq {
        None => {
            let rstep = (t2 - t1) / rest.len() as f64;
            let period = if edge == Edge::Both { 2.0 * rstep } else { rstep };
            if period == 0.0 {
                tracing::warn!("calculated period is 0");
                return Ok(Jitter::empty());
            }
            (1.0 / period, period, rstep)
        }
        Some(freq) => {
            if freq <= 0.0 {
                tracing::warn!("specified frequency is <= 0");
                return Ok(Jitter::empty());
            }
            let period = 1.0 / freq;
            let rstep = if edge == Edge::Both { 0.5 * period } else { period };
            (freq, period, rstep)
        }
    };

    let mut table = Dataset::new();
    table.append(JITTER_COLUMNS);
    let (mut tprev, mut jprev, mut pprev) = (t1, 0.0, 0.0);
    let mut tref = t1;
    for (point, &t) in rest.iter().enumerate() {
        tref += rstep;
        if !opts.clock {
            // nearest ideal edge at or after tref
            let k = ((t - tref) / rstep - 0.5).ceil().max(0.0);
            tref += k * rstep;
        }
        let j = t - tref;
        let p = t - tprev;
        table.push_row(&[tref, t, j, p, j - jprev, p - pprev, point as f64])?;
        tprev = t;
        jprev = j;
        pprev = p;
    }

    let per = Spread::of(&table, "P")?;
    let per_mean = table.mean("P")?;
    let ja = Spread::of(&table, "J")?;
    let jp = Spread::of(&table, "dJ")?;
    let mut later = table.dup();
    later.filter("point > 0")?;
    let jc = if later.nrows() > 0 {
        Spread::of(&later, "dP")?
    } else {
        Spread { min: 0.0, max: 0.0, std: 0.0 }
    };

    let metrics = JitterMetrics {
        ja_pp: ja.pp(),
        jp_pp: jp.pp(),
        jc_pp: jc.pp(),
        ja_rms: ja.std,
        jp_rms: jp.std,
        jc_rms: jc.std,
    };

    let rule = format!("#{}", "=".repeat(72));
    let pp_rms = |pp: f64, rms: f64| format!("{} ps p-p / {} ps rms", g12(pp * 1e12), g12(rms * 1e12));
    let report = [
        rule.clone(),
        format!("# ({}) {} jitter", opts.prefix, signal),
        rule,
        format!("time : {}", time),
        format!("    minimum        : {}", g12(tmin)),
        format!("    maximum        : {}", g12(tmax)),
        "ideal clock :".to_string(),
        format!("    frequency      : {} MHz", g12(freq * 1e-6)),
        format!("    period         : {} ps", g12(period * 1e12)),
        format!("signal : {}", signal),
        format!("    average        : {}", g12(vavg)),
        format!("    minimum        : {}", g12(vmin)),
        format!("    maximum        : {}", g12(vmax)),
        format!("    crossing level : {}", g12(level)),
        format!("    no. crossings  : {}", ncross),
        format!("    period (mean)  : {} us", g12(per_mean * 1e6)),
        format!("    period (min)   : {} us", g12(per.min * 1e6)),
        format!("    period (max)   : {} us", g12(per.max * 1e6)),
        format!("    jitter (min)   : {} ps", g12(ja.min * 1e12)),
        format!("    jitter (max)   : {} ps", g12(ja.max * 1e12)),
        format!("    Jabs           : {}", pp_rms(metrics.ja_pp, metrics.ja_rms)),
        format!("    Jper           : {}", pp_rms(metrics.jp_pp, metrics.jp_rms)),
        format!("    Jc_c           : {}", pp_rms(metrics.jc_pp, metrics.jc_rms)),
    ]
    .join("\n");

    Ok(Jitter { metrics, table, report })
}
