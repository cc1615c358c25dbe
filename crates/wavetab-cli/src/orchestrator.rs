//! Job orchestration: read, derive, analyze, write.

use crate::config::{Analysis, JobConfig};
use crate::output::write_dataset;
use anyhow::{Context, Result};
use lib_dsp::{
    delays, edges, fft, fourcoeff, jitter, linreg, low_pass_pars, measure_duty, measure_freq,
    periods, quadreg, rms, skews, time_average, FourierSeries, JitterMetrics, LoopResponse,
    Regression,
};
use lib_expr::{Evaluator, ScalarScope};
use lib_formats::read_file;
use lib_types::Dataset;
use serde::Serialize;

/// Job runner.
pub struct Orchestrator {
    config: JobConfig,
    evaluator: Evaluator,
}

impl Orchestrator {
    pub fn new(config: JobConfig) -> Self {
        let scope: ScalarScope = config.variables.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        Self {
            evaluator: Evaluator::new().with_interpolator(scope),
            config,
        }
    }

    /// Run the job.
    pub fn run(&self) -> Result<JobResults> {
        let mut dataset = self.load()?;

        let mut analyses = Vec::with_capacity(self.config.analyses.len());
        for analysis in &self.config.analyses {
            tracing::info!("Running {} analysis", analysis.kind());
            let value = run_analysis(&mut dataset, analysis)
                .with_context(|| format!("{} analysis failed", analysis.kind()))?;
            analyses.push(AnalysisResult {
                kind: analysis.kind(),
                value,
            });
        }

        if let Some(out) = &self.config.output {
            write_dataset(&dataset, &out.path, out.format, &out.columns)?;
            tracing::info!("Wrote {} rows to {:?}", dataset.nrows(), out.path);
        }

        Ok(JobResults { dataset, analyses })
    }

    /// Read the input and apply equations, filter and sort.
    fn load(&self) -> Result<Dataset> {
        let config = &self.config;
        tracing::info!("Reading {:?} block {}", config.input, config.block);
        let mut ds = read_file(&config.input, config.block, config.format)
            .with_context(|| format!("Failed to read {:?}", config.input))?;
        tracing::info!("Read {} rows x {} columns", ds.nrows(), ds.ncols());

        for eqn in &config.equations {
            self.evaluator
                .set(&mut ds, eqn)
                .with_context(|| format!("Equation failed: {}", eqn))?;
        }
        for eqn in &config.complex_equations {
            self.evaluator
                .cxset(&mut ds, eqn)
                .with_context(|| format!("Complex equation failed: {}", eqn))?;
        }
        if let Some(condition) = &config.filter {
            self.evaluator
                .filter(&mut ds, condition)
                .with_context(|| format!("Filter failed: {}", condition))?;
            tracing::debug!("{} rows after filter", ds.nrows());
        }
        if !config.sort.is_empty() {
            ds.sort(&config.sort).context("Sort failed")?;
        }
        Ok(ds)
    }
}

/// Run one analysis against `ds`.
///
/// Scratch columns some analyses create are gone again on return.
pub fn run_analysis(ds: &mut Dataset, analysis: &Analysis) -> Result<AnalysisValue> {
    Ok(match analysis {
        Analysis::Periods { x, y, level } => AnalysisValue::Table(periods(ds, x, y, *level)?),
        Analysis::Edges { x, y, vlow, vhigh } => AnalysisValue::Table(edges(ds, x, y, *vlow, *vhigh)?),
        Analysis::Jitter { time, signal, options } => {
            let j = jitter(ds, time, signal, options)?;
            AnalysisValue::Jitter {
                metrics: j.metrics,
                report: j.report,
                table: j.table,
            }
        }
        Analysis::Fft { x, y, name, window } => AnalysisValue::Table(fft(ds, name, y, x, *window)?),
        Analysis::Lowpass { freq, signal, dcph } => {
            AnalysisValue::Loop(low_pass_pars(ds, freq, signal, *dcph)?)
        }
        Analysis::Linreg { x, y } => AnalysisValue::Fit(linreg(ds, x, y)?),
        Analysis::Quadreg { x, y } => AnalysisValue::Fit(quadreg(ds, x, y)?),
        Analysis::Fourier { x, y, harmonics } => AnalysisValue::Series(fourcoeff(ds, x, y, *harmonics)?),
        Analysis::Rms { time, col } => AnalysisValue::Scalar(rms(ds, time, col)?),
        Analysis::TimeAverage { time, col } => AnalysisValue::Scalar(time_average(ds, time, col)?),
        Analysis::MeasureFreq { x, y, level, edge } => {
            AnalysisValue::Scalar(measure_freq(ds, x, y, *level, *edge)?)
        }
        Analysis::MeasureDuty { x, y, level } => AnalysisValue::Scalar(measure_duty(ds, x, y, *level)?),
        Analysis::Delays { time, sig1, sig2, crossing } => {
            AnalysisValue::Values(delays(ds, time, sig1, sig2, crossing)?)
        }
        Analysis::Skews { time, sig1, sig2, crossing } => {
            AnalysisValue::Values(skews(ds, time, sig1, sig2, crossing)?)
        }
    })
}

/// Job results.
#[derive(Debug)]
pub struct JobResults {
    /// The table after equations, filter and sort.
    pub dataset: Dataset,

    pub analyses: Vec<AnalysisResult>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResult {
    pub kind: &'static str,
    pub value: AnalysisValue,
}

/// Result of one analysis.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalysisValue {
    Scalar(f64),
    Values(Vec<f64>),
    Table(Dataset),
    Fit(Regression),
    Series(FourierSeries),
    Loop(LoopResponse),
    Jitter {
        metrics: JitterMetrics,
        report: String,
        table: Dataset,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use std::fs;

    /// 1 MHz triangle wave sampled every 10 ns, no sample at 0.5.
    fn triangle_wave() -> String {
        let mut text = String::from("time v\n");
        for i in 0..=500 {
            let t = i as f64 * 1e-8;
            let phase = (i % 100) as f64;
            let v = if phase < 50.0 {
                (phase + 0.25) / 50.0
            } else {
                1.0 - (phase - 50.0 + 0.25) / 50.0
            };
            text.push_str(&format!("{:e} {}\n", t, v));
        }
        text
    }

    #[test]
    fn test_run_job() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wave.col"), triangle_wave()).unwrap();
        let job = dir.path().join("job.toml");
        fs::write(
            &job,
            r#"
input = "wave.col"
equations = ["w = v * $gain"]
filter = "time < 4.5e-6"

[variables]
gain = 2.0

[[analyses]]
kind = "measure_freq"
x = "time"
y = "v"
level = 0.5

[[analyses]]
kind = "periods"
x = "time"
y = "v"

[[analyses]]
kind = "rms"
time = "time"
col = "w"

[output]
path = "out.col"
columns = ["time", "w"]
"#,
        )
        .unwrap();

        let results = Orchestrator::new(load_config(&job).unwrap()).run().unwrap();
        assert_eq!(results.dataset.names(), vec!["time", "v", "w"]);
        assert_eq!(results.dataset.nrows(), 450);
        assert_eq!(results.analyses.len(), 3);

        match results.analyses[0].value {
            AnalysisValue::Scalar(f) => assert!((f / 1e6 - 1.0).abs() < 1e-6, "freq = {}", f),
            ref other => panic!("unexpected {:?}", other),
        }
        match &results.analyses[1].value {
            AnalysisValue::Table(t) => {
                assert_eq!(t.names(), vec!["time", "frequency", "period", "duty_cycle"]);
                assert!((t.get_entry(0, "duty_cycle").unwrap() - 50.0).abs() < 1e-6);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(results.dataset.ncols(), 3);

        let written = fs::read_to_string(dir.path().join("out.col")).unwrap();
        assert!(written.starts_with("time w\n"));
        assert_eq!(written.lines().count(), 451);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let mut ds = Dataset::from_columns(&[("t", vec![0.0, 1.0]), ("v", vec![0.0, 1.0])]).unwrap();
        let analysis = Analysis::Linreg {
            x: "t".into(),
            y: "nope".into(),
        };
        assert!(run_analysis(&mut ds, &analysis).is_err());
        let fit = run_analysis(&mut ds, &Analysis::Linreg { x: "t".into(), y: "v".into() }).unwrap();
        match fit {
            AnalysisValue::Fit(r) => assert!((r.coefficients[1] - 1.0).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
    }
}
