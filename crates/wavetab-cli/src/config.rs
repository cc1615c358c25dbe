//! Job file loading and validation.

use crate::output::WriteFormat;
use anyhow::{Context, Result};
use lib_dsp::{CrossingPair, Edge, JitterOptions, Window};
use lib_formats::DataFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level batch job.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobConfig {
    /// Data file to read. Relative paths are taken from the job file's
    /// directory.
    pub input: PathBuf,

    /// Input format; detected from the file head when absent.
    #[serde(default)]
    pub format: Option<DataFormat>,

    /// Block (plot, header section) of multi-block files.
    #[serde(default)]
    pub block: usize,

    /// Scalars substituted for `$name` in equations.
    #[serde(default)]
    pub variables: BTreeMap<String, f64>,

    /// Real equations, evaluated in order.
    #[serde(default)]
    pub equations: Vec<String>,

    /// Complex equations, evaluated after the real ones.
    #[serde(default)]
    pub complex_equations: Vec<String>,

    /// Row condition such as `time > 1e-9`.
    #[serde(default)]
    pub filter: Option<String>,

    /// Sort keys, last one primary.
    #[serde(default)]
    pub sort: Vec<String>,

    #[serde(default)]
    pub analyses: Vec<Analysis>,

    /// Where to write the processed table.
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

/// One analysis of the processed table.
///
/// ```toml
/// [[analyses]]
/// kind = "periods"
/// x = "time"
/// y = "v(out)"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    Periods {
        x: String,
        y: String,
        #[serde(default)]
        level: Option<f64>,
    },
    Edges {
        x: String,
        y: String,
        #[serde(default)]
        vlow: Option<f64>,
        #[serde(default)]
        vhigh: Option<f64>,
    },
    Jitter {
        time: String,
        signal: String,
        #[serde(default)]
        options: JitterOptions,
    },
    Fft {
        x: String,
        y: String,
        /// Complex variable holding the spectrum.
        #[serde(default = "default_spectrum")]
        name: String,
        #[serde(default)]
        window: Window,
    },
    /// Loop-gain figures of a complex response.
    Lowpass {
        freq: String,
        signal: String,
        #[serde(default)]
        dcph: Option<f64>,
    },
    Linreg {
        x: String,
        y: String,
    },
    Quadreg {
        x: String,
        y: String,
    },
    Fourier {
        x: String,
        y: String,
        #[serde(default = "default_harmonics")]
        harmonics: usize,
    },
    Rms {
        time: String,
        col: String,
    },
    TimeAverage {
        time: String,
        col: String,
    },
    MeasureFreq {
        x: String,
        y: String,
        #[serde(default)]
        level: Option<f64>,
        #[serde(default)]
        edge: Edge,
    },
    MeasureDuty {
        x: String,
        y: String,
        #[serde(default)]
        level: Option<f64>,
    },
    Delays {
        time: String,
        sig1: String,
        sig2: String,
        #[serde(default)]
        crossing: CrossingPair,
    },
    Skews {
        time: String,
        sig1: String,
        sig2: String,
        #[serde(default)]
        crossing: CrossingPair,
    },
}

fn default_spectrum() -> String {
    "spectrum".to_string()
}

fn default_harmonics() -> usize {
    5
}

impl Analysis {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Periods { .. } => "periods",
            Self::Edges { .. } => "edges",
            Self::Jitter { .. } => "jitter",
            Self::Fft { .. } => "fft",
            Self::Lowpass { .. } => "lowpass",
            Self::Linreg { .. } => "linreg",
            Self::Quadreg { .. } => "quadreg",
            Self::Fourier { .. } => "fourier",
            Self::Rms { .. } => "rms",
            Self::TimeAverage { .. } => "time_average",
            Self::MeasureFreq { .. } => "measure_freq",
            Self::MeasureDuty { .. } => "measure_duty",
            Self::Delays { .. } => "delays",
            Self::Skews { .. } => "skews",
        }
    }
}

/// Output table configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,

    /// Inferred from the path extension when absent.
    #[serde(default)]
    pub format: Option<WriteFormat>,

    /// Columns to keep, in order; all when empty. For pwl the first is the
    /// x column.
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Load a job from a file.
pub fn load_config(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file: {:?}", path))?;

    let mut config: JobConfig = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&content)
            .with_context(|| "Failed to parse job file as JSON")?
    } else {
        toml::from_str(&content)
            .with_context(|| "Failed to parse job file as TOML")?
    };

    if let Some(dir) = path.parent() {
        config.resolve_paths(dir);
    }
    validate_config(&config)?;

    Ok(config)
}

impl JobConfig {
    fn resolve_paths(&mut self, dir: &Path) {
        if self.input.is_relative() {
            self.input = dir.join(&self.input);
        }
        if let Some(out) = self.output.as_mut() {
            if out.path.is_relative() {
                out.path = dir.join(&out.path);
            }
        }
    }
}

/// Validate a job before anything is read.
///
/// Column names are only checked when the analyses run.
pub fn validate_config(config: &JobConfig) -> Result<()> {
    if !config.input.exists() {
        anyhow::bail!("Input file not found: {:?}", config.input);
    }

    for analysis in &config.analyses {
        match analysis {
            Analysis::Fourier { harmonics: 0, .. } => {
                anyhow::bail!("fourier analysis needs at least one harmonic");
            }
            Analysis::Jitter { options, .. } if !options.clock && options.freq.is_none() => {
                anyhow::bail!("jitter of a data signal needs options.freq");
            }
            _ => {}
        }
    }

    if let Some(out) = &config.output {
        let format = out.format.unwrap_or_else(|| WriteFormat::from_path(&out.path));
        if format == WriteFormat::Pwl && out.columns.len() == 1 {
            anyhow::bail!("pwl output needs an x column and at least one y column");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn job_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wave.col"), "t v\n0 0\n1 1\n").unwrap();
        dir
    }

    #[test]
    fn test_load_toml_job() {
        let dir = job_dir();
        let path = dir.path().join("job.toml");
        fs::write(
            &path,
            r#"
input = "wave.col"
equations = ["w = v * 2"]
sort = ["t"]

[variables]
gain = 2.0

[[analyses]]
kind = "periods"
x = "t"
y = "v"
level = 0.5

[[analyses]]
kind = "delays"
time = "t"
sig1 = "v"
sig2 = "w"
crossing = { level = 0.5, edge2 = "falling" }

[[analyses]]
kind = "fft"
x = "t"
y = "v"

[output]
path = "out.csv"
columns = ["t", "w"]
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.input, dir.path().join("wave.col"));
        assert_eq!(config.block, 0);
        assert_eq!(config.variables["gain"], 2.0);
        assert_eq!(config.analyses.len(), 3);
        assert_eq!(
            config.analyses[0],
            Analysis::Periods { x: "t".into(), y: "v".into(), level: Some(0.5) }
        );
        match &config.analyses[1] {
            Analysis::Delays { crossing, .. } => {
                assert_eq!(crossing.level, 0.5);
                assert_eq!(crossing.edge, Edge::Rising);
                assert_eq!(crossing.edge2, Some(Edge::Falling));
            }
            other => panic!("unexpected {:?}", other),
        }
        match &config.analyses[2] {
            Analysis::Fft { name, window, .. } => {
                assert_eq!(name, "spectrum");
                assert_eq!(*window, Window::Hamming);
            }
            other => panic!("unexpected {:?}", other),
        }
        let out = config.output.unwrap();
        assert_eq!(out.path, dir.path().join("out.csv"));
        assert_eq!(out.format, None);
    }

    #[test]
    fn test_load_json_job() {
        let dir = job_dir();
        let path = dir.path().join("job.json");
        fs::write(
            &path,
            r#"{"input": "wave.col", "format": "ssv",
                "analyses": [{"kind": "measure_freq", "x": "t", "y": "v", "edge": "both"}]}"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.format, Some(DataFormat::Ssv));
        assert_eq!(config.analyses[0].kind(), "measure_freq");
    }

    #[test]
    fn test_validation_failures() {
        let dir = job_dir();
        let path = dir.path().join("job.toml");

        fs::write(&path, "input = \"missing.col\"\n").unwrap();
        assert!(load_config(&path).is_err());

        fs::write(
            &path,
            "input = \"wave.col\"\n[[analyses]]\nkind = \"jitter\"\ntime = \"t\"\nsignal = \"v\"\noptions = { clock = false }\n",
        )
        .unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("freq"));

        fs::write(&path, "input = \"wave.col\"\n[[analyses]]\nkind = \"bogus\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
