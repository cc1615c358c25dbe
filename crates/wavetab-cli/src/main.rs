//! wavetab CLI: inspect, convert, evaluate and analyze waveform data files.
//!
//! This is the main entry point for the wavetab tool.

mod config;
mod orchestrator;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::Analysis;
use lib_dsp::{Edge, JitterOptions, Window};
use lib_expr::{Evaluator, ScalarScope};
use lib_formats::{datafile_format, nutmeg_blocks_file, read_file, DataFormat};
use lib_types::Dataset;
use output::WriteFormat;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "wavetab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Data file selection shared by every command that reads one.
#[derive(Args, Debug)]
struct Source {
    /// Data file
    file: PathBuf,

    /// Block (plot, header section) of multi-block files
    #[arg(short, long, default_value_t = 0)]
    block: usize,

    /// Input format; detected from the file head when omitted
    #[arg(long = "input-format")]
    input_format: Option<DataFormat>,
}

impl Source {
    fn read(&self) -> Result<Dataset> {
        tracing::info!("Reading {:?}", self.file);
        let ds = read_file(&self.file, self.block, self.input_format)
            .with_context(|| format!("Failed to read {:?}", self.file))?;
        tracing::debug!("{} rows x {} columns", ds.nrows(), ds.ncols());
        Ok(ds)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the shape and column ranges of a data file
    Info {
        #[command(flatten)]
        source: Source,
    },

    /// Rewrite a data file in another format
    Convert {
        #[command(flatten)]
        source: Source,

        /// Output path
        output: PathBuf,

        /// Output format; inferred from the output extension when omitted
        #[arg(long)]
        to: Option<WriteFormat>,

        /// Columns to keep, comma separated
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },

    /// Evaluate equations and print or write the result
    Eval {
        #[command(flatten)]
        source: Source,

        /// Equations such as `p = v * i`
        #[arg(required = true)]
        equations: Vec<String>,

        /// Evaluate as complex equations
        #[arg(long)]
        complex: bool,

        /// Scalar binding `name=value`, referenced as `$name`
        #[arg(long = "set", value_parser = parse_binding)]
        bindings: Vec<(String, f64)>,

        /// Write the table here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Period, frequency and duty cycle of every cycle
    Periods {
        #[command(flatten)]
        source: Source,
        x: String,
        y: String,
        #[arg(long)]
        level: Option<f64>,
    },

    /// Rise and fall times of every edge
    Edges {
        #[command(flatten)]
        source: Source,
        x: String,
        y: String,
        #[arg(long)]
        vlow: Option<f64>,
        #[arg(long)]
        vhigh: Option<f64>,
    },

    /// Jitter against an ideal clock
    Jitter {
        #[command(flatten)]
        source: Source,
        time: String,
        signal: String,

        /// Reference frequency; required with --data
        #[arg(long)]
        freq: Option<f64>,
        #[arg(long)]
        level: Option<f64>,

        /// Treat the signal as data rather than a clock
        #[arg(long)]
        data: bool,
        #[arg(long, default_value = "rising")]
        edge: Edge,
        #[arg(long)]
        tmin: Option<f64>,
        #[arg(long)]
        tmax: Option<f64>,
    },

    /// Windowed spectrum of a column
    Fft {
        #[command(flatten)]
        source: Source,
        x: String,
        y: String,
        #[arg(long, default_value = "hamming")]
        window: Window,

        /// Complex variable name of the spectrum
        #[arg(long, default_value = "spectrum")]
        name: String,

        /// Write the spectrum here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Loop-gain figures of a complex frequency response
    Lowpass {
        #[command(flatten)]
        source: Source,
        freq: String,
        signal: String,

        /// Assumed dc phase in degrees
        #[arg(long)]
        dcph: Option<f64>,
    },

    /// Run a batch job file
    Run {
        /// Path to the job file (TOML, or JSON with a .json extension)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn parse_binding(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {:?}", s))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("bad value for {}: {}", name, e))?;
    Ok((name.trim().to_string(), value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let format = cli.format;
    match cli.command {
        Commands::Info { source } => info(&source, format)?,
        Commands::Convert { source, output, to, columns } => {
            let ds = source.read()?;
            output::write_dataset(&ds, &output, to, &columns)?;
            tracing::info!("Wrote {:?}", output);
        }
        Commands::Eval { source, equations, complex, bindings, output } => {
            eval(&source, &equations, complex, bindings, output.as_deref(), format)?;
        }
        Commands::Periods { source, x, y, level } => {
            analyze(&source, Analysis::Periods { x, y, level }, format)?;
        }
        Commands::Edges { source, x, y, vlow, vhigh } => {
            analyze(&source, Analysis::Edges { x, y, vlow, vhigh }, format)?;
        }
        Commands::Jitter { source, time, signal, freq, level, data, edge, tmin, tmax } => {
            let options = JitterOptions {
                tmin,
                tmax,
                freq,
                level,
                clock: !data,
                edge,
                ..Default::default()
            };
            if data && freq.is_none() {
                anyhow::bail!("--data needs --freq");
            }
            analyze(&source, Analysis::Jitter { time, signal, options }, format)?;
        }
        Commands::Fft { source, x, y, window, name, output } => match output {
            Some(path) => {
                let ds = source.read()?;
                let spectrum = lib_dsp::fft(&ds, &name, &y, &x, window)?;
                output::write_dataset(&spectrum, &path, None, &[])?;
                tracing::info!("Wrote {} frequency points to {:?}", spectrum.nrows(), path);
            }
            None => analyze(&source, Analysis::Fft { x, y, name, window }, format)?,
        },
        Commands::Lowpass { source, freq, signal, dcph } => {
            analyze(&source, Analysis::Lowpass { freq, signal, dcph }, format)?;
        }
        Commands::Run { config } => run_job(&config, format)?,
    }

    Ok(())
}

fn info(source: &Source, format: OutputFormat) -> Result<()> {
    let ds = source.read()?;
    output::print_info(&ds, &source.file, format, std::io::stdout().lock())?;

    let detected = match source.input_format {
        Some(f) => Some(f),
        None => datafile_format(&source.file)?,
    };
    if let (Some(DataFormat::Nutmeg), OutputFormat::Text) = (detected, format) {
        let blocks = nutmeg_blocks_file(&source.file)?;
        let list: Vec<String> = blocks.iter().map(|b| b.to_string()).collect();
        println!("Blocks:  {}", list.join(" "));
    }
    Ok(())
}

fn eval(
    source: &Source,
    equations: &[String],
    complex: bool,
    bindings: Vec<(String, f64)>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let mut ds = source.read()?;
    let evaluator = Evaluator::new().with_interpolator(bindings.into_iter().collect::<ScalarScope>());
    for eqn in equations {
        let evaluated = if complex {
            evaluator.cxset(&mut ds, eqn)
        } else {
            evaluator.set(&mut ds, eqn)
        };
        evaluated.with_context(|| format!("Equation failed: {}", eqn))?;
    }
    match output {
        Some(path) => output::write_dataset(&ds, path, None, &[])?,
        None => output::print_dataset(&ds, format, std::io::stdout().lock())?,
    }
    Ok(())
}

fn analyze(source: &Source, analysis: Analysis, format: OutputFormat) -> Result<()> {
    let mut ds = source.read()?;
    let value = orchestrator::run_analysis(&mut ds, &analysis)
        .with_context(|| format!("{} analysis failed", analysis.kind()))?;
    let results = [orchestrator::AnalysisResult {
        kind: analysis.kind(),
        value,
    }];
    output::print_results(&results, format, std::io::stdout().lock())
}

fn run_job(config_path: &Path, format: OutputFormat) -> Result<()> {
    tracing::info!("Loading job from {:?}", config_path);

    let config = config::load_config(config_path)?;
    let results = orchestrator::Orchestrator::new(config).run()?;

    output::print_results(&results.analyses, format, std::io::stdout().lock())?;

    tracing::info!(
        "Job complete: {} analyses over {} rows",
        results.analyses.len(),
        results.dataset.nrows()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["wavetab", "-vv", "--format", "json", "periods", "wave.raw", "time", "v(out)", "--block", "2"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Periods { source, x, y, level } => {
                assert_eq!(source.file, PathBuf::from("wave.raw"));
                assert_eq!(source.block, 2);
                assert_eq!((x.as_str(), y.as_str(), level), ("time", "v(out)", None));
            }
            _ => panic!("wrong command"),
        }

        let cli = Cli::try_parse_from([
            "wavetab", "eval", "a.col", "p = v * i", "--set", "k=2.5", "--input-format", "ssv",
        ])
        .unwrap();
        match cli.command {
            Commands::Eval { source, equations, bindings, complex, .. } => {
                assert_eq!(source.input_format, Some(DataFormat::Ssv));
                assert_eq!(equations, vec!["p = v * i"]);
                assert_eq!(bindings, vec![("k".to_string(), 2.5)]);
                assert!(!complex);
            }
            _ => panic!("wrong command"),
        }

        assert!(Cli::try_parse_from(["wavetab", "convert", "a.col", "b.xyz", "--to", "hdf5"]).is_err());
    }

    #[test]
    fn test_parse_binding() {
        assert_eq!(parse_binding("vdd = 1.8").unwrap(), ("vdd".to_string(), 1.8));
        assert!(parse_binding("vdd").is_err());
        assert!(parse_binding("vdd=high").is_err());
    }
}
