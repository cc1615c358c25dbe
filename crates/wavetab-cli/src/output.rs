//! Result formatting and table writing.

use crate::orchestrator::{AnalysisResult, AnalysisValue};
use crate::OutputFormat;
use anyhow::{Context, Result};
use lib_formats::{write_csv, write_csv_file, write_nutmeg_file, write_pwl_file, write_ssv_file, NutmegHeader};
use lib_types::Dataset;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Table file formats the CLI can write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WriteFormat {
    Ssv,
    Csv,
    Nutmeg,
    Pwl,
}

impl WriteFormat {
    /// Guess from the extension; space-separated otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Self::Csv,
            Some("raw") => Self::Nutmeg,
            Some("pwl") | Some("sp") => Self::Pwl,
            _ => Self::Ssv,
        }
    }
}

/// Write `ds` to `path`, optionally limited to `columns`.
///
/// For pwl the first column (of `columns`, or of the table) is the x axis
/// and every other column becomes a source.
pub fn write_dataset(ds: &Dataset, path: &Path, format: Option<WriteFormat>, columns: &[String]) -> Result<()> {
    let format = format.unwrap_or_else(|| WriteFormat::from_path(path));
    let ds = if columns.is_empty() {
        ds.dup()
    } else {
        if let Some(missing) = columns.iter().find(|c| !ds.contains(c)) {
            anyhow::bail!("Output column not found: {}", missing);
        }
        let picked = columns
            .iter()
            .map(|c| -> Result<(&str, Vec<f64>)> { Ok((c.as_str(), ds.get_vec(c.as_str())?)) })
            .collect::<Result<Vec<_>>>()?;
        let mut kept = Dataset::from_columns(&picked)?;
        kept.set_title(ds.title());
        kept
    };

    let written = match format {
        WriteFormat::Ssv => write_ssv_file(&ds, path),
        WriteFormat::Csv => write_csv_file(&ds, path, None),
        WriteFormat::Nutmeg => write_nutmeg_file(&ds, path, &NutmegHeader::for_dataset(&ds)),
        WriteFormat::Pwl => {
            let names = ds.column_names();
            let Some((x, ys)) = names.split_first() else {
                anyhow::bail!("Nothing to write to {:?}", path);
            };
            write_pwl_file(&ds, path, x, ys)
        }
    };
    written.with_context(|| format!("Failed to write {:?}", path))?;

    tracing::debug!("Wrote {:?} as {:?}", path, format);
    Ok(())
}

/// Print a whole table.
pub fn print_dataset<W: Write>(ds: &Dataset, format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Text => write!(out, "{}", ds)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&table_json(ds))?)?,
        OutputFormat::Csv => write_csv(ds, &mut out, None)?,
    }
    Ok(())
}

fn table_json(ds: &Dataset) -> serde_json::Value {
    let columns: serde_json::Map<String, serde_json::Value> = ds
        .column_names()
        .iter()
        .map(|name| {
            let values = ds.get_vec(name.as_str()).unwrap_or_default();
            (name.clone(), serde_json::json!(values))
        })
        .collect();
    serde_json::json!({
        "title": ds.title(),
        "nrows": ds.nrows(),
        "columns": columns,
    })
}

/// Shape and per-column range of a table.
pub fn print_info<W: Write>(ds: &Dataset, source: &Path, format: OutputFormat, mut out: W) -> Result<()> {
    let ranges: Vec<(String, f64, f64)> = ds
        .column_names()
        .iter()
        .map(|name| {
            let col = name.as_str();
            let lo = ds.min(col).unwrap_or(f64::NAN);
            let hi = ds.max(col).unwrap_or(f64::NAN);
            (name.clone(), lo, hi)
        })
        .collect();

    match format {
        OutputFormat::Text => {
            writeln!(out, "File:    {}", source.display())?;
            if !ds.title().is_empty() {
                writeln!(out, "Title:   {}", ds.title())?;
            }
            writeln!(out, "Rows:    {}", ds.nrows())?;
            writeln!(out, "Columns: {}", ds.ncols())?;
            let complex = ds.cx_vars();
            if !complex.is_empty() {
                writeln!(out, "Complex: {}", complex.join(" "))?;
            }
            for (name, lo, hi) in &ranges {
                writeln!(out, "  {:<24} {:>14.6e} {:>14.6e}", name, lo, hi)?;
            }
        }
        OutputFormat::Json => {
            let columns: Vec<serde_json::Value> = ranges
                .iter()
                .map(|(name, lo, hi)| serde_json::json!({ "name": name, "min": lo, "max": hi }))
                .collect();
            let info = serde_json::json!({
                "file": source.display().to_string(),
                "title": ds.title(),
                "nrows": ds.nrows(),
                "ncols": ds.ncols(),
                "complex": ds.cx_vars(),
                "columns": columns,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
        }
        OutputFormat::Csv => {
            writeln!(out, "column,min,max")?;
            for (name, lo, hi) in &ranges {
                writeln!(out, "{},{},{}", name, lo, hi)?;
            }
        }
    }
    Ok(())
}

/// Print analysis results.
pub fn print_results<W: Write>(results: &[AnalysisResult], format: OutputFormat, mut out: W) -> Result<()> {
    if let OutputFormat::Json = format {
        writeln!(out, "{}", serde_json::to_string_pretty(results)?)?;
        return Ok(());
    }
    for result in results {
        match format {
            OutputFormat::Text => print_text(result, &mut out)?,
            _ => print_csv(result, &mut out)?,
        }
    }
    Ok(())
}

/// Field name/value pairs of a serializable struct.
fn fields<T: Serialize>(value: &T) -> Result<Vec<(String, serde_json::Value)>> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        other => Ok(vec![("value".to_string(), other)]),
    }
}

fn print_text<W: Write>(result: &AnalysisResult, out: &mut W) -> Result<()> {
    writeln!(out, "=== {} ===", result.kind)?;
    match &result.value {
        AnalysisValue::Scalar(v) => writeln!(out, "{} = {:e}", result.kind, v)?,
        AnalysisValue::Values(vs) => {
            for v in vs {
                writeln!(out, "{:e}", v)?;
            }
        }
        AnalysisValue::Table(ds) => write!(out, "{}", ds)?,
        AnalysisValue::Fit(fit) => writeln!(out, "{}", fit.report)?,
        AnalysisValue::Series(series) => writeln!(out, "{}", series.report)?,
        AnalysisValue::Loop(lp) => {
            for (name, value) in fields(lp)? {
                writeln!(out, "{:<10} = {}", name, value)?;
            }
        }
        AnalysisValue::Jitter { report, .. } => writeln!(out, "{}", report)?,
    }
    writeln!(out)?;
    Ok(())
}

fn print_csv<W: Write>(result: &AnalysisResult, out: &mut W) -> Result<()> {
    let kind = result.kind;
    match &result.value {
        AnalysisValue::Scalar(v) => writeln!(out, "{},{}", kind, v)?,
        AnalysisValue::Values(vs) => {
            let row: Vec<String> = vs.iter().map(|v| v.to_string()).collect();
            writeln!(out, "{},{}", kind, row.join(","))?;
        }
        AnalysisValue::Table(ds) => write_csv(ds, &mut *out, None)?,
        AnalysisValue::Fit(fit) => {
            let row: Vec<String> = fit.coefficients.iter().map(|v| v.to_string()).collect();
            writeln!(out, "{},{}", kind, row.join(","))?;
        }
        AnalysisValue::Series(series) => {
            let row: Vec<String> = series.coefficients.iter().map(|v| v.to_string()).collect();
            writeln!(out, "{},{}", kind, row.join(","))?;
        }
        AnalysisValue::Loop(lp) => {
            for (name, value) in fields(lp)? {
                writeln!(out, "{},{}", name, value)?;
            }
        }
        AnalysisValue::Jitter { metrics, table, .. } => {
            for (name, value) in fields(metrics)? {
                writeln!(out, "{},{}", name, value)?;
            }
            write_csv(table, &mut *out, None)?;
        }
    }
    Ok(())
}
