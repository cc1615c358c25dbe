//! SPICE rawfile ("nutmeg") reader.
//!
//! A rawfile is a sequence of plots. Each plot has `keyword: value` header
//! lines, a `Variables:` list and a `Values:` (ASCII) or `Binary:` payload.
//!
//! Supported dialects, chosen from header text:
//! - generic: ASCII one value per line, binary little-endian `f64`
//! - Spectre (`Title` mentions spectre): ASCII values grouped per point,
//!   binary big-endian `f64`, `No. Points: 0` means "read to end of file"
//! - LTspice (`Command` mentions LTspice): binary `f64` time then `f32` values
//! - SmartSpice (`Source` mentions SmartSpice): variable list may start on
//!   the `Variables:` line

use crate::cursor::{f32_le, f64_be, f64_le, ByteCursor};
use crate::error::{ReadError, ReadResult};
use crate::table::{assemble, number};
use lib_types::{ComplexPart, Dataset};
use std::path::Path;

const FORMAT: &str = "nutmeg";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dialect {
    Generic,
    Spectre,
    LtSpice,
    SmartSpice,
}

/// Header state of the plot being read.
#[derive(Debug)]
struct Plot {
    title: String,
    dialect: Dialect,
    real: bool,
    nvars: usize,
    npts: usize,
    names: Vec<String>,
    cxvars: Vec<String>,
}

impl Plot {
    fn new() -> Self {
        Self {
            title: String::new(),
            dialect: Dialect::Generic,
            real: true,
            nvars: 0,
            npts: 0,
            names: Vec::new(),
            cxvars: Vec::new(),
        }
    }
}

fn count(field: &str, value: &str) -> ReadResult<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ReadError::invalid_value(field, format!("not a count: {:?}", value)))
}

fn next_line<'a>(cur: &mut ByteCursor<'a>, what: &str) -> ReadResult<std::borrow::Cow<'a, str>> {
    cur.read_line()
        .ok_or_else(|| ReadError::truncated(FORMAT, format!("while reading {}", what)))
}

fn parse_variables(cur: &mut ByteCursor<'_>, plot: &mut Plot, first: &str) -> ReadResult<()> {
    for ivar in 0..plot.nvars {
        let owned;
        let line: &str = if ivar == 0 && !first.trim().is_empty() {
            first
        } else {
            owned = next_line(cur, "variables")?;
            &owned
        };
        let tok: Vec<&str> = line.split_whitespace().collect();
        if tok.len() < 3 {
            return Err(ReadError::invalid_format(
                FORMAT,
                format!("problem in variable specification: {:?}", line),
            ));
        }
        let name = tok[1];
        if plot.real {
            plot.names.push(name.to_string());
        } else {
            plot.cxvars.push(name.to_string());
            plot.names.push(ComplexPart::Real.column(name));
            plot.names.push(ComplexPart::Imag.column(name));
        }
    }
    Ok(())
}

fn ascii_real(cur: &mut ByteCursor<'_>, plot: &Plot) -> ReadResult<Vec<f64>> {
    let nvalues = plot.npts * plot.nvars;
    let mut a = Vec::with_capacity(nvalues);
    if plot.dialect == Dialect::Spectre {
        while a.len() < nvalues {
            let mut j = 0;
            while j < plot.nvars {
                let line = next_line(cur, "values")?;
                let mut tok = line.split_whitespace();
                if j == 0 && tok.next().is_none() {
                    continue;
                }
                for item in tok {
                    a.push(number(FORMAT, item)?);
                    j += 1;
                }
            }
        }
        a.truncate(nvalues);
    } else {
        while a.len() < nvalues {
            let line = next_line(cur, "values")?;
            let tok: Vec<&str> = line.split_whitespace().collect();
            if tok.len() == 1 || tok.len() == 2 {
                a.push(number(FORMAT, tok[tok.len() - 1])?);
            }
        }
    }
    Ok(a)
}

fn ascii_complex(cur: &mut ByteCursor<'_>, plot: &Plot) -> ReadResult<Vec<f64>> {
    let nvalues = 2 * plot.npts * plot.nvars;
    let mut a = Vec::with_capacity(nvalues);
    while a.len() < nvalues {
        let line = next_line(cur, "values")?;
        let tok: Vec<&str> = line.split_whitespace().collect();
        if tok.len() == 1 || tok.len() == 2 {
            let (re, im) = tok[tok.len() - 1].split_once(',').ok_or_else(|| {
                ReadError::invalid_format(FORMAT, format!("expected re,im: {:?}", line))
            })?;
            a.push(number(FORMAT, re)?);
            a.push(number(FORMAT, im)?);
        }
    }
    Ok(a)
}

fn binary_f64(cur: &mut ByteCursor<'_>, nvalues: usize, big_endian: bool) -> ReadResult<Vec<f64>> {
    let bytes = cur
        .take(nvalues * 8)
        .ok_or_else(|| ReadError::truncated(FORMAT, format!("expected {} binary values", nvalues)))?;
    Ok(bytes
        .chunks_exact(8)
        .map(|b| if big_endian { f64_be(b) } else { f64_le(b) })
        .collect())
}

fn binary_real(cur: &mut ByteCursor<'_>, plot: &mut Plot) -> ReadResult<Vec<f64>> {
    match plot.dialect {
        Dialect::LtSpice => {
            let mut a = Vec::with_capacity(plot.npts * plot.nvars);
            let short = || ReadError::truncated(FORMAT, "LTspice binary point");
            for _ in 0..plot.npts {
                let time = cur.take(8).ok_or_else(short)?;
                // compressed files may store negative times
                a.push(f64_le(time).abs());
                let sigs = cur
                    .take(plot.nvars.saturating_sub(1) * 4)
                    .ok_or_else(short)?;
                a.extend(sigs.chunks_exact(4).map(|b| f64::from(f32_le(b))));
            }
            Ok(a)
        }
        Dialect::Spectre if plot.npts == 0 => {
            tracing::warn!("partial file: ignoring number of points = 0 specification");
            let rest = cur.rest();
            if plot.nvars == 0 {
                return Ok(Vec::new());
            }
            plot.npts = rest.len() / 8 / plot.nvars;
            let n = plot.npts * plot.nvars;
            Ok(rest[..n * 8].chunks_exact(8).map(f64_be).collect())
        }
        Dialect::Spectre => binary_f64(cur, plot.npts * plot.nvars, true),
        _ => binary_f64(cur, plot.npts * plot.nvars, false),
    }
}

/// Read plot number `block` from rawfile bytes.
pub fn read_nutmeg(bytes: &[u8], block: usize) -> ReadResult<Dataset> {
    let mut cur = ByteCursor::new(bytes);
    let mut plot = Plot::new();
    let mut iblock: Option<usize> = None;

    while let Some(line) = cur.read_line() {
        let (keyword, value) = match line.split_once(':') {
            Some((k, v)) => (k.trim().to_ascii_lowercase(), v.trim().to_string()),
            None => (line.trim().to_ascii_lowercase(), String::new()),
        };
        match keyword.as_str() {
            "" => {}
            "title" => {
                if value.contains("spectre") {
                    plot.dialect = Dialect::Spectre;
                }
                plot.title = value;
            }
            "plotname" => {
                iblock = Some(iblock.map_or(0, |b| b + 1));
                plot.names.clear();
                plot.cxvars.clear();
            }
            "flags" => {
                for flag in value.split_whitespace().map(str::to_ascii_lowercase) {
                    match flag.as_str() {
                        "real" => plot.real = true,
                        "complex" => plot.real = false,
                        "padded" | "unpadded" | "forward" | "log" => {}
                        other => tracing::warn!("unknown flag: {:?}", other),
                    }
                }
            }
            "no. variables" => plot.nvars = count("No. Variables", &value)?,
            "no. points" => plot.npts = count("No. Points", &value)?,
            "command" => {
                if value.contains("LTspice") {
                    plot.dialect = Dialect::LtSpice;
                }
            }
            "source" => {
                if value.contains("SmartSpice") {
                    plot.dialect = Dialect::SmartSpice;
                }
            }
            "date" | "plottype" | "dimensions" | "option" | "offset" | "backannotation"
            | "input deck file name" | "temperature" | "sweepvar" | "sweepmode" | "version" => {}
            "variables" => parse_variables(&mut cur, &mut plot, &value)?,
            "values" | "binary" => {
                let binary = keyword == "binary";
                let big_endian = plot.dialect == Dialect::Spectre;
                let a = match (plot.real, binary) {
                    (true, false) => ascii_real(&mut cur, &plot)?,
                    (true, true) => binary_real(&mut cur, &mut plot)?,
                    (false, false) => ascii_complex(&mut cur, &plot)?,
                    (false, true) => binary_f64(&mut cur, 2 * plot.npts * plot.nvars, big_endian)?,
                };
                if iblock == Some(block) {
                    tracing::debug!("nutmeg: {:?} dialect, block {}", plot.dialect, block);
                    return finish(plot, a);
                }
            }
            _ => tracing::warn!("unrecognized line in rawfile: {:?}", line),
        }
    }
    Err(ReadError::block_not_found(FORMAT, block))
}

fn finish(plot: Plot, values: Vec<f64>) -> ReadResult<Dataset> {
    let mut ds = assemble(FORMAT, plot.names, values)?;
    ds.set_title(plot.title);
    for var in &plot.cxvars {
        if matches!(var.as_str(), "frequency" | "freq" | "time") {
            ds.rename(ComplexPart::Real.column(var).as_str(), var)?;
            ds.delete([ComplexPart::Imag.column(var)]);
        } else {
            ds.cxmag(var)?;
        }
    }
    Ok(ds)
}

pub fn read_nutmeg_file(path: &Path, block: usize) -> ReadResult<Dataset> {
    let bytes = std::fs::read(path)?;
    read_nutmeg(&bytes, block)
}

/// Indices of the plots in a rawfile.
pub fn nutmeg_blocks(bytes: &[u8]) -> Vec<usize> {
    let mut cur = ByteCursor::new(bytes);
    let mut n = 0;
    while let Some(line) = cur.read_line() {
        if line.starts_with("Variables") {
            n += 1;
        }
    }
    (0..n).collect()
}

pub fn nutmeg_blocks_file(path: &Path) -> ReadResult<Vec<usize>> {
    Ok(nutmeg_blocks(&std::fs::read(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASCII_RAW: &str = "\
Title: rc step
Date: today
Plotname: Transient Analysis
Flags: real
No. Variables: 2
No. Points: 3
Variables:
\t0\ttime\ttime
\t1\tv(out)\tvoltage
Values:
 0\t0.0
\t0.0
 1\t1e-9
\t0.5
 2\t2e-9
\t0.75
";

    #[test]
    fn test_ascii_real() {
        let d = read_nutmeg(ASCII_RAW.as_bytes(), 0).unwrap();
        assert_eq!(d.title(), "rc step");
        assert_eq!(d.names(), vec!["time", "v(out)"]);
        assert_eq!(d.get_vec("v(out)").unwrap(), vec![0.0, 0.5, 0.75]);
        assert!((d.get_entry(-1, "time").unwrap() - 2e-9).abs() < 1e-24);
    }

    #[test]
    fn test_second_plot_and_blocks() {
        let two = format!("{}{}", ASCII_RAW, ASCII_RAW.replace("0.75", "0.9"));
        assert_eq!(nutmeg_blocks(two.as_bytes()), vec![0, 1]);
        let d = read_nutmeg(two.as_bytes(), 1).unwrap();
        assert_eq!(d.get_entry(-1, "v(out)").unwrap(), 0.9);
        assert!(matches!(
            read_nutmeg(two.as_bytes(), 2),
            Err(ReadError::BlockNotFound { .. })
        ));
    }

    #[test]
    fn test_ascii_complex_keeps_real_frequency() {
        let raw = "\
Title: ac
Plotname: AC Analysis
Flags: complex
No. Variables: 2
No. Points: 2
Variables:
\t0\tfrequency\tfrequency
\t1\tv(out)\tvoltage
Values:
 0\t1.0,0.0
\t1.0,0.0
 1\t10.0,0.0
\t0.0,1.0
";
        let d = read_nutmeg(raw.as_bytes(), 0).unwrap();
        assert_eq!(
            d.names(),
            vec!["frequency", "REAL(v(out))", "IMAG(v(out))", "MAG(v(out))", "DB(v(out))", "PH(v(out))"]
        );
        assert_eq!(d.get_vec("frequency").unwrap(), vec![1.0, 10.0]);
        assert!((d.get_entry(1, "PH(v(out))").unwrap() - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_generic_binary() {
        let mut raw = b"Title: bin\nPlotname: Transient\nFlags: real\nNo. Variables: 2\nNo. Points: 2\nVariables:\n 0 time time\n 1 v voltage\nBinary:\n".to_vec();
        for v in [0.0f64, 1.0, 1e-9, 2.0] {
            raw.extend_from_slice(&v.to_le_bytes());
        }
        let d = read_nutmeg(&raw, 0).unwrap();
        assert_eq!(d.get_vec("v").unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_ltspice_mixed_binary() {
        let mut raw = b"Title: lt\nCommand: Linear Technology Corporation LTspice IV\nPlotname: Transient\nFlags: real forward\nNo. Variables: 2\nNo. Points: 2\nVariables:\n 0 time time\n 1 V(n1) voltage\nBinary:\n".to_vec();
        for (t, v) in [(0.0f64, 0.5f32), (-1e-6, 0.25)] {
            raw.extend_from_slice(&t.to_le_bytes());
            raw.extend_from_slice(&v.to_le_bytes());
        }
        let d = read_nutmeg(&raw, 0).unwrap();
        assert_eq!(d.get_vec("time").unwrap(), vec![0.0, 1e-6]);
        assert_eq!(d.get_vec("V(n1)").unwrap(), vec![0.5, 0.25]);
    }

    #[test]
    fn test_truncated_values_are_reported() {
        let cut = &ASCII_RAW[..ASCII_RAW.len() - 10];
        assert!(matches!(
            read_nutmeg(cut.as_bytes(), 0),
            Err(ReadError::Truncated { .. })
        ));
    }
}
