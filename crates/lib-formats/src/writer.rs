//! Dataset writers.
//!
//! Every writer takes any [`std::io::Write`]; the `*_file` variants create
//! the file and buffer it.

use crate::error::{ReadError, ReadResult};
use lib_types::Dataset;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn create(path: &Path) -> ReadResult<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

fn join_row(ds: &Dataset, row: usize, sep: &str, limit: usize) -> String {
    ds.matrix()
        .row(row)
        .iter()
        .take(limit)
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Header line of names, then one space-separated row per point.
pub fn write_ssv<W: Write>(ds: &Dataset, mut out: W) -> ReadResult<()> {
    writeln!(out, "{}", ds.column_names().join(" "))?;
    for row in 0..ds.nrows() {
        writeln!(out, "{}", join_row(ds, row, " ", usize::MAX))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_ssv_file(ds: &Dataset, path: &Path) -> ReadResult<()> {
    write_ssv(ds, create(path)?)
}

/// Comma-separated values.
///
/// With `column_limit`, only the first `column_limit` columns are written
/// and names are made spreadsheet-friendly (`v(out)` becomes `v_out`).
pub fn write_csv<W: Write>(ds: &Dataset, mut out: W, column_limit: Option<usize>) -> ReadResult<()> {
    let header: Vec<String> = match column_limit {
        Some(limit) => ds
            .column_names()
            .iter()
            .take(limit)
            .map(|n| n.replace('(', "_").replace(')', ""))
            .collect(),
        None => ds.column_names().to_vec(),
    };
    writeln!(out, "{}", header.join(","))?;
    let limit = column_limit.unwrap_or(usize::MAX);
    for row in 0..ds.nrows() {
        writeln!(out, "{}", join_row(ds, row, ",", limit))?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_csv_file(ds: &Dataset, path: &Path, column_limit: Option<usize>) -> ReadResult<()> {
    write_csv(ds, create(path)?, column_limit)
}

/// Header fields for [`write_nutmeg`].
#[derive(Clone, Debug)]
pub struct NutmegHeader {
    pub title: String,
    pub plotname: String,
    /// Put the first variable on the `Variables:` line.
    pub first_vars: bool,
}

impl Default for NutmegHeader {
    fn default() -> Self {
        Self {
            title: "nutmeg data".to_string(),
            plotname: "wavetab data".to_string(),
            first_vars: false,
        }
    }
}

impl NutmegHeader {
    /// Defaults, with the dataset title when it has one.
    pub fn for_dataset(ds: &Dataset) -> Self {
        let mut header = Self::default();
        if !ds.title().is_empty() {
            header.title = ds.title().to_string();
        }
        header
    }
}

fn variable_type(name: &str) -> &'static str {
    match name.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('V') => "voltage",
        Some('I') => "current",
        _ => "other",
    }
}

/// Real ASCII rawfile with a single plot.
pub fn write_nutmeg<W: Write>(ds: &Dataset, mut out: W, header: &NutmegHeader) -> ReadResult<()> {
    let date = chrono::Local::now().format("%a %b %e %H:%M:%S %Y");
    writeln!(out, "Title: {}", header.title)?;
    writeln!(out, "Input deck file name: <NULL> ")?;
    writeln!(out, "Date: {}", date)?;
    writeln!(out, "Title: {}", header.title)?;
    writeln!(out, "Plotname: {}", header.plotname)?;
    writeln!(out, "Temperature: <NULL>")?;
    writeln!(out, "Sweepvar: <NULL>")?;
    writeln!(out, "Sweepmode: -1")?;
    writeln!(out, "Flags: real padded")?;
    writeln!(out, "No. Variables: {}", ds.ncols())?;
    writeln!(out, "No. Points: {}", ds.nrows())?;
    writeln!(out, "Source: wavetab")?;
    writeln!(out, "Version: {}", env!("CARGO_PKG_VERSION"))?;
    for (ivar, name) in ds.column_names().iter().enumerate() {
        if ivar == 0 {
            if header.first_vars {
                write!(out, "Variables:")?;
            } else {
                writeln!(out, "Variables:")?;
            }
        }
        writeln!(out, "\t{}\t{}\t{}", ivar, name, variable_type(name))?;
    }
    writeln!(out, "Values:")?;
    let m = ds.matrix();
    for (i, row) in m.rows().into_iter().enumerate() {
        let mut values = row.iter();
        if let Some(x) = values.next() {
            writeln!(out, "{}\t{}", i, x)?;
        }
        for v in values {
            writeln!(out, "\t{}", v)?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn write_nutmeg_file(ds: &Dataset, path: &Path, header: &NutmegHeader) -> ReadResult<()> {
    write_nutmeg(ds, create(path)?, header)
}

/// SPICE source name for a column: `v(a.b)` becomes `v_a_b`.
fn source_name(col: &str) -> String {
    col.replace(|c: char| c == '.' || c == '(', "_").replace(')', "")
}

/// One `name name 0 PWL(...)` source per y column, against `xcol`.
pub fn write_pwl<W, S>(ds: &Dataset, mut out: W, xcol: &str, ycols: &[S]) -> ReadResult<()>
where
    W: Write,
    S: AsRef<str>,
{
    let x = ds.get(xcol)?;
    if ycols.is_empty() {
        return Err(ReadError::invalid_value("pwl", "no y columns given"));
    }
    for ycol in ycols {
        let ycol = ycol.as_ref();
        let y = ds.get(ycol)?;
        let name = source_name(ycol);
        writeln!(out, "{} {} 0 PWL(", name, name)?;
        let last = ds.nrows().saturating_sub(1);
        for (i, (xv, yv)) in x.iter().zip(y.iter()).enumerate() {
            let sep = if i < last { "," } else { "" };
            writeln!(out, "+ {}, {}{}", xv, yv, sep)?;
        }
        writeln!(out, "+ )")?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_pwl_file<S: AsRef<str>>(ds: &Dataset, path: &Path, xcol: &str, ycols: &[S]) -> ReadResult<()> {
    write_pwl(ds, create(path)?, xcol, ycols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutmeg::read_nutmeg;
    use crate::ssv::read_ssv;

    fn fixture() -> Dataset {
        Dataset::from_columns(&[("time", vec![0.0, 1e-9]), ("v(a.b)", vec![0.5, 1.5])]).unwrap()
    }

    fn text(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_ssv_round_trip() {
        let d = read_ssv("x y\n1 2\n3 4\n", 0).unwrap();
        let mut buf = Vec::new();
        write_ssv(&d, &mut buf).unwrap();
        let back = read_ssv(&text(buf), 0).unwrap();
        assert_eq!(back.names(), vec!["x", "y"]);
        assert_eq!(back.matrix(), d.matrix());
    }

    #[test]
    fn test_csv_column_limit() {
        let mut buf = Vec::new();
        write_csv(&fixture(), &mut buf, Some(1)).unwrap();
        assert_eq!(text(buf), "time\n0\n0.000000001\n");

        let mut buf = Vec::new();
        write_csv(&fixture(), &mut buf, None).unwrap();
        assert!(text(buf).starts_with("time,v(a.b)\n0,0.5\n"));
    }

    #[test]
    fn test_nutmeg_reads_back() {
        let d = fixture();
        let mut buf = Vec::new();
        write_nutmeg(&d, &mut buf, &NutmegHeader::for_dataset(&d)).unwrap();
        let raw = text(buf);
        assert!(raw.contains("\t1\tv(a.b)\tvoltage\n"));
        let back = read_nutmeg(raw.as_bytes(), 0).unwrap();
        assert_eq!(back.names(), d.names());
        assert_eq!(back.get_vec("v(a.b)").unwrap(), vec![0.5, 1.5]);
    }

    #[test]
    fn test_pwl_blocks() {
        let mut buf = Vec::new();
        write_pwl(&fixture(), &mut buf, "time", &["v(a.b)"]).unwrap();
        assert_eq!(text(buf), "v_a_b v_a_b 0 PWL(\n+ 0, 0.5,\n+ 0.000000001, 1.5\n+ )\n");
        assert!(write_pwl(&fixture(), Vec::new(), "time", &["nope"]).is_err());
    }
}
