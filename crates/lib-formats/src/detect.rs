//! Data file format names and content sniffing.

use crate::error::{ReadError, ReadResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Number of leading lines inspected by [`datafile_format`].
pub const SNIFF_LINES: usize = 20;

/// Supported data file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// Space-separated values.
    Ssv,
    /// Comma-separated values.
    Csv,
    /// SPICE rawfile, ASCII or binary.
    Nutmeg,
    /// Common simulator data format.
    Csdf,
    /// HSpice `.tr0`/`.ac0` output, ASCII or binary.
    Hspice,
    /// PSF-ASCII.
    Psf,
    /// UTMOST sweep tables.
    Utmost,
    /// Spectre S-parameter text.
    Sspar,
}

impl DataFormat {
    pub const ALL: [DataFormat; 8] = [
        Self::Ssv,
        Self::Csv,
        Self::Nutmeg,
        Self::Csdf,
        Self::Hspice,
        Self::Psf,
        Self::Utmost,
        Self::Sspar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ssv => "ssv",
            Self::Csv => "csv",
            Self::Nutmeg => "nutmeg",
            Self::Csdf => "csdf",
            Self::Hspice => "hspice",
            Self::Psf => "psf",
            Self::Utmost => "utmost",
            Self::Sspar => "sspar",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = ReadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| ReadError::invalid_value("format", format!("unknown format {}", s)))
    }
}

/// Classify a file from its first [`SNIFF_LINES`] lines.
///
/// Only the formats with a recognizable head are detected: nutmeg, csdf,
/// hspice, csv and ssv. `None` means the head matches none of them.
pub fn detect_format<S: AsRef<str>>(lines: &[S]) -> Option<DataFormat> {
    let lines: Vec<&str> = lines
        .iter()
        .take(SNIFF_LINES)
        .map(|l| l.as_ref().trim_end_matches(|c: char| c == '\r' || c == '\n'))
        .collect();

    if lines.iter().any(|l| l.contains("Plotname:")) {
        return Some(DataFormat::Nutmeg);
    }
    if lines.iter().any(|l| l.starts_with("#H")) {
        return Some(DataFormat::Csdf);
    }
    if let Some(key) = lines.first().and_then(|l| l.split_whitespace().next()) {
        if key.len() == 20 && key.bytes().all(|b| b.is_ascii_digit()) {
            return Some(DataFormat::Hspice);
        }
    }

    let mut content = lines.iter().filter(|l| !l.is_empty() && !l.starts_with('#'));
    let line0 = content.next()?;
    let line1 = content.next().copied().unwrap_or("");

    if line0.contains(',') {
        let n0 = line0.split(',').count();
        let n1 = line1.split(',').count();
        if n0 > 0 && n0 == n1 {
            return Some(DataFormat::Csv);
        }
    }
    let n0 = line0.split_whitespace().count();
    let n1 = line1.split_whitespace().count();
    if n0 > 0 && n0 == n1 {
        return Some(DataFormat::Ssv);
    }
    None
}

/// Classify a data file on disk. See [`detect_format`].
pub fn datafile_format(path: &Path) -> ReadResult<Option<DataFormat>> {
    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut lines = Vec::with_capacity(SNIFF_LINES);
    let mut buf = Vec::new();
    for _ in 0..SNIFF_LINES {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }
    let format = detect_format(&lines);
    tracing::debug!("{}: detected format {:?}", path.display(), format);
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_each_format() {
        assert_eq!(
            detect_format(&["Title: t", "Date: d", "Plotname: Transient"]),
            Some(DataFormat::Nutmeg)
        );
        assert_eq!(detect_format(&["#H", "SOURCE='x'"]), Some(DataFormat::Csdf));
        assert_eq!(
            detect_format(&["00040000000000009601  title text"]),
            Some(DataFormat::Hspice)
        );
        assert_eq!(
            detect_format(&["# comment", "", "time,v(out)", "0,1"]),
            Some(DataFormat::Csv)
        );
        assert_eq!(detect_format(&["x y", "1 2"]), Some(DataFormat::Ssv));
        assert_eq!(detect_format(&["x y z", "1 2"]), None);
        assert_eq!(detect_format::<&str>(&[]), None);
    }

    #[test]
    fn test_format_names() {
        assert_eq!("NUTMEG".parse::<DataFormat>().unwrap(), DataFormat::Nutmeg);
        assert_eq!(DataFormat::Sspar.to_string(), "sspar");
        assert!("xls".parse::<DataFormat>().is_err());
    }

    #[test]
    fn test_datafile_format_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.csv");
        std::fs::write(&path, "a,b\n1,2\n3,4\n").unwrap();
        assert_eq!(datafile_format(&path).unwrap(), Some(DataFormat::Csv));
    }
}
