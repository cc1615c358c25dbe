//! Space-separated value reader.
//!
//! A non-numeric line is a header that starts a new block. Lines starting
//! with a digit or sign are data rows. Data before any header forms block 0
//! with invented names `x, y0, y1, ...`.

use crate::error::{ReadError, ReadResult};
use crate::table::{assemble, numbers};
use lib_types::Dataset;
use std::path::Path;

const FORMAT: &str = "ssv";

fn is_data_line(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_digit() || c == '+' || c == '-')
}

/// Read block `block` of space-separated text.
pub fn read_ssv(text: &str, block: usize) -> ReadResult<Dataset> {
    let mut iblock: Option<usize> = None;
    let mut selected = false;
    let mut names: Vec<String> = Vec::new();
    let mut values: Vec<f64> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if is_data_line(line) {
            if selected {
                values.extend(numbers(FORMAT, line.split_whitespace())?);
            } else if iblock.is_none() {
                iblock = Some(0);
                if block == 0 {
                    let row = numbers(FORMAT, line.split_whitespace())?;
                    names.push("x".to_string());
                    names.extend((0..row.len().saturating_sub(1)).map(|i| format!("y{}", i)));
                    values.extend(row);
                    selected = true;
                }
            }
            continue;
        }
        let next = iblock.map_or(0, |b| b + 1);
        iblock = Some(next);
        if next == block {
            names = line.split_whitespace().map(str::to_string).collect();
            selected = true;
        } else if next > block {
            break;
        }
    }

    if !selected {
        return Err(ReadError::block_not_found(FORMAT, block));
    }
    assemble(FORMAT, names, values)
}

pub fn read_ssv_file(path: &Path, block: usize) -> ReadResult<Dataset> {
    let text = std::fs::read_to_string(path)?;
    read_ssv(&text, block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_fixture() {
        let d = read_ssv("x y\n1 2\n3 4\n", 0).unwrap();
        assert_eq!(d.names(), vec!["x", "y"]);
        assert_eq!(d.nrows(), 2);
        assert_eq!(d.get_vec("x").unwrap(), vec![1.0, 3.0]);
        assert_eq!(d.get_vec("y").unwrap(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_blocks_and_comments() {
        let text = "# data\nt a\n0 1\n1 2\n\nt b c\n0 5 6\n-1 7 8\n";
        let d = read_ssv(text, 1).unwrap();
        assert_eq!(d.names(), vec!["t", "b", "c"]);
        assert_eq!(d.get_vec("c").unwrap(), vec![6.0, 8.0]);
        assert!(matches!(read_ssv(text, 2), Err(ReadError::BlockNotFound { .. })));
    }

    #[test]
    fn test_headerless_data() {
        let d = read_ssv("0 1 2\n1 3 4\n", 0).unwrap();
        assert_eq!(d.names(), vec!["x", "y0", "y1"]);
        assert_eq!(d.get_entry(1, "y1").unwrap(), 4.0);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(read_ssv("x y\n1 2\n3\n", 0).is_err());
    }
}
