//! Comma-separated value reader.
//!
//! Header names have spaces replaced by `_` and quotes removed. Empty data
//! fields read as 0. Data rows are taken only after the selected header.

use crate::error::{ReadError, ReadResult};
use crate::table::{assemble, number};
use lib_types::Dataset;
use std::path::Path;

const FORMAT: &str = "csv";

fn is_data_line(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '.' | ','))
}

/// Read block `block` of comma-separated text.
pub fn read_csv(text: &str, block: usize) -> ReadResult<Dataset> {
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
                for field in line.split(',') {
                    let field = field.trim();
                    values.push(if field.is_empty() {
                        0.0
                    } else {
                        number(FORMAT, field)?
                    });
                }
            }
            continue;
        }
        let next = iblock.map_or(0, |b| b + 1);
        iblock = Some(next);
        if next == block {
            names = line
                .replace(' ', "_")
                .replace('"', "")
                .split(',')
                .map(str::to_string)
                .collect();
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

pub fn read_csv_file(path: &Path, block: usize) -> ReadResult<Dataset> {
    let text = std::fs::read_to_string(path)?;
    read_csv(&text, block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_cleanup_and_empty_fields() {
        let d = read_csv("\"time\",\"v out\"\n0,1.5\n1,\n", 0).unwrap();
        assert_eq!(d.names(), vec!["time", "v_out"]);
        assert_eq!(d.get_vec("v_out").unwrap(), vec![1.5, 0.0]);
    }

    #[test]
    fn test_second_block() {
        let d = read_csv("a,b\n1,2\nc,d\n3,4\n5,6\n", 1).unwrap();
        assert_eq!(d.names(), vec!["c", "d"]);
        assert_eq!(d.nrows(), 2);
    }

    #[test]
    fn test_data_without_header_is_not_a_block() {
        assert!(read_csv("1,2\n3,4\n", 0).is_err());
    }
}
