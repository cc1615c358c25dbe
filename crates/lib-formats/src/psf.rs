//! PSF-ASCII reader.
//!
//! Only the `VALUE` section contributes data. Each row is `"name" value`
//! (real) or `"name" (re im)` (complex), optionally with a `V`/`I` type
//! token after the name. The first name of the section starts every sweep
//! point. `HEADER` entries are kept as metadata; a `"title"` entry becomes
//! the dataset title.

use crate::error::{ReadError, ReadResult};
use crate::table::assemble;
use lib_types::{ComplexPart, Dataset};
use nom::{
    branch::alt,
    bytes::complete::take_till,
    character::complete::{alpha1, char, space0, space1},
    combinator::{map, opt},
    number::complete::double,
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const FORMAT: &str = "psf";

const SECTIONS: [&str; 6] = ["HEADER", "TYPE", "SWEEP", "TRACE", "VALUE", "END"];

type Point = HashMap<String, (f64, Option<f64>)>;

fn unquote(s: &str) -> String {
    s.replace('"', "")
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c: char| c == '"'), char('"')).parse(input)
}

/// `(re im)`
fn complex_value(input: &str) -> IResult<&str, (f64, Option<f64>)> {
    let (input, (re, im)) = delimited(
        terminated(char('('), space0),
        (double, preceded(space1, double)),
        preceded(space0, char(')')),
    )
    .parse(input)?;
    Ok((input, (re, Some(im))))
}

/// `"name" [type] value`
fn value_entry(input: &str) -> IResult<&str, (&str, (f64, Option<f64>))> {
    let (input, name) = terminated(quoted, space1).parse(input)?;
    let (input, _) = opt(terminated(alt((quoted, alpha1)), space1)).parse(input)?;
    let (input, value) = alt((complex_value, map(double, |v| (v, None)))).parse(input)?;
    Ok((input, (name, value)))
}

/// Parsed content of a PSF-ASCII file.
#[derive(Debug, Default)]
pub struct PsfFile {
    /// `HEADER` section entries.
    pub header: Vec<(String, String)>,
    order: Vec<String>,
    complex: HashSet<String>,
    points: Vec<Point>,
}

impl PsfFile {
    pub fn parse(text: &str) -> ReadResult<Self> {
        let mut psf = PsfFile::default();
        let mut section: Option<&str> = None;
        let mut first_var: Option<String> = None;

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            let Some(head) = line.split_whitespace().next() else {
                continue;
            };
            let starts_section = match section {
                None => head == "HEADER",
                Some(_) => SECTIONS.contains(&head),
            };
            if starts_section {
                if head == "END" {
                    break;
                }
                section = SECTIONS.iter().copied().find(|s| *s == head);
                continue;
            }
            match section {
                Some("HEADER") => {
                    let tok: Vec<&str> = line.split_whitespace().collect();
                    if tok.len() >= 2 {
                        psf.header.push((unquote(tok[0]), unquote(&tok[1..].join(" "))));
                    }
                }
                Some("VALUE") => psf.value_row(line, lineno + 1, &mut first_var)?,
                _ => {}
            }
        }
        Ok(psf)
    }

    fn value_row(&mut self, line: &str, lineno: usize, first_var: &mut Option<String>) -> ReadResult<()> {
        let (var, value) = match value_entry(line) {
            Ok((rest, entry)) if rest.trim().is_empty() => entry,
            _ => {
                return Err(ReadError::syntax(lineno, format!("unexpected VALUE row {:?}", line)));
            }
        };
        let var = var.to_string();
        if first_var.is_none() {
            *first_var = Some(var.clone());
        }
        if first_var.as_deref() == Some(var.as_str()) || self.points.is_empty() {
            self.points.push(Point::new());
        }
        if value.1.is_some() {
            self.complex.insert(var.clone());
        }
        if !self.order.contains(&var) {
            self.order.push(var.clone());
        }
        if let Some(point) = self.points.last_mut() {
            point.insert(var, value);
        }
        Ok(())
    }

    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.header
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Flatten the sweep points into a dataset.
    pub fn into_dataset(self) -> ReadResult<Dataset> {
        let mut names = Vec::new();
        for var in &self.order {
            if self.complex.contains(var) {
                names.push(ComplexPart::Real.column(var));
                names.push(ComplexPart::Imag.column(var));
            } else {
                names.push(var.clone());
            }
        }
        let mut values = Vec::with_capacity(names.len() * self.points.len());
        for (i, point) in self.points.iter().enumerate() {
            for var in &self.order {
                let (re, im) = point.get(var).ok_or_else(|| {
                    ReadError::invalid_format(FORMAT, format!("{} missing at point {}", var, i))
                })?;
                values.push(*re);
                if self.complex.contains(var) {
                    values.push(im.unwrap_or(0.0));
                }
            }
        }
        let title = self.header_value("title").unwrap_or_default().to_string();
        let mut ds = assemble(FORMAT, names, values)?;
        ds.set_title(title);
        for var in &self.order {
            if self.complex.contains(var) {
                ds.cxmag(var)?;
            }
        }
        Ok(ds)
    }
}

pub fn read_psf(text: &str) -> ReadResult<Dataset> {
    PsfFile::parse(text)?.into_dataset()
}

pub fn read_psf_file(path: &Path) -> ReadResult<Dataset> {
    let text = std::fs::read_to_string(path)?;
    read_psf(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRAN: &str = r#"HEADER
"PSFversion" "1.00"
"title" "ring osc"
TYPE
"V" FLOAT DOUBLE PROP( "key" "node" )
SWEEP
"time" "s"
TRACE
"out" "V"
VALUE
"time" 0.0
"out" V 0.1
"time" 1e-9
"out" V 0.9
END
"#;

    #[test]
    fn test_real_trace() {
        let psf = PsfFile::parse(TRAN).unwrap();
        assert_eq!(psf.header_value("PSFversion"), Some("1.00"));
        let d = psf.into_dataset().unwrap();
        assert_eq!(d.title(), "ring osc");
        assert_eq!(d.names(), vec!["time", "out"]);
        assert_eq!(d.get_vec("out").unwrap(), vec![0.1, 0.9]);
    }

    #[test]
    fn test_complex_values() {
        let text = "HEADER\nVALUE\n\"freq\" 1.0\n\"vo\" (0.0 2.0)\n\"freq\" 10.0\n\"vo\" (1.0 0.0)\nEND\n";
        let d = read_psf(text).unwrap();
        assert_eq!(d.names()[..3], ["freq", "REAL(vo)", "IMAG(vo)"]);
        assert!((d.get_entry(0, "MAG(vo)").unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_variable_in_point() {
        let text = "HEADER\nVALUE\n\"t\" 0\n\"a\" 1\n\"t\" 1\nEND\n";
        assert!(read_psf(text).is_err());
    }
}
