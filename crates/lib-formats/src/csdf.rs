//! Common simulator data format (CSDF) reader.
//!
//! Sections are introduced by `#H` (header `KEY='value'` pairs), `#N`
//! (variable names) and `#C` (one record: sweep value, value count, values).
//! `#;` ends the file. Continuation lines belong to the current section.

use crate::error::ReadResult;
use crate::table::{assemble, number};
use lib_types::{ComplexPart, Dataset};
use std::collections::HashMap;
use std::path::Path;

const FORMAT: &str = "csdf";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Off,
    Header,
    Names,
    Data,
}

/// `KEY = 'value'` becomes `KEY,value'`.
fn assignments_to_commas(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(pos) = rest.find('=') {
        let after = &rest[pos + 1..];
        match after.trim_start_matches(' ').strip_prefix('\'') {
            Some(value) => {
                out.push_str(rest[..pos].trim_end_matches(' '));
                out.push(',');
                rest = value;
            }
            None => {
                out.push_str(&rest[..=pos]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// A closing quote and the spaces after it become `,`.
fn unquote(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(pos) = rest.find('\'') {
        out.push_str(&rest[..pos]);
        out.push(',');
        rest = rest[pos + 1..].trim_start_matches(' ');
    }
    out.push_str(rest);
    out
}

#[derive(Default)]
struct State {
    info: HashMap<String, String>,
    cols: Vec<String>,
    cxvars: Vec<String>,
    cxvalues: bool,
    values: Vec<f64>,
}

impl State {
    fn header(&mut self, line: &str) {
        let cleaned = unquote(&assignments_to_commas(line));
        let fields: Vec<&str> = cleaned.split(',').collect();
        for pair in fields.chunks_exact(2) {
            self.info.insert(pair[0].trim().to_string(), pair[1].to_string());
        }
    }

    fn names<'t>(&mut self, tokens: impl Iterator<Item = &'t str>) {
        for tok in tokens {
            let name = tok.replace('\'', "");
            if self.cxvalues {
                self.cols.push(ComplexPart::Real.column(&name));
                self.cols.push(ComplexPart::Imag.column(&name));
                self.cxvars.push(name);
            } else {
                self.cols.push(name);
            }
        }
    }

    fn data(&mut self, tokens: &[&str]) -> ReadResult<()> {
        if self.cxvalues {
            for triple in tokens.chunks_exact(3) {
                self.values.push(number(FORMAT, triple[0])?);
                self.values.push(number(FORMAT, triple[2])?);
            }
        } else {
            for tok in tokens {
                self.values.push(number(FORMAT, tok)?);
            }
        }
        Ok(())
    }
}

pub fn read_csdf(text: &str) -> ReadResult<Dataset> {
    let mut st = State::default();
    let mut mode = Mode::Off;

    for line in text.lines() {
        let line = line.trim();
        let tok: Vec<&str> = line.split_whitespace().collect();
        let Some(&first) = tok.first() else {
            continue;
        };
        match first {
            "#H" => {
                mode = Mode::Header;
                let rest = line[2..].trim();
                if !rest.is_empty() {
                    st.header(rest);
                }
            }
            "#N" => {
                mode = Mode::Names;
                st.cols.clear();
                if let Some(sweep) = st.info.get("SWEEPVAR") {
                    st.cols.push(sweep.to_lowercase());
                }
                if st.info.contains_key("TEMPERATURE") {
                    st.cols.push("temperature".to_string());
                }
                st.cxvalues = st.info.get("COMPLEXVALUES").map(String::as_str) == Some("YES");
                st.names(tok[1..].iter().copied());
            }
            "#C" => {
                mode = Mode::Data;
                if tok.len() < 3 {
                    continue;
                }
                st.values.push(number(FORMAT, tok[1])?);
                if let Some(temp) = st.info.get("TEMPERATURE") {
                    let temp = number(FORMAT, temp)?;
                    st.values.push(temp);
                }
                st.data(&tok[3..])?;
            }
            "#;" => break,
            _ => match mode {
                Mode::Header => st.header(line),
                Mode::Names => st.names(tok.iter().copied()),
                Mode::Data => st.data(&tok)?,
                Mode::Off => {}
            },
        }
    }

    let title = st.info.get("TITLE").cloned().unwrap_or_default();
    let mut ds = assemble(FORMAT, st.cols, st.values)?;
    ds.set_title(title);
    for var in &st.cxvars {
        ds.cxmag(var)?;
    }
    Ok(ds)
}

pub fn read_csdf_file(path: &Path) -> ReadResult<Dataset> {
    let text = std::fs::read_to_string(path)?;
    read_csdf(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_pairs() {
        let mut st = State::default();
        st.header("SOURCE='HSPICE' VERSION='2003'");
        st.header("TITLE = 'inverter chain'");
        assert_eq!(st.info.get("SOURCE").map(String::as_str), Some("HSPICE"));
        assert_eq!(st.info.get("VERSION").map(String::as_str), Some("2003"));
        assert_eq!(st.info.get("TITLE").map(String::as_str), Some("inverter chain"));
    }

    #[test]
    fn test_real_records() {
        let text = "\
#H
TITLE='tran test' SWEEPVAR='Time'
#N 'v(a)' 'v(b)'
#C 0.0 2 1.0 2.0
#C 1e-9 2 3.0
4.0
#;
";
        let d = read_csdf(text).unwrap();
        assert_eq!(d.title(), "tran test");
        assert_eq!(d.names(), vec!["time", "v(a)", "v(b)"]);
        assert_eq!(d.get_vec("v(b)").unwrap(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_complex_records() {
        let text = "\
#H SWEEPVAR='Freq' COMPLEXVALUES='YES'
#N 'v(o)'
#C 1.0 1 0.0 0 1.0
#;
";
        let d = read_csdf(text).unwrap();
        assert_eq!(d.names()[..3], ["freq", "REAL(v(o))", "IMAG(v(o))"]);
        assert!((d.get_entry(0, "PH(v(o))").unwrap() - 90.0).abs() < 1e-12);
    }
}
