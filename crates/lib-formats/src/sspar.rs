//! Spectre S-parameter text reader.
//!
//! A `format` line lists the columns, e.g.
//! `format freq:value S1:1:(real,imag) S1:2:(mag,deg)`. Each complex column
//! is stored as a `(cx1,cx2)` pair where the pair is one of real/imag,
//! mag/deg, mag/rad, db/deg or db/rad. Every group is converted to
//! REAL/IMAG followed by MAG/DB/PH.

use crate::error::{ReadError, ReadResult};
use crate::table::{assemble, numbers};
use lib_types::{Complex64, ComplexPart, Dataset};
use std::path::Path;

const FORMAT: &str = "sspar";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Title,
    Reference,
    Variables,
    Data,
}

/// Representation of one complex group as declared by the format line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Repr {
    ReIm,
    MagDeg,
    MagRad,
    DbDeg,
    DbRad,
}

impl Repr {
    fn parse(cx1: &str, cx2: &str) -> Option<Self> {
        match (cx1, cx2) {
            ("REAL", "IMAG") => Some(Self::ReIm),
            ("MAG", "PH") => Some(Self::MagDeg),
            ("MAG", "RAD") => Some(Self::MagRad),
            ("DB", "PH") => Some(Self::DbDeg),
            ("DB", "RAD") => Some(Self::DbRad),
            _ => None,
        }
    }

    fn to_complex(self, a: f64, b: f64) -> Complex64 {
        let mag = match self {
            Self::ReIm => return Complex64::new(a, b),
            Self::MagDeg | Self::MagRad => a,
            Self::DbDeg | Self::DbRad => 10f64.powf(a / 20.0),
        };
        let ph = match self {
            Self::MagDeg | Self::DbDeg => b.to_radians(),
            _ => b,
        };
        Complex64::from_polar(mag, ph)
    }
}

struct Group {
    root: String,
    first: String,
    second: String,
    repr: Repr,
}

/// `S1:1` becomes `S11` when both port numbers are one digit.
fn collapse_ports(root: &str) -> String {
    let alpha = root
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(root.len());
    if alpha == 0 {
        return root.to_string();
    }
    let rest = &root[alpha..];
    let Some((p1, tail)) = rest.split_once(':') else {
        return root.to_string();
    };
    let p2_len = tail.find(|c: char| !c.is_ascii_digit()).unwrap_or(tail.len());
    let p2 = &tail[..p2_len];
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if digits(p1) && digits(p2) && p1.len() == 1 && p2.len() == 1 {
        format!("{}{}{}{}", &root[..alpha], p1, p2, &tail[p2_len..])
    } else {
        root.to_string()
    }
}

/// Split `root(cx1,cx2)` where the root itself may contain colons.
fn split_variable(var: &str) -> Option<(&str, &str, &str)> {
    let inner = var.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let root = inner[..open].trim_end_matches(':');
    if root.contains('(') || root.is_empty() {
        return None;
    }
    let (cx1, cx2) = inner[open + 1..].split_once(',')?;
    let word = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !word(cx1) || !word(cx2) {
        return None;
    }
    Some((root, cx1, cx2))
}

#[derive(Default)]
struct Columns {
    names: Vec<String>,
    groups: Vec<Group>,
}

impl Columns {
    fn declare<'t>(&mut self, vars: impl Iterator<Item = &'t str>) -> ReadResult<()> {
        for var in vars {
            if var.starts_with("freq") {
                self.names.push("freq".to_string());
                continue;
            }
            let Some((root, cx1, cx2)) = split_variable(var) else {
                continue;
            };
            let cx1 = cx1.to_ascii_uppercase();
            let mut cx2 = cx2.to_ascii_uppercase();
            if cx2 == "DEG" {
                cx2 = "PH".to_string();
            }
            let repr = Repr::parse(&cx1, &cx2)
                .ok_or_else(|| ReadError::invalid_value("format", format!("({},{})", cx1, cx2)))?;
            let root = collapse_ports(root);
            let first = format!("{}({})", cx1, root);
            let second = format!("{}({})", cx2, root);
            self.names.push(first.clone());
            self.names.push(second.clone());
            self.groups.push(Group {
                root,
                first,
                second,
                repr,
            });
        }
        Ok(())
    }
}

pub fn read_sspar(text: &str) -> ReadResult<Dataset> {
    let mut mode = Mode::Title;
    let mut cols = Columns::default();
    let mut values: Vec<f64> = Vec::new();
    let mut pending: Vec<f64> = Vec::new();
    let mut ncol = 0;
    let mut reference: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if line.starts_with("reference") {
            mode = Mode::Reference;
        } else if let Some(rest) = line.strip_prefix("format") {
            mode = Mode::Variables;
            cols.declare(rest.split_whitespace())?;
        } else if mode == Mode::Reference {
            reference.push(line.to_string());
        } else if line.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
            if mode != Mode::Data {
                mode = Mode::Data;
                pending.clear();
                ncol = cols.names.len();
            }
            let cleaned = line.replace(|c: char| c == ',' || c == ':', " ");
            pending.extend(numbers(FORMAT, cleaned.split_whitespace())?);
            if pending.len() >= ncol {
                values.append(&mut pending);
            }
        } else if mode == Mode::Variables {
            cols.declare(line.split_whitespace())?;
        }
    }
    tracing::debug!(
        "sspar: {} columns, {} reference lines",
        cols.names.len(),
        reference.len()
    );

    let mut ds = assemble(FORMAT, cols.names, values)?;
    for group in &cols.groups {
        normalize(&mut ds, group)?;
    }
    Ok(ds)
}

/// Replace a declared group by REAL/IMAG and regenerate MAG/DB/PH.
fn normalize(ds: &mut Dataset, group: &Group) -> ReadResult<()> {
    if group.repr != Repr::ReIm {
        let a = ds.get_vec(group.first.as_str())?;
        let b = ds.get_vec(group.second.as_str())?;
        let z: Vec<Complex64> = a
            .iter()
            .zip(&b)
            .map(|(&a, &b)| group.repr.to_complex(a, b))
            .collect();
        let re_name = ComplexPart::Real.column(&group.root);
        let im_name = ComplexPart::Imag.column(&group.root);
        ds.insert(group.second.as_str(), [re_name.as_str(), im_name.as_str()])?;
        let re: Vec<f64> = z.iter().map(|v| v.re).collect();
        let im: Vec<f64> = z.iter().map(|v| v.im).collect();
        ds.set_column(re_name.as_str(), &re)?;
        ds.set_column(im_name.as_str(), &im)?;
        ds.delete([group.first.as_str(), group.second.as_str()]);
    }
    ds.cxmag(&group.root)?;
    Ok(())
}

pub fn read_sspar_file(path: &Path) -> ReadResult<Dataset> {
    let text = std::fs::read_to_string(path)?;
    read_sspar(&text)
}
