//! HSpice `.tr0`/`.ac0` reader (ASCII and binary).
//!
//! Both variants share a column string
//! `<flags> <name fields> $&%#` where names are 16-character fields. The
//! first flag is 2 for complex (AC) output; later columns flagged 1 or 8 are
//! then complex. ASCII values are 11-character fields; the last value of the
//! stream is an end marker and is dropped.

use crate::cursor::{f32_le, i32_le, ByteCursor};
use crate::error::{ReadError, ReadResult};
use crate::table::{assemble, number};
use lib_types::{ComplexPart, Dataset};
use std::path::Path;

const FORMAT: &str = "hspice";

/// Column string terminator.
const END_OF_NAMES: &str = "$&%#";

/// Width of one ASCII value field.
const VALUE_WIDTH: usize = 11;

/// Width of one column-name field.
const NAME_WIDTH: usize = 16;

struct Raw {
    title: String,
    colstring: String,
    values: Vec<f64>,
}

fn read_binary(bytes: &[u8]) -> ReadResult<Raw> {
    let mut cur = ByteCursor::new(bytes);
    let limits = cur
        .take(16)
        .ok_or_else(|| ReadError::truncated(FORMAT, "binary header limits"))?;
    let header_len = usize::try_from(i32_le(&limits[12..16]))
        .map_err(|_| ReadError::invalid_format(FORMAT, "negative header length"))?;
    let header = cur
        .take(header_len)
        .ok_or_else(|| ReadError::truncated(FORMAT, "binary header"))?;
    let text = |r: std::ops::Range<usize>| {
        let end = r.end.min(header.len());
        let start = r.start.min(end);
        String::from_utf8_lossy(&header[start..end]).into_owned()
    };
    let title = text(24..88).trim().to_string();
    let colstring = text(264..header.len());

    let mut values = Vec::new();
    // each record: trailer of the previous record, 4-word header, payload
    while cur.take(4).is_some() {
        let Some(limits) = cur.take(16) else {
            break;
        };
        let ndat = usize::try_from(i32_le(&limits[4..8]))
            .map_err(|_| ReadError::invalid_format(FORMAT, "negative record length"))?;
        let payload = cur
            .take(4 * ndat)
            .ok_or_else(|| ReadError::truncated(FORMAT, "binary record"))?;
        values.extend(payload.chunks_exact(4).map(|b| f64::from(f32_le(b))));
    }
    Ok(Raw {
        title,
        colstring,
        values,
    })
}

fn read_ascii(text: &str) -> ReadResult<Raw> {
    let mut lines = text.lines();
    let mut next = |what: &str| {
        lines
            .next()
            .ok_or_else(|| ReadError::truncated(FORMAT, format!("missing {}", what)))
    };
    let first = next("title line")?;
    let title = first.split_whitespace().skip(1).collect::<Vec<_>>().join(" ");
    next("date line")?;
    next("third header line")?;
    let mut colstring = next("column line")?.to_string();
    while !colstring.contains(END_OF_NAMES) {
        colstring.push_str(next("column names")?);
    }

    let mut values = Vec::new();
    for line in lines {
        let mut i1 = 0;
        while i1 + VALUE_WIDTH <= line.len() {
            let field = line.get(i1..i1 + VALUE_WIDTH).ok_or_else(|| {
                ReadError::invalid_format(FORMAT, "non-ASCII data in value field")
            })?;
            values.push(number(FORMAT, field)?);
            i1 += VALUE_WIDTH;
        }
    }
    Ok(Raw {
        title,
        colstring,
        values,
    })
}

/// Split `<flags> <names> $&%#` into the integer flags and the names.
fn parse_colstring(colstring: &str) -> ReadResult<(Vec<i32>, Vec<String>)> {
    let bad = || ReadError::invalid_format(FORMAT, "cannot parse column names");
    let end = colstring.find(END_OF_NAMES).ok_or_else(bad)?;
    let body = &colstring[..end];
    let split = body
        .find(|c: char| !(c.is_ascii_digit() || c == ' '))
        .unwrap_or(body.len());
    if split == 0 {
        return Err(bad());
    }
    let flags = body[..split]
        .split_whitespace()
        .map(|f| f.parse::<i32>().map_err(|_| bad()))
        .collect::<ReadResult<Vec<_>>>()?;
    let names_part = &body[split..];
    let names = names_part
        .as_bytes()
        .chunks(NAME_WIDTH)
        .map(|c| String::from_utf8_lossy(c).trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    Ok((flags, names))
}

pub fn read_hspice(bytes: &[u8]) -> ReadResult<Dataset> {
    let ascii = bytes.starts_with(b"000");
    let mut raw = if ascii {
        read_ascii(&String::from_utf8_lossy(bytes))?
    } else {
        read_binary(bytes)?
    };
    tracing::debug!("hspice: {} file", if ascii { "ascii" } else { "binary" });

    let (flags, mut cols) = parse_colstring(&raw.colstring)?;
    let mut cxvars = Vec::new();
    if flags.first() == Some(&2) && !cols.is_empty() {
        let mut expanded = vec![cols[0].clone()];
        for (flag, col) in flags.iter().skip(1).zip(cols.iter().skip(1)) {
            if *flag == 1 || *flag == 8 {
                expanded.push(ComplexPart::Real.column(col));
                expanded.push(ComplexPart::Imag.column(col));
                cxvars.push(col.clone());
            } else {
                expanded.push(col.clone());
            }
        }
        expanded.extend(cols.iter().skip(flags.len().max(1)).cloned());
        cols = expanded;
    }

    raw.values.pop();
    let mut ds = assemble(FORMAT, cols, raw.values)?;
    ds.set_title(raw.title);
    for var in &cxvars {
        ds.cxmag(var)?;
    }
    Ok(ds)
}

pub fn read_hspice_file(path: &Path) -> ReadResult<Dataset> {
    let bytes = std::fs::read(path)?;
    read_hspice(&bytes)
}
