//! UTMOST sweep-table reader.
//!
//! After three header lines the file holds data sets delimited by
//! `DataSetStart` / `DataSetFinish`. A set declares its inputs
//! (`Sweep,order,?,name,LIN,start,stop,step`, `Sweep,...,LIST` followed by a
//! `List, N` line and N values, or `Constant,?,name,value`) and then one
//! `DataArray,name` per output followed by numeric lines.
//!
//! The result has one `V(input)` column per input, primary sweep first and
//! varying fastest, followed by the outputs.

use crate::error::{ReadError, ReadResult};
use crate::table::{assemble, number, numbers};
use lib_types::numeric::range_sample;
use lib_types::Dataset;
use std::path::Path;

const FORMAT: &str = "utmost";

/// Maximum number of nested inputs.
const MAX_INPUTS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Header(u8),
    Idle,
    Declarations,
    ListHeader,
    ListValues { remaining: usize },
    Data,
}

struct Input {
    name: String,
    order: String,
    values: Vec<f64>,
}

fn fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn field<'a>(pars: &[&'a str], i: usize, line: &str) -> ReadResult<&'a str> {
    pars.get(i)
        .copied()
        .ok_or_else(|| ReadError::invalid_format(FORMAT, format!("short declaration {:?}", line)))
}

/// Read data set number `block`.
pub fn read_utmost(text: &str, block: usize) -> ReadResult<Dataset> {
    let mut mode = Mode::Header(0);
    let mut iblock: Option<usize> = None;
    let mut found = false;
    let mut inputs: Vec<Input> = Vec::new();
    let mut outputs: Vec<(String, Vec<f64>)> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match mode {
            Mode::Header(n) => {
                mode = if n >= 2 { Mode::Idle } else { Mode::Header(n + 1) };
            }
            Mode::Idle => {
                if line.starts_with("DataSetStart") {
                    let next = iblock.map_or(0, |b| b + 1);
                    iblock = Some(next);
                    if next == block {
                        found = true;
                        mode = Mode::Declarations;
                    }
                }
            }
            Mode::ListHeader => {
                let pars = fields(line);
                if pars.first() != Some(&"List") {
                    return Err(ReadError::invalid_format(
                        FORMAT,
                        format!("expected List header, got {:?}", line),
                    ));
                }
                let n: usize = field(&pars, 1, line)?
                    .parse()
                    .map_err(|_| ReadError::invalid_value("List", line.to_string()))?;
                mode = if n == 0 {
                    Mode::Declarations
                } else {
                    Mode::ListValues { remaining: n }
                };
            }
            Mode::ListValues { remaining } => {
                let vals = numbers(FORMAT, line.split_whitespace())?;
                let got = vals.len();
                if let Some(input) = inputs.last_mut() {
                    input.values.extend(vals);
                }
                mode = if got >= remaining {
                    Mode::Declarations
                } else {
                    Mode::ListValues {
                        remaining: remaining - got,
                    }
                };
            }
            Mode::Declarations | Mode::Data => {
                if line.starts_with("Sweep,") && mode == Mode::Declarations {
                    let pars = fields(line);
                    let order = field(&pars, 1, line)?.to_string();
                    let name = field(&pars, 3, line)?.to_string();
                    let kind = field(&pars, 4, line)?;
                    let mut input = Input {
                        name,
                        order,
                        values: Vec::new(),
                    };
                    match kind {
                        "LIN" => {
                            let start = number(FORMAT, field(&pars, 5, line)?)?;
                            let stop = number(FORMAT, field(&pars, 6, line)?)?;
                            let step = number(FORMAT, field(&pars, 7, line)?)?;
                            input.values = range_sample(start, stop, step);
                        }
                        "LIST" => mode = Mode::ListHeader,
                        other => {
                            return Err(ReadError::invalid_value("Sweep", other.to_string()));
                        }
                    }
                    inputs.push(input);
                } else if line.starts_with("Constant,") && mode == Mode::Declarations {
                    let pars = fields(line);
                    inputs.push(Input {
                        name: field(&pars, 2, line)?.to_string(),
                        order: "0".to_string(),
                        values: vec![number(FORMAT, field(&pars, 3, line)?)?],
                    });
                } else if line.starts_with("DataArray") {
                    let pars = fields(line);
                    outputs.push((field(&pars, 1, line)?.to_string(), Vec::new()));
                    mode = Mode::Data;
                } else if line.starts_with("DataSetFinish") {
                    break;
                } else if mode == Mode::Data
                    && line.starts_with(|c: char| c.is_ascii_digit() || c == '-')
                {
                    let vals = numbers(FORMAT, line.split_whitespace())?;
                    if let Some((_, out)) = outputs.last_mut() {
                        out.extend(vals);
                    }
                }
            }
        }
    }

    if !found {
        return Err(ReadError::block_not_found(FORMAT, block));
    }
    build(inputs, outputs)
}

/// Order inputs as primary (`1`), secondary (`2`), then constants, and
/// cross-product them with the primary varying fastest.
fn build(inputs: Vec<Input>, outputs: Vec<(String, Vec<f64>)>) -> ReadResult<Dataset> {
    let mut slots: [Option<usize>; MAX_INPUTS] = [None; MAX_INPUTS];
    for (i, input) in inputs.iter().enumerate() {
        match input.order.as_str() {
            "1" => slots[0] = Some(i),
            "2" => slots[1] = Some(i),
            "0" => {
                if let Some(slot) = slots[1..].iter_mut().find(|s| s.is_none()) {
                    *slot = Some(i);
                }
            }
            _ => {}
        }
    }
    let used = slots.iter().take_while(|s| s.is_some()).count();
    let ordered: Vec<&Input> = slots[..used].iter().flatten().map(|&i| &inputs[i]).collect();
    if ordered.is_empty() {
        return Err(ReadError::invalid_format(FORMAT, "no primary sweep input"));
    }

    let mut names: Vec<String> = ordered.iter().map(|inp| format!("V({})", inp.name)).collect();
    names.extend(outputs.iter().map(|(n, _)| n.clone()));

    let lens: Vec<usize> = ordered.iter().map(|inp| inp.values.len()).collect();
    let npts: usize = lens.iter().product();
    let mut values = Vec::with_capacity(npts * names.len());
    for point in 0..npts {
        let mut rem = point;
        for (inp, &len) in ordered.iter().zip(&lens) {
            values.push(inp.values[rem % len]);
            rem /= len;
        }
        for (name, out) in &outputs {
            let v = out.get(point).copied().ok_or_else(|| {
                ReadError::invalid_format(FORMAT, format!("{} has no value for point {}", name, point))
            })?;
            values.push(v);
        }
    }
    assemble(FORMAT, names, values)
}

pub fn read_utmost_file(path: &Path, block: usize) -> ReadResult<Dataset> {
    let text = std::fs::read_to_string(path)?;
    read_utmost(&text, block)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDVD: &str = "\
UTMOST IV
nmos
header3
DataSetStart
Sweep,1,0,vd,LIN,0,1,0.5
Sweep,2,0,vg,LIST
List, 2
1.0 2.0
Constant,0,vb,0
DataArray,id
0 1 2
3 4 5
DataSetFinish
";

    #[test]
    fn test_cross_product() {
        let d = read_utmost(IDVD, 0).unwrap();
        assert_eq!(d.names(), vec!["V(vd)", "V(vg)", "V(vb)", "id"]);
        assert_eq!(d.nrows(), 6);
        assert_eq!(d.get_vec("V(vd)").unwrap(), vec![0.0, 0.5, 1.0, 0.0, 0.5, 1.0]);
        assert_eq!(d.get_vec("V(vg)").unwrap(), vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
        assert_eq!(d.get_vec("id").unwrap(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_missing_block_and_short_output() {
        assert!(matches!(read_utmost(IDVD, 1), Err(ReadError::BlockNotFound { .. })));
        let short = IDVD.replace("3 4 5", "3 4");
        assert!(read_utmost(&short, 0).is_err());
    }
}
