//! Reshaping a flat value stream into a dataset.

use crate::error::{ReadError, ReadResult};
use lib_types::Dataset;
use ndarray::Array2;

/// Parse one numeric token.
pub(crate) fn number(format: &'static str, token: &str) -> ReadResult<f64> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| ReadError::invalid_format(format, format!("bad number {:?}", token)))
}

/// Parse all tokens of a line.
pub(crate) fn numbers<'t, I>(format: &'static str, tokens: I) -> ReadResult<Vec<f64>>
where
    I: IntoIterator<Item = &'t str>,
{
    tokens.into_iter().map(|t| number(format, t)).collect()
}

/// Build a `(values.len() / names.len()) x names.len()` dataset.
///
/// Zero variables, zero points, or a value count that is not a multiple of
/// the variable count are reported as [`ReadError::InvalidFormat`].
pub(crate) fn assemble(
    format: &'static str,
    names: Vec<String>,
    values: Vec<f64>,
) -> ReadResult<Dataset> {
    let nvars = names.len();
    if nvars == 0 || values.is_empty() {
        return Err(ReadError::invalid_format(
            format,
            format!("{} variables, {} values", nvars, values.len()),
        ));
    }
    if values.len() % nvars != 0 {
        return Err(ReadError::invalid_format(
            format,
            format!("{} values do not reshape into {} columns", values.len(), nvars),
        ));
    }
    let npts = values.len() / nvars;
    let data = Array2::from_shape_vec((npts, nvars), values)
        .map_err(|e| ReadError::invalid_format(format, e.to_string()))?;
    tracing::debug!("{}: {} points x {} variables", format, npts, nvars);
    Ok(Dataset::from_matrix(names, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_row_major() {
        let d = assemble("ssv", vec!["a".into(), "b".into()], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(d.get_vec("a").unwrap(), vec![1.0, 3.0]);
        assert_eq!(d.get_vec("b").unwrap(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_assemble_rejects_ragged_and_empty() {
        assert!(assemble("ssv", vec!["a".into(), "b".into()], vec![1.0, 2.0, 3.0]).is_err());
        assert!(assemble("ssv", vec![], vec![1.0]).is_err());
        assert!(assemble("ssv", vec!["a".into()], vec![]).is_err());
    }
}
