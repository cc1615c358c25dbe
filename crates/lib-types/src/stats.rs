//! Column statistics.
//!
//! NaN propagates through `max`/`min`/`mean`; variance and standard
//! deviation are population statistics.

use crate::dataset::{Col, Dataset};
use crate::error::{DataError, DataResult};

impl Dataset {
    fn nonempty<'a>(&self, col: impl Into<Col<'a>>) -> DataResult<Vec<f64>> {
        let col = col.into();
        let values = self.get_vec(col)?;
        if values.is_empty() {
            return Err(DataError::EmptyColumn(col.to_string()));
        }
        Ok(values)
    }

    pub fn max<'a>(&self, col: impl Into<Col<'a>>) -> DataResult<f64> {
        let v = self.nonempty(col)?;
        Ok(v.iter().copied().fold(f64::NEG_INFINITY, |a, b| {
            if a.is_nan() || b.is_nan() {
                f64::NAN
            } else {
                a.max(b)
            }
        }))
    }

    pub fn min<'a>(&self, col: impl Into<Col<'a>>) -> DataResult<f64> {
        let v = self.nonempty(col)?;
        Ok(v.iter().copied().fold(f64::INFINITY, |a, b| {
            if a.is_nan() || b.is_nan() {
                f64::NAN
            } else {
                a.min(b)
            }
        }))
    }

    pub fn mean<'a>(&self, col: impl Into<Col<'a>>) -> DataResult<f64> {
        let v = self.nonempty(col)?;
        Ok(mean_of(&v))
    }

    pub fn median<'a>(&self, col: impl Into<Col<'a>>) -> DataResult<f64> {
        let mut v = self.nonempty(col)?;
        v.sort_by(|a, b| a.total_cmp(b));
        let n = v.len();
        Ok(if n % 2 == 1 {
            v[n / 2]
        } else {
            (v[n / 2 - 1] + v[n / 2]) * 0.5
        })
    }

    pub fn var<'a>(&self, col: impl Into<Col<'a>>) -> DataResult<f64> {
        let v = self.nonempty(col)?;
        Ok(var_of(&v))
    }

    pub fn std<'a>(&self, col: impl Into<Col<'a>>) -> DataResult<f64> {
        Ok(self.var(col)?.sqrt())
    }

    /// Sorted distinct values of a column.
    pub fn unique<'a>(&self, col: impl Into<Col<'a>>) -> DataResult<Vec<f64>> {
        let mut v = self.get_vec(col)?;
        v.sort_by(|a, b| a.total_cmp(b));
        v.dedup_by(|a, b| a == b);
        Ok(v)
    }
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean_of(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

/// Population variance; NaN for an empty slice.
pub fn var_of(v: &[f64]) -> f64 {
    let m = mean_of(v);
    v.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / v.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_stats() {
        let d = Dataset::from_columns(&[("x", vec![3.0, 1.0, 4.0, 1.0])]).unwrap();
        assert_eq!(d.max("x").unwrap(), 4.0);
        assert_eq!(d.min("x").unwrap(), 1.0);
        assert_eq!(d.mean("x").unwrap(), 2.25);
        assert_eq!(d.median("x").unwrap(), 2.0);
        assert!((d.var("x").unwrap() - 1.6875).abs() < 1e-12);
        assert!((d.std("x").unwrap() - 1.6875f64.sqrt()).abs() < 1e-12);
        assert_eq!(d.unique("x").unwrap(), vec![1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_empty_and_missing() {
        let d = Dataset::from_columns(&[("x", Vec::<f64>::new())]).unwrap();
        assert!(matches!(d.max("x"), Err(DataError::EmptyColumn(_))));
        assert!(matches!(d.mean("y"), Err(DataError::ColumnNotFound(_))));
    }

    #[test]
    fn test_nan_propagates() {
        let d = Dataset::from_columns(&[("x", vec![1.0, f64::NAN, 2.0])]).unwrap();
        assert!(d.max("x").unwrap().is_nan());
    }
}
