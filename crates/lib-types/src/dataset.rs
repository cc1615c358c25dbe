//! Column-oriented numeric dataset.
//!
//! A [`Dataset`] is a dense `nrows x ncols` matrix of `f64` plus an ordered
//! list of unique column names. Columns and rows are addressed by name or by
//! index; negative indices count from the end (`-1` is the last one).
//!
//! The matrix and the name list are always owned. [`Dataset::dup`] and
//! [`Dataset::become_copy`] deep-copy both, so a duplicate never aliases its
//! source.

use crate::error::{DataError, DataResult};
use ndarray::{concatenate, Array2, ArrayView1, ArrayViewMut1, Axis};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Maximum number of suffixes tried by [`Dataset::unique_name`].
pub const UNIQUE_NAME_ATTEMPTS: usize = 10_000;

/// Column address: a name or a (possibly negative) index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Col<'a> {
    Index(isize),
    Name(&'a str),
}

impl<'a> From<&'a str> for Col<'a> {
    fn from(name: &'a str) -> Self {
        Col::Name(name)
    }
}

impl<'a> From<&'a String> for Col<'a> {
    fn from(name: &'a String) -> Self {
        Col::Name(name.as_str())
    }
}

impl From<isize> for Col<'_> {
    fn from(index: isize) -> Self {
        Col::Index(index)
    }
}

impl From<i32> for Col<'_> {
    fn from(index: i32) -> Self {
        Col::Index(index as isize)
    }
}

impl From<usize> for Col<'_> {
    fn from(index: usize) -> Self {
        Col::Index(index as isize)
    }
}

impl fmt::Display for Col<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Col::Index(i) => write!(f, "#{}", i),
            Col::Name(name) => f.write_str(name),
        }
    }
}

/// Normalize a Python-style index against a length.
fn normalize_index(index: isize, len: usize) -> Option<usize> {
    let len = len as isize;
    let idx = if index < 0 { len + index } else { index };
    if idx < 0 || idx >= len {
        None
    } else {
        Some(idx as usize)
    }
}

/// Ascending comparison with NaN ordered after every number.
fn cmp_nan_last(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Tabular waveform data: named columns over a dense row-major matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Free-form title, set by readers that carry one.
    title: String,

    /// Column names, unique, one per matrix column.
    names: Vec<String>,

    /// Values, shape `(nrows, ncols)`.
    data: Array2<f64>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self {
            title: String::new(),
            names: Vec::new(),
            data: Array2::zeros((0, 0)),
        }
    }

    /// Build a dataset from named, equal-length columns.
    ///
    /// Unequal lengths are fatal ([`DataError::ColumnLengthMismatch`]).
    /// A repeated name is reported as [`DataError::DuplicateColumn`].
    pub fn from_columns<S, V>(columns: &[(S, V)]) -> DataResult<Self>
    where
        S: AsRef<str>,
        V: AsRef<[f64]>,
    {
        let ncols = columns.len();
        let nrows = columns.first().map_or(0, |(_, v)| v.as_ref().len());
        let mut names = Vec::with_capacity(ncols);
        for (name, values) in columns {
            let name = name.as_ref();
            if values.as_ref().len() != nrows {
                return Err(DataError::ColumnLengthMismatch {
                    name: name.to_string(),
                    expected: nrows,
                    actual: values.as_ref().len(),
                });
            }
            if names.iter().any(|n: &String| n == name) {
                return Err(DataError::DuplicateColumn(name.to_string()));
            }
            names.push(name.to_string());
        }
        let data = Array2::from_shape_fn((nrows, ncols), |(r, c)| columns[c].1.as_ref()[r]);
        Ok(Self {
            title: String::new(),
            names,
            data,
        })
    }

    /// Build a dataset from names and a row-major value matrix.
    pub fn from_matrix(names: Vec<String>, data: Array2<f64>) -> DataResult<Self> {
        if names.len() != data.ncols() {
            return Err(DataError::ColumnCountMismatch {
                expected: names.len(),
                actual: data.ncols(),
            });
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(DataError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            title: String::new(),
            names,
            data,
        })
    }

    // ========================================================================
    // Shape and naming
    // ========================================================================

    pub fn ncols(&self) -> usize {
        self.names.len()
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Borrow the value matrix.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.data
    }

    /// Resolve a column address to a 0-based index.
    pub fn index<'a>(&self, col: impl Into<Col<'a>>) -> Option<usize> {
        match col.into() {
            Col::Index(i) => normalize_index(i, self.ncols()),
            Col::Name(name) => self.names.iter().position(|n| n == name),
        }
    }

    fn require<'a>(&self, col: impl Into<Col<'a>>) -> DataResult<usize> {
        let col = col.into();
        self.index(col)
            .ok_or_else(|| DataError::ColumnNotFound(col.to_string()))
    }

    fn row_index(&self, row: isize) -> DataResult<usize> {
        normalize_index(row, self.nrows()).ok_or(DataError::RowOutOfRange {
            row,
            nrows: self.nrows(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Name of a column.
    pub fn name<'a>(&self, col: impl Into<Col<'a>>) -> Option<&str> {
        self.index(col).map(|i| self.names[i].as_str())
    }

    /// Rename a column. The new name must not already be in use.
    pub fn rename<'a>(&mut self, col: impl Into<Col<'a>>, new_name: &str) -> DataResult<()> {
        let idx = self.require(col)?;
        if self.names[idx] == new_name {
            return Ok(());
        }
        if self.contains(new_name) {
            return Err(DataError::DuplicateColumn(new_name.to_string()));
        }
        self.names[idx] = new_name.to_string();
        Ok(())
    }

    /// Copy of the column name list.
    pub fn names(&self) -> Vec<String> {
        self.names.clone()
    }

    /// Borrow the column names.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// First of `prefix`, `prefix_1`, `prefix_2`, ... not already in use.
    pub fn unique_name(&self, prefix: &str) -> DataResult<String> {
        if !self.contains(prefix) {
            return Ok(prefix.to_string());
        }
        for i in 1..=UNIQUE_NAME_ATTEMPTS {
            let name = format!("{}_{}", prefix, i);
            if !self.contains(&name) {
                return Ok(name);
            }
        }
        Err(DataError::UniqueNameExhausted(prefix.to_string()))
    }

    // ========================================================================
    // Column structure
    // ========================================================================

    /// Insert a zero-filled column at `at` (0..=ncols).
    fn insert_zero_column(&mut self, at: usize, name: &str) {
        let (nrows, ncols) = self.data.dim();
        let old = &self.data;
        let data = Array2::from_shape_fn((nrows, ncols + 1), |(r, c)| match c.cmp(&at) {
            Ordering::Less => old[[r, c]],
            Ordering::Equal => 0.0,
            Ordering::Greater => old[[r, c - 1]],
        });
        self.data = data;
        self.names.insert(at, name.to_string());
    }

    /// Append zero-filled columns at the end. Names already present are skipped.
    pub fn append<I, S>(&mut self, cols: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for col in cols {
            let col = col.as_ref();
            if !self.contains(col) {
                let at = self.ncols();
                self.insert_zero_column(at, col);
            }
        }
    }

    /// Insert zero-filled columns right after `after`, in order.
    /// Names already present are skipped.
    pub fn insert<'a, I, S>(&mut self, after: impl Into<Col<'a>>, cols: I) -> DataResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut at = self.require(after)?;
        for col in cols {
            let col = col.as_ref();
            if !self.contains(col) {
                at += 1;
                self.insert_zero_column(at, col);
            }
        }
        Ok(())
    }

    /// Delete columns. Names that are not present are ignored.
    pub fn delete<I, S>(&mut self, cols: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let doomed: Vec<usize> = cols
            .into_iter()
            .filter_map(|c| self.index(c.as_ref()))
            .collect();
        if doomed.is_empty() {
            return;
        }
        let keep: Vec<usize> = (0..self.ncols()).filter(|i| !doomed.contains(i)).collect();
        self.keep_columns(&keep);
    }

    /// Delete columns by index address (negative allowed).
    pub fn delete_at(&mut self, col: isize) -> DataResult<()> {
        let idx = self.require(col)?;
        let keep: Vec<usize> = (0..self.ncols()).filter(|&i| i != idx).collect();
        self.keep_columns(&keep);
        Ok(())
    }

    fn keep_columns(&mut self, keep: &[usize]) {
        self.data = self.data.select(Axis(1), keep);
        self.names = keep.iter().map(|&i| self.names[i].clone()).collect();
    }

    /// Keep only the listed columns plus their complex-group variants.
    pub fn select<I, S>(&mut self, cols: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wanted: Vec<String> = Vec::new();
        for col in cols {
            let col = col.as_ref();
            wanted.push(col.to_string());
            for part in crate::complex::ComplexPart::ALL {
                wanted.push(part.column(col));
            }
        }
        let keep: Vec<usize> = (0..self.ncols())
            .filter(|&i| wanted.contains(&self.names[i]))
            .collect();
        self.keep_columns(&keep);
    }

    /// Horizontal concatenation. Row counts must match; names must stay unique.
    pub fn append_data(&mut self, other: &Dataset) -> DataResult<()> {
        if self.ncols() == 0 {
            self.names = other.names.clone();
            self.data = other.data.clone();
            return Ok(());
        }
        if other.nrows() != self.nrows() {
            return Err(DataError::RowCountMismatch {
                expected: self.nrows(),
                actual: other.nrows(),
            });
        }
        if let Some(dup) = other.names.iter().find(|n| self.contains(n)) {
            return Err(DataError::ConcatDuplicate(dup.clone()));
        }
        self.data = concatenate(Axis(1), &[self.data.view(), other.data.view()]).map_err(|_| {
            DataError::RowCountMismatch {
                expected: self.nrows(),
                actual: other.nrows(),
            }
        })?;
        self.names.extend(other.names.iter().cloned());
        Ok(())
    }

    // ========================================================================
    // Column and entry access
    // ========================================================================

    /// Borrow a column.
    pub fn get<'a>(&self, col: impl Into<Col<'a>>) -> DataResult<ArrayView1<'_, f64>> {
        let idx = self.require(col)?;
        Ok(self.data.column(idx))
    }

    /// Copy a column into a vector.
    pub fn get_vec<'a>(&self, col: impl Into<Col<'a>>) -> DataResult<Vec<f64>> {
        Ok(self.get(col)?.to_vec())
    }

    /// Mutably borrow a column.
    pub fn column_mut<'a>(&mut self, col: impl Into<Col<'a>>) -> DataResult<ArrayViewMut1<'_, f64>> {
        let idx = self.require(col)?;
        Ok(self.data.column_mut(idx))
    }

    /// Overwrite a column from a slice of length `nrows`.
    pub fn set_column<'a>(&mut self, col: impl Into<Col<'a>>, values: &[f64]) -> DataResult<()> {
        let idx = self.require(col)?;
        if values.len() != self.nrows() {
            return Err(DataError::LengthMismatch {
                expected: self.nrows(),
                actual: values.len(),
            });
        }
        for (dst, &v) in self.data.column_mut(idx).iter_mut().zip(values) {
            *dst = v;
        }
        Ok(())
    }

    /// Fill a column with one value.
    pub fn fill_column<'a>(&mut self, col: impl Into<Col<'a>>, value: f64) -> DataResult<()> {
        let idx = self.require(col)?;
        self.data.column_mut(idx).fill(value);
        Ok(())
    }

    pub fn get_entry<'a>(&self, row: isize, col: impl Into<Col<'a>>) -> DataResult<f64> {
        let c = self.require(col)?;
        let r = self.row_index(row)?;
        Ok(self.data[[r, c]])
    }

    pub fn set_entry<'a>(&mut self, row: isize, col: impl Into<Col<'a>>, value: f64) -> DataResult<()> {
        let c = self.require(col)?;
        let r = self.row_index(row)?;
        self.data[[r, c]] = value;
        Ok(())
    }

    // ========================================================================
    // Rows
    // ========================================================================

    pub fn row_get(&self, row: isize) -> DataResult<ArrayView1<'_, f64>> {
        let r = self.row_index(row)?;
        Ok(self.data.row(r))
    }

    pub fn row_set(&mut self, row: isize, values: &[f64]) -> DataResult<()> {
        let r = self.row_index(row)?;
        if values.len() != self.ncols() {
            return Err(DataError::LengthMismatch {
                expected: self.ncols(),
                actual: values.len(),
            });
        }
        for (dst, &v) in self.data.row_mut(r).iter_mut().zip(values) {
            *dst = v;
        }
        Ok(())
    }

    /// Append `number` zero-filled rows.
    pub fn row_append(&mut self, number: usize) -> DataResult<()> {
        let at = self.nrows();
        self.insert_zero_rows(at, number)
    }

    /// Insert `number` zero-filled rows before `row`.
    pub fn row_insert(&mut self, row: isize, number: usize) -> DataResult<()> {
        let at = self.row_index(row)?;
        self.insert_zero_rows(at, number)
    }

    fn insert_zero_rows(&mut self, at: usize, number: usize) -> DataResult<()> {
        if self.ncols() == 0 {
            return Err(DataError::NoColumns);
        }
        let (nrows, ncols) = self.data.dim();
        let old = &self.data;
        self.data = Array2::from_shape_fn((nrows + number, ncols), |(r, c)| {
            if r < at {
                old[[r, c]]
            } else if r < at + number {
                0.0
            } else {
                old[[r - number, c]]
            }
        });
        Ok(())
    }

    /// Append one row of values.
    pub fn push_row(&mut self, values: &[f64]) -> DataResult<()> {
        if values.len() != self.ncols() {
            return Err(DataError::LengthMismatch {
                expected: self.ncols(),
                actual: values.len(),
            });
        }
        self.row_append(1)?;
        self.row_set(-1, values)
    }

    /// Vertical concatenation. Column counts must match.
    pub fn row_append_data(&mut self, other: &Dataset) -> DataResult<()> {
        if other.ncols() != self.ncols() {
            return Err(DataError::ColumnCountMismatch {
                expected: self.ncols(),
                actual: other.ncols(),
            });
        }
        self.data = concatenate(Axis(0), &[self.data.view(), other.data.view()]).map_err(|_| {
            DataError::ColumnCountMismatch {
                expected: self.ncols(),
                actual: other.ncols(),
            }
        })?;
        Ok(())
    }

    /// Keep the rows whose mask entry is true.
    pub fn retain_rows(&mut self, mask: &[bool]) -> DataResult<()> {
        if mask.len() != self.nrows() {
            return Err(DataError::LengthMismatch {
                expected: self.nrows(),
                actual: mask.len(),
            });
        }
        let keep: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect();
        self.data = self.data.select(Axis(0), &keep);
        Ok(())
    }

    /// Stable ascending sort of the rows.
    ///
    /// The key list is reversed before a lexicographic comparison, so the
    /// last listed column is the primary key and the first listed column
    /// breaks the remaining ties. NaN sorts after all numbers.
    pub fn sort<I, S>(&mut self, cols: I) -> DataResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys = Vec::new();
        for col in cols {
            keys.push(self.require(col.as_ref())?);
        }
        keys.reverse();
        if keys.is_empty() {
            return Ok(());
        }
        let mut order: Vec<usize> = (0..self.nrows()).collect();
        let data = &self.data;
        order.sort_by(|&a, &b| {
            keys.iter()
                .map(|&k| cmp_nan_last(data[[a, k]], data[[b, k]]))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        self.data = self.data.select(Axis(0), &order);
        Ok(())
    }

    // ========================================================================
    // Copies
    // ========================================================================

    /// Deep copy.
    pub fn dup(&self) -> Dataset {
        self.clone()
    }

    /// Replace title, names and data with deep copies of `other`'s.
    pub fn become_copy(&mut self, other: &Dataset) {
        self.title = other.title.clone();
        self.names = other.names.clone();
        self.data = other.data.clone();
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.title.is_empty() {
            writeln!(f, " title:          {}", self.title)?;
        }
        writeln!(f, " number of rows: {}", self.nrows())?;
        writeln!(f, " number of cols: {}", self.ncols())?;
        writeln!(f, "{}", self.names.join(" "))?;
        for row in self.data.rows() {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Dataset {
        Dataset::from_columns(&[
            ("a", vec![1.0, 2.0, 3.0]),
            ("b", vec![10.0, 20.0, 30.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_columns_shape() {
        let d = abc();
        assert_eq!(d.nrows(), 3);
        assert_eq!(d.ncols(), 2);
        assert_eq!(d.names(), vec!["a", "b"]);
        assert_eq!(d.get_entry(2, "b").unwrap(), 30.0);
    }

    #[test]
    fn test_from_columns_length_mismatch_is_fatal() {
        let err = Dataset::from_columns(&[("a", vec![1.0]), ("b", vec![1.0, 2.0])]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_negative_indexing() {
        let mut d = abc();
        assert_eq!(d.get_entry(-1, -1).unwrap(), 30.0);
        assert_eq!(d.index(-2), Some(0));
        d.set_entry(-1, -1, 7.5).unwrap();
        assert_eq!(d.get_entry(2, 1).unwrap(), 7.5);
        assert!(d.get_entry(3, "a").is_err());
        assert!(d.get_entry(-4, "a").is_err());
        assert!(d.index(2).is_none());
    }

    #[test]
    fn test_set_get_entry_roundtrip() {
        let mut d = abc();
        for r in 0..3isize {
            for c in 0..2isize {
                let v = (r * 10 + c) as f64;
                d.set_entry(r, c, v).unwrap();
                assert_eq!(d.get_entry(r, c).unwrap(), v);
            }
        }
    }

    #[test]
    fn test_append_is_idempotent() {
        let mut d = abc();
        d.append(["x"]);
        d.append(["x"]);
        assert_eq!(d.ncols(), 3);
        assert_eq!(d.get_vec("x").unwrap(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_insert_after() {
        let mut d = abc();
        d.insert("a", ["m", "n", "b"]).unwrap();
        assert_eq!(d.names(), vec!["a", "m", "n", "b"]);
        assert_eq!(d.get_vec("b").unwrap(), vec![10.0, 20.0, 30.0]);
        assert!(d.insert("nope", ["q"]).is_err());
    }

    #[test]
    fn test_delete_and_select() {
        let mut d = abc();
        d.append(["REAL(a)", "IMAG(a)", "junk"]);
        d.delete(["junk", "missing"]);
        assert_eq!(d.names(), vec!["a", "b", "REAL(a)", "IMAG(a)"]);
        d.select(["a"]);
        assert_eq!(d.names(), vec!["a", "REAL(a)", "IMAG(a)"]);
    }

    #[test]
    fn test_unique_name() {
        let mut d = abc();
        let z = d.unique_name("z").unwrap();
        assert_eq!(z, "z");
        d.append([z.as_str()]);
        let z2 = d.unique_name("z").unwrap();
        assert_eq!(z2, "z_1");
        assert!(!d.contains(&z2));
    }

    #[test]
    fn test_dup_is_deep() {
        let d = abc();
        let mut copy = d.dup();
        copy.set_entry(0, "a", 99.0).unwrap();
        copy.append(["c"]);
        copy.rename("b", "bb").unwrap();
        assert_eq!(d.get_entry(0, "a").unwrap(), 1.0);
        assert_eq!(d.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_become_replaces_everything() {
        let mut d = abc();
        let mut other = Dataset::from_columns(&[("q", vec![5.0])]).unwrap();
        other.set_title("other");
        d.become_copy(&other);
        assert_eq!(d.title(), "other");
        assert_eq!(d.names(), vec!["q"]);
        assert_eq!(d.nrows(), 1);
        other.set_entry(0, "q", 1.0).unwrap();
        assert_eq!(d.get_entry(0, "q").unwrap(), 5.0);
    }

    #[test]
    fn test_append_data_row_mismatch_is_fatal() {
        let mut d = abc();
        let other = Dataset::from_columns(&[("c", vec![1.0])]).unwrap();
        let err = d.append_data(&other).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(d.ncols(), 2);
    }

    #[test]
    fn test_row_append_data() {
        let mut d = abc();
        let more = Dataset::from_columns(&[("a", vec![4.0]), ("b", vec![40.0])]).unwrap();
        d.row_append_data(&more).unwrap();
        assert_eq!(d.nrows(), 4);
        assert_eq!(d.get_entry(-1, "b").unwrap(), 40.0);
        let narrow = Dataset::from_columns(&[("a", vec![4.0])]).unwrap();
        assert!(d.row_append_data(&narrow).unwrap_err().is_fatal());
    }

    #[test]
    fn test_rows() {
        let mut d = abc();
        d.row_append(2).unwrap();
        assert_eq!(d.nrows(), 5);
        d.row_set(-1, &[8.0, 80.0]).unwrap();
        assert_eq!(d.row_get(4).unwrap().to_vec(), vec![8.0, 80.0]);
        assert!(d.row_set(0, &[1.0]).is_err());
        d.row_insert(0, 1).unwrap();
        assert_eq!(d.get_entry(0, "a").unwrap(), 0.0);
        assert_eq!(d.get_entry(1, "a").unwrap(), 1.0);
        assert!(Dataset::new().row_append(1).is_err());
    }

    #[test]
    fn test_sort_single_key() {
        let mut d = Dataset::from_columns(&[
            ("freq", vec![12.0, 11.9, 13.5, 11.0]),
            ("gain", vec![3.9891, 4.017, 3.5, 4.2]),
        ])
        .unwrap();
        d.sort(["freq"]).unwrap();
        assert_eq!(d.get_vec("freq").unwrap(), vec![11.0, 11.9, 12.0, 13.5]);
        assert_eq!(d.get_vec("gain").unwrap(), vec![4.2, 4.017, 3.9891, 3.5]);
    }

    #[test]
    fn test_sort_last_key_is_primary() {
        let mut d = Dataset::from_columns(&[
            ("a", vec![2.0, 1.0, 2.0, 1.0]),
            ("b", vec![1.0, 1.0, 0.0, 0.0]),
        ])
        .unwrap();
        d.sort(["a", "b"]).unwrap();
        assert_eq!(d.get_vec("b").unwrap(), vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(d.get_vec("a").unwrap(), vec![1.0, 2.0, 1.0, 2.0]);
    }

    #[test]
    fn test_retain_rows() {
        let mut d = abc();
        d.retain_rows(&[true, false, true]).unwrap();
        assert_eq!(d.get_vec("a").unwrap(), vec![1.0, 3.0]);
    }
}
