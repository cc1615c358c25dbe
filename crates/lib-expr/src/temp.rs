//! Scoped temporary columns.

use lib_types::dataset::UNIQUE_NAME_ATTEMPTS;
use lib_types::{ComplexPart, DataError, DataResult, Dataset};
use std::ops::{Deref, DerefMut};

/// Mutable borrow of a [`Dataset`] that owns some of its columns for the
/// duration of a computation.
///
/// Every real temporary, and every column of the complex group of every
/// complex temporary, is deleted when the guard is dropped, including on
/// early return through `?`.
pub struct TempColumns<'d> {
    ds: &'d mut Dataset,
    real: Vec<String>,
    complex: Vec<String>,
}

impl<'d> TempColumns<'d> {
    pub fn new(ds: &'d mut Dataset) -> Self {
        Self {
            ds,
            real: Vec::new(),
            complex: Vec::new(),
        }
    }

    /// Take ownership of already-named columns, e.g. tokenizer temporaries.
    pub fn adopt<I, S>(ds: &'d mut Dataset, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = Self::new(ds);
        guard.real.extend(names.into_iter().map(Into::into));
        guard
    }

    /// Create a zero-filled real temporary named after `prefix`.
    pub fn real(&mut self, prefix: &str) -> DataResult<String> {
        let name = self.ds.unique_name(prefix)?;
        self.ds.append([name.as_str()]);
        self.real.push(name.clone());
        Ok(name)
    }

    /// Reserve a complex variable name whose REAL/IMAG/MAG/DB/PH columns are
    /// all unused. The columns themselves appear on first assignment.
    pub fn complex(&mut self, prefix: &str) -> DataResult<String> {
        let free = |ds: &Dataset, var: &str| {
            ComplexPart::ALL
                .iter()
                .all(|p| !ds.contains(&p.column(var)))
                && !self.complex.iter().any(|v| v == var)
        };
        let mut chosen = None;
        if free(self.ds, prefix) {
            chosen = Some(prefix.to_string());
        } else {
            for i in 1..=UNIQUE_NAME_ATTEMPTS {
                let var = format!("{}_{}", prefix, i);
                if free(self.ds, &var) {
                    chosen = Some(var);
                    break;
                }
            }
        }
        let var = chosen.ok_or_else(|| DataError::UniqueNameExhausted(prefix.to_string()))?;
        self.complex.push(var.clone());
        Ok(var)
    }
}

impl Deref for TempColumns<'_> {
    type Target = Dataset;

    fn deref(&self) -> &Dataset {
        self.ds
    }
}

impl DerefMut for TempColumns<'_> {
    fn deref_mut(&mut self) -> &mut Dataset {
        self.ds
    }
}

impl Drop for TempColumns<'_> {
    fn drop(&mut self) {
        self.ds.delete(self.real.iter());
        for var in &self.complex {
            self.ds.delete(Dataset::cx_group_names(var));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_removed_on_drop() {
        let mut d = Dataset::from_columns(&[("t", vec![0.0, 1.0])]).unwrap();
        {
            let mut tmp = TempColumns::new(&mut d);
            let a = tmp.real("t").unwrap();
            assert_eq!(a, "t_1");
            let z = tmp.complex("z").unwrap();
            tmp.cxreim(&z, true).unwrap();
            tmp.cxmag(&z).unwrap();
            assert_eq!(tmp.ncols(), 7);
        }
        assert_eq!(d.names(), vec!["t"]);
    }

    #[test]
    fn test_removed_on_error_path() {
        fn failing(d: &mut Dataset) -> DataResult<()> {
            let mut tmp = TempColumns::new(d);
            let a = tmp.real("scratch")?;
            tmp.get_entry(5, a.as_str())?;
            Ok(())
        }
        let mut d = Dataset::from_columns(&[("t", vec![0.0])]).unwrap();
        assert!(failing(&mut d).is_err());
        assert_eq!(d.names(), vec!["t"]);
    }

    #[test]
    fn test_complex_names_do_not_repeat() {
        let mut d = Dataset::from_columns(&[("t", vec![0.0])]).unwrap();
        let mut tmp = TempColumns::new(&mut d);
        let a = tmp.complex("w").unwrap();
        let b = tmp.complex("w").unwrap();
        assert_ne!(a, b);
    }
}
