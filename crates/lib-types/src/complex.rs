//! Complex column groups.
//!
//! A complex variable `x` is stored as two adjacent real columns
//! `REAL(x)` and `IMAG(x)`, optionally followed by the derived columns
//! `MAG(x)`, `DB(x)` and `PH(x)` (degrees, unwrapped). Derived columns are
//! always regenerated from the REAL/IMAG pair, never updated in place.

use crate::dataset::Dataset;
use crate::error::{DataError, DataResult};
use crate::numeric::unwrap_phase;
use num_complex::Complex64;

/// One column of a complex group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComplexPart {
    Real,
    Imag,
    Mag,
    Db,
    Ph,
}

impl ComplexPart {
    pub const ALL: [ComplexPart; 5] = [Self::Real, Self::Imag, Self::Mag, Self::Db, Self::Ph];

    /// Column-name prefix used for this part.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Real => "REAL",
            Self::Imag => "IMAG",
            Self::Mag => "MAG",
            Self::Db => "DB",
            Self::Ph => "PH",
        }
    }

    /// Column name of this part for variable `var`, e.g. `REAL(var)`.
    pub fn column(self, var: &str) -> String {
        format!("{}({})", self.prefix(), var)
    }

    /// Split a column name such as `DB(vout)` into its part and variable.
    pub fn parse(name: &str) -> Option<(ComplexPart, &str)> {
        let open = name.find('(')?;
        let inner = name[open + 1..].strip_suffix(')')?;
        if inner.is_empty() {
            return None;
        }
        let part = Self::ALL
            .into_iter()
            .find(|p| p.prefix() == &name[..open])?;
        Some((part, inner))
    }
}

/// Magnitude floor used when converting to decibels.
pub const DB_FLOOR: f64 = 1e-300;

impl Dataset {
    /// Indices of the REAL/IMAG pair of `var`, if both exist.
    pub fn cx_pair(&self, var: &str) -> Option<(usize, usize)> {
        let re = self.index(ComplexPart::Real.column(var).as_str())?;
        let im = self.index(ComplexPart::Imag.column(var).as_str())?;
        Some((re, im))
    }

    /// Resolve the REAL/IMAG pair of `var`, appending it when `create` is set.
    pub fn cxreim(&mut self, var: &str, create: bool) -> DataResult<(usize, usize)> {
        let re = ComplexPart::Real.column(var);
        let im = ComplexPart::Imag.column(var);
        if create {
            self.append([re.as_str(), im.as_str()]);
            let ire = self
                .index(re.as_str())
                .ok_or_else(|| DataError::MissingAfterAppend(re.clone()))?;
            let iim = self
                .index(im.as_str())
                .ok_or_else(|| DataError::MissingAfterAppend(im.clone()))?;
            return Ok((ire, iim));
        }
        match self.cx_pair(var) {
            Some(pair) => Ok(pair),
            None => {
                tracing::warn!("real or imaginary column for {} not found", var);
                Err(DataError::ColumnNotFound(var.to_string()))
            }
        }
    }

    /// Complex values of `var` from its REAL/IMAG pair.
    pub fn cx_values(&self, var: &str) -> DataResult<Vec<Complex64>> {
        let (ire, iim) = self
            .cx_pair(var)
            .ok_or_else(|| DataError::ColumnNotFound(var.to_string()))?;
        let m = self.matrix();
        Ok(m.column(ire)
            .iter()
            .zip(m.column(iim).iter())
            .map(|(&re, &im)| Complex64::new(re, im))
            .collect())
    }

    /// Write complex values into the REAL/IMAG pair of `var` (created if
    /// needed) and regenerate the derived columns.
    pub fn set_cx_values(&mut self, var: &str, values: &[Complex64]) -> DataResult<()> {
        self.cxreim(var, true)?;
        let re: Vec<f64> = values.iter().map(|z| z.re).collect();
        let im: Vec<f64> = values.iter().map(|z| z.im).collect();
        self.set_column(ComplexPart::Real.column(var).as_str(), &re)?;
        self.set_column(ComplexPart::Imag.column(var).as_str(), &im)?;
        self.cxmag(var)?;
        Ok(())
    }

    /// Generate `MAG`, `DB` and `PH` columns after `IMAG(var)`.
    ///
    /// Returns `false` without touching the dataset when the REAL/IMAG pair
    /// is missing.
    pub fn cxmag(&mut self, var: &str) -> DataResult<bool> {
        let Some((ire, iim)) = self.cx_pair(var) else {
            return Ok(false);
        };
        let (mag, db, ph) = {
            let m = self.matrix();
            let re = m.column(ire);
            let im = m.column(iim);
            let mag: Vec<f64> = re.iter().zip(im.iter()).map(|(r, i)| r.hypot(*i)).collect();
            let db: Vec<f64> = mag.iter().map(|v| 20.0 * v.max(DB_FLOOR).log10()).collect();
            let angle: Vec<f64> = re.iter().zip(im.iter()).map(|(r, i)| i.atan2(*r)).collect();
            let ph: Vec<f64> = unwrap_phase(&angle).into_iter().map(f64::to_degrees).collect();
            (mag, db, ph)
        };
        let names = [
            ComplexPart::Mag.column(var),
            ComplexPart::Db.column(var),
            ComplexPart::Ph.column(var),
        ];
        self.insert(iim, names.iter())?;
        self.set_column(&names[0], &mag)?;
        self.set_column(&names[1], &db)?;
        self.set_column(&names[2], &ph)?;
        Ok(true)
    }

    /// Names of every column belonging to the complex group of `var`.
    pub fn cx_group_names(var: &str) -> Vec<String> {
        ComplexPart::ALL.iter().map(|p| p.column(var)).collect()
    }

    /// Complex variables present as REAL/IMAG pairs, in column order.
    pub fn cx_vars(&self) -> Vec<String> {
        let mut vars: Vec<String> = Vec::new();
        for name in self.column_names() {
            if let Some((ComplexPart::Real, var)) = ComplexPart::parse(name) {
                if self.cx_pair(var).is_some() && !vars.iter().any(|v| v == var) {
                    vars.push(var.to_string());
                }
            }
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_part() {
        assert_eq!(ComplexPart::parse("DB(vout)"), Some((ComplexPart::Db, "vout")));
        assert_eq!(ComplexPart::parse("REAL(v(a))"), Some((ComplexPart::Real, "v(a)")));
        assert_eq!(ComplexPart::parse("v(out)"), None);
        assert_eq!(ComplexPart::parse("MAG()"), None);
    }

    #[test]
    fn test_cxmag_generates_group() {
        let mut d = Dataset::from_columns(&[
            ("f", vec![1.0, 2.0]),
            ("REAL(z)", vec![3.0, 0.0]),
            ("IMAG(z)", vec![4.0, -1.0]),
            ("tail", vec![0.0, 0.0]),
        ])
        .unwrap();
        assert!(d.cxmag("z").unwrap());
        assert_eq!(
            d.names(),
            vec!["f", "REAL(z)", "IMAG(z)", "MAG(z)", "DB(z)", "PH(z)", "tail"]
        );
        assert!((d.get_entry(0, "MAG(z)").unwrap() - 5.0).abs() < 1e-12);
        assert!((d.get_entry(0, "DB(z)").unwrap() - 20.0 * 5f64.log10()).abs() < 1e-12);
        assert!((d.get_entry(1, "PH(z)").unwrap() + 90.0).abs() < 1e-12);
        assert!(!d.cxmag("nothing").unwrap());
    }

    #[test]
    fn test_cxreim_create() {
        let mut d = Dataset::from_columns(&[("x", vec![1.0])]).unwrap();
        assert!(d.cxreim("y", false).is_err());
        let (re, im) = d.cxreim("y", true).unwrap();
        assert_eq!((re, im), (1, 2));
        assert_eq!(d.cx_vars(), vec!["y"]);
    }
}
