//! # lib-formats
//!
//! Readers and writers for simulator and measurement data files.
//!
//! Readers:
//! - space- and comma-separated tables (with multiple header blocks)
//! - SPICE rawfiles (generic, Spectre, LTspice and SmartSpice dialects)
//! - CSDF, HSpice `.tr0`/`.ac0`, PSF-ASCII, UTMOST and Spectre S-parameters
//!
//! Writers: space-separated, comma-separated, ASCII rawfile and SPICE PWL
//! sources.
//!
//! Every reader produces a [`lib_types::Dataset`]. [`read_file`] picks the
//! reader from the file contents unless a format is given.

mod cursor;
mod table;

pub mod csdf;
pub mod csv;
pub mod detect;
pub mod error;
pub mod hspice;
pub mod nutmeg;
pub mod psf;
pub mod sspar;
pub mod ssv;
pub mod utmost;
pub mod writer;

pub use csdf::{read_csdf, read_csdf_file};
pub use csv::{read_csv, read_csv_file};
pub use detect::{datafile_format, detect_format, DataFormat};
pub use error::{ReadError, ReadResult};
pub use hspice::{read_hspice, read_hspice_file};
pub use nutmeg::{nutmeg_blocks, nutmeg_blocks_file, read_nutmeg, read_nutmeg_file};
pub use psf::{read_psf, read_psf_file, PsfFile};
pub use sspar::{read_sspar, read_sspar_file};
pub use ssv::{read_ssv, read_ssv_file};
pub use utmost::{read_utmost, read_utmost_file};
pub use writer::{
    write_csv, write_csv_file, write_nutmeg, write_nutmeg_file, write_pwl, write_pwl_file,
    write_ssv, write_ssv_file, NutmegHeader,
};

use lib_types::Dataset;
use std::path::Path;

/// Read block `block` of a data file.
///
/// Without an explicit `format` the file is classified with
/// [`datafile_format`]; formats without a recognizable head (psf, utmost,
/// sspar) must be named. Formats that hold a single table ignore `block`.
pub fn read_file(path: &Path, block: usize, format: Option<DataFormat>) -> ReadResult<Dataset> {
    let format = match format {
        Some(f) => f,
        None => datafile_format(path)?.ok_or_else(|| {
            tracing::warn!("{}: cannot determine data file format", path.display());
            ReadError::UnknownFormat
        })?,
    };
    tracing::debug!("reading {} as {}", path.display(), format);
    match format {
        DataFormat::Ssv => read_ssv_file(path, block),
        DataFormat::Csv => read_csv_file(path, block),
        DataFormat::Nutmeg => read_nutmeg_file(path, block),
        DataFormat::Csdf => read_csdf_file(path),
        DataFormat::Hspice => read_hspice_file(path),
        DataFormat::Psf => read_psf_file(path),
        DataFormat::Utmost => read_utmost_file(path, block),
        DataFormat::Sspar => read_sspar_file(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_file_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let ssv = dir.path().join("a.col");
        std::fs::write(&ssv, "x y\n1 2\n3 4\n").unwrap();
        let d = read_file(&ssv, 0, None).unwrap();
        assert_eq!(d.names(), vec!["x", "y"]);
        assert_eq!(d.get_vec("y").unwrap(), vec![2.0, 4.0]);

        let psf = dir.path().join("a.psf");
        std::fs::write(&psf, "HEADER\n\"PSFversion\" \"1.00\"\nVALUE\n\"t\" 0\n\"t\" 1\nEND\n").unwrap();
        assert!(matches!(read_file(&psf, 0, None), Err(ReadError::UnknownFormat)));
        assert_eq!(read_file(&psf, 0, Some(DataFormat::Psf)).unwrap().nrows(), 2);
    }
}
