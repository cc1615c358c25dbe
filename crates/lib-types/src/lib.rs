//! # lib-types
//!
//! Core type definitions for the wavetab waveform data engine.
//!
//! This crate provides the foundation used throughout the wavetab workspace:
//! - [`Dataset`]: named columns over a dense `f64` matrix
//! - Complex column groups (`REAL/IMAG/MAG/DB/PH`)
//! - Column statistics and elementwise numeric helpers

pub mod complex;
pub mod dataset;
pub mod error;
pub mod numeric;
pub mod stats;

pub use complex::ComplexPart;
pub use dataset::{Col, Dataset};
pub use error::{DataError, DataResult};

/// Re-export num_complex for convenience
pub use num_complex::Complex64;
