//! # lib-dsp
//!
//! Waveform analyses over [`lib_types::Dataset`] records.
//!
//! - **Crossings**: interpolated level crossings and rising/falling edges
//! - **Timing**: periods, duty cycle, rise/fall bands, delays and skews
//! - **Jitter**: absolute, period and cycle-to-cycle jitter against an ideal clock
//! - **Spectral**: windowed real FFT, Fourier series, loop-gain figures
//! - **Filters**: single-pole low pass and moving average
//! - **Networks**: one- and two-port Y/Z/H/S conversions
//! - **Measurements**: averages, RMS, fits, bus decoding, eye folding
//!
//! Analyses that need scratch columns create them through
//! [`lib_expr::TempColumns`], so the input keeps its original columns.

pub mod crossings;
pub mod error;
pub mod eye;
pub mod fft;
pub mod filter;
pub mod fourier;
pub mod jitter;
pub mod loop_response;
pub mod measure;
pub mod network;
pub mod regression;
pub mod report;
pub mod timing;
pub mod window;

pub use crossings::{crossings, find_crossings, Edge};
pub use error::{DspError, DspResult};
pub use eye::{eye_time, osc_time};
pub use fft::{fft, FftEngine};
pub use filter::{lpf, moving_average_filter};
pub use fourier::{fourcoeff, FourierSeries};
pub use jitter::{jitter, Jitter, JitterMetrics, JitterOptions};
pub use loop_response::{low_pass_pars, LoopResponse};
pub use measure::{a2d, period_time_average, rms, time_average, CycleSplit};
pub use regression::{linreg, quadreg, Regression};
pub use timing::{delays, edges, measure_duty, measure_freq, periods, skews, CrossingPair};
pub use window::Window;
