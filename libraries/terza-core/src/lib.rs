//! Terza Core
//!
//! Platform-agnostic foundation types for the Terza third-octave metering
//! engine.
//!
//! This crate defines:
//! - **Coefficient Model**: [`BiquadCoeffs`], [`BandCoeffs`], [`CoeffTable`] -
//!   externally designed filter coefficients, consumed as opaque data
//! - **Routing & Order Types**: [`ChannelMode`], [`FilterOrder`]
//! - **Error Handling**: Unified [`MeterError`] and [`Result`] types
//!
//! The engine itself lives in `terza-meter`; this crate carries no DSP.
//!
//! # Example
//!
//! ```rust
//! use terza_core::{ChannelMode, FilterOrder, NUM_BANDS};
//!
//! let order = FilterOrder::from_raw(4);
//! assert_eq!(order.sections_per_band(), 2);
//! assert_eq!(NUM_BANDS, 31);
//! assert_eq!(ChannelMode::default(), ChannelMode::Left);
//! ```

#![forbid(unsafe_code)]

pub mod coeffs;
pub mod error;
pub mod types;

pub use coeffs::{BandCoeffs, BiquadCoeffs, CoeffTable};
pub use error::{MeterError, Result};
pub use types::{ChannelMode, FilterOrder};

/// Number of third-octave bands covering 20 Hz - 20 kHz
pub const NUM_BANDS: usize = 31;

/// Nominal third-octave band center frequencies (Hz)
///
/// These identify the bands; processing uses only the supplied
/// coefficients, never these values.
pub const THIRD_OCTAVE_CENTERS_HZ: [f64; NUM_BANDS] = [
    20.0, 25.0, 31.5, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0, 315.0, 400.0,
    500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0, 3150.0, 4000.0, 5000.0, 6300.0,
    8000.0, 10000.0, 12500.0, 16000.0, 20000.0,
];
