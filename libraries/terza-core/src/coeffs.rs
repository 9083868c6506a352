//! Externally designed filter coefficients
//!
//! The metering engine never computes filter coefficients. A design tool
//! produces one [`CoeffTable`] per (sample rate, order) pair and the engine
//! consumes it as opaque data at initialization. All tables are expected to
//! be pre-normalized so that the leading denominator coefficient `a0` is 1;
//! only the remaining five coefficients are carried per section.

use serde::{Deserialize, Serialize};

use crate::error::{MeterError, Result};
use crate::types::FilterOrder;
use crate::NUM_BANDS;

/// One second-order section, `a0` pre-normalized to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiquadCoeffs {
    /// Numerator coefficients
    pub b0: f64,
    /// Numerator, first delay tap
    pub b1: f64,
    /// Numerator, second delay tap
    pub b2: f64,
    /// Denominator, first delay tap (`a0` is implied 1)
    pub a1: f64,
    /// Denominator, second delay tap
    pub a2: f64,
}

impl BiquadCoeffs {
    fn is_finite(&self) -> bool {
        self.b0.is_finite()
            && self.b1.is_finite()
            && self.b2.is_finite()
            && self.a1.is_finite()
            && self.a2.is_finite()
    }
}

/// The cascade realizing one third-octave bandpass filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandCoeffs {
    /// Nominal center frequency in Hz (identification only)
    pub center_hz: f64,
    /// Sections in cascade order; reordering changes the filter
    pub sections: Vec<BiquadCoeffs>,
}

/// A complete 31-band coefficient table for one sample rate and order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoeffTable {
    /// Sample rate the table was designed for, in Hz
    pub sample_rate: f64,
    /// Filter order the table realizes
    pub order: FilterOrder,
    /// Exactly 31 bands, ascending center frequency
    pub bands: Vec<BandCoeffs>,
}

impl CoeffTable {
    /// Check that the table is usable by the engine
    ///
    /// Enforces: positive finite sample rate, exactly 31 bands, the
    /// section count each band carries matches the declared order, centers
    /// strictly ascending, and every coefficient finite.
    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(MeterError::InvalidSampleRate(self.sample_rate));
        }

        if self.bands.len() != NUM_BANDS {
            return Err(MeterError::InvalidCoefficients(format!(
                "expected {} bands, got {}",
                NUM_BANDS,
                self.bands.len()
            )));
        }

        let sections = self.order.sections_per_band();
        for (index, band) in self.bands.iter().enumerate() {
            if band.sections.len() != sections {
                return Err(MeterError::InvalidCoefficients(format!(
                    "band {} ({} Hz) has {} sections, order {} requires {}",
                    index,
                    band.center_hz,
                    band.sections.len(),
                    self.order.as_u32(),
                    sections
                )));
            }
            if !band.center_hz.is_finite() || band.center_hz <= 0.0 {
                return Err(MeterError::InvalidCoefficients(format!(
                    "band {} has invalid center frequency {}",
                    index, band.center_hz
                )));
            }
            for section in &band.sections {
                if !section.is_finite() {
                    return Err(MeterError::InvalidCoefficients(format!(
                        "band {} ({} Hz) contains non-finite coefficients",
                        index, band.center_hz
                    )));
                }
            }
        }

        for window in self.bands.windows(2) {
            if window[0].center_hz >= window[1].center_hz {
                return Err(MeterError::InvalidCoefficients(format!(
                    "center frequencies must ascend ({} Hz then {} Hz)",
                    window[0].center_hz, window[1].center_hz
                )));
            }
        }

        Ok(())
    }
}
