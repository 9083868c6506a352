//! Biquad sections and per-band cascades

use terza_core::{BandCoeffs, BiquadCoeffs};

/// A single second-order IIR stage: fixed coefficients, mutable delay state
///
/// State and arithmetic are kept in `f64` regardless of the buffer sample
/// type; the low-band poles sit close enough to the unit circle that `f32`
/// recursion drifts audibly.
#[derive(Debug, Clone)]
pub struct BiquadSection {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z0: f64,
    z1: f64,
}

impl BiquadSection {
    /// Build a section from pre-normalized coefficients (`a0` = 1)
    pub fn new(coeffs: &BiquadCoeffs) -> Self {
        Self {
            b0: coeffs.b0,
            b1: coeffs.b1,
            b2: coeffs.b2,
            a1: coeffs.a1,
            a2: coeffs.a2,
            z0: 0.0,
            z1: 0.0,
        }
    }

    /// Advance the section by one sample
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.z0;
        self.z0 = self.b1 * input - self.a1 * output + self.z1;
        self.z1 = self.b2 * input - self.a2 * output;
        output
    }

    /// Clear the delay line
    pub fn reset(&mut self) {
        self.z0 = 0.0;
        self.z1 = 0.0;
    }
}

/// One third-octave bandpass filter: 1 or 2 sections in cascade
///
/// Sections run in the exact order the coefficient table supplies them;
/// the table owner factored the response into stages and the grouping of
/// poles with zeros is part of the design.
#[derive(Debug, Clone)]
pub struct FilterBand {
    center_hz: f64,
    sections: Vec<BiquadSection>,
}

impl FilterBand {
    /// Build a band cascade from its coefficient set
    pub fn new(coeffs: &BandCoeffs) -> Self {
        Self {
            center_hz: coeffs.center_hz,
            sections: coeffs.sections.iter().map(BiquadSection::new).collect(),
        }
    }

    /// Advance the whole cascade by one sample
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let mut sample = input;
        for section in &mut self.sections {
            sample = section.process(sample);
        }
        sample
    }

    /// Clear every section's delay line
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Nominal center frequency in Hz (identification only)
    pub fn center_hz(&self) -> f64 {
        self.center_hz
    }

    /// Number of sections in the cascade
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}
