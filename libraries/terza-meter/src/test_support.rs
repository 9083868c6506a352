//! Shared unit-test fixtures
//!
//! Stand-in coefficient tables built from textbook constant-peak-gain
//! bandpass sections, taking the place of an externally designed table.

use std::f64::consts::PI;

use terza_core::{BandCoeffs, BiquadCoeffs, CoeffTable, FilterOrder, THIRD_OCTAVE_CENTERS_HZ};

/// Quality factor of a third-octave band
pub const THIRD_OCTAVE_Q: f64 = 4.32;

/// One bandpass section with unity gain at the center frequency
pub fn bandpass_section(center_hz: f64, sample_rate: f64, q: f64) -> BiquadCoeffs {
    let omega = 2.0 * PI * center_hz / sample_rate;
    let alpha = omega.sin() / (2.0 * q);
    let a0 = 1.0 + alpha;
    BiquadCoeffs {
        b0: alpha / a0,
        b1: 0.0,
        b2: -alpha / a0,
        a1: -2.0 * omega.cos() / a0,
        a2: (1.0 - alpha) / a0,
    }
}

/// A full 31-band table for the nominal third-octave centers
pub fn bandpass_table(sample_rate: f64, order: FilterOrder) -> CoeffTable {
    CoeffTable {
        sample_rate,
        order,
        bands: THIRD_OCTAVE_CENTERS_HZ
            .iter()
            .map(|&center_hz| BandCoeffs {
                center_hz,
                sections: vec![
                    bandpass_section(center_hz, sample_rate, THIRD_OCTAVE_Q);
                    order.sections_per_band()
                ],
            })
            .collect(),
    }
}

/// Mono sine, unit amplitude scaled by `amplitude`
pub fn sine(frequency: f64, sample_rate: f64, count: usize, amplitude: f32) -> Vec<f32> {
    (0..count)
        .map(|i| ((2.0 * PI * frequency * i as f64 / sample_rate).sin() as f32) * amplitude)
        .collect()
}

/// Interleave a mono signal into the left channel, silent right channel
pub fn left_interleaved(samples: &[f32]) -> Vec<f32> {
    samples.iter().flat_map(|&s| [s, 0.0]).collect()
}
