//! Integration tests for terza-meter
//!
//! Tests include:
//! - Calibration against the reference level formula
//! - Channel routing and stereo accumulation semantics
//! - Long-run filter stability
//! - Property-based tests with proptest

use std::f64::consts::PI;

use proptest::prelude::*;
use terza_core::{
    BandCoeffs, BiquadCoeffs, ChannelMode, CoeffTable, FilterOrder, NUM_BANDS,
    THIRD_OCTAVE_CENTERS_HZ,
};
use terza_meter::{FilterBank, Meter};

const SR: f64 = 48000.0;

/// 1 kHz sits at index 17 of the nominal center table
const BAND_1K: usize = 17;

// ========== Helper Functions ==========

/// Quality factor of a third-octave band
const THIRD_OCTAVE_Q: f64 = 4.32;

/// One constant-peak-gain bandpass section (unity gain at center)
fn bandpass_section(center_hz: f64, sample_rate: f64, q: f64) -> BiquadCoeffs {
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

/// A full 31-band table, standing in for an externally designed one
fn bandpass_table(sample_rate: f64, order: FilterOrder) -> CoeffTable {
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

fn active_bank(order: FilterOrder) -> FilterBank {
    let mut bank = FilterBank::new(&bandpass_table(SR, order)).unwrap();
    bank.set_bypass(false);
    bank
}

/// Generate a mono sine wave
fn generate_sine(frequency: f64, sample_rate: f64, count: usize, amplitude: f32) -> Vec<f32> {
    (0..count)
        .map(|i| ((2.0 * PI * frequency * i as f64 / sample_rate).sin() as f32) * amplitude)
        .collect()
}

/// Interleave mono samples into the chosen channel, other channel silent
fn interleave(samples: &[f32], channel: usize) -> Vec<f32> {
    samples
        .iter()
        .flat_map(|&s| if channel == 0 { [s, 0.0] } else { [0.0, s] })
        .collect()
}

/// Deterministic noise in [-1, 1] via a simple LCG (reproducible tests)
fn lcg_noise(count: usize, seed: &mut u64) -> Vec<f32> {
    (0..count)
        .map(|_| {
            *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((*seed >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect()
}

// ========== Calibration ==========

#[test]
fn calibration_matches_reference_level() {
    // A sustained unit sine at a band's center passes at unity gain; over
    // one full window the RMS is 1/sqrt(2), so the first published level
    // is 10*log10(1/sqrt(2)) + 120 = 118.49 dB.
    let mut bank = active_bank(FilterOrder::Second);

    let tone = generate_sine(1000.0, SR, 6000, 1.0);
    bank.process(&interleave(&tone, 0));

    let level = bank.level(BAND_1K).unwrap();
    let expected = 10.0 * (1.0_f32 / 2.0_f32.sqrt()).log10() + 120.0;
    assert!(
        (level - expected).abs() < 0.35,
        "expected ~{expected:.2} dB at the 1 kHz band, got {level:.2}"
    );
}

#[test]
fn calibration_constant_shifts_levels() {
    let mut bank = active_bank(FilterOrder::Second);
    bank.set_calibration_db(94.0);

    let tone = generate_sine(1000.0, SR, 6000, 1.0);
    bank.process(&interleave(&tone, 0));

    let level = bank.level(BAND_1K).unwrap();
    let expected = 10.0 * (1.0_f32 / 2.0_f32.sqrt()).log10() + 94.0;
    assert!(
        (level - expected).abs() < 0.35,
        "expected ~{expected:.2} dB with 94 dB calibration, got {level:.2}"
    );
}

#[test]
fn bands_are_selective() {
    // A 1 kHz tone should register far louder in its own band than in the
    // outermost bands.
    let mut bank = active_bank(FilterOrder::Second);

    let tone = generate_sine(1000.0, SR, 6000, 1.0);
    bank.process(&interleave(&tone, 0));

    let at_center = bank.level(BAND_1K).unwrap();
    let at_20_hz = bank.level(0).unwrap();
    let at_20_khz = bank.level(30).unwrap();

    assert!(
        at_center - at_20_hz > 15.0,
        "20 Hz band rejected only {:.1} dB",
        at_center - at_20_hz
    );
    assert!(
        at_center - at_20_khz > 10.0,
        "20 kHz band rejected only {:.1} dB",
        at_center - at_20_khz
    );
}

// ========== Channel Routing ==========

#[test]
fn right_mode_reads_the_right_channel() {
    let tone = generate_sine(1000.0, SR, 6000, 1.0);
    let right_only = interleave(&tone, 1);

    let mut right_bank = active_bank(FilterOrder::Second);
    right_bank.set_channel_mode(ChannelMode::Right);
    right_bank.process(&right_only);
    assert!(
        right_bank.level(BAND_1K).unwrap() > 100.0,
        "right mode must pick up the tone"
    );

    // The same buffer through left mode sees only silence.
    let mut left_bank = active_bank(FilterOrder::Second);
    left_bank.process(&right_only);
    assert_eq!(left_bank.level(BAND_1K).unwrap(), 0.0);
}

#[test]
fn stereo_matches_equivalent_sample_sequence() {
    // Dual-mono stereo drives the shared filters with left then right per
    // pair. Feeding the identical flat sample sequence through left-only
    // routing must therefore accumulate the exact same sums.
    let mut seed = 7_u64;
    let samples = lcg_noise(6000, &mut seed);

    let mut stereo_bank = active_bank(FilterOrder::Second);
    stereo_bank.set_channel_mode(ChannelMode::Stereo);
    stereo_bank.process(&samples); // 3000 pairs = 6000 accumulated samples

    let mut left_bank = active_bank(FilterOrder::Second);
    left_bank.process(&interleave(&samples, 0)); // same 6000 samples

    assert_eq!(stereo_bank.levels(), left_bank.levels());
}

#[test]
fn stereo_advances_counter_twice_per_pair() {
    let mut bank = active_bank(FilterOrder::Second);
    bank.set_channel_mode(ChannelMode::Stereo);

    let mut seed = 11_u64;
    let buffer = lcg_noise(500, &mut seed); // 250 pairs
    bank.process(&buffer);

    assert_eq!(bank.samples_count(), 500);
}

// ========== Bypass ==========

#[test]
fn bypass_preserves_filter_state_exactly() {
    let mut seed = 3_u64;
    let ignored = lcg_noise(4096, &mut seed);
    let tone = interleave(&generate_sine(1000.0, SR, 6000, 0.8), 0);

    // Bank A sees a buffer while bypassed, then the tone.
    let mut bypassed_first = FilterBank::new(&bandpass_table(SR, FilterOrder::Second)).unwrap();
    bypassed_first.process(&ignored);
    bypassed_first.set_bypass(false);
    bypassed_first.process(&tone);

    // Bank B only ever sees the tone.
    let mut fresh = active_bank(FilterOrder::Second);
    fresh.process(&tone);

    assert_eq!(bypassed_first.levels(), fresh.levels());
}

// ========== Stability ==========

#[test]
fn worst_case_band_survives_a_million_samples() {
    // Highest band, fourth order, driven hard with full-scale noise: the
    // recursion must stay bounded over a long run.
    let mut bank = active_bank(FilterOrder::Fourth);

    let mut seed = 42_u64;
    let chunk = 4800;
    let mut processed = 0_usize;
    while processed < 1_050_000 {
        let noise = lcg_noise(chunk, &mut seed);
        bank.process(&interleave(&noise, 0));
        processed += chunk;
    }

    for band in 0..NUM_BANDS {
        let level = bank.level(band).unwrap();
        assert!(
            level.is_finite(),
            "band {band} published a non-finite level"
        );
        assert!(
            level < 200.0,
            "band {band} diverged to {level} dB"
        );
    }
}

// ========== Configuration Input ==========

#[test]
fn coefficient_table_loads_from_json() {
    let table = bandpass_table(SR, FilterOrder::Fourth);
    let json = serde_json::to_string(&table).unwrap();

    let loaded: CoeffTable = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded.order, FilterOrder::Fourth);

    let mut meter = Meter::new();
    meter.allocate(&loaded).unwrap();
    meter.set_bypass(false).unwrap();

    let tone = generate_sine(1000.0, SR, 6000, 1.0);
    meter.process(&interleave(&tone, 0)).unwrap();
    assert!(meter.level(BAND_1K).unwrap() > 100.0);
}

#[test]
fn window_length_follows_sample_rate() {
    let bank = FilterBank::new(&bandpass_table(44100.0, FilterOrder::Second)).unwrap();
    // floor(44100 / 1000 * 125) = 5512
    assert_eq!(bank.window_samples(), 5512);
}

// ========== Property-Based Tests ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Any finite buffer, any routing: published levels stay finite and
    /// the in-flight counter stays below the window threshold.
    #[test]
    fn levels_stay_finite(
        samples in prop::collection::vec(-1.0_f32..1.0, 0..1024),
        mode_index in 0_usize..3,
    ) {
        let mut bank = active_bank(FilterOrder::Second);
        bank.set_integration_ms(1).unwrap(); // 48-sample windows
        bank.set_channel_mode(match mode_index {
            0 => ChannelMode::Left,
            1 => ChannelMode::Right,
            _ => ChannelMode::Stereo,
        });

        bank.process(&samples);

        prop_assert!(bank.samples_count() < bank.window_samples());
        for band in 0..NUM_BANDS {
            let level = bank.level(band).unwrap();
            prop_assert!(level.is_finite());
        }
    }

    /// Silence never disturbs a silent meter, regardless of buffer shape.
    #[test]
    fn silence_publishes_the_floor(len in 0_usize..16384) {
        let mut bank = active_bank(FilterOrder::Second);
        let silence = vec![0.0_f32; len];
        bank.process(&silence);

        for band in 0..NUM_BANDS {
            let level = bank.level(band).unwrap();
            // Either still unpublished (0.0 default) or the clamped floor
            // plus default calibration, which is also exactly 0.0.
            prop_assert_eq!(level, 0.0);
        }
    }
}
