//! The 31-band filter bank: filtering, level integration, channel routing

use tracing::debug;

use terza_core::{ChannelMode, CoeffTable, FilterOrder, MeterError, Result, NUM_BANDS};

use crate::filter::FilterBand;
use crate::{DEFAULT_ALPHA, DEFAULT_CALIBRATION_DB, DEFAULT_INTEGRATION_MS, SILENCE_FLOOR_DB};

/// Third-octave filter bank with per-band level integration
///
/// Owns 31 band cascades plus their accumulation state. Samples selected
/// from an interleaved buffer drive every band; squared outputs accumulate
/// into per-band sums until the shared integration window fills, at which
/// point all 31 bands publish a calibrated, smoothed dB level and the
/// window restarts. All bands share one sample counter, so every band sees
/// the same window boundaries.
///
/// The bank starts **bypassed**: call [`set_bypass`](Self::set_bypass)
/// with `false` before feeding audio.
///
/// # Real-Time Constraints
///
/// [`process`](Self::process) performs no allocation, no locking, and no
/// I/O; per sample it costs 31 bands x at most 2 sections of constant-time
/// arithmetic.
pub struct FilterBank {
    bands: Vec<FilterBand>,

    sample_rate: f64,
    order: FilterOrder,
    bypass: bool,
    channel_mode: ChannelMode,
    calibration_db: f32,
    integration_ms: u32,
    alpha: f32,

    /// Samples per integration window, floor(sample_rate/1000 * ms)
    window_samples: u64,
    /// Shared across all bands; counts elapsed samples, not per-band state
    samples_count: u64,
    temporal_sum: [f64; NUM_BANDS],

    volume_level: [f32; NUM_BANDS],
    smoothed_level: [f32; NUM_BANDS],
    /// Instantaneous level assigned at the previous boundary; the
    /// smoother's input
    last_level: [f32; NUM_BANDS],
    /// Explicit first-update flags; a published level of exactly 0 dB is
    /// legitimate, so the value itself cannot act as the sentinel
    primed: [bool; NUM_BANDS],
}

impl FilterBank {
    /// Build a bank from an externally designed coefficient table
    ///
    /// The table is validated (31 bands, section counts matching the
    /// declared order, ascending finite centers). The bank comes up
    /// bypassed, routing the left channel, with default calibration,
    /// integration time, and smoothing.
    pub fn new(table: &CoeffTable) -> Result<Self> {
        table.validate()?;

        let window_samples = window_samples(table.sample_rate, DEFAULT_INTEGRATION_MS);
        debug!(
            sample_rate = table.sample_rate,
            order = table.order.as_u32(),
            window_samples,
            "filter bank ready"
        );

        Ok(Self {
            bands: table.bands.iter().map(FilterBand::new).collect(),
            sample_rate: table.sample_rate,
            order: table.order,
            bypass: true,
            channel_mode: ChannelMode::default(),
            calibration_db: DEFAULT_CALIBRATION_DB,
            integration_ms: DEFAULT_INTEGRATION_MS,
            alpha: DEFAULT_ALPHA,
            window_samples,
            samples_count: 0,
            temporal_sum: [0.0; NUM_BANDS],
            volume_level: [0.0; NUM_BANDS],
            smoothed_level: [0.0; NUM_BANDS],
            last_level: [0.0; NUM_BANDS],
            primed: [false; NUM_BANDS],
        })
    }

    /// Feed an interleaved stereo buffer through the bank
    ///
    /// The buffer is read only and never retained. Which samples are
    /// consumed depends on the channel mode; a trailing odd sample is
    /// ignored in stereo mode. A no-op while bypassed.
    pub fn process(&mut self, buffer: &[f32]) {
        if self.bypass {
            return;
        }

        match self.channel_mode {
            ChannelMode::Left => self.process_strided(buffer, 0),
            ChannelMode::Right => self.process_strided(buffer, 1),
            ChannelMode::Stereo => self.process_stereo(buffer),
        }
    }

    fn process_strided(&mut self, buffer: &[f32], offset: usize) {
        for &sample in buffer.iter().skip(offset).step_by(2) {
            let input = f64::from(sample);

            for (band, sum) in self.bands.iter_mut().zip(self.temporal_sum.iter_mut()) {
                let output = band.process(input);
                *sum += output * output;
            }

            self.samples_count += 1;
            if self.samples_count >= self.window_samples {
                self.publish_levels();
            }
        }
    }

    fn process_stereo(&mut self, buffer: &[f32]) {
        for pair in buffer.chunks_exact(2) {
            let left = f64::from(pair[0]);
            let right = f64::from(pair[1]);

            // Left advances each band's state first, then right; both land
            // in the same per-band sum.
            for (band, sum) in self.bands.iter_mut().zip(self.temporal_sum.iter_mut()) {
                let out_left = band.process(left);
                let out_right = band.process(right);
                *sum += out_left * out_left;
                *sum += out_right * out_right;
            }

            self.samples_count += 2;
            if self.samples_count >= self.window_samples {
                self.publish_levels();
            }
        }
    }

    /// Reduce the finished window: RMS -> calibrated dB -> smoothed level
    ///
    /// Every band reduces at the same boundary; the shared counter resets
    /// once, after all 31 bands have published.
    fn publish_levels(&mut self) {
        if self.samples_count == 0 {
            return;
        }
        let count = self.samples_count as f64;

        for band in 0..NUM_BANDS {
            let rms = (self.temporal_sum[band] / count).sqrt();
            let instant_db = if rms > 0.0 {
                (10.0 * rms.log10()) as f32 + self.calibration_db
            } else {
                SILENCE_FLOOR_DB + self.calibration_db
            };

            if self.primed[band] {
                self.smoothed_level[band] = self.alpha * self.last_level[band]
                    + (1.0 - self.alpha) * self.smoothed_level[band];
            } else {
                self.smoothed_level[band] = instant_db;
                self.primed[band] = true;
            }

            self.last_level[band] = instant_db;
            self.volume_level[band] = self.smoothed_level[band];
            self.temporal_sum[band] = 0.0;
        }

        self.samples_count = 0;
    }

    /// Clear every band's delay lines
    ///
    /// Coefficients, configuration, and already-published levels are
    /// untouched. Idempotent.
    pub fn reset(&mut self) {
        for band in &mut self.bands {
            band.reset();
        }
    }

    /// Enable or disable bypass; while bypassed, `process` is a no-op
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    /// Whether the bank is bypassed
    pub fn bypass(&self) -> bool {
        self.bypass
    }

    /// Set the calibration constant in dB added to every published level
    pub fn set_calibration_db(&mut self, calibration_db: f32) {
        self.calibration_db = calibration_db;
    }

    /// Current calibration constant in dB
    pub fn calibration_db(&self) -> f32 {
        self.calibration_db
    }

    /// Change the integration window length
    ///
    /// Recomputes the window threshold and restarts the in-flight window
    /// so the next published level covers a full window of the new length.
    pub fn set_integration_ms(&mut self, integration_ms: u32) -> Result<()> {
        if integration_ms == 0 {
            return Err(MeterError::InvalidIntegrationTime(integration_ms));
        }

        self.integration_ms = integration_ms;
        self.window_samples = window_samples(self.sample_rate, integration_ms);
        self.samples_count = 0;
        self.temporal_sum = [0.0; NUM_BANDS];
        debug!(
            integration_ms,
            window_samples = self.window_samples,
            "integration window changed"
        );
        Ok(())
    }

    /// Current integration window in milliseconds
    pub fn integration_ms(&self) -> u32 {
        self.integration_ms
    }

    /// Select which channel(s) of the interleaved buffer feed the bank
    pub fn set_channel_mode(&mut self, mode: ChannelMode) {
        debug!(?mode, "channel mode changed");
        self.channel_mode = mode;
    }

    /// Current channel routing mode
    pub fn channel_mode(&self) -> ChannelMode {
        self.channel_mode
    }

    /// Set the smoothing factor, strictly inside (0, 1)
    pub fn set_alpha(&mut self, alpha: f32) -> Result<()> {
        if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(MeterError::InvalidSmoothing(alpha));
        }
        self.alpha = alpha;
        Ok(())
    }

    /// Current smoothing factor
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Latest smoothed, calibrated level for one band in dB
    pub fn level(&self, band: usize) -> Result<f32> {
        self.volume_level
            .get(band)
            .copied()
            .ok_or(MeterError::BandOutOfRange(band))
    }

    /// Latest smoothed, calibrated levels for all 31 bands
    pub fn levels(&self) -> &[f32; NUM_BANDS] {
        &self.volume_level
    }

    /// Nominal center frequency of a band in Hz
    pub fn band_frequency(&self, band: usize) -> Option<f64> {
        self.bands.get(band).map(FilterBand::center_hz)
    }

    /// Sample rate the installed coefficients were designed for
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Filter order of the installed coefficients
    pub fn order(&self) -> FilterOrder {
        self.order
    }

    /// Samples per integration window at the current configuration
    pub fn window_samples(&self) -> u64 {
        self.window_samples
    }

    /// Samples accumulated into the current, unfinished window
    pub fn samples_count(&self) -> u64 {
        self.samples_count
    }
}

fn window_samples(sample_rate: f64, integration_ms: u32) -> u64 {
    let samples = ((sample_rate / 1000.0) * f64::from(integration_ms)).floor() as u64;
    samples.max(1)
}
