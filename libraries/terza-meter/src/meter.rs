//! The single-instance meter handle
//!
//! Hosts drive the engine through an allocate/free lifecycle: one bank at
//! a time, every operation failing cleanly while none is allocated. The
//! bank itself is an owned value, so dropping the handle releases
//! everything.

use terza_core::{ChannelMode, CoeffTable, FilterOrder, MeterError, Result, NUM_BANDS};

use crate::bank::FilterBank;

/// Owned handle around at most one [`FilterBank`]
///
/// Mirrors the bank's full configuration surface, returning
/// [`MeterError::NotInitialized`] for every call made before
/// [`allocate`](Self::allocate) or after [`free`](Self::free).
#[derive(Default)]
pub struct Meter {
    bank: Option<FilterBank>,
}

impl Meter {
    /// Create an empty handle with no bank allocated
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a filter bank built from `table`, replacing any prior one
    ///
    /// The new bank starts with fresh delay lines, zeroed accumulators,
    /// and default configuration (bypassed, left channel).
    pub fn allocate(&mut self, table: &CoeffTable) -> Result<()> {
        self.bank = Some(FilterBank::new(table)?);
        Ok(())
    }

    /// Release the bank; subsequent calls fail until re-allocated
    pub fn free(&mut self) {
        self.bank = None;
    }

    /// Whether a bank is currently allocated
    pub fn is_allocated(&self) -> bool {
        self.bank.is_some()
    }

    /// Feed an interleaved buffer through the bank
    pub fn process(&mut self, buffer: &[f32]) -> Result<()> {
        self.bank_mut()?.process(buffer);
        Ok(())
    }

    /// Clear every band's delay lines
    pub fn reset(&mut self) -> Result<()> {
        self.bank_mut()?.reset();
        Ok(())
    }

    /// Enable or disable bypass
    pub fn set_bypass(&mut self, bypass: bool) -> Result<()> {
        self.bank_mut()?.set_bypass(bypass);
        Ok(())
    }

    /// Whether the bank is bypassed
    pub fn bypass(&self) -> Result<bool> {
        Ok(self.bank()?.bypass())
    }

    /// Set the calibration constant in dB
    pub fn set_calibration_db(&mut self, calibration_db: f32) -> Result<()> {
        self.bank_mut()?.set_calibration_db(calibration_db);
        Ok(())
    }

    /// Current calibration constant in dB
    pub fn calibration_db(&self) -> Result<f32> {
        Ok(self.bank()?.calibration_db())
    }

    /// Change the integration window length in milliseconds
    pub fn set_integration_ms(&mut self, integration_ms: u32) -> Result<()> {
        self.bank_mut()?.set_integration_ms(integration_ms)
    }

    /// Current integration window in milliseconds
    pub fn integration_ms(&self) -> Result<u32> {
        Ok(self.bank()?.integration_ms())
    }

    /// Select the channel routing mode
    pub fn set_channel_mode(&mut self, mode: ChannelMode) -> Result<()> {
        self.bank_mut()?.set_channel_mode(mode);
        Ok(())
    }

    /// Current channel routing mode
    pub fn channel_mode(&self) -> Result<ChannelMode> {
        Ok(self.bank()?.channel_mode())
    }

    /// Set the smoothing factor, strictly inside (0, 1)
    pub fn set_alpha(&mut self, alpha: f32) -> Result<()> {
        self.bank_mut()?.set_alpha(alpha)
    }

    /// Current smoothing factor
    pub fn alpha(&self) -> Result<f32> {
        Ok(self.bank()?.alpha())
    }

    /// Latest smoothed, calibrated level for one band in dB
    pub fn level(&self, band: usize) -> Result<f32> {
        self.bank()?.level(band)
    }

    /// Latest smoothed, calibrated levels for all 31 bands
    pub fn levels(&self) -> Result<&[f32; NUM_BANDS]> {
        Ok(self.bank()?.levels())
    }

    /// Nominal center frequency of a band in Hz
    pub fn band_frequency(&self, band: usize) -> Result<f64> {
        self.bank()?
            .band_frequency(band)
            .ok_or(MeterError::BandOutOfRange(band))
    }

    /// Filter order of the installed coefficients
    pub fn order(&self) -> Result<FilterOrder> {
        Ok(self.bank()?.order())
    }

    /// Borrow the allocated bank directly
    pub fn bank(&self) -> Result<&FilterBank> {
        self.bank.as_ref().ok_or(MeterError::NotInitialized)
    }

    /// Mutably borrow the allocated bank directly
    pub fn bank_mut(&mut self) -> Result<&mut FilterBank> {
        self.bank.as_mut().ok_or(MeterError::NotInitialized)
    }
}
