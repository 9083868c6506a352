//! Error types for the metering engine

use thiserror::Error;

/// Result type alias using [`MeterError`]
pub type Result<T> = std::result::Result<T, MeterError>;

/// Errors surfaced by the metering engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeterError {
    /// A meter operation was attempted before `allocate` (or after `free`)
    #[error("Meter is not initialized (allocate a filter bank first)")]
    NotInitialized,

    /// Invalid sample rate in a coefficient table
    #[error("Invalid sample rate: {0} Hz (must be positive and finite)")]
    InvalidSampleRate(f64),

    /// Coefficient table shape or content mismatch
    #[error("Invalid coefficient table: {0}")]
    InvalidCoefficients(String),

    /// Integration time must be at least one millisecond
    #[error("Invalid integration time: {0} ms (must be positive)")]
    InvalidIntegrationTime(u32),

    /// Smoothing factor must lie strictly between 0 and 1
    #[error("Invalid smoothing factor: {0} (must be in (0, 1))")]
    InvalidSmoothing(f32),

    /// Band index outside 0..31
    #[error("Band index out of range: {0} (31 bands available)")]
    BandOutOfRange(usize),
}
