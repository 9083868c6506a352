//! Routing and filter-order types

use serde::{Deserialize, Serialize};

/// Which samples of an interleaved stereo buffer feed the meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelMode {
    /// Even-indexed samples only
    #[default]
    Left,
    /// Odd-indexed samples only
    Right,
    /// Both channels through the same filters, dual-mono
    Stereo,
}

/// Bandpass filter order, realized as cascaded second-order sections
///
/// Serializes as the raw order number (2 or 4); any other number
/// deserializes as second order, matching the forgiving behavior of the
/// filter-design tooling this engine consumes tables from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum FilterOrder {
    /// Second order: one biquad section per band
    #[default]
    Second,
    /// Fourth order: two cascaded biquad sections per band
    Fourth,
}

impl FilterOrder {
    /// Interpret a raw order number, falling back to second order for
    /// anything outside {2, 4}
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            4 => Self::Fourth,
            _ => Self::Second,
        }
    }

    /// The raw order number
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Second => 2,
            Self::Fourth => 4,
        }
    }

    /// Biquad sections each band cascades for this order
    pub fn sections_per_band(self) -> usize {
        match self {
            Self::Second => 1,
            Self::Fourth => 2,
        }
    }
}

impl From<u32> for FilterOrder {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<FilterOrder> for u32 {
    fn from(order: FilterOrder) -> Self {
        order.as_u32()
    }
}
