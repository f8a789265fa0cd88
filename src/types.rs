//! Shared types used across the TNC firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at construction time and provide type safety throughout the codebase.

use core::fmt;
use core::str::FromStr;

use crate::error::TncError;

/// Station callsign with SSID
///
/// Holds up to six uppercase alphanumeric characters, space padded,
/// plus a secondary station identifier in `0..=15`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Callsign {
    call: [u8; Callsign::LEN],
    ssid: u8,
}

impl Callsign {
    /// Callsign field width
    pub const LEN: usize = 6;

    /// Largest valid SSID
    pub const MAX_SSID: u8 = 15;

    /// Create a callsign from its base call and SSID
    ///
    /// The base call is case-folded to uppercase.
    ///
    /// # Errors
    ///
    /// Returns [`TncError::InvalidCallsign`] if the call is empty, longer
    /// than six characters or not alphanumeric, and
    /// [`TncError::InvalidSsid`] if `ssid` is above 15.
    pub fn new(call: &str, ssid: u8) -> Result<Self, TncError> {
        let bytes = call.as_bytes();
        if bytes.is_empty() || bytes.len() > Self::LEN {
            return Err(TncError::InvalidCallsign);
        }
        if ssid > Self::MAX_SSID {
            return Err(TncError::InvalidSsid);
        }

        let mut padded = [b' '; Self::LEN];
        for (slot, &ch) in padded.iter_mut().zip(bytes) {
            if !ch.is_ascii_alphanumeric() {
                return Err(TncError::InvalidCallsign);
            }
            *slot = ch.to_ascii_uppercase();
        }

        Ok(Self { call: padded, ssid })
    }

    /// Build from already validated, space-padded characters
    pub(crate) const fn from_padded(call: [u8; Self::LEN], ssid: u8) -> Self {
        Self {
            call,
            ssid: ssid & Self::MAX_SSID,
        }
    }

    /// Space-padded callsign characters
    #[must_use]
    pub const fn call(&self) -> &[u8; Self::LEN] {
        &self.call
    }

    /// Secondary station identifier
    #[must_use]
    pub const fn ssid(&self) -> u8 {
        self.ssid
    }

    /// Callsign without padding
    #[must_use]
    pub fn base(&self) -> &str {
        let len = self
            .call
            .iter()
            .position(|&c| c == b' ')
            .unwrap_or(Self::LEN);
        // Only ASCII is ever stored
        core::str::from_utf8(&self.call[..len]).unwrap_or("")
    }
}

impl FromStr for Callsign {
    type Err = TncError;

    /// Parse `CALL` or `CALL-SSID`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('-') {
            None => Self::new(s, 0),
            Some((call, ssid)) => {
                if ssid.is_empty() || ssid.len() > 2 || !ssid.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(TncError::InvalidSsid);
                }
                let ssid: u8 = ssid.parse().map_err(|_| TncError::InvalidSsid)?;
                Self::new(call, ssid)
            }
        }
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base())?;
        if self.ssid > 0 {
            write!(f, "-{}", self.ssid)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callsign({self})")
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Callsign {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}-{}", self.base(), self.ssid);
    }
}

/// Which received frames are shown on a terminal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MonitorMode {
    /// Show every valid frame
    #[default]
    All,
    /// Show only frames addressed to mycall
    Me,
    /// Show nothing
    Off,
}

#[cfg(feature = "embedded")]
impl defmt::Format for MonitorMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::All => defmt::write!(f, "ALL"),
            Self::Me => defmt::write!(f, "ME"),
            Self::Off => defmt::write!(f, "OFF"),
        }
    }
}

/// Bit timing recovery strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimingMode {
    /// Count samples between transitions
    EdgeCount,
    /// Phase-locked loop nudged on transitions
    #[default]
    Pll,
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimingMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::EdgeCount => defmt::write!(f, "EDGE"),
            Self::Pll => defmt::write!(f, "PLL"),
        }
    }
}

/// ADC sample width
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AdcResolution {
    /// 8-bit samples, midpoint 128
    #[default]
    Bits8,
    /// 12-bit samples, midpoint 2048
    Bits12,
}

impl AdcResolution {
    /// Sample width in bits
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits8 => 8,
            Self::Bits12 => 12,
        }
    }

    /// Shift that scales a sample down to 8-bit counts
    #[must_use]
    pub const fn shift_to_8bit(self) -> u32 {
        self.bits() - 8
    }

    /// Mid-scale sample value
    #[must_use]
    pub const fn midpoint(self) -> u16 {
        1 << (self.bits() - 1)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for AdcResolution {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}-bit", self.bits());
    }
}

/// AFSK tone (NRZI line level)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Tone {
    /// 1200 Hz
    #[default]
    Mark,
    /// 2200 Hz
    Space,
}

impl Tone {
    /// The other tone
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Mark => Self::Space,
            Self::Space => Self::Mark,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Tone {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Mark => defmt::write!(f, "MARK"),
            Self::Space => defmt::write!(f, "SPACE"),
        }
    }
}
