//! Error types
//!
//! Only the configuration surface and the fatal real-time conditions
//! produce errors. Malformed received frames are dropped silently.

use thiserror::Error;

/// TNC error kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TncError {
    /// Received frame exceeded the frame buffer
    #[error("frame exceeds receive buffer")]
    FrameTooLong,
    /// Send queue has no room for the whole record
    #[error("send queue full")]
    QueueFull,
    /// Send queue record was truncated
    #[error("send queue underrun")]
    QueueUnderrun,
    /// Sample batch arrived while every batch slot was unconsumed
    #[error("sample buffer overrun")]
    SampleOverrun,
    /// Callsign is empty, too long or not alphanumeric
    #[error("invalid callsign")]
    InvalidCallsign,
    /// SSID is not a number in 0..=15
    #[error("invalid SSID")]
    InvalidSsid,
    /// KISS payload exceeded its buffer
    #[error("KISS frame too long")]
    KissOverrun,
    /// Port number out of range
    #[error("no such port")]
    InvalidPort,
    /// Parameter value out of range
    #[error("parameter out of range")]
    OutOfRange,
}

#[cfg(feature = "embedded")]
impl defmt::Format for TncError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::FrameTooLong => defmt::write!(f, "FrameTooLong"),
            Self::QueueFull => defmt::write!(f, "QueueFull"),
            Self::QueueUnderrun => defmt::write!(f, "QueueUnderrun"),
            Self::SampleOverrun => defmt::write!(f, "SampleOverrun"),
            Self::InvalidCallsign => defmt::write!(f, "InvalidCallsign"),
            Self::InvalidSsid => defmt::write!(f, "InvalidSsid"),
            Self::KissOverrun => defmt::write!(f, "KissOverrun"),
            Self::InvalidPort => defmt::write!(f, "InvalidPort"),
            Self::OutOfRange => defmt::write!(f, "OutOfRange"),
        }
    }
}
