//! System configuration and modem constants
//!
//! This module defines compile-time constants for the TNC modem and the
//! runtime parameter sets that the KISS host and the command interpreter
//! adjust. All sample rates, buffer sizes and protocol limits are
//! centralized here.

use heapless::String;

use crate::types::{Callsign, MonitorMode, TimingMode};

/// Number of radio ports (1..=3)
pub const PORT_N: usize = 1;

/// AX.25 baud rate
pub const BAUD_RATE: u32 = 1200;

/// Audio samples per bit period (receive and transmit)
pub const SAMPLES_PER_BIT: usize = 11;

/// Per-port sampling rate (13.2 kHz)
pub const SAMPLING_RATE: u32 = BAUD_RATE * SAMPLES_PER_BIT as u32;

/// ADC sampling rate across all ports (round robin)
pub const ADC_SAMPLING_RATE: u32 = SAMPLING_RATE * PORT_N as u32;

/// Discriminator delay in microseconds
pub const DELAY_US: u32 = 446;

/// Discriminator delay line length in samples
pub const DELAYED_N: usize = ((SAMPLING_RATE * DELAY_US + 500_000) / 1_000_000) as usize;

/// Received frame buffer size
pub const DATA_LEN: usize = 1024;

/// Lowpass FIR length (post-discriminator)
pub const FIR_LPF_N: usize = 27;

/// Bandpass FIR length (input)
pub const FIR_BPF_N: usize = 25;

/// Lowpass cutoff frequency in Hz
pub const LPF_CUTOFF_HZ: u32 = 1200;

/// Bandpass lower edge in Hz
pub const BPF_LOW_HZ: u32 = 900;

/// Bandpass upper edge in Hz
pub const BPF_HIGH_HZ: u32 = 2500;

/// Mark tone frequency (binary 1)
pub const MARK_HZ: u32 = 1200;

/// Space tone frequency (binary 0)
pub const SPACE_HZ: u32 = 2200;

/// Transmit audio samples per cycle of the space tone
pub const PHASE_CYCLE: usize = (SAMPLING_RATE / SPACE_HZ) as usize;

/// Audio output midpoint (unsigned DAC/PWM level)
pub const DAC_MIDPOINT: u16 = 128;

/// Audio output amplitude around the midpoint
pub const DAC_AMPLITUDE: u16 = 100;

/// Number of audio blocks that can wait for playback
pub const DAC_QUEUE_LEN: usize = 64;

/// Backing size of the audio block ring (one slot is kept free)
pub const DAC_BLOCK_LEN: usize = DAC_QUEUE_LEN + 1;

/// Maximum bit periods in one audio block (8 data bits + 2 stuffed bits)
pub const CONTROL_N: usize = 10;

/// Consecutive ones after which a zero is stuffed
pub const BIT_STUFF_BITS: u8 = 5;

/// Outbound frame queue size in bytes
pub const SEND_QUEUE_LEN: usize = 1024 * 16;

/// Maximum decoded KISS payload length
pub const KISS_PACKET_LEN: usize = 1024;

/// Ticks an unfinished KISS frame may stay open (1 s)
pub const KISS_TIMEOUT: u32 = 100;

/// Longest beacon text
pub const BTEXT_LEN: usize = 100;

/// Longest beacon interval in minutes
pub const MAX_BEACON_MINUTES: u8 = 60;

/// Clock ticks per minute
pub const TICKS_PER_MINUTE: u32 = 60 * 100;

/// Port the beacon is sent on
pub const BEACON_PORT: usize = 0;

/// Number of rotating ADC sample batches
pub const SAMPLE_BUF_NUM: usize = 16;

/// ADC samples per batch (10 ms worth)
pub const SAMPLE_BUF_LEN: usize = ((ADC_SAMPLING_RATE + 50) / 100) as usize;

/// Number of unproto path entries (destination + 3 digipeaters)
pub const UNPROTO_N: usize = 4;

/// Maximum digipeater addresses in a frame
pub const MAX_DIGIPEATERS: usize = 8;

/// HDLC flag byte
pub const AX25_FLAG: u8 = 0x7e;

/// Per-port channel access parameters, in KISS units
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KissParams {
    /// Key-up delay in 10 ms units
    pub txdelay: u8,
    /// p-persistence (0..=255)
    pub persistence: u8,
    /// Slot time in 10 ms units
    pub slot_time: u8,
    /// Skip carrier sense
    pub full_duplex: bool,
}

impl KissParams {
    /// Default TXDELAY (500 ms)
    pub const DEFAULT_TXDELAY: u8 = 50;

    /// Default persistence (p = 0.25)
    pub const DEFAULT_PERSISTENCE: u8 = 63;

    /// Default slot time (100 ms)
    pub const DEFAULT_SLOT_TIME: u8 = 10;

    /// Create default parameters
    #[must_use]
    pub const fn new() -> Self {
        Self {
            txdelay: Self::DEFAULT_TXDELAY,
            persistence: Self::DEFAULT_PERSISTENCE,
            slot_time: Self::DEFAULT_SLOT_TIME,
            full_duplex: false,
        }
    }

    /// Number of leading flags sent for the configured TXDELAY
    #[must_use]
    pub const fn preamble_flags(&self) -> u32 {
        self.txdelay as u32 * 3 / 2 + 1
    }
}

impl Default for KissParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for KissParams {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Kiss(txd={}, p={}, slot={}, fd={})",
            self.txdelay,
            self.persistence,
            self.slot_time,
            self.full_duplex
        );
    }
}

/// Station parameters owned by the command interpreter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StationConfig {
    /// Station callsign
    pub mycall: Option<Callsign>,
    /// Digipeater alias (e.g. WIDE1-1)
    pub myalias: Option<Callsign>,
    /// Unproto path: destination followed by up to three digipeaters
    pub unproto: [Option<Callsign>; UNPROTO_N],
    /// Command-level TXDELAY (0..=200)
    pub txdelay: u8,
    /// Monitor filter for terminal display
    pub monitor: MonitorMode,
    /// Relay frames addressed through this station
    pub digipeat: bool,
    /// Bit timing recovery used by new ports
    pub timing: TimingMode,
    /// Beacon interval in minutes, 0 when off
    pub beacon: u8,
    /// Beacon text sent along the unproto path
    pub btext: String<BTEXT_LEN>,
}

impl StationConfig {
    /// Default command-level TXDELAY
    pub const DEFAULT_TXDELAY: u8 = 100;

    /// Largest accepted command-level TXDELAY
    pub const MAX_TXDELAY: u8 = 200;

    /// Create an unconfigured station
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mycall: None,
            myalias: None,
            unproto: [None; UNPROTO_N],
            txdelay: Self::DEFAULT_TXDELAY,
            monitor: MonitorMode::All,
            digipeat: false,
            timing: TimingMode::Pll,
            beacon: 0,
            btext: String::new(),
        }
    }

    /// Command-level TXDELAY converted to KISS units
    #[must_use]
    pub const fn kiss_txdelay(&self) -> u8 {
        // 200 * 2 / 3 fits in u8
        (self.txdelay as u16 * 2 / 3) as u8
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self::new()
    }
}
