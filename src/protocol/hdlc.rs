//! HDLC Deframer
//!
//! Consumes decoded bits and reassembles frames between flags. The last
//! eight bits are kept in a shift register, newest bit in the LSB
//! position:
//!
//! - six ones (`x0111111`) end the frame: a flag or an abort
//! - five ones then a zero (`x0111110`) is a stuffed zero, dropped
//! - anything else is a data bit, assembled LSB first
//!
//! While seeking, only a full `0x7E` flag opens a frame.

use heapless::Vec;

use super::ax25::MIN_FRAME_LEN;
use super::fcs::{self, FCS_LEN};
use crate::config::{AX25_FLAG, DATA_LEN};

const SIX_ONES: u8 = 0x3f;
const STUFFED: u8 = 0x3e;

/// Deframer state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramerState {
    /// Hunting for an opening flag
    SeekingFlag,
    /// Collecting frame bits
    InFrame,
}

/// Classification of one bit in frame context
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitClass {
    /// Sixth consecutive one: closing flag or abort
    FrameEnd,
    /// Zero following five ones
    Stuffed,
    /// Ordinary data bit
    Data,
}

impl BitClass {
    /// Classify the newest bit of `shift`
    #[must_use]
    pub const fn of(shift: u8) -> Self {
        match shift & SIX_ONES {
            SIX_ONES => Self::FrameEnd,
            STUFFED => Self::Stuffed,
            _ => Self::Data,
        }
    }
}

/// Outcome reported when a frame closes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameEvent {
    /// Frame long enough and FCS correct, see [`Framer::frame`]
    Valid,
    /// Frame long enough but FCS wrong
    BadFcs,
    /// Frame exceeded the buffer and was dropped
    Overrun,
}

/// Bit-level HDLC deframer
#[derive(Clone)]
pub struct Framer {
    state: FramerState,
    /// Last eight bits, newest in bit 0
    shift: u8,
    /// Byte being assembled, LSB first
    byte: u8,
    /// Data bits in `byte`
    bit_count: u8,
    /// Frame bytes including FCS
    frame: Vec<u8, DATA_LEN>,
}

impl Framer {
    /// Create a deframer hunting for a flag
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FramerState::SeekingFlag,
            shift: 0,
            byte: 0,
            bit_count: 0,
            frame: Vec::new(),
        }
    }

    /// Feed one decoded bit
    ///
    /// Returns an event when a frame of at least the minimum length
    /// closes, or when the buffer overflows. Shorter fragments, such as
    /// the gap between back-to-back flags, are discarded silently.
    pub fn push_bit(&mut self, bit: bool) -> Option<FrameEvent> {
        self.shift = (self.shift << 1) | u8::from(bit);

        match self.state {
            FramerState::SeekingFlag => {
                if self.shift == AX25_FLAG {
                    self.open();
                }
                None
            }
            FramerState::InFrame => match BitClass::of(self.shift) {
                BitClass::FrameEnd => {
                    // The closing flag's last zero reopens from seeking
                    self.state = FramerState::SeekingFlag;
                    self.close()
                }
                BitClass::Stuffed => None,
                BitClass::Data => self.push_data(bit),
            },
        }
    }

    fn open(&mut self) {
        self.state = FramerState::InFrame;
        self.byte = 0;
        self.bit_count = 0;
        self.frame.clear();
    }

    fn close(&self) -> Option<FrameEvent> {
        if self.frame.len() < MIN_FRAME_LEN {
            return None;
        }
        if fcs::check(&self.frame) {
            trace!("frame received, {} bytes", self.frame.len());
            Some(FrameEvent::Valid)
        } else {
            trace!("FCS error, {} bytes", self.frame.len());
            Some(FrameEvent::BadFcs)
        }
    }

    fn push_data(&mut self, bit: bool) -> Option<FrameEvent> {
        self.byte = (self.byte >> 1) | (u8::from(bit) << 7);
        self.bit_count += 1;
        if self.bit_count < 8 {
            return None;
        }

        self.bit_count = 0;
        if self.frame.push(self.byte).is_err() {
            warn!("packet too long");
            self.state = FramerState::SeekingFlag;
            self.frame.clear();
            return Some(FrameEvent::Overrun);
        }
        None
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> FramerState {
        self.state
    }

    /// Bytes of the last closed frame, FCS included
    ///
    /// Valid from a [`FrameEvent::Valid`] until the next flag opens a
    /// frame, which is never earlier than the next pushed bit.
    #[must_use]
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Mutable view of the last closed frame
    pub fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.frame
    }

    /// Last closed frame without its FCS
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.frame[..self.frame.len().saturating_sub(FCS_LEN)]
    }

    /// Drop any partial frame and hunt for a flag
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}
