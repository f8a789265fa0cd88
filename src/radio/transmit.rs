//! Transmit Control
//!
//! Channel access and frame transmission for one port. The sender is a
//! polled state machine: every poll runs as many transitions as it can
//! and returns as soon as it has to wait for time, the channel or room
//! in the audio queue.
//!
//! ```text
//! Idle ─> WaitClearChannel ─> PPersistence ─┬─> KeyUp ─> SendFlags ─> DataStart ─> SendData
//!              ^                            │              ^            │  empty      │
//!              └──────── WaitSlotTime <─────┘              └────────────┼─────────────┘
//!                                                                       v   last byte
//!                                                                     Idle
//! ```

use rand::RngCore;

use super::queue::SendQueue;
use crate::config::{KissParams, AX25_FLAG};

/// Emits one byte of modulated audio
pub trait ByteSink {
    /// Modulate and queue one byte
    ///
    /// Returns `false` without consuming the byte if the audio queue is
    /// full; the caller retries on a later poll.
    fn send_byte(&mut self, byte: u8, bit_stuff: bool) -> bool;

    /// Ensure playback is running and the transmitter keyed
    ///
    /// Only raises the keyed flag; the transport polls it and starts
    /// playing.
    fn start(&mut self);

    /// Clear the bit-stuffing run counter
    fn reset_stuffing(&mut self);
}

/// Sender state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TxState {
    /// Nothing to send
    #[default]
    Idle,
    /// Waiting for the channel to be clear
    WaitClearChannel,
    /// Drawing the persistence lottery
    PPersistence,
    /// Backing off for one slot time
    WaitSlotTime,
    /// Keying up the transmitter
    KeyUp,
    /// Sending preamble or trailing flags
    SendFlags,
    /// Reading the next record header
    DataStart,
    /// Sending record bytes
    SendData,
    /// Queue desynchronized
    Error,
}

#[cfg(feature = "embedded")]
impl defmt::Format for TxState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "IDLE"),
            Self::WaitClearChannel => defmt::write!(f, "WAIT_CLEAR"),
            Self::PPersistence => defmt::write!(f, "P_PERSIST"),
            Self::WaitSlotTime => defmt::write!(f, "WAIT_SLOT"),
            Self::KeyUp => defmt::write!(f, "KEY_UP"),
            Self::SendFlags => defmt::write!(f, "FLAGS"),
            Self::DataStart => defmt::write!(f, "DATA_START"),
            Self::SendData => defmt::write!(f, "DATA"),
            Self::Error => defmt::write!(f, "ERROR"),
        }
    }
}

/// Channel state seen by the sender
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelStatus {
    /// TNC clock in 10 ms ticks
    pub now: u32,
    /// Carrier currently detected on the port
    pub carrier: bool,
}

/// p-persistence test: key up when the draw falls below `p`
///
/// `p = 255` always keys up and `p = 0` never does.
#[must_use]
pub const fn persistence_allows(draw: u8, persistence: u8) -> bool {
    persistence == u8::MAX || draw < persistence
}

/// p-persistent CSMA sender
#[derive(Clone, Copy, Debug, Default)]
pub struct ChannelAccess {
    /// Current state
    state: TxState,
    /// Tick at which the slot wait started
    slot_start: u32,
    /// Flags or record bytes still to send
    remaining: u32,
    /// Byte waiting for room in the audio queue
    pending: u8,
}

impl ChannelAccess {
    /// Create an idle sender
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: TxState::Idle,
            slot_start: 0,
            remaining: 0,
            pending: 0,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> TxState {
        self.state
    }

    /// Check if a transmission is under way
    #[must_use]
    pub const fn is_transmitting(&self) -> bool {
        matches!(
            self.state,
            TxState::KeyUp | TxState::SendFlags | TxState::DataStart | TxState::SendData
        )
    }

    /// Run the state machine until it has to wait
    ///
    /// Returns the state it stopped in.
    pub fn poll<const N: usize, S: ByteSink, R: RngCore>(
        &mut self,
        status: ChannelStatus,
        params: &KissParams,
        queue: &mut SendQueue<N>,
        sink: &mut S,
        rng: &mut R,
    ) -> TxState {
        loop {
            match self.state {
                TxState::Idle => {
                    if queue.is_empty() {
                        return self.state;
                    }
                    self.state = TxState::WaitClearChannel;
                }

                TxState::WaitClearChannel => {
                    if status.carrier && !params.full_duplex {
                        return self.state;
                    }
                    self.state = TxState::PPersistence;
                }

                TxState::PPersistence => {
                    let draw = (rng.next_u32() & 0xff) as u8;
                    if persistence_allows(draw, params.persistence) {
                        self.state = TxState::KeyUp;
                    } else {
                        self.slot_start = status.now;
                        self.state = TxState::WaitSlotTime;
                        return self.state;
                    }
                }

                TxState::WaitSlotTime => {
                    if status.now.wrapping_sub(self.slot_start) < u32::from(params.slot_time) {
                        return self.state;
                    }
                    self.state = TxState::WaitClearChannel;
                }

                TxState::KeyUp => {
                    self.remaining = params.preamble_flags();
                    debug!("key up, {} flags", self.remaining);
                    self.state = TxState::SendFlags;
                }

                TxState::SendFlags => {
                    while self.remaining > 0 {
                        if !sink.send_byte(AX25_FLAG, false) {
                            return self.state;
                        }
                        self.remaining -= 1;
                    }
                    sink.reset_stuffing();
                    self.state = TxState::DataStart;
                }

                TxState::DataStart => self.start_record(queue, sink),

                TxState::SendData => {
                    if !sink.send_byte(self.pending, true) {
                        return self.state;
                    }
                    if self.remaining == 0 {
                        // One trailing flag closes the frame
                        self.remaining = 1;
                        self.state = TxState::SendFlags;
                        sink.start();
                        continue;
                    }
                    match queue.pop() {
                        Some(b) => {
                            self.pending = b;
                            self.remaining -= 1;
                        }
                        None => {
                            error!("send queue underrun in frame");
                            self.state = TxState::Error;
                        }
                    }
                }

                TxState::Error => {
                    queue.clear();
                    self.state = TxState::Idle;
                    return self.state;
                }
            }
        }
    }

    /// Read a record header and its first byte
    fn start_record<const N: usize, S: ByteSink>(&mut self, queue: &mut SendQueue<N>, sink: &mut S) {
        let Some(lo) = queue.pop() else {
            // Queue drained: let playback finish and drop PTT
            sink.start();
            self.state = TxState::Idle;
            return;
        };

        let header = queue.pop().map(|hi| u16::from_le_bytes([lo, hi]));
        let first = queue.pop();
        match (header, first) {
            (Some(len), Some(first)) if len > 0 => {
                self.pending = first;
                self.remaining = u32::from(len) - 1;
                self.state = TxState::SendData;
            }
            _ => {
                error!("send queue underrun in header");
                self.state = TxState::Error;
            }
        }
    }

    /// Return to idle, dropping any frame in progress
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
