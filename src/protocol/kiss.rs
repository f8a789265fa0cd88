//! KISS Host Protocol
//!
//! Frames are delimited by FEND. The first byte carries the port in the
//! high nibble and the command in the low nibble; FEND and FESC inside a
//! frame are escaped as `FESC TFEND` and `FESC TFESC`.
//!
//! A frame left open for [`KISS_TIMEOUT`] ticks is abandoned, so a host
//! that dies mid-frame cannot wedge the decoder.

use heapless::Vec;

use crate::config::{KISS_PACKET_LEN, KISS_TIMEOUT};

/// Frame end
pub const FEND: u8 = 0xc0;
/// Frame escape
pub const FESC: u8 = 0xdb;
/// Transposed frame end
pub const TFEND: u8 = 0xdc;
/// Transposed frame escape
pub const TFESC: u8 = 0xdd;
/// Leave KISS mode
pub const CMD_RETURN: u8 = 0xff;

/// Decoded host command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KissCommand<'a> {
    /// Frame to transmit, without FCS
    Data(&'a [u8]),
    /// Key-up delay in 10 ms units
    TxDelay(u8),
    /// p-persistence
    Persistence(u8),
    /// Slot time in 10 ms units
    SlotTime(u8),
    /// Obsolete TX tail
    TxTail(u8),
    /// Non-zero to skip carrier sense
    FullDuplex(bool),
    /// Hardware specific, unsupported
    SetHardware(&'a [u8]),
    /// Unknown command code
    Unknown(u8),
    /// Leave KISS mode
    Return,
}

/// Command plus the port it addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KissFrame<'a> {
    /// Port number from the type byte
    pub port: u8,
    /// Command
    pub command: KissCommand<'a>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DecodeState {
    Outside,
    Inside,
    Escape,
    /// Payload overflowed, waiting for FEND
    Discard,
}

/// Byte-at-a-time KISS decoder
pub struct KissDecoder {
    state: DecodeState,
    /// Tick of the opening FEND
    opened: u32,
    buf: Vec<u8, KISS_PACKET_LEN>,
}

impl KissDecoder {
    /// Create a decoder outside any frame
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DecodeState::Outside,
            opened: 0,
            buf: Vec::new(),
        }
    }

    /// Feed one byte from the host, received at tick `now`
    ///
    /// Returns a command when a complete frame has been received. Empty
    /// frames, frames with only a type byte and overflowed frames yield
    /// nothing. A byte arriving [`KISS_TIMEOUT`] or more ticks after the
    /// opening FEND is handled as if outside any frame.
    pub fn feed(&mut self, byte: u8, now: u32) -> Option<KissFrame<'_>> {
        if self.state != DecodeState::Outside && now.wrapping_sub(self.opened) >= KISS_TIMEOUT {
            debug!("KISS frame timed out, {} bytes dropped", self.buf.len());
            self.state = DecodeState::Outside;
        }

        match self.state {
            DecodeState::Outside => {
                if byte == FEND {
                    self.buf.clear();
                    self.opened = now;
                    self.state = DecodeState::Inside;
                }
                None
            }
            DecodeState::Inside => match byte {
                FEND => {
                    if self.buf.is_empty() {
                        // Back-to-back FENDs: still inside, reopened now
                        self.opened = now;
                        return None;
                    }
                    // Buffer is cleared by the next opening FEND
                    self.state = DecodeState::Outside;
                    Self::parse(&self.buf)
                }
                FESC => {
                    self.state = DecodeState::Escape;
                    None
                }
                _ => {
                    self.push(byte);
                    None
                }
            },
            DecodeState::Escape => {
                let byte = match byte {
                    TFEND => FEND,
                    TFESC => FESC,
                    other => other,
                };
                self.state = DecodeState::Inside;
                self.push(byte);
                None
            }
            DecodeState::Discard => {
                if byte == FEND {
                    self.state = DecodeState::Outside;
                }
                None
            }
        }
    }

    fn push(&mut self, byte: u8) {
        if self.buf.push(byte).is_err() {
            warn!("KISS frame too long, discarding");
            self.buf.clear();
            self.state = DecodeState::Discard;
        }
    }

    fn parse(buf: &[u8]) -> Option<KissFrame<'_>> {
        let (&kind, data) = buf.split_first()?;
        if kind == CMD_RETURN {
            return Some(KissFrame {
                port: 0,
                command: KissCommand::Return,
            });
        }
        let value = *data.first()?;

        let command = match kind & 0x0f {
            0 => KissCommand::Data(data),
            1 => KissCommand::TxDelay(value),
            2 => KissCommand::Persistence(value),
            3 => KissCommand::SlotTime(value),
            4 => KissCommand::TxTail(value),
            5 => KissCommand::FullDuplex(value != 0),
            6 => KissCommand::SetHardware(data),
            code => KissCommand::Unknown(code),
        };

        Some(KissFrame {
            port: kind >> 4,
            command,
        })
    }

    /// Abandon any partial frame
    pub fn reset(&mut self) {
        self.state = DecodeState::Outside;
        self.buf.clear();
    }
}

impl Default for KissDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `frame` as a KISS data frame for `port`
///
/// `frame` is the AX.25 frame without FCS.
pub fn encode_frame<F: FnMut(u8)>(port: u8, frame: &[u8], mut write: F) {
    write(FEND);
    write((port & 0x0f) << 4);
    for &b in frame {
        match b {
            FEND => {
                write(FESC);
                write(TFEND);
            }
            FESC => {
                write(FESC);
                write(TFESC);
            }
            _ => write(b),
        }
    }
    write(FEND);
}
