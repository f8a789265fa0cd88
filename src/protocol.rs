//! Link Layer Protocols
//!
//! AX.25 framing on the air side and KISS on the host side:
//! - Frame check sequence
//! - Address field encoding and UI frame construction
//! - HDLC deframing
//! - KISS framing and command decoding
//! - Monitor display formatting

pub mod ax25;
pub mod fcs;
pub mod hdlc;
pub mod kiss;
pub mod monitor;

pub use fcs::Fcs;
pub use hdlc::{FrameEvent, Framer, FramerState};
pub use kiss::{KissCommand, KissDecoder, KissFrame};
