//! AX.25 Address Field and UI Frames
//!
//! Address subfields are seven bytes: six callsign characters shifted
//! left one bit, then the SSID byte `0b_HRRS_SSS_E`, where `H` is the
//! has-been-repeated (or command) bit and `E` marks the last address.

use heapless::Vec;

use super::fcs::FCS_LEN;
use crate::error::TncError;
use crate::types::Callsign;

/// Length of one address subfield
pub const ADDR_LEN: usize = 7;

/// Offset of the SSID byte within a subfield
pub const SSID_OFFSET: usize = 6;

/// Offset of the source subfield
pub const SRC_OFFSET: usize = ADDR_LEN;

/// Offset of the first digipeater subfield
pub const DIGI_OFFSET: usize = 2 * ADDR_LEN;

/// Address extension bit (last address)
pub const EXT_BIT: u8 = 0x01;

/// Has-been-repeated bit on digipeaters, command bit on destination
pub const H_BIT: u8 = 0x80;

/// Reserved SSID bits, sent as ones
pub const RESERVED_BITS: u8 = 0x60;

/// UI frame control field
pub const CONTROL_UI: u8 = 0x03;

/// No layer 3 protocol
pub const PID_NO_L3: u8 = 0xf0;

/// Smallest frame the receiver accepts: two addresses, control, PID, FCS
pub const MIN_FRAME_LEN: usize = 2 * ADDR_LEN + 2 + FCS_LEN;

/// Encode a callsign as an address subfield, extension and H bits clear
#[must_use]
pub fn encode_address(call: &Callsign) -> [u8; ADDR_LEN] {
    let mut addr = [0; ADDR_LEN];
    for (a, &c) in addr.iter_mut().zip(call.call()) {
        *a = c << 1;
    }
    addr[SSID_OFFSET] = RESERVED_BITS | (call.ssid() << 1);
    addr
}

/// Decode an address subfield
///
/// Returns `None` unless `addr` holds a well-formed, space-padded
/// alphanumeric callsign.
#[must_use]
pub fn decode_address(addr: &[u8]) -> Option<Callsign> {
    let addr = addr.get(..ADDR_LEN)?;
    let mut call = [b' '; Callsign::LEN];
    let mut padding = false;
    for (c, &a) in call.iter_mut().zip(addr) {
        let ch = a >> 1;
        if ch == b' ' {
            padding = true;
        } else if padding || !(ch.is_ascii_uppercase() || ch.is_ascii_digit()) {
            return None;
        }
        *c = ch;
    }
    if call[0] == b' ' {
        return None;
    }
    Some(Callsign::from_padded(call, (addr[SSID_OFFSET] >> 1) & 0x0f))
}

/// True when `addr` carries `call` (characters and SSID)
#[must_use]
pub fn address_matches(call: &Callsign, addr: &[u8]) -> bool {
    let Some(addr) = addr.get(..ADDR_LEN) else {
        return false;
    };
    call.call()
        .iter()
        .zip(addr)
        .all(|(&c, &a)| c == a >> 1)
        && call.ssid() == (addr[SSID_OFFSET] >> 1) & 0x0f
}

/// Offset of the control field, following the address extension bits
#[must_use]
pub fn control_offset(frame: &[u8]) -> Option<usize> {
    let mut i = SSID_OFFSET;
    while i < frame.len() {
        if frame[i] & EXT_BIT != 0 {
            return Some(i + 1);
        }
        i += ADDR_LEN;
    }
    None
}

/// True for a UI frame with no layer 3 protocol
#[must_use]
pub fn is_ui(frame: &[u8]) -> bool {
    match control_offset(frame) {
        Some(i) => frame.get(i..i + 2) == Some(&[CONTROL_UI, PID_NO_L3][..]),
        None => false,
    }
}

/// Append a UI frame without FCS to `out`
///
/// The destination carries the command bit and the last address the
/// extension bit.
///
/// # Errors
///
/// Returns [`TncError::FrameTooLong`] if the frame does not fit `out`.
pub fn build_ui_frame<const N: usize>(
    dst: &Callsign,
    src: &Callsign,
    digis: &[Callsign],
    info: &[u8],
    out: &mut Vec<u8, N>,
) -> Result<(), TncError> {
    let mut dst = encode_address(dst);
    dst[SSID_OFFSET] |= H_BIT;
    out.extend_from_slice(&dst)
        .map_err(|()| TncError::FrameTooLong)?;

    let mut src = encode_address(src);
    if digis.is_empty() {
        src[SSID_OFFSET] |= EXT_BIT;
    }
    out.extend_from_slice(&src)
        .map_err(|()| TncError::FrameTooLong)?;

    for (i, digi) in digis.iter().enumerate() {
        let mut addr = encode_address(digi);
        if i + 1 == digis.len() {
            addr[SSID_OFFSET] |= EXT_BIT;
        }
        out.extend_from_slice(&addr)
            .map_err(|()| TncError::FrameTooLong)?;
    }

    out.extend_from_slice(&[CONTROL_UI, PID_NO_L3])
        .map_err(|()| TncError::FrameTooLong)?;
    out.extend_from_slice(info)
        .map_err(|()| TncError::FrameTooLong)
}
