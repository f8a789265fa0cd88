//! Digipeater
//!
//! Relays UI frames whose next-in-line digipeater is this station.
//! Only the first address without its has-been-repeated bit may act;
//! later addresses are never considered.

use super::queue::SendQueue;
use crate::config::{StationConfig, MAX_DIGIPEATERS};
use crate::protocol::ax25::{
    self, address_matches, ADDR_LEN, DIGI_OFFSET, EXT_BIT, H_BIT, MIN_FRAME_LEN, SRC_OFFSET,
    SSID_OFFSET,
};
use crate::protocol::fcs::FCS_LEN;

/// What the digipeater did with a frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigipeatOutcome {
    /// Queued for retransmission with our address marked repeated
    Repeated,
    /// Not a UI frame
    NotUi,
    /// No digipeater addresses
    NoPath,
    /// Next-in-line digipeater is another station
    NotForUs,
    /// Every digipeater has already repeated it
    Complete,
    /// Address field runs past the frame or the digipeater cap
    Malformed,
    /// Send queue had no room
    QueueFull,
}

#[cfg(feature = "embedded")]
impl defmt::Format for DigipeatOutcome {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Repeated => defmt::write!(f, "Repeated"),
            Self::NotUi => defmt::write!(f, "NotUi"),
            Self::NoPath => defmt::write!(f, "NoPath"),
            Self::NotForUs => defmt::write!(f, "NotForUs"),
            Self::Complete => defmt::write!(f, "Complete"),
            Self::Malformed => defmt::write!(f, "Malformed"),
            Self::QueueFull => defmt::write!(f, "QueueFull"),
        }
    }
}

/// Relay `frame` (FCS included) if this station is the next digipeater
///
/// The has-been-repeated bit is set only for the copy handed to the
/// queue; `frame` is left as received.
pub fn digipeat<const N: usize>(
    frame: &mut [u8],
    station: &StationConfig,
    queue: &mut SendQueue<N>,
) -> DigipeatOutcome {
    if frame.len() < MIN_FRAME_LEN || !ax25::is_ui(frame) {
        return DigipeatOutcome::NotUi;
    }
    if frame[SRC_OFFSET + SSID_OFFSET] & EXT_BIT != 0 {
        return DigipeatOutcome::NoPath;
    }

    let body_len = frame.len() - FCS_LEN;
    for n in 0..MAX_DIGIPEATERS {
        let offset = DIGI_OFFSET + n * ADDR_LEN;
        if offset + ADDR_LEN > body_len {
            return DigipeatOutcome::Malformed;
        }
        let ssid_idx = offset + SSID_OFFSET;
        let ssid = frame[ssid_idx];

        if ssid & H_BIT == 0 {
            let addr = &frame[offset..offset + ADDR_LEN];
            let ours = [station.mycall.as_ref(), station.myalias.as_ref()]
                .into_iter()
                .flatten()
                .any(|call| address_matches(call, addr));
            if !ours {
                return DigipeatOutcome::NotForUs;
            }

            frame[ssid_idx] |= H_BIT;
            let queued = queue.push_frame(&frame[..body_len]);
            frame[ssid_idx] &= !H_BIT;

            if queued {
                debug!("digipeated {} bytes", body_len);
                return DigipeatOutcome::Repeated;
            }
            warn!("digipeat dropped, send queue full");
            return DigipeatOutcome::QueueFull;
        }

        if ssid & EXT_BIT != 0 {
            return DigipeatOutcome::Complete;
        }
    }

    DigipeatOutcome::Malformed
}
