//! Monitor Display
//!
//! Human-readable rendering of received frames for terminals not in
//! KISS mode:
//!
//! ```text
//! N0CALL-7>APRS,WIDE1-1*,WIDE2-1:<03><f0>Hello
//! ```
//!
//! Source comes first, then destination and the digipeater path, with
//! `*` on addresses that have been repeated. Everything after the last
//! address, control and PID included, is shown as text with
//! non-printable bytes in `<xx>` form.

use core::fmt::{self, Write};

use super::ax25::{address_matches, ADDR_LEN, DIGI_OFFSET, EXT_BIT, H_BIT, SSID_OFFSET};
use super::fcs::FCS_LEN;
use crate::types::{Callsign, MonitorMode};

/// True if a frame should be displayed under `mode`
#[must_use]
pub fn should_display(mode: MonitorMode, mycall: Option<&Callsign>, frame: &[u8]) -> bool {
    match mode {
        MonitorMode::All => true,
        MonitorMode::Me => mycall.is_some_and(|call| address_matches(call, frame)),
        MonitorMode::Off => false,
    }
}

/// Write the monitor line for `frame` (FCS included), without line end
///
/// # Errors
///
/// Propagates errors from the writer.
pub fn write_monitor<W: Write>(w: &mut W, frame: &[u8]) -> fmt::Result {
    let body = &frame[..frame.len().saturating_sub(FCS_LEN)];
    let mut in_addr = true;

    for i in 0..body.len() {
        // Swap the first two addresses so the source prints first
        let c = match i {
            0..=6 => body.get(i + ADDR_LEN),
            7..=13 => body.get(i - ADDR_LEN),
            _ => body.get(i),
        };
        let Some(&c) = c else { break };

        if !in_addr {
            write_text_byte(w, c)?;
            continue;
        }

        let d = c >> 1;
        if i % ADDR_LEN == SSID_OFFSET {
            if i >= ADDR_LEN {
                in_addr = body[i] & EXT_BIT == 0;
            }
            let ssid = d & 0x0f;
            if ssid != 0 {
                write!(w, "-{ssid}")?;
            }
            if i >= DIGI_OFFSET && c & H_BIT != 0 {
                w.write_char('*')?;
            }
            let sep = if i == SSID_OFFSET {
                '>'
            } else if in_addr {
                ','
            } else {
                ':'
            };
            w.write_char(sep)?;
        } else if d.is_ascii_uppercase() || d.is_ascii_digit() {
            w.write_char(char::from(d))?;
        } else if d != b' ' {
            write!(w, "<{d:02x}>")?;
        }
    }

    Ok(())
}

fn write_text_byte<W: Write>(w: &mut W, c: u8) -> fmt::Result {
    if (b' '..=b'~').contains(&c) {
        w.write_char(char::from(c))
    } else {
        write!(w, "<{c:02x}>")
    }
}
