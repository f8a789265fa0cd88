//! AX.25 Frame Check Sequence
//!
//! CRC-16/X.25: reflected polynomial 0x8408, preset 0xFFFF, complemented
//! result transmitted low byte first.

/// FCS computed over a frame that includes a valid FCS
pub const FCS_RESIDUE: u16 = 0x0f47;

/// Bytes occupied by the FCS
pub const FCS_LEN: usize = 2;

/// Streaming FCS accumulator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fcs {
    crc: u16,
}

impl Fcs {
    /// Start a new checksum
    #[must_use]
    pub const fn new() -> Self {
        Self { crc: 0xffff }
    }

    /// Feed one byte
    pub fn update_byte(&mut self, byte: u8) {
        let mut crc = u32::from(self.crc ^ u16::from(byte));
        for _ in 0..8 {
            if crc & 1 != 0 {
                // 0x8408 shifted up one, with the bit about to drop out
                crc ^= 0x1_0811;
            }
            crc >>= 1;
        }
        self.crc = crc as u16;
    }

    /// Feed a slice
    pub fn update(&mut self, data: &[u8]) {
        for &b in data {
            self.update_byte(b);
        }
    }

    /// Final FCS value
    #[must_use]
    pub const fn finish(self) -> u16 {
        self.crc ^ 0xffff
    }

    /// Final FCS in transmission order
    #[must_use]
    pub const fn to_bytes(self) -> [u8; FCS_LEN] {
        self.finish().to_le_bytes()
    }
}

impl Default for Fcs {
    fn default() -> Self {
        Self::new()
    }
}

/// FCS of `data`
#[must_use]
pub fn fcs(data: &[u8]) -> u16 {
    let mut f = Fcs::new();
    f.update(data);
    f.finish()
}

/// True when `frame` ends in a correct FCS
#[must_use]
pub fn check(frame: &[u8]) -> bool {
    frame.len() >= FCS_LEN && fcs(frame) == FCS_RESIDUE
}
