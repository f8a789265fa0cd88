//! Bell 202 AFSK Modulator
//!
//! Converts bytes into NRZI-coded tone slices, one slice per bit period.
//! A slice names a tone and a starting phase; the wave table turns it
//! into `SAMPLES_PER_BIT` DAC samples.
//!
//! At 13.2 kHz the mark tone completes exactly one cycle per bit, while
//! the space tone completes 11/6 cycles. Its phase therefore steps back
//! by one sixth of a cycle per space bit, giving `PHASE_CYCLE` phases.

use heapless::Vec;
#[cfg(feature = "embedded")]
use micromath::F32Ext;

use crate::config::{
    BIT_STUFF_BITS, CONTROL_N, DAC_AMPLITUDE, DAC_MIDPOINT, MARK_HZ, PHASE_CYCLE,
    SAMPLES_PER_BIT, SAMPLING_RATE, SPACE_HZ,
};
use crate::types::Tone;

/// One bit period of output: tone plus starting phase index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToneSlice {
    /// Tone for this bit period
    pub tone: Tone,
    /// Starting phase, in sixths of a cycle
    pub phase: u8,
}

/// Tone slices generated for one byte (up to 8 data + 2 stuffed bits)
pub type AudioBlock = Vec<ToneSlice, CONTROL_N>;

/// Samples of one bit period
pub type BitSamples = [u16; SAMPLES_PER_BIT];

/// Precomputed DAC samples for every tone and starting phase
#[derive(Clone)]
pub struct WaveTable {
    /// Indexed by tone (mark, space), then phase
    samples: [[BitSamples; PHASE_CYCLE]; 2],
}

impl WaveTable {
    /// Build the table for the given DAC midpoint and amplitude
    #[must_use]
    pub fn new(midpoint: u16, amplitude: u16) -> Self {
        let two_pi = 2.0 * core::f32::consts::PI;
        let mut samples = [[[midpoint; SAMPLES_PER_BIT]; PHASE_CYCLE]; 2];

        for (tone, freq) in [(Tone::Mark, MARK_HZ), (Tone::Space, SPACE_HZ)] {
            let step = two_pi * freq as f32 / SAMPLING_RATE as f32;
            for (phase, bit) in samples[Self::row(tone)].iter_mut().enumerate() {
                let start = two_pi * phase as f32 / PHASE_CYCLE as f32;
                for (n, s) in bit.iter_mut().enumerate() {
                    let v = f32::from(amplitude) * (start + step * n as f32).sin();
                    *s = (f32::from(midpoint) + v + 0.5) as u16;
                }
            }
        }

        Self { samples }
    }

    const fn row(tone: Tone) -> usize {
        match tone {
            Tone::Mark => 0,
            Tone::Space => 1,
        }
    }

    /// Samples for one slice
    #[must_use]
    pub fn bit(&self, slice: ToneSlice) -> &BitSamples {
        &self.samples[Self::row(slice.tone)][usize::from(slice.phase) % PHASE_CYCLE]
    }

    /// Expand a block into samples
    pub fn render<'a>(&'a self, block: &'a [ToneSlice]) -> impl Iterator<Item = u16> + 'a {
        block.iter().flat_map(move |&s| self.bit(s).iter().copied())
    }
}

impl Default for WaveTable {
    fn default() -> Self {
        Self::new(DAC_MIDPOINT, DAC_AMPLITUDE)
    }
}

/// NRZI encoder with optional bit stuffing
#[derive(Clone, Copy, Debug, Default)]
pub struct AfskModulator {
    /// Current tone
    tone: Tone,
    /// Space tone phase index
    phase: u8,
    /// Consecutive ones sent with stuffing enabled
    ones: u8,
}

impl AfskModulator {
    /// Create a modulator idling on mark
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tone: Tone::Mark,
            phase: 0,
            ones: 0,
        }
    }

    /// Encode one byte LSB first
    ///
    /// A zero bit toggles the tone, a one keeps it. With `bit_stuff`, a
    /// zero is inserted after five consecutive ones; flags are sent with
    /// stuffing off.
    pub fn encode_byte(&mut self, byte: u8, bit_stuff: bool) -> AudioBlock {
        let mut block = AudioBlock::new();
        // Sentinel above the MSB marks the end of the byte
        let mut bits = u16::from(byte) | 0x100;
        let mut bit = bits & 1 != 0;

        while bits > 1 {
            if !bit {
                self.tone = self.tone.toggled();
            }

            let slice = ToneSlice {
                tone: self.tone,
                phase: self.phase,
            };
            let pushed = block.push(slice);
            debug_assert!(pushed.is_ok(), "audio block overflow");

            if self.tone == Tone::Space {
                self.phase = ((usize::from(self.phase) + PHASE_CYCLE - 1) % PHASE_CYCLE) as u8;
            }

            if bit_stuff {
                if bit {
                    self.ones += 1;
                    if self.ones >= BIT_STUFF_BITS {
                        // Send a zero without consuming a data bit
                        bit = false;
                        continue;
                    }
                } else {
                    self.ones = 0;
                }
            }

            bits >>= 1;
            bit = bits & 1 != 0;
        }

        block
    }

    /// Clear the stuffing run before frame data
    pub fn reset_stuffing(&mut self) {
        self.ones = 0;
    }

    /// Current tone
    #[must_use]
    pub const fn tone(&self) -> Tone {
        self.tone
    }
}
