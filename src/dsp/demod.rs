//! Bell 202 Demodulator
//!
//! Recovers the mark/space decision from raw ADC samples:
//!
//! ```text
//! adc ─┬─> DC average ─> carrier level ─> CDT (hysteresis)
//!      │                                    │ gate
//!      └─> BPF ─> x * x[n - DELAYED_N] ─> LPF ─> threshold ─> mark/space
//! ```
//!
//! The delay-and-multiply discriminator turns the tone frequency into the
//! sign of the lowpass output. With the delay close to one space cycle,
//! space (2200 Hz) correlates positive and mark (1200 Hz) negative.
//!
//! Carrier level and discriminator input are both scaled to 8-bit counts,
//! so the thresholds hold for 8-bit and 12-bit converters alike.

use heapless::HistoryBuffer;

use super::filter::{FirCoefficients, FirFilter, ShiftAverage};
use crate::config::{
    BPF_HIGH_HZ, BPF_LOW_HZ, DELAYED_N, FIR_BPF_N, FIR_LPF_N, LPF_CUTOFF_HZ, SAMPLING_RATE,
};
use crate::types::AdcResolution;

/// Fixed-point scale of the DC and carrier averages
const AVERAGE_MUL: i32 = 256;

/// DC average time constant (2^6 samples)
const AVERAGE_SHIFT: u32 = 6;

/// Carrier level time constant (2^6 samples)
const CDT_SHIFT: u32 = 6;

/// Carrier-detect release threshold
pub const CDT_THRESHOLD_LOW: i32 = 1024;

/// Carrier-detect attack threshold (+6 dB over release)
pub const CDT_THRESHOLD_HIGH: i32 = CDT_THRESHOLD_LOW * 2;

/// Discriminator dead band half-width
pub const LPF_THRESHOLD: i32 = 1 << 12;

/// Per-channel demodulator state
#[derive(Clone)]
pub struct Demodulator {
    /// ADC sample width
    resolution: AdcResolution,
    /// Running DC level, scaled by `AVERAGE_MUL`
    dc: ShiftAverage<AVERAGE_SHIFT>,
    /// Running signal power, scaled by `AVERAGE_MUL`
    level: ShiftAverage<CDT_SHIFT>,
    /// Carrier detected
    carrier: bool,
    /// Input bandpass
    bpf: FirFilter<FIR_BPF_N>,
    /// Discriminator lowpass
    lpf: FirFilter<FIR_LPF_N>,
    /// Discriminator delay line
    delayed: HistoryBuffer<i32, DELAYED_N>,
    /// Last decision (true = mark)
    mark: bool,
}

impl Demodulator {
    /// Create a demodulator for 8-bit samples with the standard filters
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolution(AdcResolution::default())
    }

    /// Create a demodulator for the given ADC width
    #[must_use]
    pub fn with_resolution(resolution: AdcResolution) -> Self {
        Self::with_filters(
            resolution,
            FirCoefficients::bandpass(BPF_LOW_HZ, BPF_HIGH_HZ, SAMPLING_RATE),
            FirCoefficients::lowpass(LPF_CUTOFF_HZ, SAMPLING_RATE),
        )
    }

    /// Create a demodulator sharing precomputed filter tables
    #[must_use]
    pub fn with_filters(
        resolution: AdcResolution,
        bpf: FirCoefficients<FIR_BPF_N>,
        lpf: FirCoefficients<FIR_LPF_N>,
    ) -> Self {
        Self {
            resolution,
            dc: ShiftAverage::new(),
            level: ShiftAverage::new(),
            carrier: false,
            bpf: FirFilter::new(bpf),
            lpf: FirFilter::new(lpf),
            delayed: HistoryBuffer::new_with(0),
            mark: false,
        }
    }

    /// Process one raw ADC sample
    ///
    /// Returns the current mark/space decision, or `None` while no carrier
    /// is detected. Filters and decision are frozen without carrier.
    pub fn process(&mut self, adc: u16) -> Option<bool> {
        let adc = i32::from(adc);

        let avg = self.dc.update(adc * AVERAGE_MUL);
        let val = adc - (avg + AVERAGE_MUL / 2) / AVERAGE_MUL;
        let val = val >> self.resolution.shift_to_8bit();

        let level = self.level.update(val * val * AVERAGE_MUL);
        if !self.carrier && level > CDT_THRESHOLD_HIGH {
            self.carrier = true;
            trace!("carrier on, level {}", level);
        } else if self.carrier && level < CDT_THRESHOLD_LOW {
            self.carrier = false;
            trace!("carrier off, level {}", level);
        }

        if !self.carrier {
            return None;
        }

        let out = self.discriminate(adc);
        if out < -LPF_THRESHOLD {
            self.mark = true;
        } else if out >= LPF_THRESHOLD {
            self.mark = false;
        }

        Some(self.mark)
    }

    /// Bandpass, delay-and-multiply, lowpass
    fn discriminate(&mut self, adc: i32) -> i32 {
        let val = self.bpf.apply(adc) >> self.resolution.bits();

        let delayed = self.delayed.oldest_ordered().next().copied().unwrap_or(0);
        self.delayed.write(val);

        let product = (i64::from(val) * i64::from(delayed)) >> 16;
        self.lpf.apply(product as i32)
    }

    /// Carrier currently detected
    #[must_use]
    pub const fn carrier_detected(&self) -> bool {
        self.carrier
    }

    /// Carrier power estimate
    #[must_use]
    pub const fn carrier_level(&self) -> i32 {
        self.level.value()
    }

    /// ADC sample width
    #[must_use]
    pub const fn resolution(&self) -> AdcResolution {
        self.resolution
    }

    /// DC estimate in ADC counts
    #[must_use]
    pub const fn dc_level(&self) -> i32 {
        self.dc.value() / AVERAGE_MUL
    }

    /// Reset all state
    pub fn reset(&mut self) {
        self.dc.reset();
        self.level.reset();
        self.carrier = false;
        self.bpf.reset();
        self.lpf.reset();
        self.delayed = HistoryBuffer::new_with(0);
        self.mark = false;
    }
}

impl Default for Demodulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Demodulator {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Demod(cdt={}, lvl={}, mark={})",
            self.carrier,
            self.level.value(),
            self.mark
        );
    }
}
