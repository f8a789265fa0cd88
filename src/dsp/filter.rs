//! Digital Filters
//!
//! Provides the FIR filters used by the demodulator and the shift-based
//! running averages used for DC removal and carrier detection.
//! Uses fixed-point arithmetic for efficient embedded operation.

use fixed::types::I1F15;
#[cfg(feature = "embedded")]
use micromath::F32Ext;

/// Fixed-point filter tap (Q1.15 format)
pub type Coefficient = I1F15;

/// Amplitude of a unity tap
const AMPLITUDE: f32 = 32768.0;

/// Windowed-sinc design parameters
///
/// A zero `pass_freq` yields a lowpass with cutoff `cutoff_freq`;
/// otherwise the result is a bandpass between the two frequencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterParams {
    /// Sampling frequency in Hz
    pub sampling_freq: u32,
    /// Lower edge in Hz (0 for lowpass)
    pub pass_freq: u32,
    /// Upper edge in Hz
    pub cutoff_freq: u32,
}

impl FilterParams {
    /// Lowpass with the given cutoff
    #[must_use]
    pub const fn lowpass(cutoff_freq: u32, sampling_freq: u32) -> Self {
        Self {
            sampling_freq,
            pass_freq: 0,
            cutoff_freq,
        }
    }

    /// Bandpass between `low` and `high`
    #[must_use]
    pub const fn bandpass(low: u32, high: u32, sampling_freq: u32) -> Self {
        Self {
            sampling_freq,
            pass_freq: low,
            cutoff_freq: high,
        }
    }
}

fn sinc(x: f32) -> f32 {
    if x.abs() < 1e-6 {
        1.0
    } else {
        x.sin() / x
    }
}

/// Hamming window centered on tap 0, `x` in `-PI..=PI`
fn window(x: f32) -> f32 {
    0.54 + 0.46 * x.cos()
}

/// FIR filter coefficients
#[derive(Clone, Copy)]
pub struct FirCoefficients<const N: usize> {
    /// Filter taps (symmetric for linear phase)
    taps: [Coefficient; N],
}

impl<const N: usize> FirCoefficients<N> {
    /// Design a windowed-sinc kernel
    ///
    /// `N` must be odd so the kernel has a center tap. The bandpass is the
    /// difference of two lowpass responses.
    #[must_use]
    pub fn design(params: &FilterParams) -> Self {
        let fs = params.sampling_freq as f32;
        let rp = params.pass_freq as f32 / fs;
        let rc = params.cutoff_freq as f32 / fs;
        let m = (N as i32 - 1) / 2;
        let two_pi = 2.0 * core::f32::consts::PI;

        let mut taps = [Coefficient::ZERO; N];
        for (slot, n) in taps.iter_mut().zip(-m..=m) {
            let nf = n as f32;
            let response = rc * sinc(two_pi * rc * nf) - rp * sinc(two_pi * rp * nf);
            let w = if m == 0 {
                1.0
            } else {
                window(core::f32::consts::PI * nf / m as f32)
            };
            // Truncates toward zero after the +0.5 bias
            let raw = (AMPLITUDE * 2.0 * response * w + 0.5) as i32;
            let raw = raw.clamp(i32::from(i16::MIN), i32::from(i16::MAX));
            *slot = Coefficient::from_bits(raw as i16);
        }

        Self { taps }
    }

    /// Lowpass coefficients
    #[must_use]
    pub fn lowpass(cutoff_freq: u32, sampling_freq: u32) -> Self {
        Self::design(&FilterParams::lowpass(cutoff_freq, sampling_freq))
    }

    /// Bandpass coefficients
    #[must_use]
    pub fn bandpass(low: u32, high: u32, sampling_freq: u32) -> Self {
        Self::design(&FilterParams::bandpass(low, high, sampling_freq))
    }

    /// Get coefficient at index
    #[must_use]
    pub fn get(&self, index: usize) -> Coefficient {
        self.taps.get(index).copied().unwrap_or(Coefficient::ZERO)
    }

    /// All taps
    #[must_use]
    pub const fn taps(&self) -> &[Coefficient; N] {
        &self.taps
    }

    /// Tap values as raw integers (scaled by 2^15)
    #[must_use]
    pub fn raw(&self) -> [i16; N] {
        self.taps.map(Coefficient::to_bits)
    }
}

/// FIR filter state
#[derive(Clone)]
pub struct FirFilter<const N: usize> {
    /// Filter coefficients
    coeffs: FirCoefficients<N>,
    /// Input history (circular buffer)
    history: [i32; N],
    /// Next write position in history
    index: usize,
}

impl<const N: usize> FirFilter<N> {
    /// Create a new FIR filter with given coefficients
    #[must_use]
    pub const fn new(coeffs: FirCoefficients<N>) -> Self {
        Self {
            coeffs,
            history: [0; N],
            index: 0,
        }
    }

    /// Push one sample and return the accumulated dot product
    ///
    /// The result is scaled by 2^15. Overflow of the 32-bit accumulator
    /// trips a debug assertion.
    pub fn apply(&mut self, sample: i32) -> i32 {
        self.history[self.index] = sample;

        // history[i] lines up with taps[(N - 1 - index + i) % N]
        let start = N - 1 - self.index;
        let (head, tail) = self.coeffs.taps.split_at(start);

        self.index += 1;
        if self.index >= N {
            self.index = 0;
        }

        let sum: i64 = tail
            .iter()
            .chain(head)
            .zip(&self.history)
            .map(|(c, &x)| i64::from(c.to_bits()) * i64::from(x))
            .sum();

        debug_assert!(
            i32::try_from(sum).is_ok(),
            "FIR accumulator overflow: {sum}"
        );
        sum as i32
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.history = [0; N];
        self.index = 0;
    }

    /// Filter coefficients
    #[must_use]
    pub const fn coefficients(&self) -> &FirCoefficients<N> {
        &self.coeffs
    }
}

/// Shift-based exponential moving average
///
/// `acc += (input - acc) >> SHIFT`, i.e. a single-pole lowpass with
/// time constant `2^SHIFT` samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShiftAverage<const SHIFT: u32> {
    acc: i32,
}

impl<const SHIFT: u32> ShiftAverage<SHIFT> {
    /// Create a zeroed average
    #[must_use]
    pub const fn new() -> Self {
        Self { acc: 0 }
    }

    /// Feed one (pre-scaled) input and return the new average
    pub fn update(&mut self, input: i32) -> i32 {
        self.acc += (input - self.acc) >> SHIFT;
        self.acc
    }

    /// Current average
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.acc
    }

    /// Reset to zero
    pub fn reset(&mut self) {
        self.acc = 0;
    }
}
