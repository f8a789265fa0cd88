//! Digital Signal Processing
//!
//! Provides the Bell 202 modem building blocks:
//! - FIR filters and running averages
//! - Delay-and-multiply demodulator with carrier detect
//! - Bit timing recovery (edge counting or PLL)
//! - NRZI AFSK modulator and wave tables

pub mod afsk;
pub mod demod;
pub mod filter;
pub mod timing;

pub use afsk::{AfskModulator, AudioBlock, ToneSlice, WaveTable};
pub use demod::Demodulator;
pub use timing::{BitTimingRecovery, EdgeCounter, PllRecovery, TimingRecovery};
