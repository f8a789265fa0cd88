//! TNC Firmware Library
//!
//! This library provides the modem and link layer of a software Terminal
//! Node Controller: a Bell 202 AFSK modem at 1200 baud carrying AX.25
//! frames, with KISS for host applications and a simple digipeater.
//! Hardware bring-up lives in a board support crate that drives the
//! seams exposed here (sample batches in, audio blocks and PTT out).
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       TNC CONTEXT                            │
//! │  Ports  │  Station config  │  Terminal dispatch  │  Clock    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     PROTOCOL LAYER                           │
//! │  HDLC deframer  │  FCS  │  AX.25 addressing  │  KISS         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                       DSP LAYER                              │
//! │  FIR filters  │  Demodulator  │  Bit timing  │  AFSK         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    HARDWARE SEAMS                            │
//! │  ADC sample batches  │  Audio block queue  │  PTT flag       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Static memory**: All buffers are fixed-size `heapless` types
//! - **Type-driven design**: Callsigns and parameters validated at construction
//! - **No unsafe code**: Cross-context handoff uses lock-free SPSC queues
//! - **Polled state machines**: Receive and send never block

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]

#[macro_use]
mod fmt;

/// Digital Signal Processing
///
/// Filters, demodulator, bit timing recovery and AFSK modulator.
pub mod dsp;

/// Link Layer Protocols
///
/// FCS, AX.25 addressing, HDLC deframing, KISS, monitor output.
pub mod protocol;

/// Radio Port Logic
///
/// Channel access, audio output, digipeater and the TNC context.
pub mod radio;

/// Shared Types
///
/// Domain types used across modules.
pub mod types;

/// Configuration
///
/// Modem constants and runtime parameters.
pub mod config;

/// Error Types
pub mod error;

pub use error::TncError;
pub use types::Callsign;
