//! Radio Port Logic
//!
//! Per-port channel state and the TNC context driving it:
//! - Send queue and p-persistent channel access
//! - Audio output link and transmitter
//! - ADC sample batch handoff
//! - Digipeater
//! - Port and TNC context

pub mod audio;
pub mod digipeat;
pub mod port;
pub mod queue;
pub mod sampling;
pub mod tnc;
pub mod transmit;

pub use audio::{AudioConsumer, AudioLink, AudioProducer, Transmitter};
pub use port::Port;
pub use queue::SendQueue;
pub use sampling::{BatchConsumer, BatchProducer, SampleBatch, SampleBuffers};
pub use tnc::{FrameSink, KissOutcome, Tnc};
pub use transmit::{ByteSink, ChannelAccess, ChannelStatus, TxState};
