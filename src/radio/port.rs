//! Radio Port
//!
//! One modem channel: receive chain from ADC sample to validated frame,
//! and the transmit side from send queue to audio blocks.

use rand::RngCore;

use super::audio::{AudioProducer, Transmitter};
use super::digipeat::{digipeat, DigipeatOutcome};
use super::queue::SendQueue;
use super::transmit::{ChannelAccess, ChannelStatus, TxState};
use crate::config::{KissParams, StationConfig};
use crate::dsp::demod::Demodulator;
use crate::dsp::timing::{BitTimingRecovery, TimingRecovery};
use crate::protocol::hdlc::{FrameEvent, Framer};
use crate::types::{AdcResolution, TimingMode};

/// Per-port receive and transmit state
pub struct Port<'a> {
    /// Port number reported to the host
    number: u8,
    demod: Demodulator,
    timing: TimingRecovery,
    framer: Framer,
    /// Valid frames received
    packets: u32,
    kiss: KissParams,
    queue: SendQueue,
    sender: ChannelAccess,
    tx: Transmitter<'a>,
}

impl<'a> Port<'a> {
    /// Create a port with an 8-bit ADC transmitting into `audio`
    #[must_use]
    pub fn new(number: u8, timing: TimingMode, audio: AudioProducer<'a>) -> Self {
        Self::with_resolution(number, timing, AdcResolution::default(), audio)
    }

    /// Create a port for the given ADC width
    #[must_use]
    pub fn with_resolution(
        number: u8,
        timing: TimingMode,
        adc: AdcResolution,
        audio: AudioProducer<'a>,
    ) -> Self {
        Self {
            number,
            demod: Demodulator::with_resolution(adc),
            timing: TimingRecovery::new(timing),
            framer: Framer::new(),
            packets: 0,
            kiss: KissParams::new(),
            queue: SendQueue::new(),
            sender: ChannelAccess::new(),
            tx: Transmitter::new(audio),
        }
    }

    /// Run one ADC sample through the receive chain
    ///
    /// On [`FrameEvent::Valid`] the frame is available from
    /// [`Port::frame`] until the next sample.
    pub fn receive(&mut self, sample: u16) -> Option<FrameEvent> {
        let level = self.demod.process(sample)?;

        let framer = &mut self.framer;
        let mut event = None;
        self.timing.process(level, |bit| {
            if let Some(e) = framer.push_bit(bit) {
                event = Some(e);
            }
        });

        if event == Some(FrameEvent::Valid) {
            self.packets = self.packets.wrapping_add(1);
        }
        event
    }

    /// Last received frame, FCS included
    #[must_use]
    pub fn frame(&self) -> &[u8] {
        self.framer.frame()
    }

    /// Last received frame without FCS
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        self.framer.payload()
    }

    /// Offer the last received frame to the digipeater
    pub fn digipeat(&mut self, station: &StationConfig) -> DigipeatOutcome {
        digipeat(self.framer.frame_mut(), station, &mut self.queue)
    }

    /// Queue a frame (without FCS) for transmission
    ///
    /// Returns `false` if the send queue has no room.
    pub fn send_packet(&mut self, frame: &[u8]) -> bool {
        let queued = self.queue.push_frame(frame);
        if !queued {
            warn!("port {}: send queue full", self.number);
        }
        queued
    }

    /// Advance the sender
    pub fn poll_sender<R: RngCore>(&mut self, now: u32, rng: &mut R) -> TxState {
        let status = ChannelStatus {
            now,
            carrier: self.demod.carrier_detected(),
        };
        self.sender
            .poll(status, &self.kiss, &mut self.queue, &mut self.tx, rng)
    }

    /// Port number
    #[must_use]
    pub const fn number(&self) -> u8 {
        self.number
    }

    /// Valid frames received
    #[must_use]
    pub const fn packets(&self) -> u32 {
        self.packets
    }

    /// Carrier detected
    #[must_use]
    pub const fn carrier_detected(&self) -> bool {
        self.demod.carrier_detected()
    }

    /// Sender state
    #[must_use]
    pub const fn tx_state(&self) -> TxState {
        self.sender.state()
    }

    /// Transmitter keyed
    #[must_use]
    pub fn is_keyed(&self) -> bool {
        self.tx.is_keyed()
    }

    /// Channel access parameters
    #[must_use]
    pub const fn kiss(&self) -> &KissParams {
        &self.kiss
    }

    /// Mutable channel access parameters
    pub fn kiss_mut(&mut self) -> &mut KissParams {
        &mut self.kiss
    }

    /// Bytes waiting in the send queue
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Timing recovery in use
    #[must_use]
    pub const fn timing_mode(&self) -> TimingMode {
        self.timing.mode()
    }
}
