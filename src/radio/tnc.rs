//! TNC Context
//!
//! Ties the ports to the station configuration, the 10 ms clock and the
//! attached terminals. The main loop alternates [`Tnc::receive`] and
//! [`Tnc::send`] and polls [`Tnc::beacon`]; the terminal layer feeds host
//! commands through [`Tnc::handle_kiss`].

use core::fmt::{self, Write};

use heapless::{String, Vec};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::digipeat::DigipeatOutcome;
use super::port::Port;
use super::sampling::BatchConsumer;
use crate::config::{
    StationConfig, BEACON_PORT, BTEXT_LEN, DATA_LEN, MAX_BEACON_MINUTES, PORT_N, TICKS_PER_MINUTE,
    UNPROTO_N,
};
use crate::error::TncError;
use crate::protocol::ax25::build_ui_frame;
use crate::protocol::hdlc::FrameEvent;
use crate::protocol::kiss::{self, KissCommand, KissFrame};
use crate::protocol::monitor::{should_display, write_monitor};
use crate::types::Callsign;

/// A terminal that receives decoded frames
pub trait FrameSink {
    /// Terminal is in KISS mode
    fn kiss_mode(&self) -> bool;

    /// Write output bytes
    fn write(&mut self, bytes: &[u8]);
}

/// Formatter adapter over a sink
struct SinkWriter<'s, S: ?Sized>(&'s mut S);

impl<S: FrameSink + ?Sized> Write for SinkWriter<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write(s.as_bytes());
        Ok(())
    }
}

/// Result of a host KISS command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KissOutcome {
    /// Stay in KISS mode
    Continue,
    /// Host asked to leave KISS mode
    Exit,
}

/// TNC with all ports
pub struct Tnc<'a> {
    station: StationConfig,
    ports: [Port<'a>; PORT_N],
    /// Clock in 10 ms ticks, one per sample batch
    time: u32,
    /// Port owning the next interleaved sample
    next_port: usize,
    /// Tick the beacon interval counts from
    beacon_start: u32,
    rng: SmallRng,
}

impl<'a> Tnc<'a> {
    /// Create a TNC
    ///
    /// A non-zero command-level TXDELAY overrides port 0's KISS TXDELAY.
    #[must_use]
    pub fn new(station: StationConfig, mut ports: [Port<'a>; PORT_N], seed: u64) -> Self {
        if station.txdelay > 0 {
            ports[0].kiss_mut().txdelay = station.kiss_txdelay();
        }
        info!("TNC up, {} port(s)", PORT_N);
        Self {
            station,
            ports,
            time: 0,
            next_port: 0,
            beacon_start: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Process the next sample batch, if one is ready
    ///
    /// Returns `false` when no batch was waiting.
    pub fn receive(&mut self, batches: &mut BatchConsumer<'_>, sinks: &mut [&mut dyn FrameSink]) -> bool {
        match batches.acquire() {
            Some(batch) => {
                self.process_batch(&batch, sinks);
                true
            }
            None => false,
        }
    }

    /// Run one batch of interleaved samples through the ports
    ///
    /// Each batch advances the clock by one 10 ms tick.
    pub fn process_batch(&mut self, samples: &[u16], sinks: &mut [&mut dyn FrameSink]) {
        self.time = self.time.wrapping_add(1);
        for &sample in samples {
            let idx = self.next_port;
            self.next_port = (idx + 1) % PORT_N;
            if self.ports[idx].receive(sample) == Some(FrameEvent::Valid) {
                self.dispatch(idx, sinks);
            }
        }
    }

    /// Digipeat and deliver the frame just received on `idx`
    fn dispatch(&mut self, idx: usize, sinks: &mut [&mut dyn FrameSink]) {
        let port = &mut self.ports[idx];
        if self.station.digipeat {
            let outcome = port.digipeat(&self.station);
            if outcome != DigipeatOutcome::Repeated {
                trace!("not digipeated: {:?}", outcome);
            }
        }

        let frame = port.frame();
        for sink in sinks.iter_mut() {
            if sink.kiss_mode() {
                kiss::encode_frame(port.number(), port.payload(), |b| sink.write(&[b]));
                continue;
            }
            if !should_display(self.station.monitor, self.station.mycall.as_ref(), frame) {
                continue;
            }
            let mut w = SinkWriter(&mut **sink);
            let shown = if PORT_N > 1 {
                write!(w, "({}) {}:{}:", self.time, port.number(), port.packets())
            } else {
                Ok(())
            };
            // Sink writes are infallible
            let _ = shown
                .and_then(|()| write_monitor(&mut w, frame))
                .and_then(|()| w.write_str("\r\n"));
        }
    }

    /// Advance every port's sender
    pub fn send(&mut self) {
        let now = self.time;
        for port in &mut self.ports {
            port.poll_sender(now, &mut self.rng);
        }
    }

    /// Queue a frame (without FCS) on `port`
    ///
    /// # Errors
    ///
    /// Returns [`TncError::InvalidPort`] or [`TncError::QueueFull`].
    pub fn send_packet(&mut self, port: usize, frame: &[u8]) -> Result<(), TncError> {
        let port = self.ports.get_mut(port).ok_or(TncError::InvalidPort)?;
        if port.send_packet(frame) {
            Ok(())
        } else {
            Err(TncError::QueueFull)
        }
    }

    /// Queue a UI frame along the configured unproto path
    ///
    /// Does nothing and returns `false` when mycall or the unproto
    /// destination is unset, or the frame does not fit.
    pub fn send_unproto(&mut self, port: usize, info: &[u8]) -> bool {
        let (Some(src), Some(dst)) = (self.station.mycall, self.station.unproto[0]) else {
            return false;
        };
        let digis: Vec<Callsign, { UNPROTO_N - 1 }> =
            self.station.unproto[1..].iter().flatten().copied().collect();

        let mut frame: Vec<u8, DATA_LEN> = Vec::new();
        if build_ui_frame(&dst, &src, &digis, info, &mut frame).is_err() {
            return false;
        }
        self.ports
            .get_mut(port)
            .is_some_and(|p| p.send_packet(&frame))
    }

    /// Apply a command decoded from the host
    ///
    /// # Errors
    ///
    /// Returns [`TncError::InvalidPort`] for a port that does not exist
    /// and [`TncError::QueueFull`] when a data frame cannot be queued.
    pub fn handle_kiss(&mut self, frame: &KissFrame<'_>) -> Result<KissOutcome, TncError> {
        if frame.command == KissCommand::Return {
            info!("leaving KISS mode");
            return Ok(KissOutcome::Exit);
        }

        let port = self
            .ports
            .get_mut(usize::from(frame.port))
            .ok_or(TncError::InvalidPort)?;

        match frame.command {
            KissCommand::Data(data) => {
                if !port.send_packet(data) {
                    return Err(TncError::QueueFull);
                }
            }
            KissCommand::TxDelay(v) => port.kiss_mut().txdelay = v,
            KissCommand::Persistence(v) => port.kiss_mut().persistence = v,
            KissCommand::SlotTime(v) => port.kiss_mut().slot_time = v,
            KissCommand::FullDuplex(v) => port.kiss_mut().full_duplex = v,
            KissCommand::TxTail(_)
            | KissCommand::SetHardware(_)
            | KissCommand::Unknown(_)
            | KissCommand::Return => {}
        }

        Ok(KissOutcome::Continue)
    }

    /// Set the command-level TXDELAY and port 0's KISS TXDELAY
    ///
    /// # Errors
    ///
    /// Returns [`TncError::OutOfRange`] outside `1..=200`.
    pub fn set_txdelay(&mut self, txdelay: u8) -> Result<(), TncError> {
        if txdelay == 0 || txdelay > StationConfig::MAX_TXDELAY {
            return Err(TncError::OutOfRange);
        }
        self.station.txdelay = txdelay;
        self.ports[0].kiss_mut().txdelay = self.station.kiss_txdelay();
        Ok(())
    }

    /// Send the beacon text once its interval has elapsed
    ///
    /// Polled from the main loop. The interval restarts whether or not
    /// the frame could be queued, so a station without mycall or an
    /// unproto destination does not retry every tick. Returns `true`
    /// when a beacon was queued on port 0.
    pub fn beacon(&mut self) -> bool {
        let minutes = self.station.beacon;
        if minutes == 0 || self.station.btext.is_empty() {
            return false;
        }
        let interval = u32::from(minutes) * TICKS_PER_MINUTE;
        if self.time.wrapping_sub(self.beacon_start) < interval {
            return false;
        }
        self.beacon_start = self.time;

        let text = self.station.btext.clone();
        let sent = self.send_unproto(BEACON_PORT, text.as_bytes());
        if sent {
            info!("beacon sent");
        } else {
            warn!("beacon not sent, check mycall and unproto");
        }
        sent
    }

    /// Restart the beacon interval from now
    pub fn reset_beacon(&mut self) {
        self.beacon_start = self.time;
    }

    /// Set the beacon interval in minutes, 0 turns it off
    ///
    /// # Errors
    ///
    /// Returns [`TncError::OutOfRange`] above 60 minutes.
    pub fn set_beacon(&mut self, minutes: u8) -> Result<(), TncError> {
        if minutes > MAX_BEACON_MINUTES {
            return Err(TncError::OutOfRange);
        }
        self.station.beacon = minutes;
        self.reset_beacon();
        Ok(())
    }

    /// Set the beacon text
    ///
    /// # Errors
    ///
    /// Returns [`TncError::OutOfRange`] for text longer than
    /// [`BTEXT_LEN`] bytes; the old text is kept.
    pub fn set_btext(&mut self, text: &str) -> Result<(), TncError> {
        let mut btext: String<BTEXT_LEN> = String::new();
        btext.push_str(text).map_err(|()| TncError::OutOfRange)?;
        self.station.btext = btext;
        Ok(())
    }

    /// Station configuration
    #[must_use]
    pub const fn station(&self) -> &StationConfig {
        &self.station
    }

    /// Mutable station configuration
    pub fn station_mut(&mut self) -> &mut StationConfig {
        &mut self.station
    }

    /// Port by index
    #[must_use]
    pub fn port(&self, idx: usize) -> Option<&Port<'a>> {
        self.ports.get(idx)
    }

    /// Mutable port by index
    pub fn port_mut(&mut self, idx: usize) -> Option<&mut Port<'a>> {
        self.ports.get_mut(idx)
    }

    /// Clock in 10 ms ticks
    #[must_use]
    pub const fn time(&self) -> u32 {
        self.time
    }

    /// Advance the clock without samples
    pub fn tick(&mut self) {
        self.time = self.time.wrapping_add(1);
    }
}
