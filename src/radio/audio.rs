//! Audio Output Link
//!
//! Hands modulated blocks from the sender to the audio transport (DMA or
//! a test harness) through a wait-free single-producer single-consumer
//! queue. A shared keyed flag tracks PTT: the producer raises it when
//! playback must start, the consumer drops it when the queue runs dry.
//!
//! The sender never signals the transport directly. The transport polls
//! [`AudioConsumer::is_keyed`] (from its idle loop or DMA interrupt),
//! asserts PTT and starts playback on the rising edge, then pulls blocks
//! with [`AudioConsumer::on_block_complete`] until it returns `None`.
//! Neither end blocks.

use core::sync::atomic::{AtomicBool, Ordering};

use heapless::spsc::{Consumer, Producer, Queue};

use super::transmit::ByteSink;
use crate::config::DAC_BLOCK_LEN;
use crate::dsp::afsk::{AfskModulator, AudioBlock};

/// Queue plus PTT flag shared by both ends
pub struct AudioLink {
    queue: Queue<AudioBlock, DAC_BLOCK_LEN>,
    keyed: AtomicBool,
}

impl AudioLink {
    /// Create an idle link
    #[must_use]
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
            keyed: AtomicBool::new(false),
        }
    }

    /// Split into the sender and transport ends
    pub fn split(&mut self) -> (AudioProducer<'_>, AudioConsumer<'_>) {
        let (tx, rx) = self.queue.split();
        let keyed = &self.keyed;
        (AudioProducer { tx, keyed }, AudioConsumer { rx, keyed })
    }
}

impl Default for AudioLink {
    fn default() -> Self {
        Self::new()
    }
}

/// Sender end of the audio link
pub struct AudioProducer<'a> {
    tx: Producer<'a, AudioBlock, DAC_BLOCK_LEN>,
    keyed: &'a AtomicBool,
}

impl AudioProducer<'_> {
    /// Room for at least one block
    #[must_use]
    pub fn ready(&self) -> bool {
        self.tx.ready()
    }

    /// Queue a block
    ///
    /// # Errors
    ///
    /// Gives the block back if the queue is full.
    pub fn enqueue(&mut self, block: AudioBlock) -> Result<(), AudioBlock> {
        self.tx.enqueue(block)
    }

    /// Key the transmitter if it is not already keyed
    ///
    /// Returns `true` if this call keyed it. The transport sees the same
    /// edge through [`AudioConsumer::is_keyed`].
    pub fn start(&self) -> bool {
        // Only the consumer clears the flag, so load then store is enough
        if self.keyed.load(Ordering::Acquire) {
            return false;
        }
        self.keyed.store(true, Ordering::Release);
        debug!("PTT on");
        true
    }

    /// Transmitter keyed
    #[must_use]
    pub fn is_keyed(&self) -> bool {
        self.keyed.load(Ordering::Acquire)
    }
}

/// Transport end of the audio link
pub struct AudioConsumer<'a> {
    rx: Consumer<'a, AudioBlock, DAC_BLOCK_LEN>,
    keyed: &'a AtomicBool,
}

impl AudioConsumer<'_> {
    /// Called when the previous block finished playing
    ///
    /// Returns the next block, or `None` after dropping PTT when the
    /// queue is empty.
    pub fn on_block_complete(&mut self) -> Option<AudioBlock> {
        let block = self.rx.dequeue();
        if block.is_none() && self.keyed.load(Ordering::Acquire) {
            self.keyed.store(false, Ordering::Release);
            debug!("PTT off");
        }
        block
    }

    /// Transmitter keyed
    #[must_use]
    pub fn is_keyed(&self) -> bool {
        self.keyed.load(Ordering::Acquire)
    }

    /// Blocks waiting for playback
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// No blocks waiting
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.len() == 0
    }
}

/// Modulator feeding the audio link
pub struct Transmitter<'a> {
    modulator: AfskModulator,
    output: AudioProducer<'a>,
}

impl<'a> Transmitter<'a> {
    /// Attach a modulator to the sender end of a link
    #[must_use]
    pub const fn new(output: AudioProducer<'a>) -> Self {
        Self {
            modulator: AfskModulator::new(),
            output,
        }
    }

    /// Transmitter keyed
    #[must_use]
    pub fn is_keyed(&self) -> bool {
        self.output.is_keyed()
    }
}

impl ByteSink for Transmitter<'_> {
    fn send_byte(&mut self, byte: u8, bit_stuff: bool) -> bool {
        if !self.output.ready() {
            // Queue full: make sure it is draining
            self.output.start();
            return false;
        }
        let block = self.modulator.encode_byte(byte, bit_stuff);
        if self.output.enqueue(block).is_err() {
            warn!("audio queue add failed");
        }
        true
    }

    fn start(&mut self) {
        if self.output.start() {
            trace!("playback requested");
        }
    }

    fn reset_stuffing(&mut self) {
        self.modulator.reset_stuffing();
    }
}
