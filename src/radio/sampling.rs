//! ADC Sample Batch Handoff
//!
//! The ADC interrupt fills fixed-size batches and releases them to the
//! polling loop through a single-producer single-consumer ring. Batches
//! are interleaved across ports in round-robin order.
//!
//! Neither side blocks. [`BatchProducer::release`] runs at interrupt level
//! and fails with an overrun instead of waiting for a free slot.
//! [`BatchConsumer::acquire`] is a poll: it returns `None` when nothing is
//! ready, and the main loop may then sleep until the next interrupt.

use heapless::spsc::{Consumer, Producer, Queue};
use heapless::Vec;

use crate::config::{SAMPLE_BUF_LEN, SAMPLE_BUF_NUM};
use crate::error::TncError;

/// One batch of raw ADC samples (10 ms at the aggregate rate)
pub type SampleBatch = Vec<u16, SAMPLE_BUF_LEN>;

/// Ring of filled batches
///
/// One slot is always being filled by the producer, so at most
/// `SAMPLE_BUF_NUM - 1` batches wait for processing.
pub struct SampleBuffers {
    queue: Queue<SampleBatch, SAMPLE_BUF_NUM>,
}

impl SampleBuffers {
    /// Create an empty ring
    #[must_use]
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
        }
    }

    /// Split into the interrupt and polling ends
    pub fn split(&mut self) -> (BatchProducer<'_>, BatchConsumer<'_>) {
        let (tx, rx) = self.queue.split();
        (BatchProducer { tx }, BatchConsumer { rx })
    }
}

impl Default for SampleBuffers {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt end: releases filled batches
pub struct BatchProducer<'a> {
    tx: Producer<'a, SampleBatch, SAMPLE_BUF_NUM>,
}

impl BatchProducer<'_> {
    /// Hand a filled batch to the polling loop
    ///
    /// # Errors
    ///
    /// Returns [`TncError::SampleOverrun`] when every slot is still
    /// unconsumed. The receiver has fallen behind real time and the
    /// batch is lost.
    pub fn release(&mut self, batch: SampleBatch) -> Result<(), TncError> {
        self.tx.enqueue(batch).map_err(|_| {
            error!("sample buffer overrun");
            TncError::SampleOverrun
        })
    }
}

/// Polling end: acquires batches without blocking
pub struct BatchConsumer<'a> {
    rx: Consumer<'a, SampleBatch, SAMPLE_BUF_NUM>,
}

impl BatchConsumer<'_> {
    /// Next filled batch, if any, without waiting
    pub fn acquire(&mut self) -> Option<SampleBatch> {
        self.rx.dequeue()
    }

    /// Batches waiting
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
