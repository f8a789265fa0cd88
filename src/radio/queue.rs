//! Outbound Frame Queue
//!
//! A byte ring holding length-prefixed records:
//!
//! ```text
//! len_lo len_hi frame... fcs_lo fcs_hi
//! ```
//!
//! `len` counts the frame plus FCS. A record is only enqueued when it
//! fits entirely, so the consumer can trust the length prefix.

use heapless::Deque;

use crate::config::SEND_QUEUE_LEN;
use crate::protocol::fcs::{Fcs, FCS_LEN};

/// Bytes of the length prefix
pub const LEN_PREFIX: usize = 2;

/// Byte queue of outbound frame records
pub struct SendQueue<const N: usize = SEND_QUEUE_LEN> {
    bytes: Deque<u8, N>,
}

impl<const N: usize> SendQueue<N> {
    /// Create an empty queue
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: Deque::new(),
        }
    }

    /// Enqueue `frame` with its FCS appended
    ///
    /// Returns `false`, leaving the queue unchanged, if the whole record
    /// does not fit.
    pub fn push_frame(&mut self, frame: &[u8]) -> bool {
        let len = frame.len() + FCS_LEN;
        let Ok(prefix) = u16::try_from(len) else {
            return false;
        };
        if self.free() < len + LEN_PREFIX {
            return false;
        }

        let mut fcs = Fcs::new();
        fcs.update(frame);

        let record = prefix
            .to_le_bytes()
            .into_iter()
            .chain(frame.iter().copied())
            .chain(fcs.to_bytes());
        for b in record {
            // Room was checked above
            let _ = self.bytes.push_back(b);
        }
        true
    }

    /// Dequeue one byte
    pub fn pop(&mut self) -> Option<u8> {
        self.bytes.pop_front()
    }

    /// Free space in bytes
    #[must_use]
    pub fn free(&self) -> usize {
        N - self.bytes.len()
    }

    /// Queued bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Drop everything queued
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

impl<const N: usize> Default for SendQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
