//! Packet inbox between network threads and the server tick.
//!
//! Connection threads push frames tagged with the authenticated sender; the
//! tick drains a bounded batch and runs it on the simulation thread. When
//! the inbox is full new packets are dropped and counted.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use colony_core::PlayerId;
use parking_lot::Mutex;
use tracing::warn;

/// A frame waiting to be dispatched.
#[derive(Debug, Clone)]
pub struct InboundPacket {
    /// Connection the frame arrived on.
    pub sender: PlayerId,
    /// Message id byte followed by payload.
    pub frame: Vec<u8>,
    /// When the frame was queued.
    pub received_at: Instant,
}

impl InboundPacket {
    /// Time spent in the inbox so far.
    #[must_use]
    pub fn waited(&self) -> Duration {
        self.received_at.elapsed()
    }
}

/// Thread-safe FIFO of inbound packets. Clones share the same queue.
pub struct PacketInbox {
    inner: Arc<Mutex<InboxInner>>,
}

struct InboxInner {
    queue: VecDeque<InboundPacket>,
    capacity: usize,
    total_received: u64,
    total_dropped: u64,
}

/// Statistics about the inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxStats {
    /// Current depth.
    pub depth: usize,
    /// Packets accepted.
    pub total_received: u64,
    /// Packets dropped because the inbox was full.
    pub total_dropped: u64,
}

impl PacketInbox {
    /// Inbox holding at most `capacity` packets.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InboxInner {
                queue: VecDeque::new(),
                capacity,
                total_received: 0,
                total_dropped: 0,
            })),
        }
    }

    /// Queue a frame. Returns `false` if it was dropped.
    pub fn push(&self, sender: PlayerId, frame: Vec<u8>) -> bool {
        let mut inner = self.inner.lock();
        if inner.queue.len() >= inner.capacity {
            inner.total_dropped += 1;
            warn!(%sender, capacity = inner.capacity, "Packet inbox full, dropping frame");
            return false;
        }
        inner.queue.push_back(InboundPacket {
            sender,
            frame,
            received_at: Instant::now(),
        });
        inner.total_received += 1;
        true
    }

    /// Take up to `max` packets in arrival order.
    pub fn drain(&self, max: usize) -> Vec<InboundPacket> {
        let mut inner = self.inner.lock();
        let n = max.min(inner.queue.len());
        inner.queue.drain(..n).collect()
    }

    /// Current depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> InboxStats {
        let inner = self.inner.lock();
        InboxStats {
            depth: inner.queue.len(),
            total_received: inner.total_received,
            total_dropped: inner.total_dropped,
        }
    }
}

impl Clone for PacketInbox {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
