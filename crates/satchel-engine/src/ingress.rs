//! Bounded ingress queue with deterministic ordering.
//!
//! [`IngressQueue`] buffers requests between submission and tick
//! execution. It enforces a capacity limit, assigns monotonic arrival
//! sequence numbers, and sorts requests into a deterministic order for
//! the tick engine's write phase.
//!
//! # Ordering
//!
//! Requests are sorted by the composite key:
//! `(priority_class, source_id|MAX, source_seq|MAX, arrival_seq)`
//!
//! This ensures:
//! - Lower priority class values execute first (0 = system, 1 = gameplay).
//! - Within a priority class, source-keyed requests sort before anonymous ones.
//! - Source-keyed requests from the same source execute in sequence order.
//! - Anonymous requests execute in arrival order.

use std::collections::VecDeque;

use satchel_core::{IngressError, ItemRequest, Receipt, RequestOrigin};

/// A request paired with its original batch-local index from `submit()`.
#[derive(Debug)]
pub struct DrainedRequest {
    /// The request to apply.
    pub request: ItemRequest,
    /// The original batch-local index from the `submit()` call.
    pub request_index: usize,
    /// Which batch kind `request_index` refers to.
    pub origin: RequestOrigin,
}

/// Bounded request queue for the ingress pipeline.
#[derive(Debug)]
pub struct IngressQueue {
    queue: VecDeque<DrainedRequest>,
    capacity: usize,
    next_arrival_seq: u64,
    queue_full_rejections: u64,
}

impl IngressQueue {
    /// Create a new queue with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "IngressQueue capacity must be at least 1");
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            next_arrival_seq: 0,
            queue_full_rejections: 0,
        }
    }

    /// Submit a batch of requests to the queue.
    ///
    /// Returns one [`Receipt`] per input request. Requests are accepted in
    /// order until the queue is full; the rest receive `QueueFull`
    /// receipts. Arrival sequence numbers come from a counter that
    /// persists across calls, overwriting whatever the caller set.
    pub fn submit(&mut self, requests: Vec<ItemRequest>) -> Vec<Receipt> {
        self.submit_from(requests, RequestOrigin::Submitted)
    }

    /// [`submit()`](Self::submit) a batch from a specific origin.
    ///
    /// Receipts and drained requests carry `origin`, so indices from
    /// different batch kinds can be told apart.
    pub fn submit_from(
        &mut self,
        requests: Vec<ItemRequest>,
        origin: RequestOrigin,
    ) -> Vec<Receipt> {
        let mut receipts = Vec::with_capacity(requests.len());
        for (i, mut request) in requests.into_iter().enumerate() {
            if self.queue.len() >= self.capacity {
                self.queue_full_rejections += 1;
                receipts.push(Receipt::rejected(i, IngressError::QueueFull).with_origin(origin));
                continue;
            }
            request.arrival_seq = self.next_arrival_seq;
            self.next_arrival_seq += 1;
            self.queue.push_back(DrainedRequest {
                request,
                request_index: i,
                origin,
            });
            receipts.push(Receipt::queued(i).with_origin(origin));
        }
        receipts
    }

    /// Drain the queue, sorted into execution order.
    pub fn drain(&mut self) -> Vec<DrainedRequest> {
        let mut drained: Vec<DrainedRequest> = self.queue.drain(..).collect();
        // Deterministic sort: (priority_class, source_id|MAX, source_seq|MAX, arrival_seq)
        drained.sort_unstable_by_key(|d| {
            (
                d.request.priority_class,
                d.request.source_id.unwrap_or(u64::MAX),
                d.request.source_seq.unwrap_or(u64::MAX),
                d.request.arrival_seq,
            )
        });
        drained
    }

    /// Number of requests currently buffered.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Maximum number of requests this queue can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Requests refused for lack of room since construction.
    pub fn queue_full_rejections(&self) -> u64 {
        self.queue_full_rejections
    }

    /// Discard all pending requests.
    ///
    /// Called during [`TickEngine::reset()`](crate::TickEngine::reset) so
    /// stale requests don't survive a reset.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
