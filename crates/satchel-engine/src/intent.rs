//! Cross-thread intent submission.
//!
//! Systems running in parallel read phases cannot touch the arena, so
//! they send [`ItemRequest`]s through an [`IntentSender`]. The tick engine
//! pulls everything pending at the start of its write phase and feeds it
//! through the ingress queue like any other batch.

use crossbeam_channel::{Receiver, Sender};
use satchel_core::{IngressError, ItemRequest};

/// Cloneable handle for queuing requests from any thread.
#[derive(Clone, Debug)]
pub struct IntentSender {
    tx: Sender<ItemRequest>,
}

impl IntentSender {
    pub(crate) fn new(tx: Sender<ItemRequest>) -> Self {
        Self { tx }
    }

    /// Queue a request for the next tick.
    ///
    /// Fails with [`IngressError::Disconnected`] once the engine is gone.
    pub fn send(&self, request: ItemRequest) -> Result<(), IngressError> {
        self.tx
            .send(request)
            .map_err(|_| IngressError::Disconnected)
    }

    /// Queue several requests, stopping at the first failure.
    pub fn send_all<I>(&self, requests: I) -> Result<(), IngressError>
    where
        I: IntoIterator<Item = ItemRequest>,
    {
        for request in requests {
            self.send(request)?;
        }
        Ok(())
    }
}

/// Engine side of the intent channel.
#[derive(Debug)]
pub(crate) struct IntentInbox {
    rx: Receiver<ItemRequest>,
    tx: Sender<ItemRequest>,
}

impl IntentInbox {
    pub(crate) fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { rx, tx }
    }

    pub(crate) fn sender(&self) -> IntentSender {
        IntentSender::new(self.tx.clone())
    }

    /// Everything sent so far, in send order.
    pub(crate) fn take(&self) -> Vec<ItemRequest> {
        self.rx.try_iter().collect()
    }

    /// Drop pending intents.
    pub(crate) fn clear(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::{ItemType, RequestPayload};

    fn req(count: u32) -> ItemRequest {
        ItemRequest::new(RequestPayload::AddRoot {
            item_type: ItemType(0),
            count,
        })
    }

    #[test]
    fn take_preserves_send_order_across_threads() {
        let inbox = IntentInbox::new();
        let sender = inbox.sender();
        std::thread::spawn(move || sender.send_all((1..=3).map(req)).unwrap())
            .join()
            .unwrap();
        let taken = inbox.take();
        assert_eq!(taken, vec![req(1), req(2), req(3)]);
        assert!(inbox.take().is_empty());
    }

    #[test]
    fn clear_drops_pending() {
        let inbox = IntentInbox::new();
        inbox.sender().send(req(1)).unwrap();
        inbox.clear();
        assert!(inbox.take().is_empty());
    }

    #[test]
    fn send_after_engine_drop_fails() {
        let inbox = IntentInbox::new();
        let sender = inbox.sender();
        drop(inbox);
        assert_eq!(sender.send(req(1)), Err(IngressError::Disconnected));
    }
}
