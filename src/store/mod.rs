//! Ticket store capability and its backends.
//!
//! The queue only needs four things from a store: a live feed of the whole
//! collection ordered by a field, and create/update/delete. [`TicketStore`]
//! captures exactly that, so the controller can run against Cloud Firestore
//! or the in-process [`MemoryStore`] unchanged.

pub mod error;
mod firestore;
mod memory;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::ticket::{Document, TicketFields};

pub use error::{Result, StoreError};
pub use firestore::{FirestoreStore, DEFAULT_FIRESTORE_URL};
pub use memory::MemoryStore;

/// Collection holding the queue's tickets.
pub const TICKETS_COLLECTION: &str = "tickets";

/// Field the queue is ordered by.
pub const TIME_OPEN_FIELD: &str = "timeOpen";

/// Buffered snapshots per subscription before the producer waits.
pub(crate) const FEED_BUFFER: usize = 16;

/// The complete contents of a collection at one moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Documents in query order.
    pub documents: Vec<Document>,
}

impl Snapshot {
    /// Create a snapshot from documents already in query order.
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the collection was empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// A live feed of snapshots.
///
/// Each item is either a full snapshot or the error that ended the feed.
/// The feed is closed exactly once: by [`Subscription::close`], or on drop.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<Result<Snapshot>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl Subscription {
    /// Pair a snapshot receiver with the producer's cancel signal.
    pub fn new(rx: mpsc::Receiver<Result<Snapshot>>, cancel: oneshot::Sender<()>) -> Self {
        Self {
            rx,
            cancel: Some(cancel),
        }
    }

    /// Create a subscription plus the producer half used by backends.
    pub(crate) fn channel() -> (Self, FeedProducer) {
        let (tx, rx) = mpsc::channel(FEED_BUFFER);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        (
            Self::new(rx, cancel_tx),
            FeedProducer {
                tx,
                cancelled: cancel_rx,
            },
        )
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the feed has been closed from either side.
    pub async fn next(&mut self) -> Option<Result<Snapshot>> {
        if self.cancel.is_none() {
            return None;
        }
        self.rx.recv().await
    }

    /// Close the feed.
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&mut self) -> bool {
        match self.cancel.take() {
            Some(cancel) => {
                let _ = cancel.send(());
                self.rx.close();
                debug!("Subscription closed");
                true
            }
            None => false,
        }
    }

    /// Whether [`Subscription::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Producer half of a [`Subscription`], owned by a backend's feed task.
#[derive(Debug)]
pub(crate) struct FeedProducer {
    pub(crate) tx: mpsc::Sender<Result<Snapshot>>,
    pub(crate) cancelled: oneshot::Receiver<()>,
}

/// A document store holding the ticket collection.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Open a live feed of `collection` ordered ascending by `order_key`.
    async fn subscribe(&self, collection: &str, order_key: &str) -> Result<Subscription>;

    /// Add a document. The store assigns its id and its open time.
    async fn create(&self, collection: &str, fields: TicketFields) -> Result<()>;

    /// Overwrite the editable fields of document `id`.
    async fn update(&self, collection: &str, id: &str, fields: TicketFields) -> Result<()>;

    /// Remove document `id`.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_close_runs_once() {
        let (mut sub, producer) = Subscription::channel();

        assert!(sub.close());
        assert!(!sub.close());
        assert!(sub.is_closed());

        let mut cancelled = producer.cancelled;
        assert!(cancelled.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_next_after_close_is_none() {
        let (mut sub, producer) = Subscription::channel();
        producer.tx.send(Ok(Snapshot::default())).await.unwrap();

        sub.close();

        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_drop_signals_producer() {
        let (sub, producer) = Subscription::channel();
        drop(sub);

        assert!(producer.cancelled.await.is_ok());
        assert!(producer.tx.is_closed());
    }

    #[tokio::test]
    async fn test_next_delivers_in_order() {
        let (mut sub, producer) = Subscription::channel();
        producer.tx.send(Ok(Snapshot::default())).await.unwrap();
        producer
            .tx
            .send(Err(StoreError::Feed("network lost".to_string())))
            .await
            .unwrap();

        assert!(matches!(sub.next().await, Some(Ok(s)) if s.is_empty()));
        assert!(matches!(sub.next().await, Some(Err(StoreError::Feed(_)))));
    }
}
