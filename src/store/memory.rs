//! In-process ticket store with a real push feed.
//!
//! Used by `--demo` mode and by tests. Every write publishes the full,
//! re-ordered collection to all open subscriptions, just like a remote
//! store would. Open times start out pending and are finalized by the
//! next write, so readers exercise the best-effort estimate path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::{Result, StoreError};
use super::{FeedProducer, Snapshot, Subscription, TicketStore, TIME_OPEN_FIELD};
use crate::elapsed::Clock;
use crate::ticket::{Document, ServerTimestamp, TicketFields};

/// What the feed currently publishes: the ordered documents, or the message
/// of the failure that ended it.
type FeedState = std::result::Result<Vec<Document>, String>;

struct Collection {
    documents: Vec<Document>,
    feed: watch::Sender<FeedState>,
}

impl Collection {
    fn new() -> Self {
        let (feed, _) = watch::channel(Ok(Vec::new()));
        Self {
            documents: Vec::new(),
            feed,
        }
    }

    fn finalize_pending(&mut self) {
        for doc in &mut self.documents {
            if let ServerTimestamp::Pending { estimate } = doc.time_open {
                doc.time_open = ServerTimestamp::Final(estimate);
            }
        }
    }

    fn publish(&mut self) {
        self.documents.sort_by_key(|d| d.time_open.estimate());
        if self.feed.borrow().is_err() {
            return;
        }
        self.feed.send_replace(Ok(self.documents.clone()));
    }
}

#[derive(Default)]
struct State {
    collections: HashMap<String, Collection>,
    next_id: u64,
    fail_next_write: Option<String>,
}

impl State {
    fn collection(&mut self, name: &str) -> &mut Collection {
        self.collections
            .entry(name.to_string())
            .or_insert_with(Collection::new)
    }

    fn take_injected_failure(&mut self) -> Result<()> {
        match self.fail_next_write.take() {
            Some(message) => Err(StoreError::Server(message)),
            None => Ok(()),
        }
    }
}

/// A ticket store that lives in memory.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
    active_feeds: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create an empty store that stamps documents using `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
            active_feeds: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a ticket with a known, already final open time.
    ///
    /// Returns the assigned id.
    pub fn seed(&self, collection: &str, fields: TicketFields, time_open: DateTime<Utc>) -> String {
        let mut state = self.lock();
        state.next_id += 1;
        let id = format!("mem-{}", state.next_id);
        let coll = state.collection(collection);
        coll.documents.push(Document {
            id: id.clone(),
            fields,
            time_open: ServerTimestamp::Final(time_open),
        });
        coll.publish();
        id
    }

    /// Commit every pending open time in `collection`.
    pub fn finalize_pending(&self, collection: &str) {
        let mut state = self.lock();
        let coll = state.collection(collection);
        coll.finalize_pending();
        coll.publish();
    }

    /// End the live feed of `collection` with `message`.
    ///
    /// Open subscriptions receive the error and stop; later subscriptions
    /// fail the same way.
    pub fn fail_feed(&self, collection: &str, message: impl Into<String>) {
        let message = message.into();
        warn!(collection, %message, "Injected feed failure");
        let mut state = self.lock();
        state.collection(collection).feed.send_replace(Err(message));
    }

    /// Make the next create, update or delete fail with a server error.
    pub fn fail_next_write(&self, message: impl Into<String>) {
        self.lock().fail_next_write = Some(message.into());
    }

    /// Current documents of `collection`, in query order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock().collection(collection).documents.clone()
    }

    /// Number of feed tasks still running.
    pub fn active_feeds(&self) -> usize {
        self.active_feeds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn subscribe(&self, collection: &str, order_key: &str) -> Result<Subscription> {
        if order_key != TIME_OPEN_FIELD {
            return Err(StoreError::UnsupportedQuery(format!(
                "memory store can only order by {}",
                TIME_OPEN_FIELD
            )));
        }

        let feed_rx = self.lock().collection(collection).feed.subscribe();
        let (subscription, producer) = Subscription::channel();

        self.active_feeds.fetch_add(1, Ordering::SeqCst);
        let active_feeds = Arc::clone(&self.active_feeds);
        let name = collection.to_string();
        tokio::spawn(async move {
            run_feed(feed_rx, producer).await;
            active_feeds.fetch_sub(1, Ordering::SeqCst);
            debug!(collection = %name, "Memory feed stopped");
        });

        info!(collection, order_key, "Subscribed to memory feed");
        Ok(subscription)
    }

    async fn create(&self, collection: &str, fields: TicketFields) -> Result<()> {
        let estimate = self.clock.now();
        let mut state = self.lock();
        state.take_injected_failure()?;
        state.next_id += 1;
        let id = format!("mem-{}", state.next_id);

        let coll = state.collection(collection);
        coll.finalize_pending();
        coll.documents.push(Document {
            id: id.clone(),
            fields,
            time_open: ServerTimestamp::Pending { estimate },
        });
        coll.publish();

        debug!(collection, id = %id, "Created document");
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: TicketFields) -> Result<()> {
        let mut state = self.lock();
        state.take_injected_failure()?;

        let coll = state.collection(collection);
        let doc = coll
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)))?;
        doc.fields = fields;
        coll.finalize_pending();
        coll.publish();

        debug!(collection, id, "Updated document");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut state = self.lock();
        state.take_injected_failure()?;

        let coll = state.collection(collection);
        coll.documents.retain(|d| d.id != id);
        coll.finalize_pending();
        coll.publish();

        debug!(collection, id, "Deleted document");
        Ok(())
    }
}

/// Forward every published state to the subscriber until either side stops.
async fn run_feed(mut feed_rx: watch::Receiver<FeedState>, producer: FeedProducer) {
    let FeedProducer { tx, mut cancelled } = producer;

    loop {
        let state = feed_rx.borrow_and_update().clone();
        let failed = state.is_err();
        let item = state.map(Snapshot::new).map_err(StoreError::Feed);

        tokio::select! {
            _ = &mut cancelled => return,
            sent = tx.send(item) => {
                if sent.is_err() {
                    return;
                }
            }
        }

        if failed {
            return;
        }

        tokio::select! {
            _ = &mut cancelled => return,
            changed = feed_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}
