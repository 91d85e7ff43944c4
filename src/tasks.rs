//! Background tasks that feed the main event loop.
//!
//! Store writes, the live ticket feed and the wait-time timer all run as
//! tokio tasks. Each reports back through one unbounded channel that the
//! main loop drains with `try_recv()` between frames, so rendering never
//! waits on the network.
//!
//! # Adding New Task Types
//!
//! 1. Add a variant to `QueueMessage` for the result
//! 2. Add a spawn method to `TaskSpawner`
//! 3. Handle the message in `App::handle_message`

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::queue::{Completion, StoreCommand};
use crate::store::{Snapshot, Subscription, TicketStore, TICKETS_COLLECTION};

/// Wait times are recomputed this often.
pub const WAIT_TIME_REFRESH: Duration = Duration::from_secs(60);

/// Something the live feed reported.
#[derive(Debug)]
pub enum FeedEvent {
    /// A full, ordered copy of the collection.
    Snapshot(Snapshot),
    /// The feed ended with this user-facing message.
    Failed(String),
}

/// Messages sent from background tasks to the main event loop.
#[derive(Debug)]
pub enum QueueMessage {
    /// Live feed output.
    Feed(FeedEvent),
    /// A store write finished.
    Store(Completion),
    /// The wait-time timer fired.
    RefreshWaitTimes,
}

/// A long-lived background task that stops exactly once.
///
/// Dropping the handle stops the task too.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl TaskHandle {
    fn new(name: &'static str, handle: JoinHandle<()>) -> Self {
        Self {
            name,
            handle: Some(handle),
        }
    }

    /// Stop the task. Returns `true` only for the call that stopped it.
    pub fn close(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                debug!(task = self.name, "Background task stopped");
                true
            }
            None => false,
        }
    }

    /// Whether [`TaskHandle::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    /// Whether the task ended by itself (the feed failed, for instance).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Spawns background tasks that report through a [`QueueMessage`] channel.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<QueueMessage>,
}

impl TaskSpawner {
    /// Create a new TaskSpawner with the given channel sender.
    pub fn new(tx: mpsc::UnboundedSender<QueueMessage>) -> Self {
        Self { tx }
    }

    /// Run one store write and report its completion.
    pub fn spawn_command(&self, store: &Arc<dyn TicketStore>, command: StoreCommand) {
        let tx = self.tx.clone();
        let store = Arc::clone(store);
        tokio::spawn(async move {
            let completion = match command {
                StoreCommand::Create(fields) => {
                    let result = store.create(TICKETS_COLLECTION, fields).await;
                    Completion::Created(user_result(result))
                }
                StoreCommand::Update { id, fields } => {
                    let result = store.update(TICKETS_COLLECTION, &id, fields).await;
                    Completion::Updated {
                        id,
                        result: user_result(result),
                    }
                }
                StoreCommand::Delete { id } => {
                    let result = store.delete(TICKETS_COLLECTION, &id).await;
                    Completion::Deleted {
                        id,
                        result: user_result(result),
                    }
                }
            };
            let _ = tx.send(QueueMessage::Store(completion));
        });
    }

    /// Forward a live subscription's snapshots until it ends or is stopped.
    ///
    /// Stopping the returned handle drops the subscription, which closes it.
    pub fn spawn_feed(&self, mut subscription: Subscription) -> TaskHandle {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            while let Some(item) = subscription.next().await {
                let event = match item {
                    Ok(snapshot) => FeedEvent::Snapshot(snapshot),
                    Err(e) => {
                        warn!(error = %e, "Ticket feed ended with an error");
                        FeedEvent::Failed(AppError::from(e).user_message())
                    }
                };
                let failed = matches!(event, FeedEvent::Failed(_));
                if tx.send(QueueMessage::Feed(event)).is_err() || failed {
                    break;
                }
            }
            subscription.close();
        });
        info!("Ticket feed started");
        TaskHandle::new("ticket-feed", handle)
    }

    /// Fire [`QueueMessage::RefreshWaitTimes`] every `period`, first after one
    /// full period.
    pub fn spawn_wait_time_timer(&self, period: Duration) -> TaskHandle {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
            let mut ticker = time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(QueueMessage::RefreshWaitTimes).is_err() {
                    break;
                }
            }
        });
        debug!(period_secs = period.as_secs(), "Wait time timer started");
        TaskHandle::new("wait-time-timer", handle)
    }
}

fn user_result(result: crate::store::Result<()>) -> Result<(), String> {
    result.map_err(|e| AppError::from(e).user_message())
}

/// Create a new task channel and spawner.
///
/// Returns a tuple of (receiver, spawner). The receiver should be polled
/// in the main event loop, and the spawner should be used to spawn tasks.
pub fn create_task_channel() -> (mpsc::UnboundedReceiver<QueueMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}
