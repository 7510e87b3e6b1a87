//! Change feed types shared by every backend.
//!
//! A [`Subscription`] is a scoped handle on a standing change feed: events
//! arrive on an internal channel fed by a background task, and the task is
//! aborted when the handle is released or dropped. Holding the handle is what
//! keeps the channel open.

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::resource::record;

/// Buffered events per subscription before the producer waits.
pub const FEED_BUFFER: usize = 64;

/// Row-level change delivered by the backend. Payloads are raw rows.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// A row was created; carries the new row.
    Insert(Value),
    /// A row was modified; carries the new row.
    Update(Value),
    /// A row was removed; carries at least the old row's identifier.
    Delete(Value),
}

impl ChangeEvent {
    /// Returns the raw row carried by the event.
    #[must_use]
    pub fn row(&self) -> &Value {
        match self {
            Self::Insert(row) | Self::Update(row) | Self::Delete(row) => row,
        }
    }

    /// Returns the identifier of the affected row, when present.
    #[must_use]
    pub fn resource_id(&self) -> Option<String> {
        record::id_of(self.row())
    }

    /// Short label for logging.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

/// Which rows a subscription observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedScope {
    /// Every row of the resources collection.
    Collection,
    /// Only the row with this identifier.
    Resource(String),
}

impl FeedScope {
    /// Returns true when an event falls inside this scope.
    #[must_use]
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        match self {
            Self::Collection => true,
            Self::Resource(id) => event.resource_id().as_deref() == Some(id.as_str()),
        }
    }
}

/// Live handle on a change feed.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::Receiver<ChangeEvent>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Wraps an event channel and the task that feeds it.
    #[must_use]
    pub fn new(events: mpsc::Receiver<ChangeEvent>, task: JoinHandle<()>) -> Self {
        Self {
            events,
            task: Some(task),
        }
    }

    /// Waits for the next event. Returns `None` once the feed has closed.
    pub async fn next_event(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    /// Returns an event if one is already buffered.
    pub fn try_next_event(&mut self) -> Option<ChangeEvent> {
        self.events.try_recv().ok()
    }

    /// Returns true while the feeding task is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the feed and releases the channel.
    pub fn release(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("change feed released");
        }
        self.events.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shutdown();
    }
}
