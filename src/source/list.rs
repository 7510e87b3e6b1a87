//! Live list of every catalog resource.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{Backend, ChangeEvent, FeedScope, Subscription};
use crate::resource::Resource;
use crate::resource::record;

use super::SourceState;

/// Applies one change event to an in-memory resource list.
///
/// Inserts are prepended unless the id is already present, updates replace
/// the matching entry in place, deletes remove it. Returns true when the list
/// changed. Events without an id are ignored.
pub fn reconcile(resources: &mut Vec<Resource>, event: &ChangeEvent) -> bool {
    let Some(id) = event.resource_id() else {
        return false;
    };
    match event {
        ChangeEvent::Insert(row) => {
            if resources.iter().any(|r| r.id == id) {
                return false;
            }
            resources.insert(0, record::from_row(row));
            true
        }
        ChangeEvent::Update(row) => match resources.iter_mut().find(|r| r.id == id) {
            Some(existing) => {
                *existing = record::from_row(row);
                true
            }
            None => false,
        },
        ChangeEvent::Delete(_) => {
            let before = resources.len();
            resources.retain(|r| r.id != id);
            resources.len() != before
        }
    }
}

/// Resource collection kept in sync with the backend.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use eduverza_core::backend::MemoryBackend;
/// # use eduverza_core::source::ResourceListSource;
/// # async fn example() {
/// let mut source = ResourceListSource::new(Arc::new(MemoryBackend::with_sample_catalog()));
/// source.start().await;
/// println!("{} resources", source.resources().len());
/// source.stop();
/// # }
/// ```
pub struct ResourceListSource {
    backend: Arc<dyn Backend>,
    state: SourceState<Vec<Resource>>,
    subscription: Option<Subscription>,
}

impl ResourceListSource {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: SourceState::Idle,
            subscription: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SourceState<Vec<Resource>> {
        &self.state
    }

    /// Current resources; empty unless the source is ready.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        self.state.ready().map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns true while a change feed is held.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Fetches the whole collection, newest first, replacing the current state.
    ///
    /// A failure leaves the source in [`SourceState::Error`]; there is no retry.
    pub async fn load(&mut self) -> &SourceState<Vec<Resource>> {
        self.state = SourceState::Loading;
        self.state = match self.backend.list_resources().await {
            Ok(rows) => {
                let resources: Vec<Resource> = rows.iter().map(record::from_row).collect();
                info!(count = resources.len(), backend = self.backend.name(), "resources loaded");
                SourceState::Ready(resources)
            }
            Err(error) => {
                warn!(%error, "failed to load resources");
                SourceState::Error(error)
            }
        };
        &self.state
    }

    /// Opens the collection change feed. Returns false when it is unavailable.
    pub async fn subscribe(&mut self) -> bool {
        if self.subscription.is_some() {
            return true;
        }
        match self.backend.subscribe(FeedScope::Collection).await {
            Ok(subscription) => {
                debug!("resource list subscribed");
                self.subscription = Some(subscription);
                true
            }
            Err(error) => {
                warn!(%error, "live updates unavailable for the resource list");
                false
            }
        }
    }

    /// Subscribes, then loads. Events delivered during the fetch stay buffered
    /// and are applied by [`Self::next_change`].
    pub async fn start(&mut self) -> &SourceState<Vec<Resource>> {
        self.subscribe().await;
        self.load().await
    }

    /// Applies an event to the ready list. Ignored in any other state.
    pub fn apply(&mut self, event: &ChangeEvent) -> bool {
        match &mut self.state {
            SourceState::Ready(resources) => reconcile(resources, event),
            _ => false,
        }
    }

    /// Waits for the next change event, applies it and returns it.
    ///
    /// Without a live feed this never resolves, matching a source that simply
    /// receives no updates.
    pub async fn next_change(&mut self) -> ChangeEvent {
        loop {
            let Some(subscription) = self.subscription.as_mut() else {
                return std::future::pending().await;
            };
            if let Some(event) = subscription.next_event().await {
                self.apply(&event);
                return event;
            }
            debug!("resource list feed closed");
            self.subscription = None;
        }
    }

    /// Releases the change feed. Loaded data stays available.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }
    }
}

impl std::fmt::Debug for ResourceListSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceListSource")
            .field("backend", &self.backend.name())
            .field("state", &self.state)
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}
