//! Live view of one resource by identifier.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{Backend, BackendError, ChangeEvent, FeedScope, Subscription};
use crate::resource::Resource;
use crate::resource::record;

/// Lifecycle of a single-resource view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailState {
    #[default]
    Idle,
    Loading,
    Ready(Resource),
    /// The fetch found no row with this id.
    NotFound,
    /// The row was deleted while being watched.
    Removed,
    Error(BackendError),
}

impl DetailState {
    #[must_use]
    pub fn resource(&self) -> Option<&Resource> {
        match self {
            Self::Ready(resource) => Some(resource),
            _ => None,
        }
    }
}

/// One resource kept in sync with the backend.
pub struct ResourceSource {
    backend: Arc<dyn Backend>,
    id: String,
    state: DetailState,
    subscription: Option<Subscription>,
}

impl ResourceSource {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, id: impl Into<String>) -> Self {
        Self {
            backend,
            id: id.into(),
            state: DetailState::Idle,
            subscription: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn state(&self) -> &DetailState {
        &self.state
    }

    #[must_use]
    pub fn resource(&self) -> Option<&Resource> {
        self.state.resource()
    }

    /// Fetches the resource. A missing row becomes [`DetailState::NotFound`].
    pub async fn load(&mut self) -> &DetailState {
        self.state = DetailState::Loading;
        self.state = match self.backend.get_resource(&self.id).await {
            Ok(Some(row)) => {
                info!(id = %self.id, "resource loaded");
                DetailState::Ready(record::from_row(&row))
            }
            Ok(None) => {
                debug!(id = %self.id, "resource not found");
                DetailState::NotFound
            }
            Err(error) => {
                warn!(id = %self.id, %error, "failed to load resource");
                DetailState::Error(error)
            }
        };
        &self.state
    }

    /// Opens a change feed scoped to this id. Returns false when unavailable.
    pub async fn subscribe(&mut self) -> bool {
        if self.subscription.is_some() {
            return true;
        }
        match self
            .backend
            .subscribe(FeedScope::Resource(self.id.clone()))
            .await
        {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                true
            }
            Err(error) => {
                warn!(id = %self.id, %error, "live updates unavailable for resource");
                false
            }
        }
    }

    /// Subscribes, then loads.
    pub async fn start(&mut self) -> &DetailState {
        self.subscribe().await;
        self.load().await
    }

    /// Applies an event for this id. Returns true when the state changed.
    ///
    /// Updates replace a ready record; a delete moves any ready record to
    /// [`DetailState::Removed`].
    pub fn apply(&mut self, event: &ChangeEvent) -> bool {
        if event.resource_id().as_deref() != Some(self.id.as_str()) {
            return false;
        }
        if !matches!(self.state, DetailState::Ready(_)) {
            return false;
        }
        self.state = match event {
            ChangeEvent::Insert(row) | ChangeEvent::Update(row) => {
                DetailState::Ready(record::from_row(row))
            }
            ChangeEvent::Delete(_) => {
                info!(id = %self.id, "resource removed");
                DetailState::Removed
            }
        };
        true
    }

    /// Waits for the next change event, applies it and returns it.
    ///
    /// Without a live feed this never resolves.
    pub async fn next_change(&mut self) -> ChangeEvent {
        loop {
            let Some(subscription) = self.subscription.as_mut() else {
                return std::future::pending().await;
            };
            if let Some(event) = subscription.next_event().await {
                self.apply(&event);
                return event;
            }
            self.subscription = None;
        }
    }

    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }
    }
}

impl std::fmt::Debug for ResourceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSource")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("subscribed", &self.subscription.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::backend::MemoryBackend;

    #[tokio::test]
    async fn test_missing_row_is_not_found() {
        let mut source = ResourceSource::new(Arc::new(MemoryBackend::new()), "404");
        assert_eq!(source.load().await, &DetailState::NotFound);
    }

    #[tokio::test]
    async fn test_update_replaces_and_delete_removes() {
        let backend = Arc::new(MemoryBackend::with_sample_catalog());
        let mut source = ResourceSource::new(backend, "3");
        source.load().await;
        assert_eq!(source.resource().unwrap().views, 1567);

        assert!(source.apply(&ChangeEvent::Update(json!({"id": "3", "title": "DBMS", "views": 1568}))));
        assert_eq!(source.resource().unwrap().views, 1568);

        assert!(!source.apply(&ChangeEvent::Delete(json!({"id": "4"}))));
        assert!(source.apply(&ChangeEvent::Delete(json!({"id": "3"}))));
        assert_eq!(source.state(), &DetailState::Removed);
        assert!(source.resource().is_none());
    }

    #[tokio::test]
    async fn test_fetch_error_is_distinct_from_removed() {
        let backend = Arc::new(MemoryBackend::with_sample_catalog());
        backend.set_failure(Some(BackendError::rejected("load resource", 404, "relation does not exist")));
        let mut source = ResourceSource::new(backend, "1");
        let state = source.load().await;
        assert!(matches!(state, DetailState::Error(BackendError::Rejected { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_live_update_through_feed() {
        let backend = Arc::new(MemoryBackend::with_sample_catalog());
        let mut source = ResourceSource::new(backend.clone(), "5");
        source.start().await;

        backend.update_row("5", &json!({"downloads": 1679}));
        let event = source.next_change().await;
        assert_eq!(event.label(), "update");
        assert_eq!(source.resource().unwrap().downloads, 1679);
        source.stop();
    }
}
