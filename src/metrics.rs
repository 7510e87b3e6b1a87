//! Best-effort view and download counters.
//!
//! Increments are dispatched as background tasks. Failures are logged and
//! dropped; nothing is retried or reported to the caller. Views count once per
//! resource id for the lifetime of a recorder, downloads count every time.

use std::sync::Arc;

use dashmap::DashSet;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::backend::Backend;
use crate::resource::Counter;

/// Dispatches counter increments for one session.
#[derive(Clone)]
pub struct MetricRecorder {
    backend: Arc<dyn Backend>,
    viewed: Arc<DashSet<String>>,
}

impl MetricRecorder {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            viewed: Arc::new(DashSet::new()),
        }
    }

    /// Records a view of `id` unless this session already did.
    ///
    /// Returns the dispatched task, or `None` for a repeat view. Callers may
    /// ignore the handle; awaiting it only waits for the attempt to finish.
    pub fn record_view(&self, id: &str) -> Option<JoinHandle<()>> {
        if !self.viewed.insert(id.to_string()) {
            debug!(id, "view already recorded this session");
            return None;
        }
        Some(self.dispatch(id, Counter::Views))
    }

    /// Records a download of `id`.
    pub fn record_download(&self, id: &str) -> JoinHandle<()> {
        self.dispatch(id, Counter::Downloads)
    }

    /// Returns true when a view of `id` has been recorded.
    #[must_use]
    pub fn has_viewed(&self, id: &str) -> bool {
        self.viewed.contains(id)
    }

    fn dispatch(&self, id: &str, counter: Counter) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let id = id.to_string();
        tokio::spawn(async move {
            match backend.increment(&id, counter).await {
                Ok(()) => debug!(%id, %counter, "counter incremented"),
                Err(error) => debug!(%id, %counter, %error, "failed to increment counter"),
            }
        })
    }
}

impl std::fmt::Debug for MetricRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRecorder")
            .field("backend", &self.backend.name())
            .field("viewed", &self.viewed.len())
            .finish()
    }
}
