//! Collection-level aggregates, recomputed on every change.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::{Backend, ChangeEvent, FeedScope, Subscription};
use crate::resource::Resource;
use crate::resource::record;

/// Downloads attributed to one estimated active student.
const DOWNLOADS_PER_STUDENT: u64 = 5;

/// Aggregate numbers shown on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub total_resources: u64,
    pub total_downloads: u64,
    /// Heuristic: `max(round(total_downloads / 5), total_resources)`.
    pub active_students: u64,
}

impl Stats {
    /// Builds stats from the two raw counts.
    #[must_use]
    pub fn from_counts(total_resources: u64, total_downloads: u64) -> Self {
        // Integer round-half-up of downloads / 5; the fraction is never exactly .5.
        let estimated = total_downloads.saturating_add(DOWNLOADS_PER_STUDENT / 2) / DOWNLOADS_PER_STUDENT;
        Self {
            total_resources,
            total_downloads,
            active_students: estimated.max(total_resources),
        }
    }

    /// Builds stats from an already loaded resource list.
    #[must_use]
    pub fn from_resources(resources: &[Resource]) -> Self {
        let downloads = resources.iter().map(|r| r.downloads).sum();
        Self::from_counts(resources.len() as u64, downloads)
    }
}

/// Stats kept current by recomputing after every collection change.
///
/// Failures degrade to zero instead of surfacing an error. The loading flag
/// is raised only for the first computation.
pub struct StatsSource {
    backend: Arc<dyn Backend>,
    stats: Stats,
    loading: bool,
    computed: bool,
    subscription: Option<Subscription>,
}

impl StatsSource {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            stats: Stats::default(),
            loading: true,
            computed: false,
            subscription: None,
        }
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// True until the first computation finishes; recomputations never raise it again.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns true once at least one computation has finished.
    #[must_use]
    pub fn has_computed(&self) -> bool {
        self.computed
    }

    /// Runs the count and download queries concurrently and rebuilds the stats.
    pub async fn compute(&mut self) -> Stats {
        let (count, downloads) = tokio::join!(
            self.backend.count_resources(),
            self.backend.download_counts()
        );

        let total_resources = count.unwrap_or_else(|error| {
            warn!(%error, "resource count unavailable; showing zero");
            0
        });
        let total_downloads = downloads.map_or_else(
            |error| {
                warn!(%error, "download totals unavailable; showing zero");
                0
            },
            |rows| rows.iter().map(record::downloads_of).sum::<u64>(),
        );

        self.stats = Stats::from_counts(total_resources, total_downloads);
        self.loading = false;
        self.computed = true;
        debug!(stats = ?self.stats, "stats computed");
        self.stats
    }

    /// Opens the collection change feed. Returns false when unavailable.
    pub async fn subscribe(&mut self) -> bool {
        if self.subscription.is_some() {
            return true;
        }
        match self.backend.subscribe(FeedScope::Collection).await {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                true
            }
            Err(error) => {
                warn!(%error, "live updates unavailable for stats");
                false
            }
        }
    }

    /// Subscribes, then computes.
    pub async fn start(&mut self) -> Stats {
        self.subscribe().await;
        self.compute().await
    }

    /// Waits for the next change event and recomputes the whole aggregate.
    ///
    /// Without a live feed this never resolves.
    pub async fn next_change(&mut self) -> ChangeEvent {
        loop {
            let Some(subscription) = self.subscription.as_mut() else {
                return std::future::pending().await;
            };
            if let Some(event) = subscription.next_event().await {
                self.compute().await;
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

impl std::fmt::Debug for StatsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsSource")
            .field("stats", &self.stats)
            .field("loading", &self.loading)
            .field("subscribed", &self.subscription.is_some())
            .finish_non_exhaustive()
    }
}
