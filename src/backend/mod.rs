//! Access to the hosted catalog backend.
//!
//! The backend is an external table store with a realtime change feed. This
//! module defines the seam every data source depends on:
//!
//! - [`Backend`] - async trait covering the reads, writes and subscriptions the catalog needs
//! - [`RestBackend`] - PostgREST table API plus Phoenix-channel realtime feed
//! - [`MemoryBackend`] - in-process implementation for tests and demo mode
//! - [`ChangeEvent`] / [`Subscription`] - change feed payloads and scoped handles
//!
//! Backends hand out raw rows (`serde_json::Value`); turning a row into a
//! [`crate::Resource`] is the job of [`crate::resource::record`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use eduverza_core::backend::{Backend, RestBackend};
//! use eduverza_core::BackendConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BackendConfig::new("https://abc.supabase.co", "anon-key");
//! let backend: Arc<dyn Backend> = Arc::new(RestBackend::new(config)?);
//! let rows = backend.list_resources().await?;
//! println!("{} resources", rows.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod feed;
mod http_client;
mod memory;
mod realtime;
mod rest;

pub use error::{BackendError, BackendErrorKind};
pub use feed::{ChangeEvent, FEED_BUFFER, FeedScope, Subscription};
pub use memory::{MemoryBackend, sample_catalog};
pub use realtime::{HEARTBEAT_INTERVAL, parse_change_message, realtime_url};
pub use rest::RestBackend;

use async_trait::async_trait;
use serde_json::Value;

use crate::resource::Counter;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Data-access contract for the resources collection.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Reads every resource row, newest first.
    async fn list_resources(&self) -> Result<Vec<Value>>;

    /// Reads one resource row by identifier. `Ok(None)` when no row matches.
    async fn get_resource(&self, id: &str) -> Result<Option<Value>>;

    /// Returns the number of resource rows.
    async fn count_resources(&self) -> Result<u64>;

    /// Reads the downloads counter of every row (rows carry only that column).
    async fn download_counts(&self) -> Result<Vec<Value>>;

    /// Inserts a row and returns the stored row, including generated columns.
    async fn insert_resource(&self, row: Value) -> Result<Value>;

    /// Adds one to a counter column of a row.
    ///
    /// Not atomic across clients: concurrent increments may lose updates.
    async fn increment(&self, id: &str, counter: Counter) -> Result<()>;

    /// Opens a change feed over `scope`.
    async fn subscribe(&self, scope: FeedScope) -> Result<Subscription>;
}
