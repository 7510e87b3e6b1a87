//! EduVerza Core Library
//!
//! Client-side core of the EduVerza resource catalog: students browse, filter
//! and search catalogued study material (notes, previous papers, lab records)
//! and administrators submit new resource metadata. Persistence and live
//! change notification are delegated to a hosted table store.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Connection parameters and their validation
//! - [`backend`] - Backend trait, REST/realtime client and in-memory double
//! - [`resource`] - Resource model and the row translation boundary
//! - [`source`] - Live data sources (list, single resource, stats)
//! - [`filter`] - Faceted filtering and free-text search
//! - [`metrics`] - Best-effort view/download counters
//! - [`admin`] - Validation and submission of new resources

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod admin;
pub mod backend;
pub mod config;
pub mod filter;
pub mod metrics;
pub mod resource;
pub mod source;

// Re-export commonly used types
pub use admin::{SubmitError, UploadForm, format_file_size, submit};
pub use backend::{
    Backend, BackendError, BackendErrorKind, ChangeEvent, FeedScope, MemoryBackend, RestBackend,
    Subscription,
};
pub use config::{BackendConfig, ConfigError, Connection};
pub use filter::FilterSelection;
pub use metrics::MetricRecorder;
pub use resource::{Counter, NewResource, Resource};
pub use source::{DetailState, ResourceListSource, ResourceSource, SourceState, Stats, StatsSource};
