//! In-process implementation of [`Backend`].
//!
//! Rows live in a mutex-guarded vector kept newest first; every mutation is
//! broadcast to subscribers. Used as the test double for data sources and as
//! the store behind `--demo`, where it is seeded with a sample catalog.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::resource::record::{self, columns};
use crate::resource::{Counter, Resource};

use super::{Backend, BackendError, ChangeEvent, FEED_BUFFER, FeedScope, Result, Subscription};

/// Capacity of the internal broadcast channel.
const BROADCAST_CAPACITY: usize = 256;

/// In-memory resources collection with a change feed.
#[derive(Debug)]
pub struct MemoryBackend {
    rows: Mutex<Vec<Value>>,
    events: broadcast::Sender<ChangeEvent>,
    next_id: AtomicU64,
    failure: Mutex<Option<BackendError>>,
    feed_failure: Mutex<Option<BackendError>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            rows: Mutex::new(Vec::new()),
            events,
            next_id: AtomicU64::new(1),
            failure: Mutex::new(None),
            feed_failure: Mutex::new(None),
        }
    }

    /// Creates a collection holding `rows`, given newest first.
    #[must_use]
    pub fn with_rows(rows: Vec<Value>) -> Self {
        let backend = Self::new();
        let max_numeric_id = rows
            .iter()
            .filter_map(record::id_of)
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        backend.next_id.store(max_numeric_id + 1, Ordering::Relaxed);
        if let Ok(mut guard) = backend.rows.lock() {
            *guard = rows;
        }
        backend
    }

    /// Creates a collection seeded with the sample catalog.
    #[must_use]
    pub fn with_sample_catalog() -> Self {
        Self::with_rows(sample_catalog().iter().map(record::to_row).collect())
    }

    /// Makes every read and write fail with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<BackendError>) {
        if let Ok(mut guard) = self.failure.lock() {
            *guard = error;
        }
    }

    /// Makes `subscribe` fail with `error` until cleared with `None`.
    pub fn set_feed_failure(&self, error: Option<BackendError>) {
        if let Ok(mut guard) = self.feed_failure.lock() {
            *guard = error;
        }
    }

    /// Number of rows currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    /// Returns true when no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Stores a row as the newest entry and notifies subscribers.
    ///
    /// A missing `id` is generated.
    pub fn insert_row(&self, mut row: Value) -> Value {
        if record::id_of(&row).is_none() {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if let Value::Object(map) = &mut row {
                map.insert(columns::ID.to_string(), Value::String(id.to_string()));
            }
        }
        if let Ok(mut rows) = self.rows.lock() {
            rows.insert(0, row.clone());
        }
        self.publish(ChangeEvent::Insert(row.clone()));
        row
    }

    /// Merges `patch` into the row with `id` and notifies subscribers.
    ///
    /// Returns the updated row, or `None` when no row matches.
    pub fn update_row(&self, id: &str, patch: &Value) -> Option<Value> {
        let updated = {
            let mut rows = self.rows.lock().ok()?;
            let row = rows
                .iter_mut()
                .find(|row| record::id_of(row).as_deref() == Some(id))?;
            if let (Value::Object(target), Value::Object(changes)) = (row, patch) {
                for (key, value) in changes {
                    target.insert(key.clone(), value.clone());
                }
                Value::Object(target.clone())
            } else {
                return None;
            }
        };
        self.publish(ChangeEvent::Update(updated.clone()));
        Some(updated)
    }

    /// Removes the row with `id` and notifies subscribers.
    ///
    /// Returns true when a row was removed.
    pub fn delete_row(&self, id: &str) -> bool {
        let removed = {
            let Ok(mut rows) = self.rows.lock() else {
                return false;
            };
            let before = rows.len();
            rows.retain(|row| record::id_of(row).as_deref() != Some(id));
            before != rows.len()
        };
        if removed {
            let mut old = Map::new();
            old.insert(columns::ID.to_string(), Value::String(id.to_string()));
            self.publish(ChangeEvent::Delete(Value::Object(old)));
        }
        removed
    }

    fn publish(&self, event: ChangeEvent) {
        // No receivers is not an error: nobody is watching.
        let _ = self.events.send(event);
    }

    fn check_failure(&self) -> Result<()> {
        match self.failure.lock() {
            Ok(guard) => guard.clone().map_or(Ok(()), Err),
            Err(_) => Ok(()),
        }
    }

    fn snapshot(&self) -> Vec<Value> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_resources(&self) -> Result<Vec<Value>> {
        self.check_failure()?;
        Ok(self.snapshot())
    }

    async fn get_resource(&self, id: &str) -> Result<Option<Value>> {
        self.check_failure()?;
        Ok(self
            .snapshot()
            .into_iter()
            .find(|row| record::id_of(row).as_deref() == Some(id)))
    }

    async fn count_resources(&self) -> Result<u64> {
        self.check_failure()?;
        Ok(self.len() as u64)
    }

    async fn download_counts(&self) -> Result<Vec<Value>> {
        self.check_failure()?;
        Ok(self
            .snapshot()
            .iter()
            .map(|row| record::counter_patch(Counter::Downloads, record::downloads_of(row)))
            .collect())
    }

    async fn insert_resource(&self, row: Value) -> Result<Value> {
        self.check_failure()?;
        Ok(self.insert_row(row))
    }

    async fn increment(&self, id: &str, counter: Counter) -> Result<()> {
        self.check_failure()?;
        let current = self
            .snapshot()
            .into_iter()
            .find(|row| record::id_of(row).as_deref() == Some(id))
            .ok_or_else(|| BackendError::MissingRow { id: id.to_string() })?;
        let next = record::counter_of(&current, counter).saturating_add(1);
        self.update_row(id, &record::counter_patch(counter, next));
        Ok(())
    }

    async fn subscribe(&self, scope: FeedScope) -> Result<Subscription> {
        let feed_failure = self.feed_failure.lock().ok().and_then(|guard| guard.clone());
        if let Some(error) = feed_failure {
            return Err(error);
        }

        let mut receiver = self.events.subscribe();
        let (tx, rx) = mpsc::channel(FEED_BUFFER);
        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        if !scope.matches(&event) {
                            continue;
                        }
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "memory change feed lagged; events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("memory change feed stopped");
        });
        Ok(Subscription::new(rx, task))
    }
}

struct Sample {
    id: &'static str,
    title: &'static str,
    subject: &'static str,
    department: &'static str,
    year: u8,
    sem: u8,
    resource_type: &'static str,
    views: u64,
    downloads: u64,
    file_size: &'static str,
    description: &'static str,
}

const SAMPLES: &[Sample] = &[
    Sample { id: "1", title: "Control Systems Lab Manual", subject: "Control Systems", department: "Electronics", year: 4, sem: 7, resource_type: "Records", views: 823, downloads: 478, file_size: "2.4 MB",
        description: "Complete lab manual for Control Systems with circuit diagrams, procedures, and expected outcomes." },
    Sample { id: "2", title: "Engineering Mathematics III Previous Papers", subject: "Engineering Mathematics", department: "Computer Science", year: 2, sem: 3, resource_type: "Previous Papers", views: 1890, downloads: 1456, file_size: "3.1 MB",
        description: "Previous year question papers for Engineering Mathematics III with detailed solutions." },
    Sample { id: "3", title: "Database Management Systems Guide", subject: "Database Systems", department: "Computer Science", year: 3, sem: 5, resource_type: "Notes", views: 1567, downloads: 1123, file_size: "5.2 MB",
        description: "Complete guide to DBMS covering SQL, normalization, transactions, indexing, and query optimization with examples." },
    Sample { id: "4", title: "Machine Design Lab Observations", subject: "Machine Design", department: "Mechanical", year: 4, sem: 7, resource_type: "Observations", views: 445, downloads: 312, file_size: "1.8 MB",
        description: "Lab observation sheets for Machine Design experiments including stress analysis, gear design, and bearing calculations." },
    Sample { id: "5", title: "Data Structures Lecture Notes - Module 1", subject: "Data Structures", department: "Computer Science", year: 2, sem: 3, resource_type: "Notes", views: 2104, downloads: 1678, file_size: "2.9 MB",
        description: "Comprehensive lecture notes covering arrays, linked lists, stacks, queues, and basic algorithms." },
    Sample { id: "6", title: "Thermodynamics Previous Year Papers", subject: "Thermodynamics", department: "Mechanical", year: 2, sem: 3, resource_type: "Previous Papers", views: 756, downloads: 589, file_size: "1.5 MB",
        description: "Collection of previous year exam papers with solutions for Thermodynamics." },
    Sample { id: "7", title: "Digital Electronics Lab Records", subject: "Digital Electronics", department: "Electronics", year: 3, sem: 5, resource_type: "Records", views: 634, downloads: 421, file_size: "3.7 MB",
        description: "Complete lab records with circuit diagrams, truth tables, and observations for digital electronics experiments." },
    Sample { id: "8", title: "Operating Systems Exam Papers 2023", subject: "Operating Systems", department: "Computer Science", year: 3, sem: 5, resource_type: "Previous Papers", views: 1432, downloads: 987, file_size: "2.2 MB",
        description: "Previous year question papers from 2023 with answers for Operating Systems." },
    Sample { id: "9", title: "Fluid Mechanics Lab Manual", subject: "Fluid Mechanics", department: "Civil", year: 3, sem: 5, resource_type: "Records", views: 512, downloads: 378, file_size: "4.1 MB",
        description: "Lab manual covering fluid properties, flow measurement, and hydraulic experiments." },
    Sample { id: "10", title: "Computer Networks Notes - Complete", subject: "Computer Networks", department: "Computer Science", year: 3, sem: 6, resource_type: "Notes", views: 1823, downloads: 1234, file_size: "6.8 MB",
        description: "Complete notes on computer networks including OSI model, TCP/IP, routing protocols, and network security." },
    Sample { id: "11", title: "Strength of Materials Previous Papers", subject: "Strength of Materials", department: "Civil", year: 2, sem: 3, resource_type: "Previous Papers", views: 689, downloads: 523, file_size: "2.6 MB",
        description: "Collection of previous papers with detailed solutions for strength of materials." },
    Sample { id: "12", title: "Microprocessors Lab Observations", subject: "Microprocessors", department: "Electronics", year: 3, sem: 5, resource_type: "Observations", views: 578, downloads: 401, file_size: "3.2 MB",
        description: "Lab observation sheets for 8085 and 8086 microprocessor experiments with assembly programs." },
];

/// Sample catalog used by demo mode.
#[must_use]
pub fn sample_catalog() -> Vec<Resource> {
    SAMPLES
        .iter()
        .map(|sample| Resource {
            id: sample.id.to_string(),
            title: sample.title.to_string(),
            subject: sample.subject.to_string(),
            department: sample.department.to_string(),
            year: sample.year,
            sem: sample.sem,
            resource_type: sample.resource_type.to_string(),
            views: sample.views,
            downloads: sample.downloads,
            file_size: Some(sample.file_size.to_string()),
            description: Some(sample.description.to_string()),
            file_url: None,
        })
        .collect()
}
