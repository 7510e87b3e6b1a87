//! Catalog resource model.
//!
//! A [`Resource`] is one catalogued educational document (notes, papers,
//! lab records) and its metadata. Rows coming from the backend are mapped into
//! this shape by [`record`], which is the only code that knows the storage
//! column names.

pub mod record;

use std::fmt;

use serde::Serialize;

/// Department values offered by the catalog. The first entry is the "any" sentinel.
pub const DEPARTMENTS: [&str; 6] = [
    "All",
    "Computer Science",
    "Electronics",
    "Mechanical",
    "Civil",
    "Chemical",
];

/// Year labels offered by the catalog. The first entry is the "any" sentinel.
pub const YEAR_LABELS: [&str; 5] = ["All Years", "Year 1", "Year 2", "Year 3", "Year 4"];

/// Resource type labels offered by the catalog. The first entry is the "any" sentinel.
pub const RESOURCE_TYPES: [&str; 6] = [
    "All",
    "Notes",
    "Previous Papers",
    "Records",
    "Observations",
    "Assignments",
];

/// Returns the two semesters that belong to an academic year (1-4).
///
/// Years outside 1..=4 have no semesters.
#[must_use]
pub fn semesters_for_year(year: u8) -> &'static [u8] {
    match year {
        1 => &[1, 2],
        2 => &[3, 4],
        3 => &[5, 6],
        4 => &[7, 8],
        _ => &[],
    }
}

/// Returns the academic year a semester (1-8) belongs to.
#[must_use]
pub fn year_for_semester(sem: u8) -> Option<u8> {
    match sem {
        1..=8 => Some(sem.div_ceil(2)),
        _ => None,
    }
}

/// One catalogued educational resource.
///
/// The year/semester pairing is a presentation convention; nothing here
/// enforces that `sem` belongs to `year`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// Opaque, stable identifier assigned by the backend.
    pub id: String,
    pub title: String,
    pub subject: String,
    pub department: String,
    /// Academic year (1-4).
    pub year: u8,
    /// Semester (1-8).
    pub sem: u8,
    /// One of the labels in [`RESOURCE_TYPES`] (excluding "All").
    pub resource_type: String,
    pub views: u64,
    pub downloads: u64,
    /// Human readable size such as `"2.40 MB"`.
    pub file_size: Option<String>,
    pub description: Option<String>,
    /// External location of the document. Absent until the file is uploaded.
    pub file_url: Option<String>,
}

impl Resource {
    /// Returns true when the resource has a document location to download from.
    #[must_use]
    pub fn is_downloadable(&self) -> bool {
        self.file_url.is_some()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] ({}, Year {} / Sem {})",
            self.title, self.resource_type, self.department, self.year, self.sem
        )
    }
}

/// Metadata for a resource that has not been stored yet.
///
/// Counters start at zero and no document location is set on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResource {
    pub title: String,
    pub subject: String,
    pub department: String,
    pub year: u8,
    pub sem: u8,
    pub resource_type: String,
    pub description: Option<String>,
    pub file_size: Option<String>,
}

/// Counter columns that can be incremented on a stored resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Views,
    Downloads,
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(record::counter_column(*self))
    }
}
