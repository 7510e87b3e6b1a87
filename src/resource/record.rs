//! Translation between backend rows and [`Resource`] records.
//!
//! Every storage column name lives in [`columns`]. Nothing outside this module
//! spells a column name as a literal, so a schema rename touches one file.
//!
//! Mapping is infallible: a malformed row yields defaults (zero counters,
//! empty strings, absent optionals) instead of an error.

use serde_json::{Map, Value, json};

use super::{Counter, NewResource, Resource};

/// Backend collection holding catalog resources.
pub const TABLE: &str = "resources";

/// Storage column names for the resources table.
pub mod columns {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const SUBJECT: &str = "subject";
    pub const DEPARTMENT: &str = "department";
    pub const YEAR: &str = "year";
    pub const SEM: &str = "sem";
    pub const TYPE: &str = "type";
    pub const VIEWS: &str = "views";
    pub const DOWNLOADS: &str = "downloads";
    pub const FILE_SIZE: &str = "file_size";
    pub const DESCRIPTION: &str = "description";
    pub const FILE_URL: &str = "file_url";
    pub const CREATED_AT: &str = "created_at";
}

/// Maps one raw backend row to a [`Resource`].
#[must_use]
pub fn from_row(row: &Value) -> Resource {
    Resource {
        id: id_of(row).unwrap_or_default(),
        title: string_field(row, columns::TITLE).unwrap_or_default(),
        subject: string_field(row, columns::SUBJECT).unwrap_or_default(),
        department: string_field(row, columns::DEPARTMENT).unwrap_or_default(),
        year: small_int_field(row, columns::YEAR),
        sem: small_int_field(row, columns::SEM),
        resource_type: string_field(row, columns::TYPE).unwrap_or_default(),
        views: counter_field(row, columns::VIEWS),
        downloads: counter_field(row, columns::DOWNLOADS),
        file_size: non_empty(string_field(row, columns::FILE_SIZE)),
        description: non_empty(string_field(row, columns::DESCRIPTION)),
        file_url: non_empty(string_field(row, columns::FILE_URL)),
    }
}

/// Extracts the identifier of a row.
///
/// Backends hand out both numeric and textual ids; either is normalized to a string.
#[must_use]
pub fn id_of(row: &Value) -> Option<String> {
    match row.get(columns::ID)? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Reads the downloads counter of a row (zero when missing or malformed).
#[must_use]
pub fn downloads_of(row: &Value) -> u64 {
    counter_field(row, columns::DOWNLOADS)
}

/// Reads an arbitrary counter column of a row.
#[must_use]
pub fn counter_of(row: &Value, counter: Counter) -> u64 {
    counter_field(row, counter_column(counter))
}

/// Returns the storage column for a counter.
#[must_use]
pub fn counter_column(counter: Counter) -> &'static str {
    match counter {
        Counter::Views => columns::VIEWS,
        Counter::Downloads => columns::DOWNLOADS,
    }
}

/// Builds the insert payload for a new resource.
#[must_use]
pub fn new_row(resource: &NewResource) -> Value {
    json!({
        columns::TITLE: resource.title,
        columns::DEPARTMENT: resource.department,
        columns::YEAR: resource.year,
        columns::SEM: resource.sem,
        columns::SUBJECT: resource.subject,
        columns::TYPE: resource.resource_type,
        columns::DESCRIPTION: resource.description,
        columns::VIEWS: 0,
        columns::DOWNLOADS: 0,
        columns::FILE_SIZE: resource.file_size,
    })
}

/// Builds a full row from a [`Resource`], used to seed in-memory catalogs.
#[must_use]
pub fn to_row(resource: &Resource) -> Value {
    json!({
        columns::ID: resource.id,
        columns::TITLE: resource.title,
        columns::SUBJECT: resource.subject,
        columns::DEPARTMENT: resource.department,
        columns::YEAR: resource.year,
        columns::SEM: resource.sem,
        columns::TYPE: resource.resource_type,
        columns::VIEWS: resource.views,
        columns::DOWNLOADS: resource.downloads,
        columns::FILE_SIZE: resource.file_size,
        columns::DESCRIPTION: resource.description,
        columns::FILE_URL: resource.file_url,
    })
}

/// Returns a single-column patch setting `counter` to `value`.
#[must_use]
pub fn counter_patch(counter: Counter, value: u64) -> Value {
    let mut patch = Map::new();
    patch.insert(counter_column(counter).to_string(), Value::from(value));
    Value::Object(patch)
}

fn string_field(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn counter_field(row: &Value, column: &str) -> u64 {
    match row.get(column) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn small_int_field(row: &Value, column: &str) -> u8 {
    let value = counter_field(row, column);
    u8::try_from(value).unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_row() -> Value {
        json!({
            "id": "b6f1",
            "title": "Data Structures Lecture Notes",
            "subject": "Data Structures",
            "department": "Computer Science",
            "year": 2,
            "sem": 3,
            "type": "Notes",
            "views": 2104,
            "downloads": 1678,
            "file_size": "2.9 MB",
            "description": "Arrays, linked lists, stacks and queues.",
            "file_url": "https://files.example.com/ds.pdf",
            "created_at": "2025-01-10T09:00:00Z"
        })
    }

    #[test]
    fn test_from_row_maps_all_columns() {
        let resource = from_row(&full_row());
        assert_eq!(resource.id, "b6f1");
        assert_eq!(resource.title, "Data Structures Lecture Notes");
        assert_eq!(resource.subject, "Data Structures");
        assert_eq!(resource.department, "Computer Science");
        assert_eq!(resource.year, 2);
        assert_eq!(resource.sem, 3);
        assert_eq!(resource.resource_type, "Notes");
        assert_eq!(resource.views, 2104);
        assert_eq!(resource.downloads, 1678);
        assert_eq!(resource.file_size.as_deref(), Some("2.9 MB"));
        assert_eq!(
            resource.description.as_deref(),
            Some("Arrays, linked lists, stacks and queues.")
        );
        assert!(resource.is_downloadable());
    }

    #[test]
    fn test_from_row_defaults_missing_counters_and_optionals() {
        let row = json!({"id": 7, "title": "Lab Records", "year": 1, "sem": 2});
        let resource = from_row(&row);
        assert_eq!(resource.id, "7");
        assert_eq!(resource.views, 0);
        assert_eq!(resource.downloads, 0);
        assert_eq!(resource.file_size, None);
        assert_eq!(resource.description, None);
        assert_eq!(resource.file_url, None);
        assert!(!resource.is_downloadable());
    }

    #[test]
    fn test_from_row_treats_null_and_empty_optionals_as_absent() {
        let row = json!({
            "id": "1",
            "views": null,
            "downloads": null,
            "description": "",
            "file_size": null,
            "file_url": ""
        });
        let resource = from_row(&row);
        assert_eq!(resource.views, 0);
        assert_eq!(resource.downloads, 0);
        assert_eq!(resource.description, None);
        assert_eq!(resource.file_url, None);
    }

    #[test]
    fn test_from_row_malformed_input_yields_defaults() {
        let resource = from_row(&json!("not an object"));
        assert_eq!(resource.id, "");
        assert_eq!(resource.year, 0);
        assert_eq!(resource.views, 0);

        let resource = from_row(&json!({"year": "three", "views": -4}));
        assert_eq!(resource.year, 0);
        assert_eq!(resource.views, 0);
    }

    #[test]
    fn test_new_row_starts_counters_at_zero_without_file_url() {
        let row = new_row(&NewResource {
            title: "Signals Notes".to_string(),
            subject: "Signals".to_string(),
            department: "Electronics".to_string(),
            year: 2,
            sem: 4,
            resource_type: "Notes".to_string(),
            description: None,
            file_size: Some("1.20 MB".to_string()),
        });
        assert_eq!(row["views"], 0);
        assert_eq!(row["downloads"], 0);
        assert_eq!(row["type"], "Notes");
        assert_eq!(row["description"], Value::Null);
        assert!(row.get("file_url").is_none());
        assert!(row.get("id").is_none());
    }

    #[test]
    fn test_to_row_then_from_row_preserves_resource() {
        let resource = from_row(&full_row());
        assert_eq!(from_row(&to_row(&resource)), resource);
    }

    #[test]
    fn test_counter_patch_targets_single_column() {
        let patch = counter_patch(Counter::Downloads, 12);
        assert_eq!(patch, json!({"downloads": 12}));
        assert_eq!(counter_of(&patch, Counter::Downloads), 12);
        assert_eq!(counter_of(&patch, Counter::Views), 0);
    }
}
