//! Admin submission of new resource metadata.
//!
//! Only metadata is stored. A selected document contributes its size
//! (`"x.xx MB"`); its bytes are never transmitted and no file location is set.

use thiserror::Error;
use tracing::{info, instrument};

use crate::backend::{Backend, BackendError};
use crate::filter::ALL;
use crate::resource::record;
use crate::resource::{DEPARTMENTS, NewResource, RESOURCE_TYPES, Resource};

/// Errors that can occur while submitting a resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// A form field is missing or holds an unusable value.
    #[error("invalid {field}: {reason}\n  Suggestion: {suggestion}")]
    Invalid {
        field: &'static str,
        reason: String,
        suggestion: String,
    },

    /// The backend refused or could not store the row.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SubmitError {
    fn invalid(field: &'static str, reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Raw admin form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub title: String,
    pub department: String,
    pub year: u8,
    pub sem: u8,
    pub subject: String,
    pub resource_type: String,
    pub description: Option<String>,
    /// Size in bytes of the selected document, if one was chosen.
    pub file_size_bytes: Option<u64>,
}

impl UploadForm {
    /// Checks required fields and builds the metadata to store.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<NewResource, SubmitError> {
        let title = required(&self.title, "title", "Give the resource a descriptive title")?;
        let department = choice(&self.department, "department", &DEPARTMENTS)?;
        if !(1..=4).contains(&self.year) {
            return Err(SubmitError::invalid(
                "year",
                format!("{} is not an academic year", self.year),
                "Use a year from 1 to 4",
            ));
        }
        if !(1..=8).contains(&self.sem) {
            return Err(SubmitError::invalid(
                "semester",
                format!("{} is not a semester", self.sem),
                "Use a semester from 1 to 8",
            ));
        }
        let subject = required(&self.subject, "subject", "Name the subject, e.g. Data Structures")?;
        let resource_type = choice(&self.resource_type, "type", &RESOURCE_TYPES)?;
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(NewResource {
            title,
            subject,
            department,
            year: self.year,
            sem: self.sem,
            resource_type,
            description,
            file_size: self.file_size_bytes.map(format_file_size),
        })
    }
}

fn required(value: &str, field: &'static str, suggestion: &str) -> Result<String, SubmitError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SubmitError::invalid(field, "value is required", suggestion));
    }
    Ok(trimmed.to_string())
}

fn choice(value: &str, field: &'static str, vocabulary: &[&str]) -> Result<String, SubmitError> {
    let options: Vec<&str> = vocabulary.iter().copied().filter(|v| *v != ALL).collect();
    let suggestion = format!("Choose one of: {}", options.join(", "));
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SubmitError::invalid(field, "value is required", suggestion));
    }
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(trimmed))
        .map(|option| (*option).to_string())
        .ok_or_else(|| SubmitError::invalid(field, format!("'{trimmed}' is not a known {field}"), suggestion))
}

/// Formats a byte count the way stored sizes are displayed, e.g. `"2.40 MB"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// Validates the form and stores the new resource.
///
/// Returns the stored record, including the backend-assigned id.
///
/// # Errors
///
/// Returns [`SubmitError::Invalid`] for bad input (nothing is sent) or
/// [`SubmitError::Backend`] when the insert fails.
#[instrument(skip(backend, form), fields(title = %form.title))]
pub async fn submit(backend: &dyn Backend, form: &UploadForm) -> Result<Resource, SubmitError> {
    let new_resource = form.validate()?;
    let stored = backend.insert_resource(record::new_row(&new_resource)).await?;
    let resource = record::from_row(&stored);
    info!(id = %resource.id, "resource submitted");
    Ok(resource)
}
