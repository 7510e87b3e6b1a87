//! Faceted filtering and free-text search over the resource list.
//!
//! [`FilterSelection`] holds the user's facet choices and keeps their
//! dependencies consistent: choosing a year clears the semester and subject,
//! choosing a semester clears the subject. Filtering itself is a pure
//! function of the list and the selection and preserves input order.
//!
//! # Example
//!
//! ```
//! use eduverza_core::filter::FilterSelection;
//!
//! let mut selection = FilterSelection::default();
//! selection.set_year("Year 2");
//! assert_eq!(selection.available_semesters(), &[3, 4]);
//! ```

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::resource::{Resource, semesters_for_year};

/// Department and type sentinel that matches everything.
pub const ALL: &str = "All";

/// Year sentinel that matches everything.
pub const ALL_YEARS: &str = "All Years";

/// Subject sentinel that disables the subject facet.
pub const ALL_SUBJECTS: &str = "All Subjects";

#[allow(clippy::expect_used)]
static YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Year (\d)").expect("year regex is valid") // Static pattern, safe to panic
});

/// Facet choices for the browse view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    department: String,
    year: String,
    semester: Option<u8>,
    subject: String,
    resource_type: String,
    query: String,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            department: ALL.to_string(),
            year: ALL_YEARS.to_string(),
            semester: None,
            subject: ALL_SUBJECTS.to_string(),
            resource_type: ALL.to_string(),
            query: String::new(),
        }
    }
}

impl FilterSelection {
    #[must_use]
    pub fn department(&self) -> &str {
        &self.department
    }

    #[must_use]
    pub fn year(&self) -> &str {
        &self.year
    }

    #[must_use]
    pub fn semester(&self) -> Option<u8> {
        self.semester
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_department(&mut self, department: impl Into<String>) {
        self.department = department.into();
    }

    /// Selects a year label and resets the semester and subject.
    pub fn set_year(&mut self, year: impl Into<String>) {
        self.year = year.into();
        self.semester = None;
        self.subject = ALL_SUBJECTS.to_string();
    }

    /// Selects (or clears) the semester and resets the subject.
    pub fn set_semester(&mut self, semester: Option<u8>) {
        self.semester = semester;
        self.subject = ALL_SUBJECTS.to_string();
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    pub fn set_resource_type(&mut self, resource_type: impl Into<String>) {
        self.resource_type = resource_type.into();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Numeric year parsed from the year label; `None` for "All Years" or an
    /// unrecognized label.
    #[must_use]
    pub fn year_number(&self) -> Option<u8> {
        if self.year == ALL_YEARS {
            return None;
        }
        YEAR_PATTERN
            .captures(&self.year)
            .and_then(|caps| caps.get(1))
            .and_then(|digit| digit.as_str().parse().ok())
    }

    /// Semesters offered for the selected year (empty without a year).
    #[must_use]
    pub fn available_semesters(&self) -> &'static [u8] {
        self.year_number().map(semesters_for_year).unwrap_or_default()
    }

    /// Sorted distinct subjects among resources with the selected year and
    /// semester. Empty unless both are selected.
    #[must_use]
    pub fn subject_options(&self, resources: &[Resource]) -> Vec<String> {
        let (Some(year), Some(sem)) = (self.year_number(), self.semester) else {
            return Vec::new();
        };
        resources
            .iter()
            .filter(|r| r.year == year && r.sem == sem)
            .map(|r| r.subject.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// True when the subject facet takes part in matching.
    #[must_use]
    pub fn subject_filter_active(&self, subject_options: &[String]) -> bool {
        self.year_number().is_some()
            && self.semester.is_some()
            && !subject_options.is_empty()
            && self.subject != ALL_SUBJECTS
    }

    /// Tests one resource against every facet.
    ///
    /// `subject_active` comes from [`Self::subject_filter_active`] so the
    /// subject options are derived once per list rather than per resource.
    #[must_use]
    pub fn matches(&self, resource: &Resource, subject_active: bool) -> bool {
        let department = self.department == ALL || resource.department == self.department;
        let year = self.year == ALL_YEARS || self.year_number() == Some(resource.year);
        let semester = self.semester.is_none_or(|sem| resource.sem == sem);
        let subject = !subject_active || resource.subject == self.subject;
        let resource_type = self.resource_type == ALL || resource.resource_type == self.resource_type;

        department && year && semester && subject && resource_type && self.matches_query(resource)
    }

    fn matches_query(&self, resource: &Resource) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        resource.title.to_lowercase().contains(&needle)
            || resource.subject.to_lowercase().contains(&needle)
            || resource
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    /// Returns the resources that satisfy every facet, in input order.
    #[must_use]
    pub fn apply<'a>(&self, resources: &'a [Resource]) -> Vec<&'a Resource> {
        let options = self.subject_options(resources);
        let subject_active = self.subject_filter_active(&options);
        resources
            .iter()
            .filter(|r| self.matches(r, subject_active))
            .collect()
    }
}
