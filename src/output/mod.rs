//! CLI output formatting and display helpers.
//!
//! Renderers return strings so they can be tested without a terminal; the
//! command handlers decide where they are printed.

use std::fmt::Write as _;
use std::time::Duration;

use eduverza_core::backend::{BackendError, BackendErrorKind};
use eduverza_core::{Resource, Stats};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::ViewMode;

/// Shown when a filter combination matches nothing.
pub const NO_RESULTS: &str = "No resources found";

/// Follow-up hint for [`NO_RESULTS`].
pub const NO_RESULTS_HINT: &str = "Try adjusting your filters or search terms";

/// Shown in place of a missing description on the detail page.
pub const DESCRIPTION_FALLBACK: &str = "Detailed description of the resource would appear here.";

/// Static text for `eduverza about`.
pub const ABOUT_TEXT: &str = "\
ABOUT EDUVERZA
A student-friendly platform for sharing and discovering educational resources.

OUR MISSION
Educational resources should be easily accessible to all students. EduVerza
provides a centralized, organized and friendly space where students can find
notes, previous papers, lab records and more, all in one place.

WHAT MAKES US SPECIAL
  Student-centered    Built by students, for students.
  Easy upload         Admins add new resources with proper metadata.
  Organized library   Resources are categorized by department, year and subject.
  Community driven    Every resource shared helps students in their academic journey.";

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

/// Formats a count with thousands separators (`9580` -> `9,580`).
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut output = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            output.push(',');
        }
        output.push(ch);
    }
    output
}

fn counters_line(resource: &Resource) -> String {
    let mut line = format!(
        "{} views | {} downloads",
        group_thousands(resource.views),
        group_thousands(resource.downloads)
    );
    if let Some(size) = &resource.file_size {
        let _ = write!(line, " | {size}");
    }
    line
}

/// Renders a resource as a multi-line card.
pub fn render_card(resource: &Resource, width: usize) -> String {
    let mut card = String::new();
    let _ = writeln!(
        card,
        "{}",
        truncate_to_width(&format!("[{}] {}  (id {})", resource.resource_type, resource.title, resource.id), width)
    );
    let _ = writeln!(
        card,
        "  Year {} | Sem {} | {} | {}",
        resource.year, resource.sem, resource.department, resource.subject
    );
    if let Some(description) = &resource.description {
        let _ = writeln!(card, "  {}", truncate_to_width(description, width.saturating_sub(2)));
    }
    let _ = write!(card, "  {}", counters_line(resource));
    card
}

/// Renders a resource as a single line.
pub fn render_list_row(resource: &Resource, width: usize) -> String {
    let line = format!(
        "{:>4}  {} [{}] Y{}/S{} {} - {} views, {} downloads",
        resource.id,
        resource.title,
        resource.resource_type,
        resource.year,
        resource.sem,
        resource.department,
        group_thousands(resource.views),
        group_thousands(resource.downloads)
    );
    truncate_to_width(&line, width)
}

/// Renders the browse page: result count, then cards or rows.
pub fn render_browse(resources: &[&Resource], view: ViewMode, width: usize) -> String {
    let mut page = format!("Found {} resources\n", resources.len());
    if resources.is_empty() {
        let _ = write!(page, "\n{NO_RESULTS}\n{NO_RESULTS_HINT}");
        return page;
    }
    for resource in resources {
        page.push('\n');
        match view {
            ViewMode::Grid => {
                page.push_str(&render_card(resource, width));
                page.push('\n');
            }
            ViewMode::List => page.push_str(&render_list_row(resource, width)),
        }
    }
    page
}

/// Renders the detail page of one resource.
pub fn render_detail(resource: &Resource) -> String {
    let mut page = String::new();
    let _ = writeln!(page, "{}", resource.title);
    let _ = writeln!(
        page,
        "[Year {}] [Sem {}] [{}] [{}]",
        resource.year, resource.sem, resource.resource_type, resource.department
    );
    let _ = writeln!(page);
    let _ = writeln!(page, "ABOUT THIS RESOURCE");
    let _ = writeln!(
        page,
        "{}",
        resource.description.as_deref().unwrap_or(DESCRIPTION_FALLBACK)
    );
    let _ = writeln!(page);
    let _ = writeln!(page, "DETAILS");
    let _ = writeln!(page, "  Subject:    {}", resource.subject);
    let _ = writeln!(page, "  Department: {}", resource.department);
    let _ = writeln!(page, "  Year:       Year {}", resource.year);
    let _ = writeln!(page, "  Semester:   Semester {}", resource.sem);
    let _ = writeln!(page, "  File Type:  {}", resource.resource_type);
    if let Some(size) = &resource.file_size {
        let _ = writeln!(page, "  File Size:  {size}");
    }
    let _ = writeln!(page, "  Views:      {}", group_thousands(resource.views));
    let _ = write!(page, "  Downloads:  {}", group_thousands(resource.downloads));
    page
}

/// Renders the home page statistics.
pub fn render_stats(stats: Stats) -> String {
    format!(
        "Resources:       {}\nDownloads:       {}\nActive Students: {}",
        group_thousands(stats.total_resources),
        group_thousands(stats.total_downloads),
        group_thousands(stats.active_students)
    )
}

/// Remediation steps for a failed fetch.
pub fn troubleshooting_steps(kind: BackendErrorKind) -> &'static [&'static str] {
    match kind {
        BackendErrorKind::Configuration => &[
            "Set EDUVERZA_SUPABASE_URL and EDUVERZA_SUPABASE_ANON_KEY (VITE_SUPABASE_* names are also read)",
            "Or pass --url and --anon-key on the command line",
            "Or add supabase_url and anon_key to the config file (see `eduverza config show`)",
            "Run with --demo to try the built-in sample catalog",
        ],
        BackendErrorKind::Network | BackendErrorKind::Realtime => &[
            "Check your network connection",
            "Verify the backend project is active and not paused",
            "Check that the project URL is correct",
            "Re-run with -vv for request details",
        ],
        BackendErrorKind::Rejected | BackendErrorKind::Decode => &[
            "Check that the 'resources' table exists",
            "Check that the anon key may read it (row level security policies)",
            "Re-run with -vv for request details",
        ],
    }
}

/// Renders an error panel with details and troubleshooting steps.
pub fn render_error_panel(title: &str, error: &BackendError) -> String {
    let mut panel = format!("{title}\n\nError Details:\n");
    for line in error.to_string().lines() {
        let _ = writeln!(panel, "  {line}");
    }
    let _ = write!(panel, "\nTroubleshooting Steps:");
    for (index, step) in troubleshooting_steps(error.kind()).iter().enumerate() {
        let _ = write!(panel, "\n  {}. {step}", index + 1);
    }
    panel
}

/// Renders the "not found" view for a missing resource.
pub fn render_not_found(id: &str) -> String {
    format!(
        "Resource Not Found\nThe resource you're looking for doesn't exist (id {id}).\nBack to browse: eduverza browse"
    )
}

/// Renders the notice for a resource deleted while it was shown.
pub fn render_removed(id: &str) -> String {
    format!("Resource {id} was removed.\nBack to browse: eduverza browse")
}

/// Returns true when a spinner should be drawn.
pub fn should_use_spinner(stderr_is_terminal: bool, quiet: bool) -> bool {
    stderr_is_terminal && !quiet
}

/// Starts a stderr spinner, or returns `None` when disabled.
pub fn start_spinner(enabled: bool, message: &str) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

/// Clears a spinner started with [`start_spinner`].
pub fn finish_spinner(spinner: Option<ProgressBar>) {
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
}
