//! Browse command handler: filtered resource list, optionally kept live.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Result, bail};
use eduverza_core::{FilterSelection, ResourceListSource};
use tracing::{debug, info};

use super::CommandContext;
use crate::cli::{BrowseArgs, ViewMode};
use crate::output;

/// Builds the facet selection from the command line.
///
/// Facets are applied in dependency order (year, then semester, then subject)
/// since each setter resets the facets below it.
pub(crate) fn selection_from_args(args: &BrowseArgs) -> Result<FilterSelection> {
    let mut selection = FilterSelection::default();
    selection.set_department(args.department.clone());
    selection.set_resource_type(args.resource_type.clone());
    if let Some(query) = &args.search {
        selection.set_query(query.trim());
    }
    if let Some(year) = args.year {
        selection.set_year(format!("Year {year}"));
    }
    if let Some(sem) = args.sem {
        let available = selection.available_semesters();
        if !available.contains(&sem) {
            bail!(
                "Semester {sem} does not belong to year {}. Choose one of: {}",
                args.year.unwrap_or_default(),
                available
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        selection.set_semester(Some(sem));
    }
    if let Some(subject) = &args.subject {
        selection.set_subject(subject.clone());
    }
    Ok(selection)
}

fn print_page(source: &ResourceListSource, selection: &FilterSelection, view: ViewMode, width: usize) {
    let resources = source.resources();
    let visible = selection.apply(resources);
    if selection.semester().is_some() && selection.subject_options(resources).is_empty() {
        debug!("no subjects for the selected year and semester; subject filter inactive");
    }
    println!("{}", output::render_browse(&visible, view, width));
}

pub async fn run_browse_command(ctx: &CommandContext, args: &BrowseArgs) -> Result<ExitCode> {
    let selection = selection_from_args(args)?;
    let mut source = ResourceListSource::new(Arc::clone(&ctx.backend));
    if args.watch {
        source.subscribe().await;
    }

    let spinner = output::start_spinner(ctx.use_spinner, "Loading resources...");
    source.load().await;
    output::finish_spinner(spinner);

    if let Some(error) = source.state().error() {
        eprintln!("{}", output::render_error_panel("Error loading resources", error));
        return Ok(ExitCode::FAILURE);
    }
    print_page(&source, &selection, args.view, ctx.width);

    if !args.watch {
        return Ok(ExitCode::SUCCESS);
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = source.next_change() => {
                info!(event = event.label(), id = ?event.resource_id(), "catalog changed");
                println!();
                print_page(&source, &selection, args.view, ctx.width);
            }
        }
    }
    source.stop();
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    fn browse_args(argv: &[&str]) -> BrowseArgs {
        let mut full = vec!["eduverza", "browse"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Browse(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_selection_applies_dependent_facets_in_order() {
        let selection =
            selection_from_args(&browse_args(&["--year", "3", "--sem", "5", "--subject", "Database Systems"]))
                .unwrap();
        assert_eq!(selection.year(), "Year 3");
        assert_eq!(selection.semester(), Some(5));
        assert_eq!(selection.subject(), "Database Systems");
    }

    #[test]
    fn test_selection_rejects_semester_outside_year() {
        let err = selection_from_args(&browse_args(&["--year", "1", "--sem", "5"])).unwrap_err();
        assert!(err.to_string().contains("Choose one of: 1, 2"));
    }

    #[test]
    fn test_selection_trims_query() {
        let selection = selection_from_args(&browse_args(&["--search", "  dbms "])).unwrap();
        assert_eq!(selection.query(), "dbms");
    }
}
