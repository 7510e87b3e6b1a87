//! Download command handler.
//!
//! Documents are not hosted by the catalog itself; a download counts the
//! request and prints the stored document location when there is one.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use eduverza_core::{DetailState, Resource, ResourceSource};
use tokio::task::JoinHandle;

use super::{CommandContext, settle_metric};
use crate::output;

pub(crate) const NOT_DOWNLOADABLE: &str =
    "This resource has no document available for download yet.";

/// Writes the download location and counts the download in the background.
///
/// Every request counts, even repeated ones.
pub(crate) fn present_download(
    ctx: &CommandContext,
    resource: &Resource,
    out: &mut impl Write,
) -> io::Result<JoinHandle<()>> {
    let pending = ctx.metrics.record_download(&resource.id);
    writeln!(out, "Download: {}", resource.title)?;
    match resource.file_url.as_deref() {
        Some(location) => writeln!(out, "{location}")?,
        None => writeln!(out, "{NOT_DOWNLOADABLE}")?,
    }
    Ok(pending)
}

pub async fn run_download_command(ctx: &CommandContext, id: &str) -> Result<ExitCode> {
    let mut source = ResourceSource::new(Arc::clone(&ctx.backend), id);
    let spinner = output::start_spinner(ctx.use_spinner, "Loading resource...");
    source.load().await;
    output::finish_spinner(spinner);

    let pending = match source.state() {
        DetailState::Ready(resource) => present_download(ctx, resource, &mut io::stdout())?,
        DetailState::NotFound => {
            println!("{}", output::render_not_found(id));
            return Ok(ExitCode::FAILURE);
        }
        DetailState::Error(error) => {
            eprintln!("{}", output::render_error_panel("Error loading resource", error));
            return Ok(ExitCode::FAILURE);
        }
        DetailState::Idle | DetailState::Loading | DetailState::Removed => {
            return Ok(ExitCode::FAILURE);
        }
    };

    settle_metric(Some(pending)).await;
    Ok(ExitCode::SUCCESS)
}
