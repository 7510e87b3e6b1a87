//! Show command handler: one resource's detail page.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use eduverza_core::{DetailState, Resource, ResourceSource};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{CommandContext, settle_metric};
use crate::output;

/// Writes the detail page and counts the view in the background.
///
/// Views are counted once per resource per session. The returned task is
/// `None` for a repeat view.
pub(crate) fn present_detail(
    ctx: &CommandContext,
    resource: &Resource,
    out: &mut impl Write,
) -> io::Result<Option<JoinHandle<()>>> {
    let pending = ctx.metrics.record_view(&resource.id);
    writeln!(out, "{}", output::render_detail(resource))?;
    Ok(pending)
}

async fn watch_detail(source: &mut ResourceSource, id: &str) {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = source.next_change() => {
                debug!(event = event.label(), "resource changed");
                match source.state() {
                    DetailState::Ready(resource) => {
                        println!();
                        println!("{}", output::render_detail(resource));
                    }
                    DetailState::Removed => {
                        println!("{}", output::render_removed(id));
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
    source.stop();
}

pub async fn run_show_command(ctx: &CommandContext, id: &str, watch: bool) -> Result<ExitCode> {
    let mut source = ResourceSource::new(Arc::clone(&ctx.backend), id);
    if watch {
        source.subscribe().await;
    }

    let spinner = output::start_spinner(ctx.use_spinner, "Loading resource...");
    source.load().await;
    output::finish_spinner(spinner);

    let pending = match source.state() {
        DetailState::Ready(resource) => present_detail(ctx, resource, &mut io::stdout())?,
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

    if watch {
        watch_detail(&mut source, id).await;
    }
    settle_metric(pending).await;
    Ok(ExitCode::SUCCESS)
}
