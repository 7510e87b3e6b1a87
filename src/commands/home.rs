//! Home command handler: catalog statistics, optionally kept live.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use eduverza_core::StatsSource;
use tracing::{debug, info};

use super::CommandContext;
use crate::output;

const HEADLINE: &str = "EDUVERZA\nCOLLEGE RESOURCES, CRAFTED WITH CARE\n";

pub async fn run_home_command(ctx: &CommandContext, watch: bool) -> Result<ExitCode> {
    let mut source = StatsSource::new(Arc::clone(&ctx.backend));
    if watch {
        source.subscribe().await;
    }

    let spinner = output::start_spinner(
        ctx.use_spinner && source.is_loading(),
        "Loading statistics...",
    );
    let stats = source.compute().await;
    output::finish_spinner(spinner);

    println!("{HEADLINE}");
    println!("{}", output::render_stats(stats));

    if !watch {
        return Ok(ExitCode::SUCCESS);
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = source.next_change() => {
                debug!(event = event.label(), "stats refreshed");
                println!();
                println!("{}", output::render_stats(source.stats()));
            }
        }
    }
    source.stop();
    info!("stopped watching statistics");
    Ok(ExitCode::SUCCESS)
}
