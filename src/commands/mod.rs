//! CLI command handlers.

mod about;
mod admin;
mod browse;
mod config;
mod download;
mod home;
mod show;

pub use about::run_about_command;
pub use admin::run_admin_upload_command;
pub use browse::run_browse_command;
pub use config::run_config_show_command;
pub use download::run_download_command;
pub use home::run_home_command;
pub use show::run_show_command;

use std::sync::Arc;

use eduverza_core::{Backend, MetricRecorder};
use tokio::task::JoinHandle;
use tracing::debug;

/// Shared state handed to every backend-facing command.
pub(crate) struct CommandContext {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) metrics: MetricRecorder,
    pub(crate) use_spinner: bool,
    pub(crate) width: usize,
}

impl CommandContext {
    pub(crate) fn new(backend: Arc<dyn Backend>, use_spinner: bool, width: usize) -> Self {
        let metrics = MetricRecorder::new(Arc::clone(&backend));
        Self {
            backend,
            metrics,
            use_spinner,
            width,
        }
    }
}

/// Waits for a dispatched counter update so process exit does not cut it off.
///
/// Called after the page is printed; failures only reach the log.
pub(crate) async fn settle_metric(pending: Option<JoinHandle<()>>) {
    if let Some(handle) = pending
        && let Err(error) = handle.await
    {
        debug!(%error, "counter task did not complete");
    }
}
