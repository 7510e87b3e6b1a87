//! CLI entry point for the EduVerza catalog.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use eduverza_core::{Backend, BackendConfig, MemoryBackend, RestBackend};
use tracing::{debug, info};

mod app_config;
mod cli;
mod commands;
mod output;

use app_config::{LoadedConfig, VerbositySetting};
use cli::{AdminCommand, Cli, Command, ConfigCommand};
use commands::CommandContext;

/// Picks the default log level.
///
/// Priority: `-q` > `-v` count > file verbosity > `warn`. `RUST_LOG` still
/// overrides the result in [`init_tracing`].
fn resolve_default_log_level(cli: &Cli, file_verbosity: Option<VerbositySetting>) -> &'static str {
    if cli.quiet {
        return "error";
    }
    match cli.verbose {
        0 => match file_verbosity {
            Some(VerbositySetting::Quiet) => "error",
            Some(VerbositySetting::Verbose) => "info",
            Some(VerbositySetting::Debug) => "debug",
            Some(VerbositySetting::Default) | None => "warn",
        },
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

/// Merges connection settings: command line, then environment, then file.
fn effective_backend_config(cli: &Cli, loaded: &LoadedConfig) -> BackendConfig {
    let file = loaded
        .config
        .as_ref()
        .map(app_config::FileConfig::backend_config)
        .unwrap_or_default();
    BackendConfig {
        url: cli.connection.url.clone(),
        anon_key: cli.connection.anon_key.clone(),
        connect_timeout: file.connect_timeout,
        read_timeout: file.read_timeout,
    }
    .or(&BackendConfig::from_env())
    .or(&file)
}

fn build_backend(demo: bool, config: BackendConfig) -> Result<Arc<dyn Backend>> {
    if demo {
        info!("using built-in sample catalog");
        return Ok(Arc::new(MemoryBackend::with_sample_catalog()));
    }
    Ok(Arc::new(RestBackend::new(config)?))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // A missing .env file is normal.
    let _ = dotenvy::dotenv();

    let loaded = app_config::load_default_file_config()?;
    let file_verbosity = loaded.config.as_ref().and_then(|cfg| cfg.verbosity);
    init_tracing(resolve_default_log_level(&cli, file_verbosity));

    debug!(command = ?cli.command, demo = cli.connection.demo, "CLI arguments parsed");
    if let Some(path) = &loaded.path {
        debug!(path = %path.display(), loaded = loaded.loaded_from_file(), "config file");
    }

    let effective = effective_backend_config(&cli, &loaded);
    let demo = cli.connection.demo;

    match &cli.command {
        Command::About => return Ok(commands::run_about_command()),
        Command::Config {
            action: ConfigCommand::Show,
        } => return Ok(commands::run_config_show_command(&loaded, &effective, demo)),
        _ => {}
    }

    let backend = build_backend(demo, effective)?;
    let use_spinner = output::should_use_spinner(io::stderr().is_terminal(), cli.quiet);
    let ctx = CommandContext::new(backend, use_spinner, output::terminal_width());

    match &cli.command {
        Command::Home { watch } => commands::run_home_command(&ctx, *watch).await,
        Command::Browse(args) => commands::run_browse_command(&ctx, args).await,
        Command::Show { id, watch } => commands::run_show_command(&ctx, id, *watch).await,
        Command::Download { id } => commands::run_download_command(&ctx, id).await,
        Command::Admin {
            action: AdminCommand::Upload(args),
        } => commands::run_admin_upload_command(&ctx, args).await,
        Command::About | Command::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}
