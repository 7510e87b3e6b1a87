//! Config command handler.

use std::process::ExitCode;

use eduverza_core::BackendConfig;
use eduverza_core::config::mask_key;

use crate::app_config::{LoadedConfig, VerbositySetting};

/// Renders the effective configuration as `key: value` lines.
pub(crate) fn render_config(loaded: &LoadedConfig, effective: &BackendConfig, demo: bool) -> String {
    let path = loaded
        .path
        .as_ref()
        .map_or_else(|| "(unresolved)".to_string(), |p| p.display().to_string());
    let file = if loaded.loaded_from_file() {
        "loaded"
    } else {
        "not found (using defaults)"
    };
    let verbosity = loaded
        .config
        .as_ref()
        .and_then(|cfg| cfg.verbosity)
        .unwrap_or(VerbositySetting::Default);
    let status = if demo {
        "sample catalog (no backend contacted)".to_string()
    } else {
        match effective.validate() {
            Ok(_) => "configured".to_string(),
            Err(error) => error
                .to_string()
                .lines()
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    };

    [
        format!("config_path: {path}"),
        format!("config_file: {file}"),
        format!("mode: {}", if demo { "demo" } else { "hosted" }),
        format!(
            "supabase_url: {}",
            effective.url.as_deref().unwrap_or("(not set)")
        ),
        format!(
            "anon_key: {}",
            effective
                .anon_key
                .as_deref()
                .map_or_else(|| "(not set)".to_string(), mask_key)
        ),
        format!("connect_timeout_secs: {}", effective.connect_timeout.as_secs()),
        format!("read_timeout_secs: {}", effective.read_timeout.as_secs()),
        format!("verbosity: {}", verbosity.as_str()),
        format!("status: {status}"),
    ]
    .join("\n")
}

pub fn run_config_show_command(loaded: &LoadedConfig, effective: &BackendConfig, demo: bool) -> ExitCode {
    println!("{}", render_config(loaded, effective, demo));
    ExitCode::SUCCESS
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app_config::FileConfig;

    #[test]
    fn test_render_config_without_file() {
        let loaded = LoadedConfig {
            path: Some(PathBuf::from("/tmp/eduverza/config.toml")),
            config: None,
        };
        let text = render_config(&loaded, &BackendConfig::default(), false);
        assert!(text.contains("config_path: /tmp/eduverza/config.toml"));
        assert!(text.contains("config_file: not found (using defaults)"));
        assert!(text.contains("supabase_url: (not set)"));
        assert!(text.contains("verbosity: default"));
        assert!(text.contains("status: backend is not configured"));
    }

    #[test]
    fn test_render_config_masks_key() {
        let loaded = LoadedConfig {
            path: None,
            config: Some(FileConfig {
                verbosity: Some(VerbositySetting::Debug),
                ..FileConfig::default()
            }),
        };
        let effective = BackendConfig::new("https://abc.supabase.co", "secret-anon-key");
        let text = render_config(&loaded, &effective, false);
        assert!(text.contains("config_file: loaded"));
        assert!(text.contains("anon_key: ***********-key"));
        assert!(!text.contains("secret"));
        assert!(text.contains("verbosity: debug"));
        assert!(text.contains("status: configured"));
    }

    #[test]
    fn test_render_config_demo_mode() {
        let loaded = LoadedConfig {
            path: None,
            config: None,
        };
        let text = render_config(&loaded, &BackendConfig::default(), true);
        assert!(text.contains("mode: demo"));
        assert!(text.contains("status: sample catalog"));
    }
}
