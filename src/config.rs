//! Backend connection configuration.
//!
//! Two parameters are required: the service endpoint URL and the public
//! (anon) API key. Missing values, and the placeholder values shipped in
//! template environments, are rejected here, before any network call is made.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Placeholder URL used by template environments.
pub const PLACEHOLDER_URL: &str = "https://placeholder.supabase.co";

/// Placeholder key used by template environments.
pub const PLACEHOLDER_ANON_KEY: &str = "placeholder-key";

/// Environment variable naming the service endpoint.
pub const URL_ENV: &str = "EDUVERZA_SUPABASE_URL";

/// Environment variable naming the public API key.
pub const ANON_KEY_ENV: &str = "EDUVERZA_SUPABASE_ANON_KEY";

/// Legacy variable names accepted as fallbacks for [`URL_ENV`] and [`ANON_KEY_ENV`].
pub const LEGACY_URL_ENV: &str = "VITE_SUPABASE_URL";
pub const LEGACY_ANON_KEY_ENV: &str = "VITE_SUPABASE_ANON_KEY";

/// Default connect timeout for backend requests.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default read timeout for backend requests.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Remediation text shared by configuration errors.
const CONFIG_SUGGESTION: &str = "Set EDUVERZA_SUPABASE_URL and EDUVERZA_SUPABASE_ANON_KEY (or pass --url/--anon-key, or add supabase_url/anon_key to ~/.config/eduverza/config.toml), then run the command again";

/// Configuration problems detected before contacting the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One or both connection parameters are absent.
    #[error("backend is not configured: missing {}\n  Suggestion: {}", .missing.join(", "), CONFIG_SUGGESTION)]
    Missing {
        /// Names of the missing parameters.
        missing: Vec<&'static str>,
    },

    /// A parameter still holds its template placeholder.
    #[error("backend is not configured: {name} still holds the placeholder value\n  Suggestion: {}", CONFIG_SUGGESTION)]
    Placeholder {
        /// Name of the offending parameter.
        name: &'static str,
    },

    /// The endpoint URL does not parse or uses an unsupported scheme.
    #[error("invalid backend URL '{url}': {reason}\n  Suggestion: Use the project URL, e.g. https://<project>.supabase.co")]
    InvalidUrl {
        /// The rejected value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Raw connection settings, possibly incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Service endpoint, e.g. `https://abc.supabase.co`.
    pub url: Option<String>,
    /// Public API key sent with every request.
    pub anon_key: Option<String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        }
    }
}

/// Validated connection parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct Connection {
    /// Service endpoint.
    pub url: Url,
    pub anon_key: String,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url.as_str())
            .field("anon_key", &mask_key(&self.anon_key))
            .finish()
    }
}

impl BackendConfig {
    /// Creates a config from explicit values with default timeouts.
    #[must_use]
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            anon_key: Some(anon_key.into()),
            ..Self::default()
        }
    }

    /// Reads the connection parameters from the process environment.
    ///
    /// The `EDUVERZA_*` names win over the legacy `VITE_*` names.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the connection parameters through an arbitrary lookup function.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |primary: &str, legacy: &str| {
            lookup(primary)
                .filter(|value| !value.trim().is_empty())
                .or_else(|| lookup(legacy).filter(|value| !value.trim().is_empty()))
                .map(|value| value.trim().to_string())
        };
        Self {
            url: read(URL_ENV, LEGACY_URL_ENV),
            anon_key: read(ANON_KEY_ENV, LEGACY_ANON_KEY_ENV),
            ..Self::default()
        }
    }

    /// Fills unset parameters from `fallback`, keeping values already present.
    #[must_use]
    pub fn or(mut self, fallback: &BackendConfig) -> Self {
        if self.url.is_none() {
            self.url.clone_from(&fallback.url);
        }
        if self.anon_key.is_none() {
            self.anon_key.clone_from(&fallback.anon_key);
        }
        self
    }

    /// Returns true when both parameters are present and not placeholders.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a parameter is missing, still a placeholder,
    /// or the URL is not an http(s) URL.
    pub fn validate(&self) -> Result<Connection, ConfigError> {
        let url = self.url.as_deref().map(str::trim).filter(|v| !v.is_empty());
        let anon_key = self
            .anon_key
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let (url, anon_key) = match (url, anon_key) {
            (Some(url), Some(key)) => (url, key),
            (url, key) => {
                let mut missing = Vec::new();
                if url.is_none() {
                    missing.push(URL_ENV);
                }
                if key.is_none() {
                    missing.push(ANON_KEY_ENV);
                }
                return Err(ConfigError::Missing { missing });
            }
        };

        if url.trim_end_matches('/') == PLACEHOLDER_URL {
            return Err(ConfigError::Placeholder { name: URL_ENV });
        }
        if anon_key == PLACEHOLDER_ANON_KEY {
            return Err(ConfigError::Placeholder { name: ANON_KEY_ENV });
        }

        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Connection {
            url: parsed,
            anon_key: anon_key.to_string(),
        })
    }
}

/// Masks an API key for display, keeping only its last four characters.
#[must_use]
pub fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}
