//! Shared HTTP client construction policy for backend requests.
//!
//! Centralizes timeouts, user agent and compression so every request against
//! the table API behaves the same way.

use std::time::Duration;

use reqwest::Client;

use super::BackendError;

/// Project URL advertised in the user agent.
const PROJECT_URL: &str = "https://github.com/fierce/eduverza";

/// Returns the user agent sent with every backend request.
#[must_use]
pub fn user_agent() -> String {
    format!("eduverza/{} (+{PROJECT_URL})", env!("CARGO_PKG_VERSION"))
}

/// Builds the backend HTTP client.
///
/// # Errors
///
/// Returns [`BackendError::Network`] when the TLS backend or proxy settings
/// cannot be initialized.
pub fn build_backend_http_client(
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Client, BackendError> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(read_timeout)
        .user_agent(user_agent())
        .gzip(true)
        .build()
        .map_err(|e| {
            BackendError::network("initialize the HTTP client", format!("client construction failed: {e}"))
        })
}
