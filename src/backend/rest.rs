//! PostgREST-backed implementation of [`Backend`].
//!
//! Reads and writes go through the `/rest/v1/<table>` endpoint with the anon
//! key in both the `apikey` and `Authorization` headers. Subscriptions use the
//! realtime WebSocket endpoint of the same project (see [`super::realtime`]).
//!
//! When the connection parameters are unusable every operation fails with
//! [`BackendError::Config`] without touching the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_RANGE, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::{BackendConfig, ConfigError, Connection};
use crate::resource::Counter;
use crate::resource::record::{self, columns};

use super::http_client::build_backend_http_client;
use super::realtime;
use super::{Backend, BackendError, FeedScope, Result, Subscription};

const PREFER: &str = "Prefer";

/// Table API client for the resources collection.
pub struct RestBackend {
    client: Client,
    connection: std::result::Result<Connection, ConfigError>,
    connect_timeout: Duration,
}

impl RestBackend {
    /// Creates a backend from connection settings.
    ///
    /// Unusable settings are not an error here; they surface as
    /// [`BackendError::Config`] from every operation instead.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the HTTP client cannot be constructed.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = build_backend_http_client(config.connect_timeout, config.read_timeout)?;
        let connection = config.validate();
        if let Err(error) = &connection {
            debug!(%error, "backend configuration unusable; operations will fail fast");
        }
        Ok(Self {
            client,
            connection,
            connect_timeout: config.connect_timeout,
        })
    }

    /// Returns true when the connection parameters are usable.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.connection.is_ok()
    }

    fn connection(&self) -> Result<&Connection> {
        self.connection
            .as_ref()
            .map_err(|e| BackendError::Config(e.clone()))
    }

    fn table_url(&self, operation: &'static str) -> Result<Url> {
        let connection = self.connection()?;
        let base = connection.url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/rest/v1/{}", record::TABLE))
            .map_err(|e| BackendError::decode(operation, format!("invalid table URL: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let connection = self.connection()?;
        Ok(self
            .client
            .request(method, url)
            .header("apikey", &connection.anon_key)
            .bearer_auth(&connection.anon_key))
    }

    async fn execute(&self, operation: &'static str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::network(operation, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = rejection_message(&body, status);
        debug!(operation, status = status.as_u16(), %message, "backend rejected request");
        Err(BackendError::rejected(operation, status.as_u16(), message))
    }

    async fn fetch_rows(&self, operation: &'static str, url: Url) -> Result<Vec<Value>> {
        let request = self.request(Method::GET, url)?;
        let response = self.execute(operation, request).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| BackendError::decode(operation, e.to_string()))
    }
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Backend for RestBackend {
    fn name(&self) -> &'static str {
        "rest"
    }

    #[tracing::instrument(skip(self))]
    async fn list_resources(&self) -> Result<Vec<Value>> {
        const OP: &str = "load resources";
        let mut url = self.table_url(OP)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", &format!("{}.desc", columns::CREATED_AT));
        let rows = self.fetch_rows(OP, url).await?;
        debug!(rows = rows.len(), "loaded resource rows");
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn get_resource(&self, id: &str) -> Result<Option<Value>> {
        const OP: &str = "load resource";
        let mut url = self.table_url(OP)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair(columns::ID, &format!("eq.{id}"))
            .append_pair("limit", "1");
        let rows = self.fetch_rows(OP, url).await?;
        Ok(rows.into_iter().next())
    }

    #[tracing::instrument(skip(self))]
    async fn count_resources(&self) -> Result<u64> {
        const OP: &str = "count resources";
        let mut url = self.table_url(OP)?;
        url.query_pairs_mut().append_pair("select", columns::ID);
        let request = self
            .request(Method::HEAD, url)?
            .header(PREFER, "count=exact");
        let response = self.execute(OP, request).await?;
        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value: &HeaderValue| value.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| BackendError::decode(OP, "missing or malformed Content-Range header"))
    }

    #[tracing::instrument(skip(self))]
    async fn download_counts(&self) -> Result<Vec<Value>> {
        const OP: &str = "read download counters";
        let mut url = self.table_url(OP)?;
        url.query_pairs_mut()
            .append_pair("select", columns::DOWNLOADS);
        self.fetch_rows(OP, url).await
    }

    #[tracing::instrument(skip(self, row))]
    async fn insert_resource(&self, row: Value) -> Result<Value> {
        const OP: &str = "insert resource";
        let url = self.table_url(OP)?;
        let request = self
            .request(Method::POST, url)?
            .header(PREFER, "return=representation")
            .json(&Value::Array(vec![row]));
        let response = self.execute(OP, request).await?;
        let rows = response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| BackendError::decode(OP, e.to_string()))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::decode(OP, "insert returned no rows"))
    }

    #[tracing::instrument(skip(self), fields(counter = %counter))]
    async fn increment(&self, id: &str, counter: Counter) -> Result<()> {
        const OP: &str = "update counter";
        let column = record::counter_column(counter);

        let mut read_url = self.table_url(OP)?;
        read_url
            .query_pairs_mut()
            .append_pair("select", column)
            .append_pair(columns::ID, &format!("eq.{id}"));
        let rows = self.fetch_rows(OP, read_url).await?;
        let Some(current) = rows.first() else {
            return Err(BackendError::MissingRow { id: id.to_string() });
        };
        let next = record::counter_of(current, counter).saturating_add(1);

        let mut write_url = self.table_url(OP)?;
        write_url
            .query_pairs_mut()
            .append_pair(columns::ID, &format!("eq.{id}"));
        let request = self
            .request(Method::PATCH, write_url)?
            .header(PREFER, "return=minimal")
            .json(&record::counter_patch(counter, next));
        self.execute(OP, request).await?;
        debug!(id, value = next, "counter updated");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn subscribe(&self, scope: FeedScope) -> Result<Subscription> {
        let connection = self.connection()?;
        realtime::subscribe(connection, scope, self.connect_timeout).await
    }
}

/// Extracts a readable message from a PostgREST error body.
fn rejection_message(body: &str, status: StatusCode) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let message = json
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| json.get("error").and_then(Value::as_str));
        if let Some(message) = message {
            return match json.get("hint").and_then(Value::as_str) {
                Some(hint) if !hint.is_empty() => format!("{message} (hint: {hint})"),
                _ => message.to_string(),
            };
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses the total from a `Content-Range` header such as `0-24/3573` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}
