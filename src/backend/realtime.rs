//! Realtime change feed over the Phoenix channel protocol.
//!
//! One WebSocket per subscription: connect, join a `postgres_changes` channel
//! for the resources table, then forward insert/update/delete payloads until
//! the subscription is released. Per-id scopes are narrowed client side, since
//! the server does not apply row filters to deletes. A
//! heartbeat keeps the socket alive. Failures after the join end the feed
//! quietly; the consumer simply stops receiving events.

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};
use url::Url;

use crate::config::Connection;
use crate::resource::record;

use super::{BackendError, ChangeEvent, FEED_BUFFER, FeedScope, Result, Subscription};

/// Interval between Phoenix heartbeats.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// Phoenix protocol version requested on connect.
const PROTOCOL_VERSION: &str = "1.0.0";

/// Database schema holding the resources table.
const SCHEMA: &str = "public";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Derives the realtime WebSocket URL from the project URL.
///
/// `https://abc.supabase.co` becomes
/// `wss://abc.supabase.co/realtime/v1/websocket?apikey=<key>&vsn=1.0.0`.
///
/// # Errors
///
/// Returns [`BackendError::Realtime`] if the scheme cannot be switched.
pub fn realtime_url(connection: &Connection) -> Result<Url> {
    let mut url = connection.url.clone();
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|()| BackendError::realtime(format!("cannot derive realtime URL from {}", connection.url)))?;
    url.set_path("/realtime/v1/websocket");
    url.query_pairs_mut()
        .clear()
        .append_pair("apikey", &connection.anon_key)
        .append_pair("vsn", PROTOCOL_VERSION);
    Ok(url)
}

fn channel_topic(scope: &FeedScope) -> String {
    match scope {
        FeedScope::Collection => format!("realtime:{}", record::TABLE),
        FeedScope::Resource(id) => format!("realtime:{}:{id}", record::TABLE),
    }
}

/// Builds the `phx_join` message for a scope.
fn join_message(scope: &FeedScope, access_token: &str, join_ref: u64) -> Value {
    let change = json!({
        "event": "*",
        "schema": SCHEMA,
        "table": record::TABLE,
    });
    json!({
        "topic": channel_topic(scope),
        "event": "phx_join",
        "payload": {
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [change],
            },
            "access_token": access_token,
        },
        "ref": join_ref.to_string(),
        "join_ref": join_ref.to_string(),
    })
}

fn heartbeat_message(msg_ref: u64) -> Value {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": msg_ref.to_string(),
    })
}

/// Parses a realtime frame into a [`ChangeEvent`].
///
/// Accepts both the `postgres_changes` envelope and the older per-event
/// (`INSERT`/`UPDATE`/`DELETE`) envelope. Any other frame yields `None`.
#[must_use]
pub fn parse_change_message(text: &str) -> Option<ChangeEvent> {
    let frame: Value = serde_json::from_str(text).ok()?;
    let event = frame.get("event")?.as_str()?;
    let payload = frame.get("payload")?;

    let data = match event {
        "postgres_changes" => payload.get("data")?,
        "INSERT" | "UPDATE" | "DELETE" => payload,
        _ => return None,
    };
    let change_type = data
        .get("type")
        .or_else(|| data.get("eventType"))
        .and_then(Value::as_str)
        .unwrap_or(event);

    let record = data.get("record").or_else(|| data.get("new"));
    let old_record = data.get("old_record").or_else(|| data.get("old"));

    match change_type {
        "INSERT" => Some(ChangeEvent::Insert(record?.clone())),
        "UPDATE" => Some(ChangeEvent::Update(record?.clone())),
        "DELETE" => Some(ChangeEvent::Delete(old_record?.clone())),
        _ => None,
    }
}

/// Returns the refusal reason when a frame reports a channel error.
fn channel_error(text: &str) -> Option<String> {
    let frame: Value = serde_json::from_str(text).ok()?;
    let event = frame.get("event")?.as_str()?;
    let payload = frame.get("payload")?;
    match event {
        "phx_reply" if payload.get("status").and_then(Value::as_str) == Some("error") => Some(
            payload
                .get("response")
                .map_or_else(|| "join refused".to_string(), Value::to_string),
        ),
        "phx_error" => Some("channel crashed".to_string()),
        "system" if payload.get("status").and_then(Value::as_str) == Some("error") => Some(
            payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("system error")
                .to_string(),
        ),
        _ => None,
    }
}

/// Opens a realtime subscription.
pub(super) async fn subscribe(
    connection: &Connection,
    scope: FeedScope,
    connect_timeout: Duration,
) -> Result<Subscription> {
    let url = realtime_url(connection)?;
    debug!(host = url.host_str().unwrap_or_default(), ?scope, "opening realtime channel");

    let (socket, _) = tokio::time::timeout(connect_timeout, connect_async(url.as_str()))
        .await
        .map_err(|_| BackendError::realtime("timed out connecting to the realtime endpoint"))?
        .map_err(|e| BackendError::realtime(e.to_string()))?;

    let (mut sink, source) = socket.split();
    let join = join_message(&scope, &connection.anon_key, 1);
    sink.send(Message::Text(join.to_string()))
        .await
        .map_err(|e| BackendError::realtime(format!("failed to join channel: {e}")))?;

    let (tx, rx) = mpsc::channel(FEED_BUFFER);
    let task = tokio::spawn(run_channel(sink, source, scope, tx));
    Ok(Subscription::new(rx, task))
}

async fn run_channel(
    mut sink: SplitSink<Socket, Message>,
    mut source: SplitStream<Socket>,
    scope: FeedScope,
    tx: mpsc::Sender<ChangeEvent>,
) {
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;
    let mut next_ref: u64 = 2;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let frame = heartbeat_message(next_ref).to_string();
                next_ref += 1;
                if let Err(e) = sink.send(Message::Text(frame)).await {
                    warn!(error = %e, "realtime heartbeat failed; closing feed");
                    break;
                }
            }
            () = tx.closed() => break,
            message = source.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reason) = channel_error(&text) {
                        warn!(%reason, "realtime channel refused; no live updates");
                        break;
                    }
                    let Some(event) = parse_change_message(&text) else {
                        continue;
                    };
                    if !scope.matches(&event) {
                        continue;
                    }
                    debug!(event = event.label(), id = ?event.resource_id(), "change received");
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!("realtime socket closed by server");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(error = %e, "realtime socket error; closing feed");
                    break;
                }
            }
        }
    }

    let _ = sink.close().await;
}
