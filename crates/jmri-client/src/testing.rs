//! Test utilities for jmri-client
//!
//! [`MockJmriServer`] speaks enough of the JMRI JSON protocol to exercise the
//! client: HTTP listings and named lookups under `/json/<type>`, and a
//! WebSocket session at `/json/` that greets, records every request and
//! answers it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::config::ClientConfig;
use crate::types::{Endpoint, ObjectType};
use crate::Result;

/// How the mock server misbehaves
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// Accept the WebSocket but never send the greeting
    pub silent_handshake: bool,
    /// Answer every session request with an empty message
    pub empty_replies: bool,
    /// Close the socket instead of answering the Nth session request (1-based)
    pub close_on_request: Option<usize>,
    /// Wait this long before each session reply
    pub reply_delay: Duration,
    /// Serve these bytes with status 200 for every HTTP request
    pub raw_http_body: Option<Vec<u8>>,
}

/// Something the mock session observed, in order
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A request arrived (non-JSON text is kept as a string value)
    Received(Value),
    /// A reply to the last request is about to be sent
    Replied,
    /// The client sent a close frame
    Closed,
}

struct MockState {
    catalog: HashMap<ObjectType, Vec<Value>>,
    behavior: MockBehavior,
    events: Mutex<Vec<SessionEvent>>,
}

impl MockState {
    fn record(&self, event: SessionEvent) {
        self.events.lock().push(event);
    }

    fn find(&self, object_type: ObjectType, name: &str) -> Option<Value> {
        self.catalog
            .get(&object_type)?
            .iter()
            .find(|item| object_name(item) == Some(name))
            .cloned()
    }

    /// Reporters are answered from the catalog; everything else is echoed
    fn reply_to(&self, request: &Value) -> Value {
        let object_type = request
            .get("type")
            .and_then(|t| serde_json::from_value::<ObjectType>(t.clone()).ok());
        let data = request.get("data").cloned().unwrap_or_else(|| json!({}));

        match object_type {
            Some(ObjectType::Reporter) => {
                let name = data.get("name").and_then(Value::as_str).unwrap_or_default();
                match self.find(ObjectType::Reporter, name) {
                    Some(item) => item,
                    None => error_body(404, &format!("Unable to access reporter {}.", name)),
                }
            }
            Some(object_type) => json!({"type": object_type, "data": data}),
            None => error_body(400, "Unknown type"),
        }
    }
}

/// Name of a catalog item in either `{"name"}` or `{"data":{"name"}}` form
fn object_name(item: &Value) -> Option<&str> {
    item.get("name")
        .or_else(|| item.pointer("/data/name"))
        .and_then(Value::as_str)
}

fn error_body(code: u16, message: &str) -> Value {
    json!({"type": "error", "data": {"code": code, "message": message}})
}

/// Greeting JMRI sends on every new session
pub fn hello_message() -> Value {
    json!({
        "type": "hello",
        "data": {
            "JMRI": "5.9.2",
            "json": "5.0",
            "version": "v5",
            "heartbeat": 13500,
            "railroad": "Mock Railroad",
            "node": "jmri-mock",
            "activeProfile": "Mock"
        }
    })
}

/// Reporters served when no catalog is given
pub fn default_reporters() -> Vec<Value> {
    ["MR001", "MR002"]
        .into_iter()
        .map(|name| {
            json!({
                "type": "reporter",
                "data": {"name": name, "userName": null, "state": 0, "report": null}
            })
        })
        .collect()
}

/// A mock JMRI server that shuts down when dropped
pub struct MockJmriServer {
    pub addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl MockJmriServer {
    /// Start a well-behaved server serving the default reporters
    pub async fn start() -> Result<Self> {
        let mut catalog = HashMap::new();
        catalog.insert(ObjectType::Reporter, default_reporters());
        Self::start_with(catalog, MockBehavior::default()).await
    }

    /// Start a server with a custom catalog and behavior
    pub async fn start_with(
        catalog: HashMap<ObjectType, Vec<Value>>,
        behavior: MockBehavior,
    ) -> Result<Self> {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(MockState {
            catalog,
            behavior,
            events: Mutex::new(Vec::new()),
        });

        let router = Router::new()
            .route("/json/", get(session_handler))
            .route("/json/{object_type}", get(list_handler))
            .route("/json/{object_type}/{name}", get(named_handler))
            .with_state(state.clone());

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.addr.ip().to_string(), self.addr.port())
    }

    /// Client configuration pointing at this server, with short timeouts
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint(),
            ..Default::default()
        }
        .with_http_timeout(Duration::from_secs(5))
        .with_connect_timeout(Duration::from_secs(2))
    }

    /// Every session event so far
    pub fn events(&self) -> Vec<SessionEvent> {
        self.state.events.lock().clone()
    }

    /// Session requests received so far, in arrival order
    pub fn received(&self) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::Received(value) => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Number of close frames received
    pub fn close_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| **event == SessionEvent::Closed)
            .count()
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for MockJmriServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn parse_type(object_type: &str) -> std::result::Result<ObjectType, Response> {
    object_type.parse().map_err(|_| {
        let body = error_body(404, &format!("No such type {}.", object_type));
        (StatusCode::NOT_FOUND, Json(body)).into_response()
    })
}

async fn list_handler(
    State(state): State<Arc<MockState>>,
    Path(object_type): Path<String>,
) -> Response {
    if let Some(raw) = &state.behavior.raw_http_body {
        return (StatusCode::OK, raw.clone()).into_response();
    }
    let object_type = match parse_type(&object_type) {
        Ok(t) => t,
        Err(response) => return response,
    };

    let items = state.catalog.get(&object_type).cloned().unwrap_or_default();
    Json(Value::Array(items)).into_response()
}

async fn named_handler(
    State(state): State<Arc<MockState>>,
    Path((object_type, name)): Path<(String, String)>,
) -> Response {
    if let Some(raw) = &state.behavior.raw_http_body {
        return (StatusCode::OK, raw.clone()).into_response();
    }
    let object_type = match parse_type(&object_type) {
        Ok(t) => t,
        Err(response) => return response,
    };

    match state.find(object_type, &name) {
        Some(item) => Json(item).into_response(),
        None => {
            let body = error_body(404, &format!("Unable to access {} {}.", object_type, name));
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
    }
}

async fn session_handler(ws: WebSocketUpgrade, State(state): State<Arc<MockState>>) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, state))
}

async fn run_session(mut socket: WebSocket, state: Arc<MockState>) {
    let behavior = state.behavior.clone();

    if !behavior.silent_handshake
        && socket
            .send(Message::Text(hello_message().to_string().into()))
            .await
            .is_err()
    {
        return;
    }

    let mut count = 0;
    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(text) => {
                count += 1;
                let request = serde_json::from_str::<Value>(text.as_str())
                    .unwrap_or_else(|_| Value::String(text.as_str().to_string()));
                state.record(SessionEvent::Received(request.clone()));

                if behavior.close_on_request == Some(count) {
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                }

                if !behavior.reply_delay.is_zero() {
                    tokio::time::sleep(behavior.reply_delay).await;
                }

                let reply = if behavior.empty_replies {
                    String::new()
                } else {
                    state.reply_to(&request).to_string()
                };

                state.record(SessionEvent::Replied);
                if socket.send(Message::Text(reply.into())).await.is_err() {
                    return;
                }
            }
            Message::Close(_) => {
                state.record(SessionEvent::Closed);
                return;
            }
            _ => {}
        }
    }
}

/// Wait for a condition with timeout
pub async fn wait_for<F>(condition: F, timeout: Duration) -> bool
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;

    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_shapes() {
        assert_eq!(object_name(&json!({"name": "MR001"})), Some("MR001"));
        assert_eq!(
            object_name(&json!({"type": "reporter", "data": {"name": "MR002"}})),
            Some("MR002")
        );
        assert_eq!(object_name(&json!({"type": "reporter"})), None);
    }

    #[test]
    fn test_hello_message_type() {
        assert_eq!(hello_message()["type"], "hello");
    }
}
