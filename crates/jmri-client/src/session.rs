//! Persistent WebSocket session to the JMRI JSON server
//!
//! JMRI multiplexes every object type over one socket and tags messages by
//! type only, with no request id. A reply can therefore only be matched to
//! its request by strict alternation: one send, then one receive, never two
//! requests in flight. [`Session::send_and_receive`] takes `&mut self` so the
//! borrow checker enforces that for any single owner.
//!
//! A call dropped between its send and its receive (for example by a
//! `tokio::time::timeout` wrapper) leaves an unread reply on the socket. The
//! session cannot tell that reply from the next one, so the next call closes
//! the session instead of sending.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, instrument, warn};

use crate::envelope::{self, Reply};
use crate::error::{JmriError, Result};
use crate::types::Endpoint;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    AwaitingHandshake,
    Ready,
    Closed,
}

/// A single open WebSocket channel to JMRI
///
/// Dropping a session that was not closed releases the socket; when called
/// inside a Tokio runtime a close frame is also sent from a spawned task.
pub struct Session {
    endpoint: Endpoint,
    state: SessionState,
    socket: Option<WsStream>,
    greeting: Reply,
    /// Set from send until the matching receive returns
    in_flight: bool,
}

impl Session {
    /// Connect and consume the server's greeting
    ///
    /// Both the connect and the greeting must complete within
    /// `connect_timeout`, otherwise the channel is released and
    /// [`JmriError::ConnectionError`] is returned.
    #[instrument(skip(connect_timeout))]
    pub async fn open(endpoint: &Endpoint, connect_timeout: Duration) -> Result<Self> {
        let url = endpoint.ws_url()?;

        let mut session = Self {
            endpoint: endpoint.clone(),
            state: SessionState::Disconnected,
            socket: None,
            greeting: Reply::Empty,
            in_flight: false,
        };

        session.state = SessionState::Connecting;
        info!("Connecting to JMRI session at {}", url);

        let (socket, _) = tokio::time::timeout(connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| JmriError::ConnectionError(format!("Timed out connecting to {}", url)))?
            .map_err(|e| {
                JmriError::ConnectionError(format!("WebSocket connect to {} failed: {}", url, e))
            })?;

        session.socket = Some(socket);
        session.state = SessionState::AwaitingHandshake;

        let greeting = match tokio::time::timeout(connect_timeout, session.receive()).await {
            Ok(Ok(greeting)) => greeting,
            Ok(Err(e)) => {
                session.close().await;
                return Err(JmriError::ConnectionError(format!("Handshake failed: {}", e)));
            }
            Err(_) => {
                session.close().await;
                return Err(JmriError::ConnectionError(format!(
                    "No greeting from {} within {:?}",
                    url, connect_timeout
                )));
            }
        };

        if greeting.message_type() != Some("hello") {
            warn!("Unexpected greeting from JMRI: {:?}", greeting);
        }
        debug!("Session ready, greeting: {:?}", greeting);

        session.greeting = greeting;
        session.state = SessionState::Ready;
        Ok(session)
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// The endpoint this session is connected to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The greeting consumed during the handshake
    pub fn greeting(&self) -> &Reply {
        &self.greeting
    }

    /// Whether an earlier call was dropped before its reply was read
    pub fn has_abandoned_request(&self) -> bool {
        self.in_flight
    }

    /// Send one message and return the next message as its reply
    ///
    /// If an earlier call was cancelled after sending, the session is closed
    /// and [`JmriError::TransportError`] is returned without sending.
    pub async fn send_and_receive(&mut self, message: &str) -> Result<Reply> {
        if self.state != SessionState::Ready {
            return Err(JmriError::SessionClosed);
        }
        if self.in_flight {
            warn!("Earlier request on {} was abandoned before its reply", self.endpoint);
            self.close().await;
            return Err(JmriError::TransportError(
                "Session discarded: an earlier request was cancelled before its reply arrived"
                    .to_string(),
            ));
        }

        self.in_flight = true;
        let result = self.exchange(message).await;
        self.in_flight = false;
        result
    }

    async fn exchange(&mut self, message: &str) -> Result<Reply> {
        let socket = self.socket.as_mut().ok_or(JmriError::SessionClosed)?;

        debug!("Sending: {}", message);
        socket
            .send(Message::Text(message.to_string()))
            .await
            .map_err(|e| JmriError::TransportError(format!("Send failed: {}", e)))?;

        let reply = self.receive().await?;
        debug!("Received: {:?}", reply);
        Ok(reply)
    }

    /// Read the next data message, skipping control frames
    async fn receive(&mut self) -> Result<Reply> {
        let socket = self.socket.as_mut().ok_or(JmriError::SessionClosed)?;

        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return envelope::decode(&text),
                Some(Ok(Message::Binary(data))) => return envelope::decode_bytes(&data),
                Some(Ok(Message::Close(frame))) => {
                    return Err(JmriError::TransportError(match frame {
                        Some(frame) => format!("Session closed by server: {}", frame.reason),
                        None => "Session closed by server".to_string(),
                    }));
                }
                // Ping, pong and raw frames are never replies
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    return Err(JmriError::TransportError(format!("Receive failed: {}", e)));
                }
                None => {
                    return Err(JmriError::TransportError(
                        "Session stream ended".to_string(),
                    ));
                }
            }
        }
    }

    /// Release the channel
    ///
    /// Closing an already closed session does nothing.
    pub async fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            info!("Closing JMRI session to {}", self.endpoint);
            if let Err(e) = socket.close(None).await {
                debug!("Close frame not delivered: {}", e);
            }
        }
        self.in_flight = false;
        self.state = SessionState::Closed;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .field("greeting", &self.greeting)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = socket.close(None).await;
                });
            }
        }
    }
}
