//! JMRI client facade

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::envelope::{self, Reply};
use crate::error::{JmriError, Result};
use crate::http::HttpChannel;
use crate::registry::{self, Intent, Transport};
use crate::session::Session;
use crate::throttle::{ThrottleController, TrainRun};
use crate::types::{Direction, Endpoint, ObjectType, ThrottleState};

/// Client for a JMRI web server
///
/// Owns one WebSocket session for its whole lifetime and an HTTP channel
/// for catalog requests. Each operation picks its transport from the
/// registry, so callers only say what they want.
///
/// Session use is serialized: concurrent calls that need the session wait
/// for each other, and a throttle run holds the session for both of its
/// round trips. HTTP calls never wait on the session.
#[derive(Debug)]
pub struct JmriClient {
    config: ClientConfig,
    http: HttpChannel,
    session: Mutex<Session>,
}

impl JmriClient {
    /// Connect to the server described by `config`
    ///
    /// Opens the session and consumes its greeting. If that fails nothing
    /// else is attempted.
    #[instrument(skip(config), fields(endpoint = %config.endpoint))]
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let http = HttpChannel::new(&config.endpoint, config.http_timeout, config.connect_timeout)?;
        let session = Session::open(&config.endpoint, config.connect_timeout).await?;
        info!("Connected to JMRI at {}", config.endpoint);

        Ok(Self {
            config,
            http,
            session: Mutex::new(session),
        })
    }

    /// Connect to `host:port` with default settings
    pub async fn new(host: &str, port: u16) -> Result<Self> {
        Self::connect(ClientConfig::new(host, port)).await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.config.endpoint
    }

    /// The HTTP channel, for callers that want catalog access only
    pub fn http(&self) -> &HttpChannel {
        &self.http
    }

    /// The greeting the server sent when the session opened
    pub async fn greeting(&self) -> Reply {
        self.session.lock().await.greeting().clone()
    }

    // =========================================================================
    // Generic operations
    // =========================================================================

    /// Query an object type over whichever transport serves `intent`
    ///
    /// HTTP intents put the name in the URL; session intents send it as
    /// `data.name`. [`Intent::StatefulControl`] is refused with
    /// [`JmriError::RequiresController`]; use [`JmriClient::run_train_with`].
    #[instrument(skip(self))]
    pub async fn query(
        &self,
        object_type: ObjectType,
        intent: Intent,
        name: Option<&str>,
    ) -> Result<Reply> {
        let transport = registry::resolve(object_type, intent)?;
        if intent == Intent::StatefulControl {
            return Err(JmriError::RequiresController { object_type });
        }
        debug!("{} {} via {:?}", object_type, intent, transport);

        match transport {
            Transport::Http => self.http.get(object_type, name).await,
            Transport::Session => {
                let payload = registry::payload_for(object_type, intent, name)?;
                let message = envelope::encode(object_type, payload.as_ref(), None)?;
                let mut session = self.session.lock().await;
                session.send_and_receive(&message).await
            }
        }
    }

    /// List every object of a type
    pub async fn list(&self, object_type: ObjectType) -> Result<Vec<Value>> {
        let reply = self.query(object_type, Intent::Listing, None).await?;
        into_list(reply)
    }

    /// Fetch one named object over HTTP
    pub async fn get(&self, object_type: ObjectType, name: &str) -> Result<Reply> {
        self.query(object_type, Intent::NamedQuery, Some(name)).await
    }

    /// Ask the session for the current state of one named object
    pub async fn query_state(&self, object_type: ObjectType, name: &str) -> Result<Reply> {
        self.query(object_type, Intent::StateQuery, Some(name)).await
    }

    // =========================================================================
    // Reporters
    // =========================================================================

    /// List all reporters
    pub async fn list_reporters(&self) -> Result<Vec<Value>> {
        self.list(ObjectType::Reporter).await
    }

    /// Fetch a reporter over HTTP
    pub async fn get_reporter(&self, name: &str) -> Result<Reply> {
        self.get(ObjectType::Reporter, name).await
    }

    /// Get the current state of a reporter over the session
    pub async fn get_reporter_state(&self, name: &str) -> Result<Reply> {
        self.query_state(ObjectType::Reporter, name).await
    }

    // =========================================================================
    // Throttles
    // =========================================================================

    /// Drive a locomotive under the configured throttle name
    ///
    /// `direction` is free text: only `"forward"` means forward.
    pub async fn run_train(&self, address: u32, speed: f64, direction: &str) -> Result<TrainRun> {
        self.run_train_with(&self.config.throttle_name, address, speed, direction)
            .await
    }

    /// Drive a locomotive under an explicit throttle name
    #[instrument(skip(self))]
    pub async fn run_train_with(
        &self,
        throttle_name: &str,
        address: u32,
        speed: f64,
        direction: &str,
    ) -> Result<TrainRun> {
        let state = ThrottleState::new(
            throttle_name,
            address,
            speed,
            Direction::from_input(direction),
        )?;

        let mut session = self.session.lock().await;
        ThrottleController::new(&mut *session).run(state).await
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Close the session
    ///
    /// Safe to call more than once. Later session operations fail with
    /// [`JmriError::SessionClosed`]; HTTP operations keep working.
    pub async fn close(&self) {
        self.session.lock().await.close().await;
    }
}

/// Unwrap a listing reply into its elements
fn into_list(reply: Reply) -> Result<Vec<Value>> {
    match reply {
        Reply::Body(Value::Array(items)) => Ok(items),
        Reply::Empty => Ok(Vec::new()),
        Reply::Body(other) => Err(JmriError::MalformedResponse(format!(
            "Expected a JSON array, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_list() {
        let items = into_list(Reply::Body(json!([{"name": "MR001"}]))).unwrap();
        assert_eq!(items, vec![json!({"name": "MR001"})]);

        assert!(into_list(Reply::Empty).unwrap().is_empty());
        assert!(matches!(
            into_list(Reply::Body(json!({"name": "MR001"}))),
            Err(JmriError::MalformedResponse(_))
        ));
    }
}
