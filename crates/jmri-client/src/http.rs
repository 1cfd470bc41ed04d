//! Stateless HTTP channel to the JMRI JSON servlet

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::envelope::{self, Reply};
use crate::error::{JmriError, Result};
use crate::types::{Endpoint, ObjectType};

/// HTTP channel for catalog requests (`GET /json/<type>[/<name>]`)
///
/// Every call is an independent exchange, so the channel can be cloned and
/// used concurrently.
#[derive(Debug, Clone)]
pub struct HttpChannel {
    client: Client,
    base_url: Url,
}

impl HttpChannel {
    /// Create a channel for the given endpoint
    pub fn new(endpoint: &Endpoint, timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let base_url = endpoint.http_base()?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `<base>/json/<type>` or `<base>/json/<type>/<name>`
    ///
    /// The name is pushed as a single path segment, so names containing `/`
    /// or spaces are percent-encoded rather than split.
    pub fn resource_url(&self, object_type: ObjectType, name: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments.pop_if_empty().push("json").push(object_type.as_str());
            if let Some(name) = name {
                segments.push(name);
            }
        }
        Ok(url)
    }

    /// Fetch a listing (no name) or a single named object
    #[instrument(skip(self))]
    pub async fn get(&self, object_type: ObjectType, name: Option<&str>) -> Result<Reply> {
        let url = self.resource_url(object_type, name)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        let body = response.bytes().await.map_err(|e| {
            JmriError::TransportError(format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            return Err(JmriError::request_failed(
                status.as_u16(),
                error_message(status, &body),
            ));
        }

        envelope::decode_bytes(&body)
    }
}

/// Pull the message out of a JMRI error body
/// (`{"type":"error","data":{"code":404,"message":"..."}}`), falling back to
/// the status line.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/data/message")?.as_str().map(String::from))
        .unwrap_or_else(|| format!("HTTP {}", status))
}
