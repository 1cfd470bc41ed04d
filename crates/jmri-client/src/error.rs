//! Error types for JMRI client operations

use thiserror::Error;

use crate::registry::Intent;
use crate::types::ObjectType;

/// Result type alias for JMRI client operations
pub type Result<T> = std::result::Result<T, JmriError>;

/// Errors that can occur during JMRI client operations
///
/// Nothing in the client recovers from these locally. Any error means the
/// state of the remote operation is unknown to the caller.
#[derive(Error, Debug)]
pub enum JmriError {
    /// The WebSocket session could not be opened or its greeting never arrived
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    /// Session used after it was closed
    #[error("Session closed")]
    SessionClosed,

    /// Send or receive failed mid-session or mid-request
    #[error("Transport error: {0}")]
    TransportError(String),

    /// HTTP request did not succeed
    #[error("Request failed ({}): {message}", describe_status(.status))]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    /// Body present but not valid JSON
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A request could not be serialized
    #[error("Failed to encode request: {0}")]
    EncodeError(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The object type is not served for this intent
    #[error("{object_type} does not support {intent}")]
    UnsupportedIntent {
        object_type: ObjectType,
        intent: Intent,
    },

    /// Stateful control must go through the throttle controller
    #[error("{object_type} control is only available through run_train")]
    RequiresController { object_type: ObjectType },

    /// Throttle speed outside 0.0..=1.0
    #[error("Invalid throttle speed {0}: expected a fraction between 0.0 and 1.0")]
    InvalidSpeed(f64),
}

fn describe_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no status".to_string(),
    }
}

impl JmriError {
    /// Create a request failure from an HTTP status code and message
    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for JmriError {
    fn from(e: reqwest::Error) -> Self {
        Self::RequestFailed {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_display() {
        let err = JmriError::request_failed(404, "Not Found");
        assert_eq!(err.to_string(), "Request failed (404): Not Found");

        let err = JmriError::RequestFailed {
            status: None,
            message: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "Request failed (no status): connection refused");
    }

    #[test]
    fn test_unsupported_intent_display() {
        let err = JmriError::UnsupportedIntent {
            object_type: ObjectType::Throttle,
            intent: Intent::Listing,
        };
        assert_eq!(err.to_string(), "throttle does not support listing");
    }
}
