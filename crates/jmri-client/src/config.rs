//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Endpoint, DEFAULT_PORT};

/// Default HTTP request timeout
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// Default timeout for connecting and receiving the session greeting
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Throttle name used when the caller does not pick one
pub const DEFAULT_THROTTLE_NAME: &str = "mycoolthrottle";

/// Configuration for [`JmriClient`](crate::JmriClient)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// JMRI web server address
    pub endpoint: Endpoint,
    /// Timeout applied to each HTTP request
    pub http_timeout: Duration,
    /// Timeout for opening the session, including the greeting
    pub connect_timeout: Duration,
    /// Name under which `run_train` acquires its throttle
    pub throttle_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::new("localhost", DEFAULT_PORT),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            throttle_name: DEFAULT_THROTTLE_NAME.to_string(),
        }
    }
}

impl ClientConfig {
    /// Configuration for a server with default timeouts
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            endpoint: Endpoint::new(host, port),
            ..Default::default()
        }
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_throttle_name(mut self, name: impl Into<String>) -> Self {
        self.throttle_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, Endpoint::new("localhost", 12080));
        assert_eq!(config.throttle_name, "mycoolthrottle");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("jmri.local", 8080)
            .with_connect_timeout(Duration::from_millis(250))
            .with_throttle_name("yard");
        assert_eq!(config.endpoint.host, "jmri.local");
        assert_eq!(config.endpoint.port, 8080);
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(config.throttle_name, "yard");
    }
}
