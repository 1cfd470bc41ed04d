//! Domain types shared by the JMRI client

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{JmriError, Result};

/// Default JMRI web server port
pub const DEFAULT_PORT: u16 = 12080;

// =============================================================================
// Endpoint
// =============================================================================

/// Address of a JMRI web server
///
/// Both the WebSocket URL and the HTTP base URL are derived from it, so the
/// two transports always talk to the same server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// WebSocket URL of the JSON session (`ws://host:port/json/`)
    pub fn ws_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("ws://{}:{}/json/", self.host, self.port))?)
    }

    /// Base URL of the HTTP JSON servlet (`http://host:port/`)
    pub fn http_base(&self) -> Result<Url> {
        Ok(Url::parse(&format!("http://{}:{}/", self.host, self.port))?)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Object types and verbs
// =============================================================================

/// JMRI object type tag carried in the `type` field of every message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Reporter,
    Sensor,
    Turnout,
    Light,
    Memory,
    Throttle,
}

impl ObjectType {
    /// All object types the client knows about
    pub const ALL: [ObjectType; 6] = [
        ObjectType::Reporter,
        ObjectType::Sensor,
        ObjectType::Turnout,
        ObjectType::Light,
        ObjectType::Memory,
        ObjectType::Throttle,
    ];

    /// Wire name of the object type
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Reporter => "reporter",
            ObjectType::Sensor => "sensor",
            ObjectType::Turnout => "turnout",
            ObjectType::Light => "light",
            ObjectType::Memory => "memory",
            ObjectType::Throttle => "throttle",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ObjectType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown object type: {}", s))
    }
}

/// Method carried in the optional `method` field of a session message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

// =============================================================================
// Throttle
// =============================================================================

/// Locomotive direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Parse free-text direction input.
    ///
    /// Only the exact string `"forward"` means forward; everything else,
    /// including `"Forward"` and the empty string, means reverse.
    pub fn from_input(input: &str) -> Self {
        if input == "forward" {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, Direction::Forward)
    }
}

impl From<&str> for Direction {
    fn from(input: &str) -> Self {
        Direction::from_input(input)
    }
}

/// Progress of one throttle run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottlePhase {
    Unbound,
    Acquiring,
    Bound,
    SpeedDirectionSet,
}

/// Transient state of a throttle driven by a single `run_train` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThrottleState {
    pub throttle_name: String,
    pub engine_address: u32,
    pub speed: f64,
    pub direction: Direction,
    pub phase: ThrottlePhase,
}

impl ThrottleState {
    /// Create an unbound throttle state, rejecting speeds outside `0.0..=1.0`
    pub fn new(
        throttle_name: impl Into<String>,
        engine_address: u32,
        speed: f64,
        direction: Direction,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&speed) {
            return Err(JmriError::InvalidSpeed(speed));
        }

        Ok(Self {
            throttle_name: throttle_name.into(),
            engine_address,
            speed,
            direction,
            phase: ThrottlePhase::Unbound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let endpoint = Endpoint::new("localhost", 12080);
        assert_eq!(endpoint.ws_url().unwrap().as_str(), "ws://localhost:12080/json/");
        assert_eq!(endpoint.http_base().unwrap().as_str(), "http://localhost:12080/");
        assert_eq!(endpoint.to_string(), "localhost:12080");
    }

    #[test]
    fn test_endpoint_invalid_host() {
        let endpoint = Endpoint::new("bad host", 12080);
        assert!(matches!(endpoint.ws_url(), Err(JmriError::InvalidUrl(_))));
    }

    #[test]
    fn test_object_type_names() {
        for t in ObjectType::ALL {
            assert_eq!(t.as_str().parse::<ObjectType>().unwrap(), t);
            assert_eq!(serde_json::to_value(t).unwrap(), t.as_str());
        }
        assert!("Reporter".parse::<ObjectType>().is_err());
    }

    #[test]
    fn test_verb_serialization() {
        assert_eq!(serde_json::to_value(Verb::Post).unwrap(), "post");
        assert_eq!(serde_json::to_value(Verb::Delete).unwrap(), "delete");
    }

    #[test]
    fn test_direction_mapping() {
        assert!(Direction::from_input("forward").is_forward());
        for input in ["reverse", "Forward", "", "FORWARD", " forward", "backwards"] {
            assert_eq!(Direction::from(input), Direction::Reverse, "input {:?}", input);
        }
    }

    #[test]
    fn test_throttle_state_speed_bounds() {
        let state = ThrottleState::new("t1", 138, 0.5, Direction::Forward).unwrap();
        assert_eq!(state.phase, ThrottlePhase::Unbound);

        assert!(ThrottleState::new("t1", 138, 0.0, Direction::Forward).is_ok());
        assert!(ThrottleState::new("t1", 138, 1.0, Direction::Forward).is_ok());
        assert!(matches!(
            ThrottleState::new("t1", 138, 1.5, Direction::Forward),
            Err(JmriError::InvalidSpeed(_))
        ));
        assert!(matches!(
            ThrottleState::new("t1", 138, -0.1, Direction::Reverse),
            Err(JmriError::InvalidSpeed(_))
        ));
        assert!(ThrottleState::new("t1", 138, f64::NAN, Direction::Reverse).is_err());
    }
}
