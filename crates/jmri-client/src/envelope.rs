//! Envelope codec for JMRI JSON messages
//!
//! Every session message is a JSON object `{"type", "data"?, "method"?}`.
//! Replies from either transport decode into a [`Reply`].

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{JmriError, Result};
use crate::types::{ObjectType, Verb};

/// Request payload carried in the `data` field
///
/// Each variant is the exact field set one kind of request needs, so a
/// request cannot be built with a missing or misspelled key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Look up a single named object (`{"name"}`)
    NamedQuery { name: String },

    /// Bind a throttle name to a locomotive address (`{"name", "address"}`)
    ThrottleAcquire { name: String, address: u32 },

    /// Set speed and direction of a bound throttle (`{"throttle", "speed", "forward"}`)
    ThrottleControl {
        throttle: String,
        speed: f64,
        #[serde(serialize_with = "serialize_flag")]
        forward: bool,
    },

    /// Free-form fields for object types without a dedicated shape
    Fields(Map<String, Value>),
}

impl Payload {
    /// Whether the payload would serialize to an empty object
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Fields(fields) => fields.is_empty(),
            _ => false,
        }
    }
}

/// JMRI has always been sent the direction flag as `1`/`0`
fn serialize_flag<S>(flag: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*flag))
}

/// A single outbound session message
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a> {
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Verb>,
}

/// Decoded reply from either transport
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// The server sent a JSON body
    Body(Value),
    /// The server sent nothing; this means "no data", not failure
    Empty,
}

impl Reply {
    pub fn is_empty(&self) -> bool {
        matches!(self, Reply::Empty)
    }

    /// Borrow the decoded body, if any
    pub fn body(&self) -> Option<&Value> {
        match self {
            Reply::Body(value) => Some(value),
            Reply::Empty => None,
        }
    }

    /// Take the decoded body, if any
    pub fn into_body(self) -> Option<Value> {
        match self {
            Reply::Body(value) => Some(value),
            Reply::Empty => None,
        }
    }

    /// The `type` tag of the reply, if it is a JMRI message object
    pub fn message_type(&self) -> Option<&str> {
        self.body()?.get("type")?.as_str()
    }

    /// The `data` object of the reply, if present
    pub fn data(&self) -> Option<&Value> {
        self.body()?.get("data")
    }
}

/// Encode a session message
///
/// `data` is omitted when absent or empty and `method` when absent; neither
/// is ever written as `null`.
pub fn encode(
    object_type: ObjectType,
    data: Option<&Payload>,
    verb: Option<Verb>,
) -> Result<String> {
    let envelope = RequestEnvelope {
        object_type,
        data: data.filter(|payload| !payload.is_empty()),
        method: verb,
    };

    serde_json::to_string(&envelope)
        .map_err(|e| JmriError::EncodeError(e.to_string()))
}

/// Decode a raw reply
pub fn decode(raw: &str) -> Result<Reply> {
    if raw.trim().is_empty() {
        return Ok(Reply::Empty);
    }

    serde_json::from_str(raw)
        .map(Reply::Body)
        .map_err(|e| JmriError::MalformedResponse(e.to_string()))
}

/// Decode a raw reply received as bytes
pub fn decode_bytes(raw: &[u8]) -> Result<Reply> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| JmriError::MalformedResponse(format!("Reply is not UTF-8: {}", e)))?;
    decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn roundtrip(object_type: ObjectType, data: Option<&Payload>, verb: Option<Verb>) -> Value {
        let wire = encode(object_type, data, verb).unwrap();
        decode(&wire).unwrap().into_body().unwrap()
    }

    #[test]
    fn test_encode_type_only() {
        let wire = encode(ObjectType::Reporter, None, None).unwrap();
        assert_eq!(wire, r#"{"type":"reporter"}"#);
    }

    #[test]
    fn test_encode_reporter_query() {
        let payload = Payload::NamedQuery {
            name: "MR001".into(),
        };
        assert_eq!(
            roundtrip(ObjectType::Reporter, Some(&payload), None),
            json!({"type": "reporter", "data": {"name": "MR001"}})
        );
    }

    #[test]
    fn test_encode_throttle_acquire() {
        let payload = Payload::ThrottleAcquire {
            name: "mycoolthrottle".into(),
            address: 138,
        };
        let wire = encode(ObjectType::Throttle, Some(&payload), None).unwrap();
        assert_eq!(
            wire,
            r#"{"type":"throttle","data":{"name":"mycoolthrottle","address":138}}"#
        );
    }

    #[test]
    fn test_encode_throttle_control() {
        let payload = Payload::ThrottleControl {
            throttle: "mycoolthrottle".into(),
            speed: 0.5,
            forward: true,
        };
        assert_eq!(
            roundtrip(ObjectType::Throttle, Some(&payload), Some(Verb::Post)),
            json!({
                "type": "throttle",
                "data": {"throttle": "mycoolthrottle", "speed": 0.5, "forward": 1},
                "method": "post"
            })
        );

        let reverse = Payload::ThrottleControl {
            throttle: "t".into(),
            speed: 0.0,
            forward: false,
        };
        let value = roundtrip(ObjectType::Throttle, Some(&reverse), Some(Verb::Post));
        assert_eq!(value["data"]["forward"], json!(0));
    }

    #[test]
    fn test_encode_omits_empty_fields() {
        let empty = Payload::Fields(Map::new());
        let value = roundtrip(ObjectType::Memory, Some(&empty), None);
        assert_eq!(value, json!({"type": "memory"}));
        assert!(value.get("data").is_none());
        assert!(value.get("method").is_none());
    }

    #[test]
    fn test_encode_method_without_data() {
        let value = roundtrip(ObjectType::Sensor, None, Some(Verb::Get));
        assert_eq!(value, json!({"type": "sensor", "method": "get"}));
    }

    #[test]
    fn test_encode_free_form_fields() {
        let mut fields = Map::new();
        fields.insert("name".into(), json!("IT1"));
        fields.insert("state".into(), json!(4));
        let payload = Payload::Fields(fields);
        let value = roundtrip(ObjectType::Turnout, Some(&payload), Some(Verb::Post));
        assert_eq!(
            value,
            json!({"type": "turnout", "data": {"name": "IT1", "state": 4}, "method": "post"})
        );
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode("").unwrap(), Reply::Empty);
        assert_eq!(decode("  \n").unwrap(), Reply::Empty);
        assert_eq!(decode_bytes(b"").unwrap(), Reply::Empty);
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(decode("{not json"), Err(JmriError::MalformedResponse(_))));
        assert!(matches!(
            decode_bytes(&[0xff, 0xfe]),
            Err(JmriError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_reply_accessors() {
        let raw = r#"{"type":"reporter","data":{"name":"MR001","report":"138"}}"#;
        let reply = decode(raw).unwrap();
        assert_eq!(reply.message_type(), Some("reporter"));
        assert_eq!(reply.data().unwrap()["report"], "138");
        assert!(!reply.is_empty());

        assert_eq!(Reply::Empty.message_type(), None);
        assert!(Reply::Empty.into_body().is_none());
    }
}
