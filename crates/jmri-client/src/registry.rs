//! Transport policy for JMRI object types
//!
//! JMRI serves some object types only over the WebSocket session (throttles)
//! and exposes catalog types over both transports. The client standardizes
//! catalog listings and named lookups on HTTP so they never consume a session
//! round trip, and sends everything stateful through the session.

use std::fmt;

use serde::Serialize;

use crate::envelope::Payload;
use crate::error::{JmriError, Result};
use crate::types::ObjectType;

/// What the caller wants to do with an object type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// List every object of the type
    Listing,
    /// Fetch one object by name over HTTP, name as path segment
    NamedQuery,
    /// Fetch one object's state over the session, name inside `data`
    StateQuery,
    /// Acquire or mutate a stateful object
    StatefulControl,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Listing => "listing",
            Intent::NamedQuery => "named query",
            Intent::StateQuery => "state query",
            Intent::StatefulControl => "stateful control",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which channel carries a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Http,
    Session,
}

/// Static capabilities of one object type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectTypeDescriptor {
    pub object_type: ObjectType,
    pub supports_listing: bool,
    pub supports_named_query: bool,
    pub supports_state_query: bool,
    pub supports_stateful_control: bool,
}

impl ObjectTypeDescriptor {
    const fn catalog(object_type: ObjectType) -> Self {
        Self {
            object_type,
            supports_listing: true,
            supports_named_query: true,
            supports_state_query: true,
            supports_stateful_control: false,
        }
    }

    const fn stateful(object_type: ObjectType) -> Self {
        Self {
            object_type,
            supports_listing: false,
            supports_named_query: false,
            supports_state_query: false,
            supports_stateful_control: true,
        }
    }

    /// Whether this type is served for `intent`
    pub fn supports(&self, intent: Intent) -> bool {
        match intent {
            Intent::Listing => self.supports_listing,
            Intent::NamedQuery => self.supports_named_query,
            Intent::StateQuery => self.supports_state_query,
            Intent::StatefulControl => self.supports_stateful_control,
        }
    }
}

/// Look up the descriptor of an object type
pub fn descriptor(object_type: ObjectType) -> ObjectTypeDescriptor {
    match object_type {
        ObjectType::Reporter
        | ObjectType::Sensor
        | ObjectType::Turnout
        | ObjectType::Light
        | ObjectType::Memory => ObjectTypeDescriptor::catalog(object_type),
        ObjectType::Throttle => ObjectTypeDescriptor::stateful(object_type),
    }
}

/// Descriptors of every known object type
pub fn descriptors() -> impl Iterator<Item = ObjectTypeDescriptor> {
    ObjectType::ALL.into_iter().map(descriptor)
}

/// Pick the transport for an object type and intent
pub fn resolve(object_type: ObjectType, intent: Intent) -> Result<Transport> {
    if !descriptor(object_type).supports(intent) {
        return Err(JmriError::UnsupportedIntent {
            object_type,
            intent,
        });
    }

    Ok(match intent {
        Intent::Listing | Intent::NamedQuery => Transport::Http,
        Intent::StateQuery | Intent::StatefulControl => Transport::Session,
    })
}

/// Build the session payload for a catalog intent
///
/// HTTP intents carry the name in the URL, so they have no payload. Stateful
/// control payloads depend on the controller step and are built there.
pub fn payload_for(
    object_type: ObjectType,
    intent: Intent,
    name: Option<&str>,
) -> Result<Option<Payload>> {
    match resolve(object_type, intent)? {
        Transport::Http => Ok(None),
        Transport::Session => Ok(name.map(|name| Payload::NamedQuery {
            name: name.to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTENTS: [Intent; 4] = [
        Intent::Listing,
        Intent::NamedQuery,
        Intent::StateQuery,
        Intent::StatefulControl,
    ];

    #[test]
    fn test_every_type_has_descriptor() {
        let types: Vec<_> = descriptors().map(|d| d.object_type).collect();
        assert_eq!(types, ObjectType::ALL.to_vec());
        assert!(descriptors().all(|d| d.supports_listing != d.supports_stateful_control));
    }

    #[test]
    fn test_reporter_routes() {
        let route = |intent| resolve(ObjectType::Reporter, intent).unwrap();
        assert_eq!(route(Intent::Listing), Transport::Http);
        assert_eq!(route(Intent::NamedQuery), Transport::Http);
        assert_eq!(route(Intent::StateQuery), Transport::Session);
        assert!(matches!(
            resolve(ObjectType::Reporter, Intent::StatefulControl),
            Err(JmriError::UnsupportedIntent { .. })
        ));
    }

    #[test]
    fn test_throttle_is_session_only() {
        assert_eq!(
            resolve(ObjectType::Throttle, Intent::StatefulControl).unwrap(),
            Transport::Session
        );
        for intent in [Intent::Listing, Intent::NamedQuery, Intent::StateQuery] {
            assert!(resolve(ObjectType::Throttle, intent).is_err());
        }
    }

    #[test]
    fn test_resolve_is_pure() {
        let first: Vec<_> = ObjectType::ALL
            .iter()
            .flat_map(|t| INTENTS.into_iter().map(move |i| resolve(*t, i).ok()))
            .collect();

        // Reverse order, repeated: same answers
        for _ in 0..3 {
            let again: Vec<_> = ObjectType::ALL
                .iter()
                .rev()
                .flat_map(|t| INTENTS.into_iter().rev().map(move |i| resolve(*t, i).ok()))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_payload_for_catalog() {
        assert_eq!(
            payload_for(ObjectType::Reporter, Intent::Listing, None).unwrap(),
            None
        );
        assert_eq!(
            payload_for(ObjectType::Reporter, Intent::NamedQuery, Some("MR001")).unwrap(),
            None
        );
        assert_eq!(
            payload_for(ObjectType::Reporter, Intent::StateQuery, Some("MR001")).unwrap(),
            Some(Payload::NamedQuery {
                name: "MR001".into()
            })
        );
        assert!(payload_for(ObjectType::Throttle, Intent::StateQuery, Some("t")).is_err());
    }
}
