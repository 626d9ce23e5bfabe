//! Minimal routing envelope carried by inbound and routed messages.
//!
//! Wire shape is a JSON object with camelCase routing keys:
//!
//! ```text
//! { "fromUserId": "alice", "toUserId": "bob", ...payload fields }
//! ```
//!
//! Only `toUserId` is read from the client. Whatever the client put in
//! `fromUserId` is discarded; the router stamps the sender's own identity.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::EnvelopeError;
use crate::types::is_blank;

const FROM_USER_ID: &str = "fromUserId";
const TO_USER_ID: &str = "toUserId";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(rename = "fromUserId", skip_serializing_if = "Option::is_none")]
    pub from_user_id: Option<String>,

    #[serde(rename = "toUserId", skip_serializing_if = "Option::is_none")]
    pub to_user_id: Option<String>,

    /// Every other field of the object, forwarded untouched.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    /// Parse inbound text. Anything that is not a JSON object fails.
    ///
    /// A numeric `toUserId` is accepted in its decimal form; any other
    /// non-string value counts as no destination.
    pub fn parse(raw: &str) -> Result<Self, EnvelopeError> {
        let Value::Object(mut payload) = serde_json::from_str::<Value>(raw)? else {
            return Err(EnvelopeError::NotAnObject);
        };

        payload.remove(FROM_USER_ID);
        let to_user_id = match payload.remove(TO_USER_ID) {
            Some(Value::String(to)) => Some(to),
            Some(Value::Number(to)) => Some(to.to_string()),
            _ => None,
        };

        Ok(Self {
            from_user_id: None,
            to_user_id,
            payload,
        })
    }

    /// Overwrite `fromUserId` with the identity of the sending connection.
    pub fn stamp_sender(&mut self, user_id: &str) {
        self.from_user_id = Some(user_id.to_string());
    }

    /// The destination user, if one was supplied and is not blank.
    pub fn destination(&self) -> Option<&str> {
        self.to_user_id.as_deref().filter(|to| !is_blank(to))
    }

    /// Encode back to wire text.
    pub fn to_text(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_keeps_payload_fields() {
        let env = Envelope::parse(r#"{"toUserId":"u1","payload":"hi","n":3}"#).unwrap();
        assert_eq!(env.to_user_id.as_deref(), Some("u1"));
        assert_eq!(env.from_user_id, None);
        assert_eq!(env.payload["payload"], "hi");
        assert_eq!(env.payload["n"], 3);
        assert!(!env.payload.contains_key("toUserId"));
    }

    #[test]
    fn stamp_sender_overwrites_claimed_identity() {
        let mut env =
            Envelope::parse(r#"{"fromUserId":"attacker","toUserId":"bob","body":"x"}"#).unwrap();
        env.stamp_sender("alice");

        let value: Value = serde_json::from_str(&env.to_text().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"fromUserId": "alice", "toUserId": "bob", "body": "x"})
        );
    }

    #[test]
    fn non_string_sender_claim_is_discarded() {
        for claim in [r#"7"#, r#"{"id":"attacker"}"#, r#"["a"]"#, r#"true"#, r#"null"#] {
            let raw = format!(r#"{{"fromUserId":{claim},"toUserId":"bob","body":"x"}}"#);
            let mut env = Envelope::parse(&raw).unwrap();
            assert!(!env.payload.contains_key("fromUserId"));

            env.stamp_sender("alice");
            let value: Value = serde_json::from_str(&env.to_text().unwrap()).unwrap();
            assert_eq!(value["fromUserId"], "alice");
        }
    }

    #[test]
    fn numeric_destination_is_coerced() {
        let env = Envelope::parse(r#"{"toUserId":42}"#).unwrap();
        assert_eq!(env.destination(), Some("42"));
    }

    #[test]
    fn blank_or_unusable_destination_is_none() {
        let env = Envelope::parse(r#"{"toUserId":"   "}"#).unwrap();
        assert_eq!(env.destination(), None);

        let env = Envelope::parse(r#"{"payload":"no destination"}"#).unwrap();
        assert_eq!(env.destination(), None);

        let env = Envelope::parse(r#"{"toUserId":{"id":"bob"}}"#).unwrap();
        assert_eq!(env.destination(), None);
    }

    #[test]
    fn non_object_is_rejected() {
        assert_matches!(Envelope::parse("heartbeat"), Err(EnvelopeError::Malformed(_)));
        assert_matches!(Envelope::parse("[1,2,3]"), Err(EnvelopeError::NotAnObject));
        assert_matches!(Envelope::parse(r#""text""#), Err(EnvelopeError::NotAnObject));
    }
}
