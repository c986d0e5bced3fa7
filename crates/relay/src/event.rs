//! Inbound Figma webhook payloads.
//!
//! [`InboundEvent::decode`] is the only way into this type: it takes the raw
//! request body and either yields a decoded event or a [`DecodeError`].
//! Whether the event warrants an issue is a separate question answered by
//! [`InboundEvent::is_actionable`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::DecodeError;

/// The only event type that results in an issue being filed.
pub const LIBRARY_PUBLISH: &str = "LIBRARY_PUBLISH";

/// One webhook subscription listed in the payload's `webhooks` array.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookSubscription {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub team_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub endpoint: String,
}

/// A decoded Figma webhook delivery.
///
/// Missing or `null` string fields decode as empty and a missing or `null`
/// `webhooks` array as an empty list. A field that is present with the wrong
/// JSON type is a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InboundEvent {
    #[serde(deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub file_key: String,
    /// Delivery time as sent by Figma. Kept verbatim; never reparsed.
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(deserialize_with = "null_as_default")]
    pub triggered_by: String,
    #[serde(rename = "webhooks", deserialize_with = "null_as_default")]
    pub subscriptions: Vec<WebhookSubscription>,
}

/// Treats an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl InboundEvent {
    /// Decodes a raw request body.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedPayload`] if `body` is not a JSON object
    /// or one of its known fields has the wrong shape.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        let document: serde_json::Value = serde_json::from_slice(body)?;
        if !document.is_object() {
            return Err(DecodeError::MalformedPayload {
                reason: "payload is not a JSON object".to_string(),
            });
        }
        Ok(serde_json::from_value(document)?)
    }

    /// Returns `true` if this event should be turned into an issue.
    pub fn is_actionable(&self) -> bool {
        self.event_type == LIBRARY_PUBLISH
    }
}
