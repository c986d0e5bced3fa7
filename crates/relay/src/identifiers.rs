//! Newtype identifiers and credentials.
//!
//! Configuration values that must be present before the relay can talk to
//! Linear are wrapped so that "set but empty" and "unset" collapse into the
//! same `None`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies the Linear team new issues are filed under.
///
/// Resolved once from configuration; never taken from the inbound webhook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(String);

impl TeamId {
    /// Creates a team id, returning `None` if the value is empty or only whitespace.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Linear API token.
///
/// Sent verbatim in the `Authorization` header, without a `Bearer` prefix.
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Creates a token, returning `None` if the value is empty or only whitespace.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the raw token value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Identifies one inbound webhook delivery.
///
/// Generated fresh for every request the listener accepts and recorded on the
/// handler span, so all log lines of one delivery can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(Uuid);

impl DeliveryId {
    /// Generates a new random delivery identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifiers_are_rejected() {
        assert!(TeamId::new("").is_none());
        assert!(TeamId::new("   ").is_none());
        assert_eq!(TeamId::new("team-1").unwrap().as_str(), "team-1");
    }

    #[test]
    fn team_id_is_trimmed() {
        assert_eq!(TeamId::new(" team-1\n").unwrap().as_str(), "team-1");
        assert_eq!(TeamId::new(" team-1 "), TeamId::new("team-1"));
    }

    #[test]
    fn api_token_is_trimmed_and_redacted() {
        let token = ApiToken::new("  lin_api_secret\n").unwrap();
        assert_eq!(token.expose(), "lin_api_secret");
        assert!(!format!("{token:?}").contains("secret"));
        assert!(ApiToken::new("").is_none());
    }

    #[test]
    fn delivery_ids_are_unique() {
        assert_ne!(DeliveryId::new_random(), DeliveryId::new_random());
    }
}
