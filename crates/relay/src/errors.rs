//! Error types for the relay domain.
//!
//! [`DecodeError`] covers the inbound side (the webhook body could not be
//! understood). [`TrackerError`] covers the outbound side: conditions under
//! which an [`crate::IssueTracker`] could not produce a
//! [`crate::MutationOutcome`] at all.
//!
//! A remote rejection (non-200 status) is *not* an error here; it is the
//! [`crate::MutationOutcome::Failure`] value. None of these conditions are
//! retried: each is terminal for the webhook delivery that produced it.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Inbound errors
// ---------------------------------------------------------------------------

/// The inbound webhook body could not be decoded into an
/// [`crate::InboundEvent`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not a JSON object, or a known field has the wrong type.
    ///
    /// Surfaced to the webhook sender as `400 Bad Request`.
    #[error("malformed webhook payload: {reason}")]
    MalformedPayload {
        /// Parser diagnostic, for the logs only.
        reason: String,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPayload {
            reason: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound errors
// ---------------------------------------------------------------------------

/// Errors that prevent an issue tracker call from being classified.
///
/// All variants are surfaced to the webhook sender as
/// `500 Internal Server Error` with the `Display` text embedded.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The API token or team id was not configured.
    ///
    /// Detected before any network call is attempted. This is an operator
    /// problem; every actionable delivery fails until the process is
    /// restarted with the missing values.
    #[error("missing LINEAR_API_KEY or LINEAR_TEAM_ID in env")]
    ConfigMissing,

    /// The request could not be sent or no response arrived in time
    /// (connection refused, DNS failure, TLS failure, timeout).
    #[error("request to issue tracker failed: {message}")]
    Transport {
        /// Description of the underlying transport failure.
        message: String,
        /// `true` if the configured timeout elapsed.
        timed_out: bool,
    },

    /// The mutation body could not be serialised.
    #[error("failed to encode mutation request: {message}")]
    Encode {
        /// Serialiser diagnostic.
        message: String,
    },
}
