//! The port through which the relay files issues.

use async_trait::async_trait;

use crate::{IssueDraft, MutationOutcome, TeamId, TrackerError};

/// Files an [`IssueDraft`] with a remote issue tracker.
///
/// Implementations make exactly one outbound call per invocation and never
/// retry; the caller decides what to do with the outcome.
///
/// ## Errors
///
/// - [`TrackerError::ConfigMissing`] before any network activity when
///   credentials are absent.
/// - [`TrackerError::Transport`] when no response could be obtained.
///
/// A response with a non-success status is reported as
/// [`MutationOutcome::Failure`], not as an error.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// The team issues are filed under, if one is configured.
    ///
    /// Callers draft issues with this value; the tracker files them under the
    /// same configured team regardless of what the draft carries.
    fn team_id(&self) -> Option<&TeamId>;

    async fn create_issue(&self, draft: &IssueDraft) -> Result<MutationOutcome, TrackerError>;
}
