//! Turning an actionable webhook into the issue that will be filed.

use serde::{Deserialize, Serialize};

use crate::InboundEvent;

/// The title, description and team of an issue about to be created.
///
/// Derived deterministically from an [`InboundEvent`]; carries no identity of
/// its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub team_id: String,
}

impl IssueDraft {
    /// Builds the draft for a published library.
    ///
    /// `team_id` comes from configuration, never from the event. Callers only
    /// invoke this for events where [`InboundEvent::is_actionable`] holds.
    pub fn for_library_publish(event: &InboundEvent, team_id: &str) -> Self {
        debug_assert!(event.is_actionable());
        Self {
            title: format!("Figma Library Published: {}", event.file_key),
            description: format!(
                "The Figma file with key {} has published a new library at {}.",
                event.file_key, event.timestamp
            ),
            team_id: team_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_embeds_file_key_and_timestamp() {
        let event = InboundEvent {
            event_type: "LIBRARY_PUBLISH".into(),
            file_key: "ABC123".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            triggered_by: "user-7".into(),
            subscriptions: Vec::new(),
        };

        let draft = IssueDraft::for_library_publish(&event, "team-1");

        assert_eq!(draft.title, "Figma Library Published: ABC123");
        assert_eq!(
            draft.description,
            "The Figma file with key ABC123 has published a new library at 2024-01-01T00:00:00Z."
        );
        assert_eq!(draft.team_id, "team-1");
    }
}
