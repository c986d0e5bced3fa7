//! The `issueCreate` GraphQL mutation: request construction and response
//! classification.
//!
//! Both halves are pure. The transport that carries the bytes lives in the
//! `linear` crate; keeping construction and classification here means they can
//! be tested without a network and reused by any [`crate::IssueTracker`].
//!
//! ## Wire format
//!
//! ```json
//! {
//!   "query": "mutation IssueCreate($input: IssueCreateInput!) { ... }",
//!   "variables": { "input": { "title": "...", "description": "...", "teamId": "..." } }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{IssueDraft, TeamId, TrackerError};

/// The GraphQL document sent with every request.
pub const ISSUE_CREATE_MUTATION: &str = "\
mutation IssueCreate($input: IssueCreateInput!) {
  issueCreate(input: $input) {
    issue {
      id
      title
    }
  }
}";

/// Maximum number of body bytes kept in [`MutationOutcome::Failure`].
pub const MAX_BODY_EXCERPT_BYTES: usize = 2048;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// The `IssueCreateInput` argument. Always carries exactly these three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCreateInput {
    pub title: String,
    pub description: String,
    pub team_id: String,
}

/// The `variables` object of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationVariables {
    pub input: IssueCreateInput,
}

/// A complete GraphQL request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationRequest {
    pub query: &'static str,
    pub variables: MutationVariables,
}

impl MutationRequest {
    /// Builds the `issueCreate` request for `draft`, filed under `team_id`.
    ///
    /// The team always comes from the tracker's configuration; the draft's own
    /// `team_id` is not consulted, so a draft built without a team cannot
    /// produce an empty `teamId` on the wire.
    pub fn issue_create(draft: &IssueDraft, team_id: &TeamId) -> Self {
        Self {
            query: ISSUE_CREATE_MUTATION,
            variables: MutationVariables {
                input: IssueCreateInput {
                    title: draft.title.clone(),
                    description: draft.description.clone(),
                    team_id: team_id.as_str().to_string(),
                },
            },
        }
    }

    /// Serialises the request to the JSON bytes sent over the wire.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Encode`] if serialisation fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, TrackerError> {
        serde_json::to_vec(self).map_err(|e| TrackerError::Encode {
            message: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// The issue Linear reports as created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub title: String,
}

/// How the issue tracker answered a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The tracker answered `200 OK`.
    ///
    /// `issue` is filled in when the response body carries
    /// `data.issueCreate.issue`; a body that cannot be read that way is still
    /// a success.
    Success {
        issue: Option<CreatedIssue>,
    },

    /// The tracker answered with any other status.
    Failure {
        status_code: u16,
        /// The response body, truncated to [`MAX_BODY_EXCERPT_BYTES`].
        body_excerpt: String,
    },
}

impl MutationOutcome {
    /// Classifies a response from the status code and raw body.
    pub fn classify(status_code: u16, body: &[u8]) -> Self {
        if status_code == 200 {
            Self::Success {
                issue: parse_created_issue(body),
            }
        } else {
            Self::Failure {
                status_code,
                body_excerpt: body_excerpt(body),
            }
        }
    }

    /// Returns `true` for [`MutationOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl std::fmt::Display for MutationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { issue: Some(issue) } => {
                write!(f, "created issue {} ({})", issue.id, issue.title)
            }
            Self::Success { issue: None } => f.write_str("created issue"),
            Self::Failure {
                status_code,
                body_excerpt,
            } => write!(
                f,
                "failed to create issue, status: {status_code}, body: {body_excerpt}"
            ),
        }
    }
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<IssueCreateData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueCreateData {
    issue_create: Option<IssueCreatePayload>,
}

#[derive(Deserialize)]
struct IssueCreatePayload {
    issue: Option<CreatedIssue>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

fn parse_created_issue(body: &[u8]) -> Option<CreatedIssue> {
    let response: GraphQlResponse = serde_json::from_slice(body).ok()?;
    response.data?.issue_create?.issue
}

/// Returns the `errors[].message` entries of a GraphQL response body.
///
/// GraphQL servers may report errors alongside a `200` status. They do not
/// change the outcome, but are worth logging.
pub fn graphql_error_messages(body: &[u8]) -> Vec<String> {
    serde_json::from_slice::<GraphQlResponse>(body)
        .map(|r| r.errors.into_iter().map(|e| e.message).collect())
        .unwrap_or_default()
}

/// Decodes `body` lossily and truncates it to [`MAX_BODY_EXCERPT_BYTES`] on a
/// char boundary, appending `…` when anything was cut.
pub fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= MAX_BODY_EXCERPT_BYTES {
        return text.into_owned();
    }
    let mut end = MAX_BODY_EXCERPT_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
