//! Linear issue tracker adapter.
//!
//! Implements the [`relay::IssueTracker`] trait over Linear's GraphQL API.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, header construction and the request
//! timeout live here. Request bodies and response classification come from
//! [`relay::MutationRequest`] and [`relay::MutationOutcome`]; this crate only
//! moves bytes.
//!
//! ## Transport
//!
//! One `POST` per issue, with `Content-Type: application/json` and the raw API
//! token in `Authorization` (Linear personal API keys take no `Bearer`
//! prefix). There is no retry: a timeout or connection failure is reported as
//! [`relay::TrackerError::Transport`] and the caller decides what to do.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{error, info, instrument, warn};

use relay::{
    graphql_error_messages, ApiToken, IssueDraft, IssueTracker, MutationOutcome, MutationRequest,
    TeamId, TrackerError,
};

/// Linear's public GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.linear.app/graphql";

/// Upper bound on one round trip to the tracker.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Process-wide tracker settings, resolved once at startup.
///
/// Absent credentials are allowed here so the process can still start and
/// answer non-actionable webhooks; [`LinearClient`] refuses to submit until
/// both are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub api_token: Option<ApiToken>,
    pub team_id: Option<TeamId>,
    pub endpoint: String,
    pub timeout: Duration,
}

impl TrackerConfig {
    /// Creates a config pointing at [`DEFAULT_ENDPOINT`] with [`DEFAULT_TIMEOUT`].
    pub fn new(api_token: Option<ApiToken>, team_id: Option<TeamId>) -> Self {
        Self {
            api_token,
            team_id,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the GraphQL endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns `true` if both the API token and team id are set.
    pub fn is_complete(&self) -> bool {
        self.api_token.is_some() && self.team_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Files issues with Linear.
///
/// Cheap to share behind an `Arc`; the inner [`reqwest::Client`] pools
/// connections across calls.
#[derive(Debug, Clone)]
pub struct LinearClient {
    http: reqwest::Client,
    config: TrackerConfig,
}

impl LinearClient {
    /// Builds a client whose every request is bounded by `config.timeout`.
    ///
    /// # Errors
    ///
    /// Returns the [`reqwest::Error`] if the HTTP client cannot be initialised
    /// (e.g. the TLS backend fails to load).
    pub fn new(config: TrackerConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("figma-linear-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    async fn submit(&self, token: &ApiToken, body: Vec<u8>) -> Result<(u16, Vec<u8>), TrackerError> {
        let mut auth = HeaderValue::from_str(token.expose()).map_err(|_| TrackerError::Encode {
            message: "API token is not a valid header value".to_string(),
        })?;
        auth.set_sensitive(true);

        let response = self
            .http
            .post(&self.config.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, auth)
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        // The status alone decides the outcome. A body read that fails, even
        // one cut short by the request timeout, only loses the excerpt; it is
        // never reported as a transport error once the status has arrived.
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                warn!(
                    status,
                    timed_out = e.is_timeout(),
                    error = %e,
                    "Failed to read issue tracker response body"
                );
                Vec::new()
            }
        };
        Ok((status, bytes))
    }
}

fn transport_error(err: reqwest::Error) -> TrackerError {
    TrackerError::Transport {
        message: err.to_string(),
        timed_out: err.is_timeout(),
    }
}

#[async_trait]
impl IssueTracker for LinearClient {
    fn team_id(&self) -> Option<&TeamId> {
        self.config.team_id.as_ref()
    }

    #[instrument(skip_all, fields(endpoint = %self.config.endpoint, title = %draft.title))]
    async fn create_issue(&self, draft: &IssueDraft) -> Result<MutationOutcome, TrackerError> {
        let (Some(token), Some(team_id)) = (&self.config.api_token, &self.config.team_id) else {
            error!("Linear credentials are not configured; refusing to submit");
            return Err(TrackerError::ConfigMissing);
        };
        if draft.team_id != team_id.as_str() {
            warn!(
                draft_team = %draft.team_id,
                configured_team = %team_id,
                "Draft team differs from configuration; filing under the configured team"
            );
        }

        let body = MutationRequest::issue_create(draft, team_id).to_json_bytes()?;
        let (status, bytes) = self.submit(token, body).await.inspect_err(|e| {
            error!(error = %e, "Issue tracker request failed");
        })?;

        let outcome = MutationOutcome::classify(status, &bytes);
        match &outcome {
            MutationOutcome::Success { issue } => {
                for message in graphql_error_messages(&bytes) {
                    warn!(%message, "Issue tracker reported a GraphQL error");
                }
                match issue {
                    Some(issue) => info!(issue_id = %issue.id, issue_title = %issue.title, "Created Linear issue"),
                    None => info!("Created Linear issue (no issue details in response)"),
                }
            }
            MutationOutcome::Failure {
                status_code,
                body_excerpt,
            } => {
                error!(status_code, body = %body_excerpt, "Issue tracker rejected the mutation");
            }
        }
        Ok(outcome)
    }
}
