//! Relay webhook receiver.
//!
//! Serves a single endpoint, `POST /create-issue`, which Figma's webhook
//! subscription is pointed at. Each delivery is handled independently:
//!
//! 1. decode the body into a [`relay::InboundEvent`];
//! 2. acknowledge and stop if it is not a `LIBRARY_PUBLISH`;
//! 3. draft the issue and hand it to the configured [`relay::IssueTracker`];
//! 4. map the result to an HTTP status.
//!
//! | Situation | Status | Body |
//! |-----------|--------|------|
//! | Issue created | 201 | `Linear issue created successfully` |
//! | Event not actionable | 200 | `Event type not handled` |
//! | Body is not a valid payload | 400 | `Invalid JSON` |
//! | Method other than `POST` | 405 | `Method not allowed` |
//! | Tracker error or rejection | 500 | `Failed to create Linear issue: <detail>` |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP framing and status mapping live here. The only
//! shared state is the read-only tracker handle; the team new issues are filed
//! under is whatever that tracker was configured with.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

use relay::{DeliveryId, InboundEvent, IssueDraft, IssueTracker, MutationOutcome, TeamId};

/// Path Figma delivers webhooks to.
pub const CREATE_ISSUE_PATH: &str = "/create-issue";

// ── Config ──

/// Where the listener binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    pub host: String,
    pub port: u16,
}

impl ListenerConfig {
    /// Returns the `host:port` string passed to the TCP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Errors that stop the listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("webhook server failed: {0}")]
    Serve(#[source] std::io::Error),
}

// ── App State ──

struct AppState {
    tracker: Arc<dyn IssueTracker>,
}

// ── Replies ──

/// Every way a delivery can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Reply {
    Created,
    NotHandled,
    InvalidJson,
    MethodNotAllowed,
    TrackerFailed(String),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Created => (StatusCode::CREATED, "Linear issue created successfully").into_response(),
            Reply::NotHandled => (StatusCode::OK, "Event type not handled").into_response(),
            Reply::InvalidJson => (StatusCode::BAD_REQUEST, "Invalid JSON").into_response(),
            Reply::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response()
            }
            Reply::TrackerFailed(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create Linear issue: {detail}"),
            )
                .into_response(),
        }
    }
}

// ── Entrypoint ──

/// Builds the router (for testing without binding to a port).
///
/// Drafts take their team from [`IssueTracker::team_id`]; when the tracker has
/// none configured it is expected to refuse them.
pub fn router(tracker: Arc<dyn IssueTracker>) -> Router {
    let state = Arc::new(AppState { tracker });
    Router::new()
        .route(
            CREATE_ISSUE_PATH,
            post(create_issue).fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `config` and serves `app` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ListenerError::Bind`] if the address cannot be bound and
/// [`ListenerError::Serve`] if the accept loop fails.
pub async fn serve<F>(config: &ListenerConfig, app: Router, shutdown: F) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ListenerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, path = CREATE_ISSUE_PATH, "Webhook listener started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ListenerError::Serve)?;

    info!("Webhook listener stopped");
    Ok(())
}

// ── POST /create-issue ──

#[instrument(skip_all, fields(delivery_id = %DeliveryId::new_random()))]
async fn create_issue(State(state): State<Arc<AppState>>, body: Bytes) -> Reply {
    let event = match InboundEvent::decode(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Rejected webhook");
            return Reply::InvalidJson;
        }
    };

    info!(
        event_type = %event.event_type,
        file_key = %event.file_key,
        timestamp = %event.timestamp,
        triggered_by = %event.triggered_by,
        webhooks = event.subscriptions.len(),
        "Received Figma webhook"
    );

    if !event.is_actionable() {
        info!(event_type = %event.event_type, "Event type not handled");
        return Reply::NotHandled;
    }

    let team_id = state.tracker.team_id().map(TeamId::as_str).unwrap_or_default();
    let draft = IssueDraft::for_library_publish(&event, team_id);

    match state.tracker.create_issue(&draft).await {
        Ok(MutationOutcome::Success { .. }) => Reply::Created,
        Ok(failure @ MutationOutcome::Failure { .. }) => Reply::TrackerFailed(failure.to_string()),
        Err(e) => {
            error!(error = %e, "Could not create Linear issue");
            Reply::TrackerFailed(e.to_string())
        }
    }
}

async fn method_not_allowed() -> Reply {
    Reply::MethodNotAllowed
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use relay::{CreatedIssue, TrackerError};
    use tower::ServiceExt;

    /// Records every draft it is handed and answers with a canned result.
    struct RecordingTracker {
        team_id: Option<TeamId>,
        drafts: Mutex<Vec<IssueDraft>>,
        answer: fn() -> Result<MutationOutcome, TrackerError>,
    }

    impl RecordingTracker {
        fn new(answer: fn() -> Result<MutationOutcome, TrackerError>) -> Arc<Self> {
            Self::with_team(TeamId::new("team-1"), answer)
        }

        fn with_team(
            team_id: Option<TeamId>,
            answer: fn() -> Result<MutationOutcome, TrackerError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                team_id,
                drafts: Mutex::new(Vec::new()),
                answer,
            })
        }

        fn calls(&self) -> usize {
            self.drafts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl IssueTracker for RecordingTracker {
        fn team_id(&self) -> Option<&TeamId> {
            self.team_id.as_ref()
        }

        async fn create_issue(&self, draft: &IssueDraft) -> Result<MutationOutcome, TrackerError> {
            self.drafts.lock().unwrap().push(draft.clone());
            (self.answer)()
        }
    }

    fn created() -> Result<MutationOutcome, TrackerError> {
        Ok(MutationOutcome::Success {
            issue: Some(CreatedIssue {
                id: "iss-1".into(),
                title: "Figma Library Published: ABC123".into(),
            }),
        })
    }

    const PUBLISH_BODY: &str = r#"{
        "event_type": "LIBRARY_PUBLISH",
        "file_key": "ABC123",
        "timestamp": "2024-01-01T00:00:00Z",
        "triggered_by": "user-7",
        "webhooks": [{"id": "wh-1", "team_id": "figma-team", "endpoint": "https://relay.example/create-issue"}]
    }"#;

    fn app(tracker: Arc<RecordingTracker>) -> Router {
        router(tracker)
    }

    async fn send(app: Router, method: &str, body: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(CREATE_ISSUE_PATH)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn library_publish_creates_issue() {
        let tracker = RecordingTracker::new(created);

        let (status, body) = send(app(tracker.clone()), "POST", PUBLISH_BODY).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, "Linear issue created successfully");
        let drafts = tracker.drafts.lock().unwrap();
        assert_eq!(
            *drafts,
            vec![IssueDraft {
                title: "Figma Library Published: ABC123".into(),
                description: "The Figma file with key ABC123 has published a new library at 2024-01-01T00:00:00Z.".into(),
                team_id: "team-1".into(),
            }]
        );
    }

    #[tokio::test]
    async fn null_webhooks_still_create_issue() {
        let tracker = RecordingTracker::new(created);
        let body = r#"{"event_type": "LIBRARY_PUBLISH", "file_key": "ABC123", "timestamp": "2024-01-01T00:00:00Z", "webhooks": null}"#;

        let (status, _) = send(app(tracker.clone()), "POST", body).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(tracker.calls(), 1);
    }

    #[tokio::test]
    async fn other_event_types_are_acknowledged_without_tracker_call() {
        let bodies = [
            r#"{"event_type": "FILE_UPDATE", "file_key": "ABC123"}"#,
            r#"{"event_type": "", "file_key": "ABC123"}"#,
            r#"{"file_key": "ABC123"}"#,
            r#"{"event_type": null, "file_key": "ABC123"}"#,
            "{}",
        ];
        for body in bodies {
            let tracker = RecordingTracker::new(created);

            let (status, text) = send(app(tracker.clone()), "POST", body).await;

            assert_eq!(status, StatusCode::OK, "{body}");
            assert_eq!(text, "Event type not handled");
            assert_eq!(tracker.calls(), 0);
        }
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests_without_tracker_call() {
        for body in ["", "not json", "{\"event_type\":", "[1,2]", r#"{"event_type": 7}"#] {
            let tracker = RecordingTracker::new(created);

            let (status, text) = send(app(tracker.clone()), "POST", body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(text, "Invalid JSON");
            assert_eq!(tracker.calls(), 0);
        }
    }

    #[tokio::test]
    async fn non_post_methods_are_rejected_regardless_of_body() {
        for method in ["GET", "PUT", "DELETE", "PATCH"] {
            let tracker = RecordingTracker::new(created);

            let (status, text) = send(app(tracker.clone()), method, PUBLISH_BODY).await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(text, "Method not allowed");
            assert_eq!(tracker.calls(), 0);
        }
    }

    #[tokio::test]
    async fn missing_config_is_a_server_error() {
        let tracker = RecordingTracker::with_team(None, || Err(TrackerError::ConfigMissing));

        let (status, text) = send(app(tracker.clone()), "POST", PUBLISH_BODY).await;

        assert_eq!(tracker.drafts.lock().unwrap()[0].team_id, "");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            text,
            "Failed to create Linear issue: missing LINEAR_API_KEY or LINEAR_TEAM_ID in env"
        );
    }

    #[tokio::test]
    async fn transport_error_is_a_server_error() {
        let tracker = RecordingTracker::new(|| {
            Err(TrackerError::Transport {
                message: "operation timed out".into(),
                timed_out: true,
            })
        });

        let (status, text) = send(app(tracker), "POST", PUBLISH_BODY).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            text,
            "Failed to create Linear issue: request to issue tracker failed: operation timed out"
        );
    }

    #[tokio::test]
    async fn tracker_rejection_embeds_status_and_body() {
        let tracker = RecordingTracker::new(|| {
            Ok(MutationOutcome::Failure {
                status_code: 401,
                body_excerpt: "Authentication required".into(),
            })
        });

        let (status, text) = send(app(tracker), "POST", PUBLISH_BODY).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            text,
            "Failed to create Linear issue: failed to create issue, status: 401, body: Authentication required"
        );
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = ListenerConfig {
            host: "0.0.0.0".into(),
            port: 80,
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:80");
    }
}
