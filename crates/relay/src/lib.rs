//! Core domain for the Figma → Linear relay.
//!
//! The relay receives Figma `LIBRARY_PUBLISH` webhooks and files a Linear issue
//! for each one. This crate holds every piece of that flow that does not touch
//! the network: decoding the webhook, deciding whether it is actionable,
//! drafting the issue, building the GraphQL mutation and classifying the
//! tracker's answer.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! The [`IssueTracker`] trait says *what* the relay needs from a tracker; the
//! `linear` crate says *how*.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | `TeamId`, `ApiToken`, `DeliveryId` |
//! | [`event`] | `InboundEvent` decoding and the actionable filter |
//! | [`draft`] | `IssueDraft` construction |
//! | [`mutation`] | `MutationRequest` construction and `MutationOutcome` classification |
//! | [`tracker`] | The `IssueTracker` port |
//! | [`errors`] | `DecodeError` and `TrackerError` |

pub mod draft;
pub mod errors;
pub mod event;
pub mod identifiers;
pub mod mutation;
pub mod tracker;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use draft::IssueDraft;
pub use errors::{DecodeError, TrackerError};
pub use event::{InboundEvent, WebhookSubscription, LIBRARY_PUBLISH};
pub use identifiers::{ApiToken, DeliveryId, TeamId};
pub use mutation::{
    body_excerpt, graphql_error_messages, CreatedIssue, IssueCreateInput, MutationOutcome,
    MutationRequest, MutationVariables, ISSUE_CREATE_MUTATION, MAX_BODY_EXCERPT_BYTES,
};
pub use tracker::IssueTracker;
