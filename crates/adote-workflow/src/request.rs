//! # Adoption Request Aggregate
//!
//! The request tracks one citizen proposal to adopt one public area. Its
//! event history is the source of truth; the `column` and `closure`
//! fields are a maintained projection of that history and must never
//! diverge from it. Requests are mutated exclusively through the workflow
//! engine and are never deleted, only closed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use adote_core::{ActorRole, AreaId, ProtocolCode, RequestId, Timestamp};

use crate::column::Column;
use crate::event::{DecisionOutcome, Event};
use crate::log::{self, Projection};

/// Metadata for an attachment supplied with the proposal.
///
/// The file contents live outside this system; only the descriptive
/// record is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    /// Original file name as submitted.
    pub file_name: String,
    /// MIME type reported at upload.
    pub media_type: String,
    /// Size in bytes reported at upload.
    pub size_bytes: u64,
    /// When the attachment was registered.
    pub uploaded_at: Timestamp,
}

/// Closure marker set on terminal transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closure {
    /// Approved or rejected.
    pub outcome: DecisionOutcome,
    /// When the request was closed.
    pub at: Timestamp,
}

/// An adoption request with its projected state and full event history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionRequest {
    /// Unique request identifier.
    pub id: RequestId,
    /// Immutable external protocol code assigned at creation.
    pub protocol: ProtocolCode,
    /// The public area this request proposes to adopt.
    pub area_id: AreaId,
    /// Display name of the area at submission time.
    pub area_name: String,
    /// Free-text description of the adoption plan.
    pub plan: String,
    /// Attachment metadata records.
    pub attachments: Vec<AttachmentMeta>,
    /// The submitting actor; the only role allowed to resubmit.
    pub owner: ActorRole,
    /// When the request was created.
    pub created_at: Timestamp,
    /// When the request was last mutated.
    pub updated_at: Timestamp,
    /// Current column. Always equals the fold of `events`.
    pub column: Column,
    /// Closure marker. Present exactly when `column` is terminal.
    pub closure: Option<Closure>,
    /// Ordered event history. Append-only.
    pub events: Vec<Event>,
}

impl AdoptionRequest {
    /// Whether the request has reached a terminal column.
    pub fn is_closed(&self) -> bool {
        self.closure.is_some()
    }

    /// The ordered event history.
    pub fn history(&self) -> &[Event] {
        &self.events
    }

    /// Recompute the projection from the event history.
    ///
    /// For any request maintained by the engine, this equals the stored
    /// `column`/`closure`; it is the check backing that invariant.
    pub fn replay(&self) -> Projection {
        log::project(&self.events)
    }

    /// Rebuild a request from persisted metadata plus raw history records.
    ///
    /// Runs the records through the normalization boundary, backfills the
    /// synthetic `create` head when missing, and derives `column` and
    /// `closure` from the fold, so a partially-shaped legacy history still
    /// yields a consistent aggregate.
    #[allow(clippy::too_many_arguments)]
    pub fn rebuild(
        id: RequestId,
        protocol: ProtocolCode,
        area_id: AreaId,
        area_name: String,
        plan: String,
        attachments: Vec<AttachmentMeta>,
        owner: ActorRole,
        created_at: Timestamp,
        records: &[Value],
    ) -> Self {
        let mut events = log::from_records(records);
        log::ensure_created(&mut events, created_at, &owner);
        let projection = log::project(&events);
        let updated_at = projection.last_event_at.unwrap_or(created_at);

        Self {
            id,
            protocol,
            area_id,
            area_name,
            plan,
            attachments,
            owner,
            created_at,
            updated_at,
            column: projection.column,
            closure: projection.closure.map(|c| Closure {
                outcome: c.outcome,
                at: c.at,
            }),
            events,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
