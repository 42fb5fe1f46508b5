//! # Request Events
//!
//! The typed, append-only events that make up a request's history. The
//! event log is the source of truth: the request's current column and
//! closure marker are always the fold of these events.
//!
//! ## Normalization Boundary
//!
//! Persisted histories accumulated across several front-end generations,
//! so field spellings drifted (`timestamp` vs `ts`, `note` vs `comment`,
//! Portuguese column tokens). [`Event::from_record`] is the single point
//! where raw records are mapped onto the canonical shape. Records that
//! cannot name their type and timestamp are dropped with a warning, never
//! propagated; optional fields are defaulted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use adote_core::{ActorRole, EventId, Timestamp};

use crate::column::Column;

/// Outcome of a terminal decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// The adoption was approved and the term signed.
    Approved,
    /// The adoption was rejected.
    Rejected,
}

impl std::fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// The type-specific payload of an event.
///
/// A closed union: every record in a history is one of these five kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Marks the start of the history. No extra fields.
    Create,

    /// A column transition.
    Move {
        /// Column before the transition.
        from: Column,
        /// Column after the transition.
        to: Column,
        /// Optional free-text note.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    /// A reviewer sent the request back for corrections. Always
    /// accompanies a `Move` into [`Column::Adjustments`].
    RequestAdjustments {
        /// The review column that requested the corrections.
        from: Column,
        /// What must be corrected. Mandatory.
        note: String,
    },

    /// A gate precondition was bypassed with justification. Dated
    /// strictly before the `Move` it authorizes.
    Override {
        /// Column before the gated transition.
        from: Column,
        /// Column after the gated transition.
        to: Column,
        /// Justification for the bypass. Mandatory.
        note: String,
        /// Source column of the gate this override covers.
        gate_from: Column,
        /// Target column of the gate this override covers.
        gate_to: Column,
    },

    /// A terminal decision was recorded.
    Decision {
        /// Approved or rejected.
        outcome: DecisionOutcome,
        /// Optional rationale; mandatory when the outcome is rejected.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

/// A single immutable event in a request's history.
///
/// Events are ordered primarily by timestamp; ties are broken by
/// insertion order within the history vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// When the event occurred (UTC).
    pub at: Timestamp,
    /// The role that performed the action.
    pub actor: ActorRole,
    /// Type-specific payload.
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Construct an event occurring now-ish with a fresh identity.
    pub fn new(at: Timestamp, actor: ActorRole, kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            at,
            actor,
            kind,
        }
    }

    /// Normalize one raw persisted record into a canonical event.
    ///
    /// Tolerates the legacy field spellings listed in the module docs.
    /// Returns `None` for records that cannot supply a readable type and
    /// timestamp, or whose payload is structurally unusable (a move
    /// without columns cannot be folded or reported). The log module
    /// decides how a dropped record is reported.
    pub fn from_record(record: &Value) -> Option<Event> {
        let kind_token = first_str(record, &["type", "kind"])?;

        let at = read_timestamp(record)?;

        let actor = first_str(record, &["actor", "role"])
            .and_then(|s| ActorRole::new(s.trim().to_ascii_lowercase()).ok())
            .unwrap_or_else(ActorRole::unknown);

        let id = first_str(record, &["id", "event_id"])
            .and_then(|s| s.parse().ok())
            .map(EventId)
            .unwrap_or_default();

        let note = first_str(record, &["note", "comment", "observation"])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let kind = match kind_token.trim().to_ascii_lowercase().as_str() {
            "create" | "created" => EventKind::Create,
            "move" | "moved" => EventKind::Move {
                from: read_column(record, &["from", "source", "column_from"])?,
                to: read_column(record, &["to", "target", "column_to"])?,
                note,
            },
            "request_adjustments" | "adjustments_requested" => EventKind::RequestAdjustments {
                from: read_column(record, &["from", "source", "column_from"])?,
                note: note.unwrap_or_default(),
            },
            "override" | "gate_override" => EventKind::Override {
                from: read_column(record, &["from", "source", "column_from"])?,
                to: read_column(record, &["to", "target", "column_to"])?,
                note: note.unwrap_or_default(),
                gate_from: read_column(record, &["gate_from", "from", "source"])?,
                gate_to: read_column(record, &["gate_to", "to", "target"])?,
            },
            "decision" | "decided" => EventKind::Decision {
                outcome: read_outcome(record)?,
                note,
            },
            _ => return None,
        };

        Some(Event {
            id,
            at,
            actor,
            kind,
        })
    }

    /// The `(from, to)` pair when this event is a column transition.
    pub fn transition(&self) -> Option<(Column, Column)> {
        match &self.kind {
            EventKind::Move { from, to, .. } => Some((*from, *to)),
            _ => None,
        }
    }
}

/// First present-and-string value among the candidate keys.
fn first_str<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| record.get(k).and_then(Value::as_str))
}

/// Timestamp from any of the known spellings, string or epoch seconds.
fn read_timestamp(record: &Value) -> Option<Timestamp> {
    for key in ["at", "timestamp", "ts", "date"] {
        match record.get(key) {
            Some(Value::String(s)) => {
                if let Ok(ts) = Timestamp::parse_lenient(s) {
                    return Some(ts);
                }
            }
            Some(Value::Number(n)) => {
                if let Some(ts) = n.as_i64().and_then(|secs| Timestamp::from_epoch_secs(secs).ok())
                {
                    return Some(ts);
                }
            }
            _ => {}
        }
    }
    None
}

fn read_column(record: &Value, keys: &[&str]) -> Option<Column> {
    first_str(record, keys).and_then(Column::parse_token)
}

fn read_outcome(record: &Value) -> Option<DecisionOutcome> {
    let token = first_str(record, &["outcome", "decision", "result"])?;
    match token.trim().to_ascii_lowercase().as_str() {
        "approved" | "approve" | "aprovado" => Some(DecisionOutcome::Approved),
        "rejected" | "reject" | "rejeitado" | "reprovado" => Some(DecisionOutcome::Rejected),
        _ => None,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
