//! # Event Log Operations
//!
//! Append-only history handling and the projection fold. The log exposes
//! exactly three capabilities: append, ordered read through the
//! normalization boundary, and the fold that derives current state. There
//! is no update and no delete.
//!
//! ## Fold Invariants
//!
//! - Replaying a full history deterministically reproduces the request's
//!   current column and closure marker.
//! - Events are processed in vector order; the engine writes strictly
//!   increasing timestamps, and for legacy histories with equal adjacent
//!   timestamps insertion order is authoritative.
//! - A history with no `create` head is backfilled with a synthetic one
//!   before use, so every request carries evidence for reporting.

use serde_json::Value;
use tracing::warn;

use adote_core::{ActorRole, Timestamp};

use crate::column::Column;
use crate::event::{DecisionOutcome, Event, EventKind};
use crate::error::WorkflowError;

/// The current-state view derived by folding a history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Column after the last state-changing event.
    pub column: Column,
    /// Closure marker, present exactly when the column is terminal.
    pub closure: Option<ProjectedClosure>,
    /// Timestamp of the last event of any kind, if the history is non-empty.
    pub last_event_at: Option<Timestamp>,
}

/// Closure information carried by a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectedClosure {
    /// Approved or rejected.
    pub outcome: DecisionOutcome,
    /// When the request was closed.
    pub at: Timestamp,
}

/// Append one event to a history.
///
/// The only malformed shape an append can detect is an event dated before
/// the history tail; equal timestamps are accepted (insertion order breaks
/// the tie).
///
/// # Errors
///
/// Returns `WorkflowError::Validation` when the event would break
/// timestamp ordering.
pub fn append(history: &mut Vec<Event>, event: Event) -> Result<(), WorkflowError> {
    if let Some(last) = history.last() {
        if event.at < last.at {
            return Err(WorkflowError::Validation(format!(
                "event at {} predates history tail at {}",
                event.at, last.at
            )));
        }
    }
    history.push(event);
    Ok(())
}

/// Read raw persisted records into an ordered, normalized history.
///
/// Unparseable records are dropped with a warning; the read itself never
/// fails. Surviving events are sorted by timestamp, stably, so that the
/// insertion order of equal-timestamp records is preserved.
pub fn from_records(records: &[Value]) -> Vec<Event> {
    let mut events: Vec<Event> = Vec::with_capacity(records.len());
    for record in records {
        match Event::from_record(record) {
            Some(event) => events.push(event),
            None => {
                warn!(record = %record, "dropping unreadable history record");
            }
        }
    }
    events.sort_by_key(|e| e.at);
    events
}

/// Backfill the synthetic `create` head for histories persisted without
/// one, dated at the request's creation and attributed to its owner.
pub fn ensure_created(history: &mut Vec<Event>, created_at: Timestamp, owner: &ActorRole) {
    let has_create = matches!(history.first().map(|e| &e.kind), Some(EventKind::Create));
    if !has_create {
        history.insert(0, Event::new(created_at, owner.clone(), EventKind::Create));
    }
}

/// Fold a history into its current projection.
///
/// - `create` starts the request in [`Column::Protocol`].
/// - `move` lands on its target column; moves into a terminal column also
///   set the closure marker, so legacy histories that lack an explicit
///   decision event still satisfy the closure invariant.
/// - `request_adjustments` confirms [`Column::Adjustments`] (it always
///   accompanies a move there).
/// - `override` never changes the column; it precedes the move it covers.
/// - `decision` sets the closure marker.
pub fn project(history: &[Event]) -> Projection {
    let mut column = Column::Protocol;
    let mut closure: Option<ProjectedClosure> = None;

    for event in history {
        match &event.kind {
            EventKind::Create => column = Column::Protocol,
            EventKind::Move { to, .. } => {
                column = *to;
                match to {
                    Column::TermSigned => {
                        closure = Some(ProjectedClosure {
                            outcome: DecisionOutcome::Approved,
                            at: event.at,
                        });
                    }
                    Column::Rejected => {
                        closure = Some(ProjectedClosure {
                            outcome: DecisionOutcome::Rejected,
                            at: event.at,
                        });
                    }
                    _ => {}
                }
            }
            EventKind::RequestAdjustments { .. } => column = Column::Adjustments,
            EventKind::Override { .. } => {}
            EventKind::Decision { outcome, .. } => {
                closure = Some(ProjectedClosure {
                    outcome: *outcome,
                    at: event.at,
                });
            }
        }
    }

    Projection {
        column,
        closure,
        last_event_at: history.last().map(|e| e.at),
    }
}

/// Whether a history already carries an override covering the given gated
/// transition pair. Used to avoid re-prompting for a transition that was
/// already justified once.
pub fn has_override_for(history: &[Event], pair: (Column, Column)) -> bool {
    history.iter().any(|e| match &e.kind {
        EventKind::Override {
            gate_from, gate_to, ..
        } => (*gate_from, *gate_to) == pair,
        _ => false,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────
