//! # Workflow Engine
//!
//! Validates and applies commands against a request's projected state,
//! appends the resulting events, and drives the area registry as a side
//! effect of creation and terminal transitions.
//!
//! ## Command Atomicity
//!
//! Every command either appends its full set of events and performs its
//! adapter side effects, or changes nothing. The ordering inside a
//! command is: validate on the current projection, consult adapters,
//! build the event batch, perform side effects, then append. The mutation
//! closure runs under the store's per-request writer lock, so commands
//! against one request are linearizable.
//!
//! ## Timestamp Discipline
//!
//! All events of one command carry strictly increasing timestamps within
//! the request's history. The log has seconds precision, so the minimal
//! spacing is one second: a synthesized override is dated first and the
//! move it authorizes is bumped past it, and companion events
//! (adjustments request, decision) are bumped past the move.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use adote_core::{ActorRole, AreaId, ProtocolCode, RequestId, Timestamp};

use crate::area::{AreaRegistry, AreaStatus};
use crate::column::Column;
use crate::error::WorkflowError;
use crate::event::{DecisionOutcome, Event, EventKind};
use crate::gate::{InspectionGate, OverrideContext, OverrideDecider};
use crate::log;
use crate::policy::TransitionPolicy;
use crate::request::{AdoptionRequest, AttachmentMeta, Closure};
use crate::store::RequestStore;

/// Note recorded on the system-authored resubmission move.
pub const RESUBMIT_NOTE: &str = "resubmitted after adjustments";

/// Engine configuration: which transitions are gated on the inspection
/// artifact. Deserializable so deployments can ship it as configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// `(from, to)` pairs that require an issued inspection report or an
    /// explicit override.
    pub gated: Vec<(Column, Column)>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gated: vec![(Column::SemadReview, Column::EcosReview)],
        }
    }
}

/// Input for [`WorkflowEngine::create`].
#[derive(Debug, Clone)]
pub struct NewRequest {
    /// The area to adopt.
    pub area_id: AreaId,
    /// Display name of the area at submission time.
    pub area_name: String,
    /// Free-text adoption plan.
    pub plan: String,
    /// Attachment metadata supplied with the proposal.
    pub attachments: Vec<AttachmentMeta>,
    /// The submitting actor; becomes the request owner.
    pub owner: ActorRole,
}

/// Input for [`WorkflowEngine::move_request`].
#[derive(Debug, Clone)]
pub struct MoveRequest {
    /// The request to move.
    pub request_id: RequestId,
    /// Target column.
    pub to: Column,
    /// The acting role.
    pub actor: ActorRole,
    /// Free-text note. Mandatory for moves into adjustments or rejection.
    pub note: Option<String>,
}

/// Fields a resubmission may refresh.
#[derive(Debug, Clone, Default)]
pub struct ResubmitUpdate {
    /// Replacement adoption plan, if revised.
    pub plan: Option<String>,
    /// Replacement attachment set, if revised.
    pub attachments: Option<Vec<AttachmentMeta>>,
}

/// The workflow engine. Cheap to share behind an `Arc`; all commands take
/// `&self` and serialize per request through the store.
pub struct WorkflowEngine {
    store: Arc<dyn RequestStore>,
    areas: Arc<dyn AreaRegistry>,
    gate: Arc<dyn InspectionGate>,
    overrides: Arc<dyn OverrideDecider>,
    policy: Arc<dyn TransitionPolicy>,
    config: EngineConfig,
    protocol_seq: AtomicU32,
}

impl WorkflowEngine {
    pub fn new(
        store: Arc<dyn RequestStore>,
        areas: Arc<dyn AreaRegistry>,
        gate: Arc<dyn InspectionGate>,
        overrides: Arc<dyn OverrideDecider>,
        policy: Arc<dyn TransitionPolicy>,
    ) -> Self {
        Self {
            store,
            areas,
            gate,
            overrides,
            policy,
            config: EngineConfig::default(),
            protocol_seq: AtomicU32::new(0),
        }
    }

    /// Replace the gated-transition configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The persistence port, for read-only consumers (reporting snapshots).
    pub fn store(&self) -> &Arc<dyn RequestStore> {
        &self.store
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Create a new adoption request against an available area.
    ///
    /// The area reservation is the serialization point for the
    /// one-open-request-per-area invariant: of two concurrent creates
    /// against the same area, exactly one wins the reservation.
    pub fn create(&self, input: NewRequest) -> Result<AdoptionRequest, WorkflowError> {
        if input.plan.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "an adoption plan description is required".to_string(),
            ));
        }

        let request_id = RequestId::new();
        self.store
            .reserve_area(&input.area_id, &request_id)
            .map_err(|_| {
                WorkflowError::InvariantViolation(format!(
                    "area {} already has an open adoption request",
                    input.area_id
                ))
            })?;

        // Reservation held from here on: every failure path releases it.
        let status = match self.areas.status(&input.area_id) {
            Ok(status) => status,
            Err(e) => {
                self.store.release_area(&input.area_id);
                return Err(e.into());
            }
        };
        if status != AreaStatus::Available {
            self.store.release_area(&input.area_id);
            return Err(WorkflowError::InvariantViolation(format!(
                "area {} is {}, not AVAILABLE",
                input.area_id, status
            )));
        }
        if let Err(e) = self.areas.set_status(&input.area_id, AreaStatus::InReview) {
            self.store.release_area(&input.area_id);
            return Err(e.into());
        }

        let created_at = Timestamp::now();
        let protocol = self.next_protocol(created_at);
        let request = AdoptionRequest {
            id: request_id,
            protocol,
            area_id: input.area_id,
            area_name: input.area_name,
            plan: input.plan,
            attachments: input.attachments,
            owner: input.owner.clone(),
            created_at,
            updated_at: created_at,
            column: Column::Protocol,
            closure: None,
            events: vec![Event::new(created_at, input.owner, EventKind::Create)],
        };

        if let Err(e) = self.store.insert(request.clone()) {
            // Fresh v4 ids make a duplicate practically unreachable, but a
            // failed insert must not leave the area locked out.
            let _ = self.areas.set_status(&request.area_id, AreaStatus::Available);
            self.store.release_area(&request.area_id);
            return Err(e.into());
        }

        info!(
            request = %request.id,
            area = %request.area_id,
            protocol = %request.protocol,
            "adoption request created"
        );
        Ok(request)
    }

    /// Move a request to another column, enforcing note and gate rules.
    pub fn move_request(&self, cmd: MoveRequest) -> Result<AdoptionRequest, WorkflowError> {
        let updated = self
            .store
            .update(&cmd.request_id, &mut |req| self.apply_move(req, &cmd))?;
        info!(
            request = %updated.id,
            to = %updated.column,
            actor = %cmd.actor,
            "transition applied"
        );
        Ok(updated)
    }

    /// Send a request back for corrections. Alias for a move into
    /// [`Column::Adjustments`] with a mandatory note.
    pub fn request_adjustments(
        &self,
        request_id: RequestId,
        actor: ActorRole,
        note: impl Into<String>,
    ) -> Result<AdoptionRequest, WorkflowError> {
        self.move_request(MoveRequest {
            request_id,
            to: Column::Adjustments,
            actor,
            note: Some(note.into()),
        })
    }

    /// Record the terminal decision. Alias for a move into the terminal
    /// column matching the outcome.
    pub fn decide(
        &self,
        request_id: RequestId,
        outcome: DecisionOutcome,
        note: Option<String>,
        actor: ActorRole,
    ) -> Result<AdoptionRequest, WorkflowError> {
        let to = match outcome {
            DecisionOutcome::Approved => Column::TermSigned,
            DecisionOutcome::Rejected => Column::Rejected,
        };
        self.move_request(MoveRequest {
            request_id,
            to,
            actor,
            note,
        })
    }

    /// Resubmit a request parked in adjustments, optionally refreshing
    /// the plan and attachments. Owner-only; always returns the request
    /// to the start of the review sequence.
    pub fn resubmit(
        &self,
        request_id: RequestId,
        changes: ResubmitUpdate,
        actor: ActorRole,
    ) -> Result<AdoptionRequest, WorkflowError> {
        let updated = self.store.update(&request_id, &mut |req| {
            if actor != req.owner {
                return Err(WorkflowError::Unauthorized(format!(
                    "only the request owner may resubmit; {} is not {}",
                    actor, req.owner
                )));
            }
            if req.column != Column::Adjustments {
                return Err(WorkflowError::InvariantViolation(format!(
                    "resubmission is only possible from ADJUSTMENTS, request is in {}",
                    req.column
                )));
            }
            if let Some(plan) = &changes.plan {
                if plan.trim().is_empty() {
                    return Err(WorkflowError::Validation(
                        "a revised plan must not be empty".to_string(),
                    ));
                }
            }

            let at = self.next_event_at(req);
            if let Some(plan) = changes.plan.clone() {
                req.plan = plan;
            }
            if let Some(attachments) = changes.attachments.clone() {
                req.attachments = attachments;
            }
            log::append(
                &mut req.events,
                Event::new(
                    at,
                    actor.clone(),
                    EventKind::Move {
                        from: Column::Adjustments,
                        to: Column::Protocol,
                        note: Some(RESUBMIT_NOTE.to_string()),
                    },
                ),
            )?;
            req.column = Column::Protocol;
            req.updated_at = at;
            Ok(())
        })?;

        info!(request = %updated.id, actor = %actor, "request resubmitted");
        Ok(updated)
    }

    // ── Internal helpers ─────────────────────────────────────────────

    fn apply_move(&self, req: &mut AdoptionRequest, cmd: &MoveRequest) -> Result<(), WorkflowError> {
        let from = req.column;
        let to = cmd.to;
        let note = cmd
            .note
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        if req.is_closed() && to != from {
            return Err(WorkflowError::InvariantViolation(format!(
                "request {} is closed; no further transitions",
                req.protocol
            )));
        }
        if to == from {
            return Err(WorkflowError::Validation(format!(
                "request is already in {to}"
            )));
        }
        if !self.policy.allowed_targets(&cmd.actor, from).contains(&to) {
            return Err(WorkflowError::Validation(format!(
                "role {} may not move {} to {}",
                cmd.actor, from, to
            )));
        }
        if to == Column::Adjustments && note.is_none() {
            return Err(WorkflowError::Validation(
                "a note describing the required adjustments is mandatory".to_string(),
            ));
        }
        if to == Column::Rejected && note.is_none() {
            return Err(WorkflowError::Validation(
                "a rejection note is mandatory".to_string(),
            ));
        }

        let override_note = if self.config.gated.contains(&(from, to)) {
            self.clear_gate(req, from, to)?
        } else {
            None
        };

        let mut at = self.next_event_at(req);
        let mut pending: Vec<Event> = Vec::with_capacity(3);

        if let Some(justification) = override_note {
            pending.push(Event::new(
                at,
                cmd.actor.clone(),
                EventKind::Override {
                    from,
                    to,
                    note: justification,
                    gate_from: from,
                    gate_to: to,
                },
            ));
            // The move stays strictly later than the override it rests on.
            at = at.next_second();
        }

        pending.push(Event::new(
            at,
            cmd.actor.clone(),
            EventKind::Move {
                from,
                to,
                note: note.clone(),
            },
        ));

        match to {
            Column::Adjustments => {
                at = at.next_second();
                pending.push(Event::new(
                    at,
                    cmd.actor.clone(),
                    EventKind::RequestAdjustments {
                        from,
                        note: note.clone().unwrap_or_default(),
                    },
                ));
            }
            Column::TermSigned => {
                at = at.next_second();
                pending.push(Event::new(
                    at,
                    cmd.actor.clone(),
                    EventKind::Decision {
                        outcome: DecisionOutcome::Approved,
                        note: note.clone(),
                    },
                ));
            }
            Column::Rejected => {
                at = at.next_second();
                pending.push(Event::new(
                    at,
                    cmd.actor.clone(),
                    EventKind::Decision {
                        outcome: DecisionOutcome::Rejected,
                        note: note.clone(),
                    },
                ));
            }
            _ => {}
        }

        // Adapter side effects before the first append: a failed registry
        // call aborts the command with the aggregate untouched.
        match to {
            Column::TermSigned => {
                self.areas.set_status(&req.area_id, AreaStatus::Adopted)?;
                self.store.release_area(&req.area_id);
            }
            Column::Rejected => {
                self.areas.set_status(&req.area_id, AreaStatus::Available)?;
                self.store.release_area(&req.area_id);
            }
            _ => {}
        }

        for event in pending {
            let event_at = event.at;
            log::append(&mut req.events, event)?;
            req.updated_at = event_at;
        }
        req.column = to;
        match to {
            Column::TermSigned => {
                req.closure = Some(Closure {
                    outcome: DecisionOutcome::Approved,
                    at: req.updated_at,
                });
            }
            Column::Rejected => {
                req.closure = Some(Closure {
                    outcome: DecisionOutcome::Rejected,
                    at: req.updated_at,
                });
            }
            _ => {}
        }
        Ok(())
    }

    /// Clear a gated transition: satisfied gate or prior override pass
    /// silently; otherwise ask the override decider. Returns the
    /// justification note when a fresh override must be logged.
    fn clear_gate(
        &self,
        req: &AdoptionRequest,
        from: Column,
        to: Column,
    ) -> Result<Option<String>, WorkflowError> {
        if self.gate.has_issued_report(&req.id)? {
            debug!(request = %req.id, "gate satisfied: inspection report on file");
            return Ok(None);
        }
        if log::has_override_for(&req.events, (from, to)) {
            debug!(
                request = %req.id,
                %from,
                %to,
                "gate bypassed: override already logged for this transition"
            );
            return Ok(None);
        }

        let decision = self.overrides.decide(&OverrideContext {
            request_id: req.id,
            protocol: req.protocol.clone(),
            from,
            to,
        })?;
        let justification = decision.note.trim().to_string();
        if decision.approved && !justification.is_empty() {
            info!(request = %req.id, %from, %to, "gate override authorized");
            Ok(Some(justification))
        } else {
            Err(WorkflowError::GatePending { from, to })
        }
    }

    /// First usable timestamp for a new event: now, bumped past the
    /// history tail when the command lands within the same second.
    fn next_event_at(&self, req: &AdoptionRequest) -> Timestamp {
        let now = Timestamp::now();
        match req.events.last() {
            Some(last) if now <= last.at => last.at.next_second(),
            _ => now,
        }
    }

    fn next_protocol(&self, at: Timestamp) -> ProtocolCode {
        let seq = self.protocol_seq.fetch_add(1, Ordering::Relaxed) + 1;
        ProtocolCode::assign(at.as_datetime().year(), seq)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
