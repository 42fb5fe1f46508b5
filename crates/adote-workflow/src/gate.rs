//! # Inspection Gate Port
//!
//! One transition in the workflow is gated on an external artifact: the
//! request may only advance from SEMAD review to ECOS review once an
//! inspection report has been issued for it. The gate is an explicit,
//! injected interface with a single method; the engine never goes looking
//! for inspection data by convention.
//!
//! When the artifact is absent the transition is not simply refused: the
//! caller may authorize an explicit, logged override. The decision comes
//! through the [`OverrideDecider`] callback, which decouples the engine
//! from whatever surface (form, dialog, queue) collects the confirmation
//! and the justification note.

use dashmap::DashMap;

use adote_core::{ProtocolCode, RequestId};

use crate::column::Column;
use crate::error::AdapterError;

/// Port to the inspection-report registry.
pub trait InspectionGate: Send + Sync {
    /// Whether an issued inspection report exists for this request.
    fn has_issued_report(&self, id: &RequestId) -> Result<bool, AdapterError>;
}

/// In-process gate backed by a set of request ids with issued reports.
///
/// Reference implementation and test double.
#[derive(Debug, Default)]
pub struct StaticGate {
    issued: DashMap<RequestId, ()>,
}

impl StaticGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an inspection report was issued for a request.
    pub fn mark_issued(&self, id: RequestId) {
        self.issued.insert(id, ());
    }
}

impl InspectionGate for StaticGate {
    fn has_issued_report(&self, id: &RequestId) -> Result<bool, AdapterError> {
        Ok(self.issued.contains_key(id))
    }
}

// ─── Override Decisions ──────────────────────────────────────────────

/// Context handed to the override decider when a gated transition finds
/// its prerequisite artifact absent.
#[derive(Debug, Clone)]
pub struct OverrideContext {
    /// The request attempting the gated transition.
    pub request_id: RequestId,
    /// Its external protocol code, for display.
    pub protocol: ProtocolCode,
    /// Source column of the gated transition.
    pub from: Column,
    /// Target column of the gated transition.
    pub to: Column,
}

/// The caller's answer to an override prompt.
#[derive(Debug, Clone)]
pub struct OverrideDecision {
    /// Whether the bypass is authorized.
    pub approved: bool,
    /// Justification note. Must be non-empty for an approval to count.
    pub note: String,
}

/// Callback port for collecting override decisions.
pub trait OverrideDecider: Send + Sync {
    /// Ask whether the gated transition may proceed without its artifact.
    fn decide(&self, ctx: &OverrideContext) -> Result<OverrideDecision, AdapterError>;
}

/// Decider that refuses every override. The safe default for deployments
/// where no surface collects confirmations.
#[derive(Debug, Default)]
pub struct DenyOverrides;

impl OverrideDecider for DenyOverrides {
    fn decide(&self, _ctx: &OverrideContext) -> Result<OverrideDecision, AdapterError> {
        Ok(OverrideDecision {
            approved: false,
            note: String::new(),
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_gate_reports_issued() {
        let gate = StaticGate::new();
        let id = RequestId::new();
        assert!(!gate.has_issued_report(&id).unwrap());
        gate.mark_issued(id);
        assert!(gate.has_issued_report(&id).unwrap());
    }

    #[test]
    fn test_deny_overrides_never_approves() {
        let decider = DenyOverrides;
        let ctx = OverrideContext {
            request_id: RequestId::new(),
            protocol: ProtocolCode::assign(2026, 1),
            from: Column::SemadReview,
            to: Column::EcosReview,
        };
        let decision = decider.decide(&ctx).unwrap();
        assert!(!decision.approved);
    }
}
