//! # Consolidated Period Counts
//!
//! Event counts over a reporting window, replayed from the histories and
//! never from current state. Terminal outcomes are counted once per
//! request even when both the terminal move and its decision record fall
//! inside the window.

use serde::{Deserialize, Serialize};

use adote_workflow::{AdoptionRequest, Column, DecisionOutcome, EventKind};

use crate::window::ReportWindow;

/// Consolidated counts for one reporting period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    /// Requests created in the period.
    pub created: usize,
    /// Moves landing on SEMAD review.
    pub entered_semad_review: usize,
    /// Moves landing on ECOS review.
    pub entered_ecos_review: usize,
    /// Moves landing on the decision column.
    pub entered_decision: usize,
    /// Adjustment requests raised in the period.
    pub adjustments_requested: usize,
    /// Requests approved in the period (counted once each).
    pub approved: usize,
    /// Requests rejected in the period (counted once each).
    pub rejected: usize,
}

/// Compute the consolidated counts for a window.
///
/// Adjustment accounting: engine-written histories carry both the move
/// into adjustments and its companion `request_adjustments` record, while
/// legacy histories may carry either alone. Per request the count is the
/// maximum of the two, so canonical pairs are not double-counted and
/// lone records are not missed.
pub fn consolidated_report(
    requests: &[AdoptionRequest],
    window: &ReportWindow,
) -> ConsolidatedReport {
    let mut report = ConsolidatedReport::default();

    for request in requests {
        let mut moves_to_adjustments = 0usize;
        let mut adjustment_records = 0usize;
        let mut approved = false;
        let mut rejected = false;

        for event in request.history() {
            if !window.contains(event.at) {
                continue;
            }
            match &event.kind {
                EventKind::Create => report.created += 1,
                EventKind::Move { to, .. } => match to {
                    Column::SemadReview => report.entered_semad_review += 1,
                    Column::EcosReview => report.entered_ecos_review += 1,
                    Column::Decision => report.entered_decision += 1,
                    Column::Adjustments => moves_to_adjustments += 1,
                    Column::TermSigned => approved = true,
                    Column::Rejected => rejected = true,
                    Column::Protocol => {}
                },
                EventKind::RequestAdjustments { .. } => adjustment_records += 1,
                EventKind::Decision { outcome, .. } => match outcome {
                    DecisionOutcome::Approved => approved = true,
                    DecisionOutcome::Rejected => rejected = true,
                },
                EventKind::Override { .. } => {}
            }
        }

        report.adjustments_requested += moves_to_adjustments.max(adjustment_records);
        if approved {
            report.approved += 1;
        }
        if rejected {
            report.rejected += 1;
        }
    }

    report
}

// ─── Tests ───────────────────────────────────────────────────────────
