//! # Per-Actor Productivity
//!
//! Breaks the period's workflow activity down by acting role: how many
//! moves, adjustment requests and overrides each role performed, how many
//! distinct requests it touched, and which transitions it performed most.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use adote_core::{ActorRole, RequestId};
use adote_workflow::{AdoptionRequest, Column, EventKind};

use crate::window::ReportWindow;

/// One `(from -> to)` transition with its frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCount {
    /// Source column.
    pub from: Column,
    /// Target column.
    pub to: Column,
    /// How many times the role performed this transition in the period.
    pub count: usize,
}

/// Productivity of one acting role over the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorProductivity {
    /// The acting role.
    pub role: ActorRole,
    /// Column moves performed.
    pub moves: usize,
    /// Adjustment requests raised.
    pub adjustment_requests: usize,
    /// Gate overrides authorized.
    pub overrides: usize,
    /// Distinct requests the role acted on.
    pub requests_touched: usize,
    /// Transition frequency table, sorted descending by count; ties are
    /// ordered by the transition pair for deterministic output.
    pub transitions: Vec<TransitionCount>,
}

#[derive(Default)]
struct Accumulator {
    moves: usize,
    adjustment_requests: usize,
    overrides: usize,
    requests: HashSet<RequestId>,
    transitions: BTreeMap<(Column, Column), usize>,
}

/// Compute the per-actor productivity breakdown for a window.
///
/// Only workflow actions count: moves, adjustment requests, and
/// overrides. Creation and decision records are reported elsewhere.
/// Output is sorted by role for stable presentation.
pub fn productivity_report(
    requests: &[AdoptionRequest],
    window: &ReportWindow,
) -> Vec<ActorProductivity> {
    let mut by_role: BTreeMap<ActorRole, Accumulator> = BTreeMap::new();

    for request in requests {
        for event in request.history() {
            if !window.contains(event.at) {
                continue;
            }
            match &event.kind {
                EventKind::Move { from, to, .. } => {
                    let acc = by_role.entry(event.actor.clone()).or_default();
                    acc.moves += 1;
                    acc.requests.insert(request.id);
                    *acc.transitions.entry((*from, *to)).or_default() += 1;
                }
                EventKind::RequestAdjustments { .. } => {
                    let acc = by_role.entry(event.actor.clone()).or_default();
                    acc.adjustment_requests += 1;
                    acc.requests.insert(request.id);
                }
                EventKind::Override { .. } => {
                    let acc = by_role.entry(event.actor.clone()).or_default();
                    acc.overrides += 1;
                    acc.requests.insert(request.id);
                }
                EventKind::Create | EventKind::Decision { .. } => {}
            }
        }
    }

    by_role
        .into_iter()
        .map(|(role, acc)| {
            let mut transitions: Vec<TransitionCount> = acc
                .transitions
                .into_iter()
                .map(|((from, to), count)| TransitionCount { from, to, count })
                .collect();
            transitions.sort_by(|a, b| {
                b.count
                    .cmp(&a.count)
                    .then_with(|| (a.from, a.to).cmp(&(b.from, b.to)))
            });

            ActorProductivity {
                role,
                moves: acc.moves,
                adjustment_requests: acc.adjustment_requests,
                overrides: acc.overrides,
                requests_touched: acc.requests.len(),
                transitions,
            }
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────
