//! # Transition Policy Collaborator
//!
//! Which role may move which column where is program configuration, not
//! engine logic. The engine asks this collaborator for the allowed
//! targets of a proposed transition and enforces nothing else about
//! roles. Deployments load their own rule tables; the default table
//! encodes the program's standard review matrix.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use adote_core::ActorRole;

use crate::column::Column;

/// Port for role-based transition rules.
pub trait TransitionPolicy: Send + Sync {
    /// Columns the given role may move a request to from `from`.
    fn allowed_targets(&self, role: &ActorRole, from: Column) -> BTreeSet<Column>;
}

/// One rule in a policy table: a role, a source column, and the targets
/// the role may reach from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    /// The acting role the rule applies to.
    pub role: ActorRole,
    /// Source column.
    pub from: Column,
    /// Allowed target columns.
    pub targets: Vec<Column>,
}

/// Rule-table implementation of [`TransitionPolicy`].
///
/// Deserializable, so deployments can ship the table as configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyTable {
    rules: Vec<PolicyRule>,
}

impl PolicyTable {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }

    /// The program's standard review matrix.
    ///
    /// - `semad` triages intake and runs the first review; it may send the
    ///   request back for adjustments or reject it.
    /// - `ecos` runs the second review.
    /// - `manager` takes the final decision and may resume a request
    ///   parked in adjustments directly into a review column.
    ///
    /// Citizens appear nowhere here: resubmission after adjustments is a
    /// dedicated engine command restricted to the request owner.
    pub fn default_program() -> Self {
        fn rule(role: &str, from: Column, targets: &[Column]) -> PolicyRule {
            PolicyRule {
                // Tokens are static lowercase literals; validation cannot fail.
                role: ActorRole::new(role).unwrap_or_else(|_| ActorRole::unknown()),
                from,
                targets: targets.to_vec(),
            }
        }

        Self::new(vec![
            rule(
                "semad",
                Column::Protocol,
                &[Column::SemadReview, Column::Adjustments],
            ),
            rule(
                "semad",
                Column::SemadReview,
                &[Column::EcosReview, Column::Adjustments, Column::Rejected],
            ),
            rule(
                "ecos",
                Column::EcosReview,
                &[Column::Decision, Column::Adjustments, Column::Rejected],
            ),
            rule(
                "manager",
                Column::Decision,
                &[Column::TermSigned, Column::Adjustments, Column::Rejected],
            ),
            rule(
                "manager",
                Column::Adjustments,
                &[Column::SemadReview, Column::EcosReview, Column::Decision],
            ),
        ])
    }
}

impl TransitionPolicy for PolicyTable {
    fn allowed_targets(&self, role: &ActorRole, from: Column) -> BTreeSet<Column> {
        self.rules
            .iter()
            .filter(|r| &r.role == role && r.from == from)
            .flat_map(|r| r.targets.iter().copied())
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
