//! # Workflow Columns
//!
//! The named states an adoption request moves through, from protocol
//! intake to a terminal decision.
//!
//! ## States
//!
//! ```text
//! Protocol ──▶ SemadReview ──▶ EcosReview ──▶ Decision ──▶ TermSigned (terminal)
//!     ▲             │              │             │
//!     │             ▼              ▼             ▼
//!     └──────── Adjustments   (any review column may also
//!     (resubmit)               reach Rejected, terminal)
//! ```
//!
//! Which role may move which column where is decided by the
//! transition-policy collaborator, not here. This module only names the
//! columns and their structural properties.

use serde::{Deserialize, Serialize};

/// A named state in the adoption request workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Intake: the request has been submitted and holds a protocol code.
    Protocol,
    /// Under review by the environment secretariat (SEMAD).
    SemadReview,
    /// Under review by the ecosystems board (ECOS).
    EcosReview,
    /// Returned to the submitter for corrections.
    Adjustments,
    /// Awaiting the final decision.
    Decision,
    /// Adoption term signed; the request is approved (terminal).
    TermSigned,
    /// The request was rejected (terminal).
    Rejected,
}

impl Column {
    /// All columns, in workflow order.
    pub const ALL: [Column; 7] = [
        Column::Protocol,
        Column::SemadReview,
        Column::EcosReview,
        Column::Adjustments,
        Column::Decision,
        Column::TermSigned,
        Column::Rejected,
    ];

    /// Whether this column is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TermSigned | Self::Rejected)
    }

    /// Whether this column is a review station (an actor is working the
    /// request, as opposed to intake, correction, or a terminal state).
    pub fn is_review(&self) -> bool {
        matches!(self, Self::SemadReview | Self::EcosReview | Self::Decision)
    }

    /// Parse a column token as found in persisted records.
    ///
    /// Accepts the canonical snake_case names in any ASCII case, plus the
    /// legacy Portuguese spellings used by earlier exports. Returns `None`
    /// for unknown tokens; the normalization boundary decides whether that
    /// drops the record.
    pub fn parse_token(token: &str) -> Option<Column> {
        let token = token.trim().to_ascii_lowercase();
        match token.as_str() {
            "protocol" | "protocolo" => Some(Self::Protocol),
            "semad_review" | "analise_semad" => Some(Self::SemadReview),
            "ecos_review" | "analise_ecos" => Some(Self::EcosReview),
            "adjustments" | "ajustes" => Some(Self::Adjustments),
            "decision" | "decisao" => Some(Self::Decision),
            "term_signed" | "termo_assinado" => Some(Self::TermSigned),
            "rejected" | "rejeitado" | "reprovado" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Protocol => "PROTOCOL",
            Self::SemadReview => "SEMAD_REVIEW",
            Self::EcosReview => "ECOS_REVIEW",
            Self::Adjustments => "ADJUSTMENTS",
            Self::Decision => "DECISION",
            Self::TermSigned => "TERM_SIGNED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
