//! # adote-report — Reporting Engine
//!
//! Derives operational reports for the adoption program strictly from the
//! record of what happened: the requests' event histories, replayed over
//! a caller-supplied period. Nothing here mutates state, and every input
//! is a detached snapshot, so reports run concurrently with workflow
//! writes.
//!
//! ## Reports
//!
//! - **Consolidated counts** (`consolidated.rs`): creations, entries into
//!   each review column, adjustment requests, and terminal outcomes
//!   (counted once per request) in the period.
//!
//! - **Per-actor productivity** (`productivity.rs`): per acting role,
//!   the moves, adjustment requests and overrides performed, distinct
//!   requests touched, and the transition frequency table.
//!
//! - **Column residency / SLA** (`sla.rs`): per-column duration samples
//!   reconstructed from the move history, clipped to the window with
//!   right-censoring for segments still open at the window end, with
//!   nearest-rank p50/p80/p95 and the fraction breaching the configured
//!   target.
//!
//! ## Robustness
//!
//! Reports never fail on malformed histories: records pass through the
//! workflow crate's normalization boundary when aggregates are rebuilt,
//! and an empty or partially-shaped log simply contributes nothing.

pub mod consolidated;
pub mod productivity;
pub mod sla;
pub mod window;

// ─── Window re-exports ──────────────────────────────────────────────

pub use window::{ReportError, ReportWindow};

// ─── Consolidated re-exports ────────────────────────────────────────

pub use consolidated::{consolidated_report, ConsolidatedReport};

// ─── Productivity re-exports ────────────────────────────────────────

pub use productivity::{productivity_report, ActorProductivity, TransitionCount};

// ─── SLA re-exports ─────────────────────────────────────────────────

pub use sla::{
    percentile, residency_segments, sla_report, ColumnSla, ResidencySegment, SlaTargets, DAY_SECS,
};
