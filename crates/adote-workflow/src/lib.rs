//! # adote-workflow — Adoption Request Workflow Engine
//!
//! Tracks a public-area adoption request from submission through the
//! multi-party review process to a terminal decision. The append-only
//! event history is the source of truth; the request's current column and
//! closure marker are a maintained fold of that history.
//!
//! ## Modules
//!
//! - **Column** (`column.rs`): the named workflow states, from protocol
//!   intake through SEMAD and ECOS review to term signature or rejection.
//!
//! - **Event** (`event.rs`): the closed tagged-union event types and the
//!   single normalization boundary that maps legacy record spellings onto
//!   the canonical shape.
//!
//! - **Log** (`log.rs`): append, ordered read, synthetic `create`
//!   backfill, and the projection fold.
//!
//! - **Request** (`request.rs`): the aggregate, its attachments and
//!   closure marker, and legacy-history rebuild.
//!
//! - **Engine** (`engine.rs`): command validation and application,
//!   gate-override synthesis, timestamp discipline, and the area-registry
//!   side effects.
//!
//! - **Ports** (`area.rs`, `gate.rs`, `policy.rs`, `store.rs`): the
//!   collaborator interfaces the engine is injected with, each with an
//!   in-process reference implementation.
//!
//! ## Design
//!
//! The engine owns no role rules and no gate heuristics: the
//! allowed-targets policy, the inspection gate, and the override decision
//! surface are all injected collaborators. What the engine does own is
//! the invariants: mandatory notes on adjustments and rejections, one
//! open request per area, closed requests stay closed, histories are
//! append-only with strictly increasing timestamps per command, and the
//! stored projection never diverges from the fold of the log.

pub mod area;
pub mod column;
pub mod engine;
pub mod error;
pub mod event;
pub mod gate;
pub mod log;
pub mod policy;
pub mod request;
pub mod store;

// ─── Column re-exports ──────────────────────────────────────────────

pub use column::Column;

// ─── Event re-exports ───────────────────────────────────────────────

pub use event::{DecisionOutcome, Event, EventKind};

// ─── Log re-exports ─────────────────────────────────────────────────

pub use log::{Projection, ProjectedClosure};

// ─── Request re-exports ─────────────────────────────────────────────

pub use request::{AdoptionRequest, AttachmentMeta, Closure};

// ─── Engine re-exports ──────────────────────────────────────────────

pub use engine::{
    EngineConfig, MoveRequest, NewRequest, ResubmitUpdate, WorkflowEngine, RESUBMIT_NOTE,
};

// ─── Port re-exports ────────────────────────────────────────────────

pub use area::{AreaRegistry, AreaStatus, InMemoryAreaRegistry};
pub use gate::{
    DenyOverrides, InspectionGate, OverrideContext, OverrideDecider, OverrideDecision, StaticGate,
};
pub use policy::{PolicyRule, PolicyTable, TransitionPolicy};
pub use store::{MemoryStore, RequestStore};

// ─── Error re-exports ───────────────────────────────────────────────

pub use error::{AdapterError, StoreError, WorkflowError};
