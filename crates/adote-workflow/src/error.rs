//! # Workflow Error Types
//!
//! Structured errors for the workflow engine and its collaborator ports.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! The variants mirror how callers recover:
//!
//! - `Validation` is rejected before any event is appended and is fully
//!   recoverable by retrying with corrected input.
//! - `InvariantViolation` signals a conflict with request or area state;
//!   no partial mutation has happened.
//! - `GatePending` is not a hard failure: the transition needs an explicit
//!   override decision with a justification note. Nothing was appended.
//! - `Adapter` and `Store` failures are hard command failures; a failed
//!   collaborator call is never substituted with a silent default.

use thiserror::Error;

use adote_core::RequestId;

use crate::column::Column;

/// Errors returned by workflow engine commands.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Input rejected before any event was appended (missing mandatory
    /// note, invalid target column). Retry with corrected input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Command conflicts with current request or area state (area
    /// unavailable, open request exists, request already closed).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The acting role may not perform this operation on this request.
    #[error("unauthorized operation: {0}")]
    Unauthorized(String),

    /// A gated transition is missing its prerequisite artifact and no
    /// approved override was supplied. The log is unchanged.
    #[error("gate pending for transition {from} -> {to}: prerequisite artifact absent")]
    GatePending {
        /// Source column of the gated transition.
        from: Column,
        /// Target column of the gated transition.
        to: Column,
    },

    /// No request with this identity exists in the store.
    #[error("request not found: {0}")]
    NotFound(RequestId),

    /// A collaborator adapter call failed.
    #[error("adapter failure: {0}")]
    Adapter(#[from] AdapterError),

    /// The persistence port rejected the operation.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

/// Errors surfaced by collaborator adapters (area registry, inspection
/// gate, override decider).
#[derive(Error, Debug)]
pub enum AdapterError {
    /// The adapter has no record of the referenced resource.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// The adapter call did not complete.
    #[error("adapter call failed: {0}")]
    CallFailed(String),
}

/// Errors surfaced by the persistence port.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A request with this identity already exists.
    #[error("duplicate request: {0}")]
    DuplicateRequest(String),

    /// The area already has an open request reserved against it.
    #[error("area already reserved: {0}")]
    AreaReserved(String),
}
