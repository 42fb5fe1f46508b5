//! # adote-core — Foundational Types for the Adoption Stack
//!
//! This crate is the bedrock of the Adote uma Praça stack. It defines the
//! type-system primitives shared by the workflow engine and the reporting
//! engine. Every other crate in the workspace depends on `adote-core`; it
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `RequestId`, `AreaId`,
//!    `EventId`, `ProtocolCode`, `ActorRole` are all newtypes with validated
//!    constructors. No bare strings or bare UUIDs for identifiers.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision. Event ordering and residency-time
//!    arithmetic depend on a single unambiguous timeline; local offsets are
//!    rejected at construction, not silently converted.
//!
//! 3. **Structured errors.** Validated constructors return `CoreError`
//!    variants that name the offending value and the rule it broke.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `adote-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use identity::{ActorRole, AreaId, EventId, ProtocolCode, RequestId};
pub use temporal::Timestamp;
