//! # Error Types
//!
//! Structured errors for the foundational types. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! Validation failures name the offending value and the rule it broke, so
//! callers can surface actionable messages without string matching.

use thiserror::Error;

/// Errors produced by validated constructors in `adote-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An identifier failed shape validation.
    #[error("invalid {kind}: {value:?}: {reason}")]
    InvalidIdentifier {
        /// Which identifier type rejected the input (e.g. "protocol code").
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// The rule that was broken.
        reason: String,
    },

    /// A timestamp string failed parsing or timezone validation.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
