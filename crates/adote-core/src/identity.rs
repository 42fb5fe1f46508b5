//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the adoption stack.
//! These prevent accidental identifier confusion: you cannot pass an
//! `AreaId` where a `RequestId` is expected.
//!
//! Opaque identities (`RequestId`, `AreaId`, `EventId`) are random v4
//! UUIDs. Human-facing identities (`ProtocolCode`, `ActorRole`) are
//! validated strings with a fixed shape, rejected at construction when
//! malformed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Unique identifier for an adoption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

/// Unique identifier for a public area (praça, canteiro, largo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaId(pub Uuid);

/// Unique identifier for a single event in a request's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl RequestId {
    /// Generate a new random request identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AreaId {
    /// Generate a new random area identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl EventId {
    /// Generate a new random event identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for AreaId {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "request:{}", self.0)
    }
}

impl std::fmt::Display for AreaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "area:{}", self.0)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event:{}", self.0)
    }
}

// ─── Protocol Code ───────────────────────────────────────────────────

/// The external protocol code assigned to a request at creation.
///
/// Immutable for the lifetime of the request and used by citizens to
/// follow their submission. Format: `ADT-YYYY-NNNNNN`, where `YYYY` is
/// the submission year and `NNNNNN` a zero-padded sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolCode(String);

impl ProtocolCode {
    /// Assign a protocol code from a year and sequence number.
    pub fn assign(year: i32, sequence: u32) -> Self {
        Self(format!("ADT-{year:04}-{sequence:06}"))
    }

    /// Parse and validate a protocol code string.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidIdentifier` when the input does not
    /// match `ADT-YYYY-NNNNNN`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidIdentifier {
            kind: "protocol code",
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.split('-');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("ADT"), Some(year), Some(seq), None) => {
                if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid("year must be 4 digits"));
                }
                if seq.len() != 6 || !seq.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid("sequence must be 6 digits"));
                }
                Ok(Self(s.to_string()))
            }
            _ => Err(invalid("expected ADT-YYYY-NNNNNN")),
        }
    }

    /// Access the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProtocolCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Actor Role ──────────────────────────────────────────────────────

/// The acting role recorded on every event and as request ownership.
///
/// Roles are lowercase tokens such as `citizen`, `semad`, `ecos` or
/// `manager`. Which role may perform which transition is decided by the
/// transition-policy collaborator, not by this type; the type only
/// guarantees the token is well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorRole(String);

impl ActorRole {
    /// Validate and wrap a role token.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidIdentifier` when the token is empty or
    /// contains anything other than lowercase ASCII letters, digits, or
    /// underscores.
    pub fn new(token: impl Into<String>) -> Result<Self, CoreError> {
        let token = token.into();
        let well_formed = !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !well_formed {
            return Err(CoreError::InvalidIdentifier {
                kind: "actor role",
                value: token,
                reason: "expected a non-empty lowercase token".to_string(),
            });
        }
        Ok(Self(token))
    }

    /// The fallback role recorded when a legacy event names no actor.
    pub fn unknown() -> Self {
        Self("unknown".to_string())
    }

    /// Access the role token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
