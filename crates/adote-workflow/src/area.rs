//! # Area Registry Port
//!
//! The public-area registry is an external collaborator: it owns the
//! availability status of each area, and the workflow engine updates that
//! status as a side effect of request transitions. Nothing else in this
//! workspace mutates areas; the reporting engine never touches them.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use adote_core::AreaId;

use crate::error::AdapterError;

/// Availability status of a public area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaStatus {
    /// Open for a new adoption request.
    Available,
    /// An adoption request referencing this area is under review.
    InReview,
    /// An adoption term is signed for this area.
    Adopted,
}

impl std::fmt::Display for AreaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Available => "AVAILABLE",
            Self::InReview => "IN_REVIEW",
            Self::Adopted => "ADOPTED",
        };
        f.write_str(s)
    }
}

/// Port to the area registry.
///
/// A failed call is a hard failure of the surrounding command; it is
/// never replaced with a default status.
pub trait AreaRegistry: Send + Sync {
    /// Current availability status of an area.
    fn status(&self, id: &AreaId) -> Result<AreaStatus, AdapterError>;

    /// Update the availability status of an area.
    fn set_status(&self, id: &AreaId, status: AreaStatus) -> Result<(), AdapterError>;
}

/// In-process area registry backed by a concurrent map.
///
/// Reference implementation for deployments without an external registry,
/// and the registry double used throughout the test suites.
#[derive(Debug, Default)]
pub struct InMemoryAreaRegistry {
    areas: DashMap<AreaId, AreaStatus>,
}

impl InMemoryAreaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an area with an initial status.
    pub fn register(&self, id: AreaId, status: AreaStatus) {
        self.areas.insert(id, status);
    }
}

impl AreaRegistry for InMemoryAreaRegistry {
    fn status(&self, id: &AreaId) -> Result<AreaStatus, AdapterError> {
        self.areas
            .get(id)
            .map(|entry| *entry.value())
            .ok_or_else(|| AdapterError::UnknownResource(id.to_string()))
    }

    fn set_status(&self, id: &AreaId, status: AreaStatus) -> Result<(), AdapterError> {
        match self.areas.get_mut(id) {
            Some(mut entry) => {
                *entry.value_mut() = status;
                Ok(())
            }
            None => Err(AdapterError::UnknownResource(id.to_string())),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
