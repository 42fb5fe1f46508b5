//! # Request Store Port
//!
//! Narrow persistence interface for request aggregates. The engine talks
//! only to this port, so the backing medium can be swapped for any
//! transactional store without touching engine logic.
//!
//! ## Concurrency Contract
//!
//! - `update` is the single-writer path: implementations must serialize
//!   concurrent updates to the same request id, so no two commands can
//!   read the same stale projection and append conflicting events.
//! - `reserve_area` must be atomic across its check-and-set, so two
//!   concurrent creates against one area cannot both pass. The
//!   reservation is held for the lifetime of the open request and
//!   released when it closes.
//! - `snapshot` and `get` return clones, never live references, so the
//!   reporting engine can replay concurrently with writers.

use dashmap::DashMap;

use adote_core::{AreaId, RequestId};

use crate::error::{StoreError, WorkflowError};
use crate::request::AdoptionRequest;

/// Persistence port for request aggregates.
pub trait RequestStore: Send + Sync {
    /// Insert a freshly created request.
    ///
    /// # Errors
    ///
    /// Fails with `StoreError::DuplicateRequest` if the id already exists.
    fn insert(&self, request: AdoptionRequest) -> Result<(), StoreError>;

    /// A consistent snapshot of one request, if it exists.
    fn get(&self, id: &RequestId) -> Option<AdoptionRequest>;

    /// Exclusive read-modify-write of one request.
    ///
    /// The mutation closure runs under the request's writer lock. When it
    /// returns an error the aggregate must be left untouched (callers
    /// uphold this by mutating only after all fallible work succeeded).
    /// Returns a snapshot of the updated request.
    fn update(
        &self,
        id: &RequestId,
        mutate: &mut dyn FnMut(&mut AdoptionRequest) -> Result<(), WorkflowError>,
    ) -> Result<AdoptionRequest, WorkflowError>;

    /// Atomically reserve an area for an open request.
    fn reserve_area(&self, area: &AreaId, request: &RequestId) -> Result<(), StoreError>;

    /// Release an area reservation (the open request closed or creation
    /// was rolled back).
    fn release_area(&self, area: &AreaId);

    /// The open request currently reserved against an area, if any.
    fn open_request_for(&self, area: &AreaId) -> Option<RequestId>;

    /// Snapshots of all requests, for the reporting engine.
    fn snapshot(&self) -> Vec<AdoptionRequest>;
}

/// In-memory store backed by sharded concurrent maps.
///
/// `DashMap`'s per-shard write guards give the single-writer guarantee:
/// `update` holds the exclusive guard for the request entry while the
/// mutation closure runs. The area index entry API gives the atomic
/// reservation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    requests: DashMap<RequestId, AdoptionRequest>,
    open_by_area: DashMap<AreaId, RequestId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestStore for MemoryStore {
    fn insert(&self, request: AdoptionRequest) -> Result<(), StoreError> {
        match self.requests.entry(request.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(StoreError::DuplicateRequest(request.id.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(request);
                Ok(())
            }
        }
    }

    fn get(&self, id: &RequestId) -> Option<AdoptionRequest> {
        self.requests.get(id).map(|entry| entry.value().clone())
    }

    fn update(
        &self,
        id: &RequestId,
        mutate: &mut dyn FnMut(&mut AdoptionRequest) -> Result<(), WorkflowError>,
    ) -> Result<AdoptionRequest, WorkflowError> {
        let mut entry = self
            .requests
            .get_mut(id)
            .ok_or(WorkflowError::NotFound(*id))?;
        mutate(entry.value_mut())?;
        Ok(entry.value().clone())
    }

    fn reserve_area(&self, area: &AreaId, request: &RequestId) -> Result<(), StoreError> {
        match self.open_by_area.entry(*area) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(StoreError::AreaReserved(area.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(*request);
                Ok(())
            }
        }
    }

    fn release_area(&self, area: &AreaId) {
        self.open_by_area.remove(area);
    }

    fn open_request_for(&self, area: &AreaId) -> Option<RequestId> {
        self.open_by_area.get(area).map(|entry| *entry.value())
    }

    fn snapshot(&self) -> Vec<AdoptionRequest> {
        self.requests
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
