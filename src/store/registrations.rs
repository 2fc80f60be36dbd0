//! # Registration store.
//!
//! [`RegistrationStore`] gives transactional access to the durable
//! namespace: registration records, the live id set and the dispatch handle.
//!
//! ## Architecture
//! ```text
//! writers ──► commit lock ──► clone current ──► mutate ──► backend.commit()
//!                                                              │ Ok
//!                                                              ▼
//! readers ──► current (RwLock, held only for a clone/lookup) ◄─ swap in
//! ```
//!
//! ## Rules
//! - Writers are serialized by the commit lock; the backend sees one
//!   complete namespace per mutation (record + live set move together).
//! - The in-memory view is swapped only after a successful commit, so a
//!   failed commit leaves both memory and disk untouched.
//! - Readers never wait on backend I/O; the dispatcher reads the handle from
//!   inside its own critical section and must not stall there.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::regions::{DispatchHandle, RegionSummary, RegistrationRecord};
use crate::store::{Namespace, StoreBackend};

/// Durable store of registration records.
pub struct RegistrationStore {
    backend: Arc<dyn StoreBackend>,
    current: RwLock<Namespace>,
    commit: Mutex<()>,
}

impl RegistrationStore {
    /// Opens the store by loading the last committed namespace.
    ///
    /// Fails with [`StoreError::Unavailable`] if the backend cannot be read.
    pub fn open(backend: Arc<dyn StoreBackend>) -> Result<Self, StoreError> {
        let ns = backend.load()?;
        debug!(
            backend = backend.name(),
            entries = ns.len(),
            "registration store opened"
        );
        Ok(Self {
            backend,
            current: RwLock::new(ns),
            commit: Mutex::new(()),
        })
    }

    /// Stores `record` under `record.id` and adds the id to the live set.
    ///
    /// Overwrites an existing record with the same id.
    pub fn put(&self, record: &RegistrationRecord) -> Result<(), StoreError> {
        let payload = serde_json::to_string(record).map_err(StoreError::unavailable)?;
        self.mutate(|ns| {
            ns.insert_record(&record.id, payload);
            true
        })
        .map(|_| ())
    }

    /// Removes the record for `id` and drops `id` from the live set.
    ///
    /// Returns `Ok(false)` without touching the backend if `id` is unknown.
    pub fn remove(&self, id: &str) -> Result<bool, StoreError> {
        self.mutate(|ns| ns.remove_record(id))
    }

    /// Removes every id in `ids` in one commit.
    ///
    /// Returns how many ids were stored. Unknown ids are ignored; if none is
    /// known the backend is not touched.
    pub fn remove_many(&self, ids: &[String]) -> Result<usize, StoreError> {
        let mut removed = 0;
        self.mutate(|ns| {
            removed = ids.iter().filter(|id| ns.remove_record(id)).count();
            removed > 0
        })?;
        Ok(removed)
    }

    /// Fetches and decodes the record for `id`.
    ///
    /// Returns `Ok(None)` if absent and [`StoreError::Malformed`] if the stored
    /// payload does not decode.
    pub fn get(&self, id: &str) -> Result<Option<RegistrationRecord>, StoreError> {
        let payload = {
            let ns = self.current.read();
            match ns.record_text(id) {
                Some(t) => t.to_string(),
                None => return Ok(None),
            }
        };
        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|e| StoreError::Malformed {
                id: id.to_string(),
                reason: e.to_string(),
            })
    }

    /// Snapshot of the live id set.
    pub fn list_ids(&self) -> BTreeSet<String> {
        self.current.read().live_ids()
    }

    /// Persists the dispatch handle, replacing any previous one.
    pub fn set_dispatch_handle(&self, handle: DispatchHandle) -> Result<(), StoreError> {
        self.mutate(|ns| {
            ns.set_dispatch_handle(handle);
            true
        })
        .map(|_| ())
    }

    /// The persisted dispatch handle, if `set_dispatch_handle` was ever called.
    pub fn dispatch_handle(&self) -> Option<DispatchHandle> {
        self.current.read().dispatch_handle()
    }

    /// Summaries of every live region whose record decodes.
    ///
    /// Malformed records are skipped (and logged), not removed.
    pub fn regions(&self) -> Vec<RegionSummary> {
        self.list_ids()
            .iter()
            .filter_map(|id| match self.get(id) {
                Ok(Some(rec)) => Some(rec.summary()),
                Ok(None) => None,
                Err(e) => {
                    warn!(region = %id, error = %e, "skipping malformed region");
                    None
                }
            })
            .collect()
    }

    /// Applies `f` to a copy of the namespace and commits it.
    ///
    /// `f` returns whether it changed anything; unchanged copies are not committed.
    fn mutate(&self, f: impl FnOnce(&mut Namespace) -> bool) -> Result<bool, StoreError> {
        let _commit = self.commit.lock();
        let mut next = self.current.read().clone();
        if !f(&mut next) {
            return Ok(false);
        }
        self.backend.commit(&next)?;
        *self.current.write() = next;
        Ok(true)
    }
}
