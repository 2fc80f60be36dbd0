//! # Store backends.
//!
//! A [`StoreBackend`] persists a whole [`Namespace`] at once. The contract is
//! all-or-nothing: after `commit` returns `Ok`, a later `load` (in this or a
//! future process) returns exactly that namespace; after it returns `Err`,
//! the previously committed namespace is still what `load` returns.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::StoreError;
use crate::store::Namespace;

/// Durable storage for the registration namespace.
pub trait StoreBackend: Send + Sync + 'static {
    /// Loads the last committed namespace (empty if nothing was ever committed).
    fn load(&self) -> Result<Namespace, StoreError>;

    /// Durably replaces the stored namespace with `ns`.
    fn commit(&self, ns: &Namespace) -> Result<(), StoreError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[derive(Default)]
struct MemoryState {
    committed: Namespace,
    fail_commits: bool,
    fail_loads: bool,
}

/// In-memory backend.
///
/// Clones share the same state, so a clone handed to a second
/// [`RegistrationStore`](crate::RegistrationStore) behaves like the same
/// storage seen from a new process generation.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with `ns`.
    pub fn with_namespace(ns: Namespace) -> Self {
        let me = Self::default();
        me.state.lock().committed = ns;
        me
    }

    /// Makes every following `commit` fail with [`StoreError::Unavailable`].
    pub fn fail_commits(&self, fail: bool) {
        self.state.lock().fail_commits = fail;
    }

    /// Makes every following `load` fail with [`StoreError::Unavailable`].
    pub fn fail_loads(&self, fail: bool) {
        self.state.lock().fail_loads = fail;
    }

    /// Copy of the committed namespace.
    pub fn snapshot(&self) -> Namespace {
        self.state.lock().committed.clone()
    }
}

impl StoreBackend for MemoryBackend {
    fn load(&self) -> Result<Namespace, StoreError> {
        let st = self.state.lock();
        if st.fail_loads {
            return Err(StoreError::unavailable("memory backend: load disabled"));
        }
        Ok(st.committed.clone())
    }

    fn commit(&self, ns: &Namespace) -> Result<(), StoreError> {
        let mut st = self.state.lock();
        if st.fail_commits {
            return Err(StoreError::unavailable("memory backend: commit disabled"));
        }
        st.committed = ns.clone();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
