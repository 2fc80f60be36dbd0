//! # Entrypoint registry.
//!
//! Maps [`DispatchHandle`]s to runnable entrypoints. The embedding
//! application registers its entrypoints at startup (every process
//! generation), while the handle itself is what survives in the store.
//!
//! ## Rules
//! - Lookups take a short read lock and never block on I/O; the
//!   bootstrapper resolves from inside the dispatch critical section.
//! - Registering a handle twice replaces the earlier entrypoint.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::entrypoint::EntrypointRef;
use crate::regions::DispatchHandle;

/// Handle → entrypoint resolution table.
#[derive(Default)]
pub struct EntrypointRegistry {
    entries: RwLock<HashMap<DispatchHandle, EntrypointRef>>,
}

impl EntrypointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entry` under `handle`, returning the entrypoint it replaced.
    pub fn insert(&self, handle: DispatchHandle, entry: EntrypointRef) -> Option<EntrypointRef> {
        self.entries.write().insert(handle, entry)
    }

    /// Resolves `handle`.
    pub fn resolve(&self, handle: DispatchHandle) -> Option<EntrypointRef> {
        self.entries.read().get(&handle).cloned()
    }

    /// Sorted list of registered handles.
    pub fn handles(&self) -> Vec<DispatchHandle> {
        let mut v: Vec<DispatchHandle> = self.entries.read().keys().copied().collect();
        v.sort_unstable();
        v
    }
}
