//! Persistent registration store.
//!
//! This module groups the durable side of the coordinator: the key/value
//! **layout**, the pluggable **backends** that persist it, and the
//! [`RegistrationStore`] that guards it with its own lock domain.
//!
//! ## Contents
//! - [`Namespace`], [`StoredValue`] persisted key/value layout
//! - [`StoreBackend`] durable commit/load contract
//! - [`FileBackend`] JSON file, written atomically (temp + fsync + rename)
//! - [`MemoryBackend`] shared in-memory backend (tests, ephemeral hosts)
//! - [`RegistrationStore`] transactional record/live-set/handle access
//!
//! ## Layout
//! ```text
//! callback_dispatch_handler        → Handle(i64)          (dispatch target)
//! persistent_geofences_ids         → IdSet({"home", ...})  (live set)
//! persistent_geofence/<id>         → Text("<json record>") (one per live id)
//! ```

mod backend;
mod file;
mod namespace;
mod registrations;

pub use backend::{MemoryBackend, StoreBackend};
pub use file::FileBackend;
pub use namespace::{Namespace, StoredValue};
pub use registrations::RegistrationStore;
