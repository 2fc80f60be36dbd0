//! # Persisted key/value layout.
//!
//! [`Namespace`] is the whole durable state as one value. Backends commit it
//! in a single step, so a record and its live-set entry are either both on
//! disk or both absent.
//!
//! ## Rules
//! - A record key exists **iff** its id is in the live set; only
//!   [`Namespace::insert_record`] / [`Namespace::remove_record`] touch either.
//! - Record payloads are opaque text; decoding happens in the store, so a
//!   corrupt record never makes the namespace itself unreadable.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::regions::DispatchHandle;

const DISPATCH_HANDLE_KEY: &str = "callback_dispatch_handler";
const LIVE_IDS_KEY: &str = "persistent_geofences_ids";
const RECORD_KEY_PREFIX: &str = "persistent_geofence/";

/// A single persisted value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredValue {
    Handle(i64),
    IdSet(BTreeSet<String>),
    Text(String),
}

/// Durable key/value namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace {
    entries: BTreeMap<String, StoredValue>,
}

impl Namespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Key under which the record for `id` is stored.
    pub fn record_key(id: &str) -> String {
        format!("{RECORD_KEY_PREFIX}{id}")
    }

    /// Persisted dispatch handle, if any.
    pub fn dispatch_handle(&self) -> Option<DispatchHandle> {
        match self.entries.get(DISPATCH_HANDLE_KEY) {
            Some(StoredValue::Handle(v)) => Some(DispatchHandle(*v)),
            _ => None,
        }
    }

    /// Overwrites the dispatch handle.
    pub fn set_dispatch_handle(&mut self, handle: DispatchHandle) {
        self.entries
            .insert(DISPATCH_HANDLE_KEY.to_string(), StoredValue::Handle(handle.get()));
    }

    /// The live id set (empty if never written).
    pub fn live_ids(&self) -> BTreeSet<String> {
        match self.entries.get(LIVE_IDS_KEY) {
            Some(StoredValue::IdSet(ids)) => ids.clone(),
            _ => BTreeSet::new(),
        }
    }

    /// Raw record payload for `id`.
    pub fn record_text(&self, id: &str) -> Option<&str> {
        match self.entries.get(&Self::record_key(id)) {
            Some(StoredValue::Text(t)) => Some(t),
            _ => None,
        }
    }

    /// Stores `payload` under `id` and adds `id` to the live set.
    pub fn insert_record(&mut self, id: &str, payload: String) {
        self.entries
            .insert(Self::record_key(id), StoredValue::Text(payload));
        let mut ids = self.live_ids();
        ids.insert(id.to_string());
        self.entries
            .insert(LIVE_IDS_KEY.to_string(), StoredValue::IdSet(ids));
    }

    /// Drops the record for `id` and removes `id` from the live set.
    ///
    /// Returns `true` if either existed.
    pub fn remove_record(&mut self, id: &str) -> bool {
        let had_record = self.entries.remove(&Self::record_key(id)).is_some();
        let mut ids = self.live_ids();
        let had_id = ids.remove(id);
        if had_id {
            self.entries
                .insert(LIVE_IDS_KEY.to_string(), StoredValue::IdSet(ids));
        }
        had_record || had_id
    }

    /// Number of raw entries (including the handle and the id set).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
