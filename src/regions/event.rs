//! # Geofence transition events.
//!
//! A [`GeofenceEvent`] is produced by the platform delivery mechanism and
//! consumed exactly once by the background context. Between the two it is
//! owned by the coordinator's pending queue (while the context boots) or
//! moved straight into the context's delivery channel (once it is ready).

use serde::{Deserialize, Serialize};

use super::handle::CallbackHandle;
use super::record::{Location, Transition};

/// A transition that fired for one or more regions.
///
/// A single detection may trigger several regions at once; `region_ids`
/// keeps them in the order the platform reported them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeofenceEvent {
    /// Callback of the region(s) that triggered.
    pub callback: CallbackHandle,
    /// Ids of the triggered regions.
    pub region_ids: Vec<String>,
    /// Location that triggered the transition.
    pub location: Location,
    /// What happened.
    pub transition: Transition,
}

impl GeofenceEvent {
    pub fn new(
        callback: CallbackHandle,
        region_ids: Vec<String>,
        location: Location,
        transition: Transition,
    ) -> Self {
        Self {
            callback,
            region_ids,
            location,
            transition,
        }
    }
}
