//! Geofence data model.
//!
//! This module groups the value types that flow through the coordinator:
//!
//! ## Contents
//! - [`RegistrationRecord`] one monitored circular region (what the store persists)
//! - [`Transition`], [`TransitionMask`] enter / exit / dwell codes and bitsets
//! - [`Location`], [`Expiration`] coordinates and region lifetime
//! - [`DispatchHandle`], [`CallbackHandle`] opaque 64-bit entrypoint identifiers
//! - [`GeofenceEvent`] a transition delivered to the background context
//! - [`RegionSummary`] lightweight view used by `registered_regions()`

mod event;
mod handle;
mod record;

pub use event::GeofenceEvent;
pub use handle::{CallbackHandle, DispatchHandle};
pub use record::{
    Expiration, Location, RegionSummary, RegistrationRecord, Transition, TransitionMask,
};
