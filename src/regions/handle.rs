//! # Opaque entrypoint handles.
//!
//! Both handles are 64-bit values minted by the embedding application. The
//! coordinator never interprets them; it only persists, compares and
//! resolves them.
//!
//! - [`DispatchHandle`] names the background entrypoint that boots the
//!   long-lived context. One per process, persisted by `initialize()`.
//! - [`CallbackHandle`] names the per-region user callback. It travels with
//!   every [`GeofenceEvent`](crate::GeofenceEvent) so the background context
//!   knows which callback to invoke.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Durable identifier of the background entrypoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchHandle(pub i64);

/// Identifier of the user callback a region's transitions are routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackHandle(pub i64);

impl DispatchHandle {
    /// Returns the raw value.
    #[inline]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl CallbackHandle {
    /// Returns the raw value.
    #[inline]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DispatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dispatch#{}", self.0)
    }
}

impl fmt::Display for CallbackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "callback#{}", self.0)
    }
}
