//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the synchronizer,
//! bootstrapper, replayer, lifecycle controller and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Synchronizer`, `Bootstrapper` (via the synchronizer),
//!   `Replayer`, `LifecycleController`, `Coordinator`, `SubscriberSet` workers.
//! - **Consumers**: the coordinator's listener task (fans out to `SubscriberSet`).
//!
//! See `core/mod.rs` for the system-level wiring diagram.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
