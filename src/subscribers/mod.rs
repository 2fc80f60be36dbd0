//! # Event subscribers for the fencevisor coordinator.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Synchronizer / Replayer / Lifecycle ── publish(Event) ──► Bus
//!                                                            │
//!                                                  coordinator listener
//!                                                            │
//!                                                     SubscriberSet::emit
//!                                                   ┌────────┼────────┐
//!                                                   ▼        ▼        ▼
//!                                               LogWriter  Metrics  Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use fencevisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct ReplayAlerts;
//!
//! #[async_trait]
//! impl Subscribe for ReplayAlerts {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ReplayFailed {
//!             // page someone
//!         }
//!     }
//!     fn name(&self) -> &'static str { "replay-alerts" }
//! }
//! ```

mod log;
mod subscribe;
mod subscriber_set;

pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
