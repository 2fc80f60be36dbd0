//! # Runtime events emitted by the coordinator.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Dispatch events**: queueing, bootstrap and delivery of geofence transitions
//! - **Registration events**: register / unregister / reboot replay outcomes
//! - **Lifecycle events**: promotion, demotion, shutdown and teardown
//! - **Subscriber events**: overflow and panics inside the fan-out workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, region
//! id, handles, counts and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use fencevisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ReplayFailed)
//!     .with_region("home")
//!     .with_reason("permission denied");
//!
//! assert_eq!(ev.kind, EventKind::ReplayFailed);
//! assert_eq!(ev.region.as_deref(), Some("home"));
//! assert_eq!(ev.reason.as_deref(), Some("permission denied"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `region`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `region`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Dispatch events ===
    /// A transition was buffered because the background context is not ready.
    ///
    /// Sets:
    /// - `count`: queue length after the push
    EventQueued,

    /// A transition was handed straight to the ready background context.
    EventForwarded,

    /// A transition could not be handed over because the background context
    /// dropped its receiver.
    ///
    /// Sets:
    /// - `reason`: "context_gone"
    DeliveryDropped,

    /// The background context was started (single-flight winner).
    ///
    /// Sets:
    /// - `handle`: dispatch handle used
    /// - `reason`: entrypoint name
    BootstrapStarted,

    /// A bootstrap attempt failed; the next transition retries.
    ///
    /// Sets:
    /// - `reason`: error label
    BootstrapFailed,

    /// The background context signalled readiness and the queue was drained.
    ///
    /// Sets:
    /// - `count`: number of drained transitions
    ContextReady,

    /// A readiness signal arrived when there was nothing to drain.
    SpuriousReady,

    /// The background context's entrypoint returned.
    ///
    /// Sets:
    /// - `reason`: present if it returned an error
    ContextExited,

    // === Registration events ===
    /// The dispatch handle was persisted.
    ///
    /// Sets:
    /// - `handle`: new dispatch handle
    DispatchTargetSet,

    /// A region was registered with the monitor and persisted.
    ///
    /// Sets:
    /// - `region`: region id
    RegionRegistered,

    /// Registering a region failed.
    ///
    /// Sets:
    /// - `region`: region id
    /// - `reason`: error label or message
    RegionRegisterFailed,

    /// Regions were removed from the monitor and the store.
    ///
    /// Sets:
    /// - `count`: number of ids in the request
    RegionsRemoved,

    /// Removing regions failed.
    ///
    /// Sets:
    /// - `count`: number of ids in the request
    /// - `reason`: error message
    RegionRemoveFailed,

    /// Reboot replay started.
    ///
    /// Sets:
    /// - `count`: number of live ids
    ReplayStarted,

    /// A live id was skipped during replay (missing or malformed record).
    ///
    /// Sets:
    /// - `region`: region id
    /// - `reason`: "missing" or error label
    ReplaySkipped,

    /// Re-registering one region failed during replay.
    ///
    /// Sets:
    /// - `region`: region id
    /// - `reason`: monitor message
    ReplayFailed,

    /// Reboot replay finished.
    ///
    /// Sets:
    /// - `count`: number of regions re-registered
    ReplayCompleted,

    // === Lifecycle events ===
    /// The process was promoted to foreground priority.
    Promoted,

    /// The process was demoted to background priority.
    Demoted,

    /// The lifecycle controller was shut down.
    LifecycleShutdown,

    /// Coordinator teardown started (signal or explicit call).
    ShutdownRequested,

    /// The background context exited within the grace period.
    AllStoppedWithin,

    /// The grace period was exceeded; the background context was aborted.
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Region id (or subscriber name for subscriber events).
    pub region: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Raw dispatch handle, if applicable.
    pub handle: Option<i64>,
    /// Count attached to the event (queue length, drained, replayed...).
    pub count: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            region: None,
            reason: None,
            handle: None,
            count: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a region id.
    #[inline]
    pub fn with_region(mut self, region: impl Into<Arc<str>>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Attaches a raw dispatch handle.
    #[inline]
    pub fn with_handle(mut self, handle: i64) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Attaches a count (saturated to `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_region(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_region(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
