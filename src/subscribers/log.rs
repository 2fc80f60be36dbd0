//! # LogWriter: bus events rendered through `tracing`
//!
//! A subscriber that turns every [`Event`] into one structured `tracing`
//! record. Failures log at `warn`, state transitions at `info`, per-event
//! chatter at `debug`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG fencevisor: queued seq=3 queue_len=Some(1)
//!  INFO fencevisor: bootstrap started seq=4 handle=Some(42) entrypoint=Some("dispatcher")
//!  INFO fencevisor: background context ready seq=9 drained=Some(2)
//!  WARN fencevisor: replay failed seq=14 region=Some("home") reason=Some("permission denied")
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let region = e.region.as_deref();
        let reason = e.reason.as_deref();
        let seq = e.seq;

        match e.kind {
            EventKind::EventQueued => debug!(seq, queue_len = ?e.count, "queued"),
            EventKind::EventForwarded => debug!(seq, "forwarded"),
            EventKind::DeliveryDropped => warn!(seq, ?reason, "delivery dropped"),
            EventKind::BootstrapStarted => {
                info!(seq, handle = ?e.handle, entrypoint = ?reason, "bootstrap started")
            }
            EventKind::BootstrapFailed => warn!(seq, ?reason, "bootstrap failed"),
            EventKind::ContextReady => info!(seq, drained = ?e.count, "background context ready"),
            EventKind::SpuriousReady => debug!(seq, "spurious ready"),
            EventKind::ContextExited => info!(seq, ?reason, "background context exited"),
            EventKind::DispatchTargetSet => info!(seq, handle = ?e.handle, "dispatch target set"),
            EventKind::RegionRegistered => info!(seq, ?region, "region registered"),
            EventKind::RegionRegisterFailed => {
                warn!(seq, ?region, ?reason, "region registration failed")
            }
            EventKind::RegionsRemoved => info!(seq, count = ?e.count, "regions removed"),
            EventKind::RegionRemoveFailed => {
                warn!(seq, count = ?e.count, ?reason, "region removal failed")
            }
            EventKind::ReplayStarted => info!(seq, live = ?e.count, "replay started"),
            EventKind::ReplaySkipped => warn!(seq, ?region, ?reason, "replay skipped"),
            EventKind::ReplayFailed => warn!(seq, ?region, ?reason, "replay failed"),
            EventKind::ReplayCompleted => info!(seq, replayed = ?e.count, "replay completed"),
            EventKind::Promoted => info!(seq, "promoted to foreground"),
            EventKind::Demoted => info!(seq, "demoted to background"),
            EventKind::LifecycleShutdown => info!(seq, "lifecycle shut down"),
            EventKind::ShutdownRequested => info!(seq, "shutdown requested"),
            EventKind::AllStoppedWithin => info!(seq, "all stopped within grace"),
            EventKind::GraceExceeded => warn!(seq, "grace exceeded"),
            EventKind::SubscriberOverflow => {
                warn!(seq, subscriber = ?region, ?reason, "subscriber overflow")
            }
            EventKind::SubscriberPanicked => warn!(
                seq,
                subscriber = region.unwrap_or("unknown"),
                info = reason.unwrap_or("unknown"),
                "subscriber panicked"
            ),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
