//! # Background context handle.
//!
//! [`BackgroundContext`] is what an [`Entrypoint`](crate::Entrypoint) receives
//! when the bootstrapper starts it. It is the context's whole view of the
//! coordinator:
//!
//! ```text
//!             coordinator                         background context
//!  ┌─────────────────────────────┐           ┌──────────────────────────┐
//!  │ Synchronizer ── deliver ────┼──(mpsc)──►│ next_event()             │
//!  │      ▲                      │           │                          │
//!  │      └──── on_ready ◄───────┼───────────┤ ready()                  │
//!  │ LifecycleController ◄───────┼───────────┤ promote() / demote()     │
//!  │                             │           │ request_shutdown()       │
//!  └─────────────────────────────┘           └──────────────────────────┘
//! ```
//!
//! Only one message shape flows towards the context (a [`GeofenceEvent`]), so
//! delivery is a single typed channel rather than a call-by-name dispatcher.
//! The links back are weak: a context that outlives its coordinator sees
//! `ready()` return 0 and lifecycle calls report "no change".

use std::sync::Weak;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::lifecycle::LifecycleController;
use crate::core::synchronizer::Synchronizer;
use crate::error::LifecycleError;
use crate::regions::GeofenceEvent;

/// Weak links from the background context back to the coordinator.
#[derive(Clone)]
pub(crate) struct ContextLink {
    pub dispatcher: Weak<Synchronizer>,
    pub lifecycle: Weak<LifecycleController>,
}

/// Handle given to the background entrypoint.
pub struct BackgroundContext {
    entrypoint: String,
    events: mpsc::UnboundedReceiver<GeofenceEvent>,
    link: ContextLink,
    token: CancellationToken,
}

impl BackgroundContext {
    pub(crate) fn new(
        entrypoint: impl Into<String>,
        events: mpsc::UnboundedReceiver<GeofenceEvent>,
        link: ContextLink,
        token: CancellationToken,
    ) -> Self {
        Self {
            entrypoint: entrypoint.into(),
            events,
            link,
            token,
        }
    }

    /// Name of the entrypoint this context runs.
    pub fn entrypoint(&self) -> &str {
        &self.entrypoint
    }

    /// Signals that the context can accept events.
    ///
    /// Flushes every transition buffered during startup into this context's
    /// channel, in arrival order, and switches the coordinator to direct
    /// delivery. Returns the number of flushed events; a repeated call flushes
    /// nothing and returns 0.
    pub fn ready(&self) -> usize {
        self.link
            .dispatcher
            .upgrade()
            .map(|d| d.on_ready())
            .unwrap_or(0)
    }

    /// Waits for the next transition.
    ///
    /// Events already handed over are returned even after teardown began;
    /// `None` means the coordinator is gone or cancelled and nothing is pending.
    pub async fn next_event(&mut self) -> Option<GeofenceEvent> {
        tokio::select! {
            biased;
            ev = self.events.recv() => ev,
            _ = self.token.cancelled() => self.events.try_recv().ok(),
        }
    }

    /// Asks the coordinator to raise process priority to foreground.
    pub fn promote(&self) -> Result<bool, LifecycleError> {
        match self.link.lifecycle.upgrade() {
            Some(lc) => lc.promote(),
            None => Ok(false),
        }
    }

    /// Asks the coordinator to drop back to background priority.
    pub fn demote(&self) -> bool {
        self.link
            .lifecycle
            .upgrade()
            .map(|lc| lc.demote())
            .unwrap_or(false)
    }

    /// Asks the coordinator to shut the lifecycle controller down.
    pub fn request_shutdown(&self) -> bool {
        self.link
            .lifecycle
            .upgrade()
            .map(|lc| lc.shutdown())
            .unwrap_or(false)
    }

    /// Returns true once coordinator teardown has started.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token cancelled on coordinator teardown.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }
}
